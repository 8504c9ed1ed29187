//! Per-run symbol assignment.
//!
//! A [`SymbolTable`] hands out one [`Symbol`] per structurally distinct
//! [`SourceType`]. Asking twice for the same type returns the same symbol, so
//! every later reference can compare handles instead of type trees.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::source::SourceType;

/// Stable identity of a reference-shaped type within one run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    id: usize,
    name: String,
}

impl Symbol {
    /// Creation order within the run.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Name the declaration is emitted under.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Symbols assigned so far in one run.
#[derive(Debug, Default)]
pub struct SymbolTable {
    by_type: HashMap<SourceType, Symbol>,
    names: HashSet<String>,
}

impl SymbolTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the symbol for `ty`, creating it on first request.
    ///
    /// Names are derived from the simple type name. Two different types with
    /// the same simple name get numeric suffixes (`Foo`, `Foo2`, ...).
    pub fn symbol(&mut self, ty: &SourceType) -> Symbol {
        if let Some(symbol) = self.by_type.get(ty) {
            return symbol.clone();
        }

        let base = base_name(ty);
        let mut name = base.clone();
        let mut suffix = 2;
        while self.names.contains(&name) {
            name = format!("{base}{suffix}");
            suffix += 1;
        }

        let symbol = Symbol {
            id: self.by_type.len(),
            name: name.clone(),
        };
        tracing::trace!(ty = %ty, symbol = %symbol, "Assigned symbol");
        self.names.insert(name);
        self.by_type.insert(ty.clone(), symbol.clone());
        symbol
    }

    /// Look up a symbol without creating one.
    pub fn get(&self, ty: &SourceType) -> Option<&Symbol> {
        self.by_type.get(ty)
    }

    /// Number of symbols assigned.
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    /// Whether no symbol was assigned yet.
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

fn base_name(ty: &SourceType) -> String {
    match ty {
        SourceType::Class(name) | SourceType::Parameterized { raw: name, .. } => {
            name.simple_name().to_string()
        }
        SourceType::Primitive(p) => p.as_str().to_string(),
        SourceType::TypeVariable(name) => name.clone(),
        SourceType::Array(elem) => format!("{}Array", base_name(elem)),
    }
}
