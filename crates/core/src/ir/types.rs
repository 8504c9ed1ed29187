//! TypeScript type tree produced by the processor chain.
//!
//! - TsType: resolved types (primitives, arrays, references, function types, verbatim text)
//! - TsPrimitive: the built-in TypeScript primitives
//! - TsParam: a named function-type parameter

use crate::symbols::Symbol;

/// TypeScript type representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsType {
    /// Primitive types: string, number, boolean, null, void, any, unknown
    Primitive(TsPrimitive),
    /// Array type: T[]
    Array(Box<TsType>),
    /// String-keyed map: Record<string, V>
    Record(Box<TsType>),
    /// Named declaration, optionally applied to arguments: Foo, Box<string>
    Reference {
        /// The declaration.
        symbol: Symbol,
        /// Type arguments; empty for a bare reference.
        args: Vec<TsType>,
    },
    /// Generic parameter in scope: T
    TypeVariable(String),
    /// Function type: (arg0: string) => number
    Function {
        /// Parameters in order.
        params: Vec<TsParam>,
        /// Return type.
        ret: Box<TsType>,
    },
    /// Text supplied by an override, emitted unmodified
    Verbatim(String),
}

impl TsType {
    /// Bare reference to a declaration.
    pub fn reference(symbol: Symbol) -> Self {
        TsType::Reference {
            symbol,
            args: Vec::new(),
        }
    }

    /// Check if this type names a declaration (the only shape the parser keeps)
    pub fn is_reference(&self) -> bool {
        matches!(self, TsType::Reference { .. })
    }

    /// Check if this type is override text as a whole
    pub fn is_verbatim(&self) -> bool {
        matches!(self, TsType::Verbatim(_))
    }

    /// Check if any part of this type is override text
    pub fn contains_verbatim(&self) -> bool {
        match self {
            TsType::Verbatim(_) => true,
            TsType::Array(inner) | TsType::Record(inner) => inner.contains_verbatim(),
            TsType::Reference { args, .. } => args.iter().any(TsType::contains_verbatim),
            TsType::Function { params, ret } => {
                params.iter().any(|p| p.ty.contains_verbatim()) || ret.contains_verbatim()
            }
            TsType::Primitive(_) | TsType::TypeVariable(_) => false,
        }
    }
}

/// TypeScript primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
    /// `void`
    Void,
    /// `any`
    Any,
    /// `unknown`
    Unknown,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsParam {
    /// Parameter name, sanitized on emission.
    pub name: String,
    /// Parameter type.
    pub ty: TsType,
}

impl TsParam {
    /// A named parameter.
    pub fn new(name: impl Into<String>, ty: TsType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Positional placeholder used when the host recorded no name.
    pub fn positional(index: usize, ty: TsType) -> Self {
        Self::new(format!("arg{index}"), ty)
    }
}
