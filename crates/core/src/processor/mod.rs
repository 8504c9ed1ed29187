//! Type processor chain.
//!
//! A [`TypeProcessor`] turns a [`SourceType`] into a [`Resolution`] or
//! declines with `Ok(None)`. The [`TypeProcessorChain`] asks its processors in
//! order and returns the first match; nothing is merged. Processors recurse
//! into nested types through [`Context::process_type`], which runs the same
//! chain again with the same symbol table.

mod overrides;
mod sam;
mod structural;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;
use typeweave_common::{SamMode, Settings};

use crate::error::GenerateError;
use crate::ir::TsType;
use crate::source::SourceType;
use crate::symbols::{Symbol, SymbolTable};
use crate::universe::{Declaration, TypeUniverse};

pub use overrides::OverrideResolver;
pub use sam::SamProcessor;
pub use structural::StructuralProcessor;
pub(crate) use structural::is_builtin;

/// A resolved type plus the types it made reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The resolved type.
    pub ty: TsType,
    /// Types that need their own declarations.
    pub dependents: Vec<SourceType>,
}

impl Resolution {
    /// A resolution with no dependents.
    pub fn new(ty: TsType) -> Self {
        Self {
            ty,
            dependents: Vec::new(),
        }
    }

    /// A resolution that makes `dependents` reachable.
    pub fn with_dependents(ty: TsType, dependents: Vec<SourceType>) -> Self {
        Self { ty, dependents }
    }
}

/// One link of the chain.
pub trait TypeProcessor {
    /// Resolve `ty`, or return `Ok(None)` to let the next processor try.
    fn process_type(
        &self,
        ty: &SourceType,
        ctx: &mut Context<'_>,
    ) -> Result<Option<Resolution>, GenerateError>;

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> TypeProcessor for F
where
    F: Fn(&SourceType, &mut Context<'_>) -> Result<Option<Resolution>, GenerateError>,
{
    fn process_type(
        &self,
        ty: &SourceType,
        ctx: &mut Context<'_>,
    ) -> Result<Option<Resolution>, GenerateError> {
        self(ty, ctx)
    }
}

/// Ambient values attached to a context, one per type.
type Extensions = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// State visible to processors while resolving one type.
///
/// The symbol table is shared with every context of the same run. The member
/// and the extensions belong to this context only: [`Context::with_extension`]
/// and [`Context::with_member`] hand out a child context and leave the
/// caller's values untouched.
pub struct Context<'a> {
    symbols: &'a mut SymbolTable,
    chain: &'a TypeProcessorChain,
    universe: &'a TypeUniverse,
    settings: &'a Settings,
    member: Option<Declaration<'a>>,
    extensions: Arc<Extensions>,
}

impl<'a> Context<'a> {
    /// A root context with no member and no extensions.
    pub fn new(
        symbols: &'a mut SymbolTable,
        chain: &'a TypeProcessorChain,
        universe: &'a TypeUniverse,
        settings: &'a Settings,
    ) -> Self {
        Self {
            symbols,
            chain,
            universe,
            settings,
            member: None,
            extensions: Arc::new(Extensions::new()),
        }
    }

    /// Set the declaration whose type is being resolved.
    pub fn for_member(mut self, member: Option<Declaration<'a>>) -> Self {
        self.member = member;
        self
    }

    /// Get or create the symbol for `ty`.
    pub fn symbol(&mut self, ty: &SourceType) -> Symbol {
        self.symbols.symbol(ty)
    }

    /// Resolve a nested type through the whole chain.
    pub fn process_type(&mut self, ty: &SourceType) -> Result<Option<Resolution>, GenerateError> {
        let chain = self.chain;
        chain.process_type(ty, self)
    }

    /// Declaration whose type is being resolved, if any.
    pub fn member(&self) -> Option<Declaration<'a>> {
        self.member
    }

    /// The universe of the current run.
    pub fn universe(&self) -> &'a TypeUniverse {
        self.universe
    }

    /// Settings of the current run.
    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    /// The value of type `T` bound by an enclosing [`Context::with_extension`].
    pub fn extension<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Child context with `value` bound for nested calls.
    pub fn with_extension<T: Any + Send + Sync>(&mut self, value: T) -> Context<'_> {
        let mut extensions = Extensions::clone(&self.extensions);
        extensions.insert(TypeId::of::<T>(), Arc::new(value));
        Context {
            symbols: &mut *self.symbols,
            chain: self.chain,
            universe: self.universe,
            settings: self.settings,
            member: self.member,
            extensions: Arc::new(extensions),
        }
    }

    /// Child context resolving on behalf of another declaration.
    pub fn with_member<'b>(&'b mut self, member: Option<Declaration<'b>>) -> Context<'b> {
        Context {
            symbols: &mut *self.symbols,
            chain: self.chain,
            universe: self.universe,
            settings: self.settings,
            member,
            extensions: Arc::clone(&self.extensions),
        }
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("member", &self.member.map(|m| m.qualified_name()))
            .field("extensions", &self.extensions.len())
            .finish()
    }
}

/// Ordered processors; order is precedence.
#[derive(Default)]
pub struct TypeProcessorChain {
    processors: Vec<Box<dyn TypeProcessor>>,
}

impl TypeProcessorChain {
    /// An empty chain; it resolves nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides, then functional interfaces, then the structural fallback.
    pub fn with_defaults(sam_mode: SamMode) -> Self {
        let mut chain = Self::new();
        chain.push(OverrideResolver);
        chain.push(SamProcessor::new(sam_mode));
        chain.push(StructuralProcessor);
        chain
    }

    /// Append a processor with the lowest precedence.
    pub fn push(&mut self, processor: impl TypeProcessor + 'static) {
        self.processors.push(Box::new(processor));
    }

    /// Insert at `index`, shifting later processors down. Clamped to the end.
    pub fn insert(&mut self, index: usize, processor: impl TypeProcessor + 'static) {
        let index = index.min(self.processors.len());
        self.processors.insert(index, Box::new(processor));
    }

    /// Number of processors.
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Whether the chain has no processors.
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Processor names in precedence order.
    pub fn names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }
}

impl TypeProcessor for TypeProcessorChain {
    fn process_type(
        &self,
        ty: &SourceType,
        ctx: &mut Context<'_>,
    ) -> Result<Option<Resolution>, GenerateError> {
        for processor in &self.processors {
            if let Some(resolution) = processor.process_type(ty, ctx)? {
                trace!(ty = %ty, processor = processor.name(), "Processor matched");
                return Ok(Some(resolution));
            }
        }
        Ok(None)
    }
}

impl fmt::Debug for TypeProcessorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
