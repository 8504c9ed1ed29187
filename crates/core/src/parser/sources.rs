//! Structural-source collaborators.
//!
//! A structural source looks at each worklist entry before the processor
//! chain does and may claim it, contributing its own declarations (a REST
//! client, say) instead of a bean or enum.

use crate::error::GenerateError;
use crate::model::ExternalDeclaration;
use crate::processor::Context;
use crate::source::{SourceEntry, SourceType};

/// What a structural source produced for a claimed entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Claim {
    /// Declarations added to the model as they are.
    pub declarations: Vec<ExternalDeclaration>,
    /// Types to schedule, with the claimed entry's provenance.
    pub dependents: Vec<SourceType>,
}

impl Claim {
    /// A claim that declares nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration.
    pub fn with_declaration(mut self, declaration: ExternalDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Schedule more types.
    pub fn with_dependents(mut self, dependents: Vec<SourceType>) -> Self {
        self.dependents.extend(dependents);
        self
    }
}

/// A collaborator that can take over whole worklist entries.
pub trait StructuralSource {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Claim `entry`, or return `Ok(None)` to leave it to the processor chain.
    ///
    /// `ctx` is a fresh context of the current run, so types resolved here
    /// share symbols with the rest of the model.
    fn try_claim(
        &self,
        entry: &SourceEntry,
        ctx: &mut Context<'_>,
    ) -> Result<Option<Claim>, GenerateError>;
}
