//! Declarative signature overrides.
//!
//! A declaration carrying exactly one [`OverrideTag`] resolves to its text and
//! nothing else is inspected. Two or more tags are an error; they are never
//! merged or ranked.

use tracing::debug;

use super::{Context, Resolution, TypeProcessor};
use crate::error::GenerateError;
use crate::ir::TsType;
use crate::source::SourceType;
use crate::universe::{Declaration, OverrideTag, SignatureProviders};

/// Highest-precedence processor: resolves the tags of the context member.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverrideResolver;

impl OverrideResolver {
    /// Resolve the override tags on `declaration`, if any.
    ///
    /// Used by the chain for members and by the parser for type-level tags.
    pub fn resolve_declaration(
        declaration: Declaration<'_>,
        providers: &SignatureProviders,
    ) -> Result<Option<Resolution>, GenerateError> {
        match declaration.tags() {
            [] => Ok(None),
            [tag] => resolve_tag(declaration, tag, providers).map(Some),
            _ => Err(GenerateError::AmbiguousOverride {
                declaration: declaration.qualified_name(),
            }),
        }
    }
}

fn resolve_tag(
    declaration: Declaration<'_>,
    tag: &OverrideTag,
    providers: &SignatureProviders,
) -> Result<Resolution, GenerateError> {
    match tag {
        OverrideTag::Verbatim { text, extra_types } => {
            if text.trim().is_empty() {
                return Err(GenerateError::configuration(
                    declaration.qualified_name(),
                    "verbatim signature text is empty",
                ));
            }
            Ok(Resolution::with_dependents(
                TsType::Verbatim(text.clone()),
                extra_types.clone(),
            ))
        }
        OverrideTag::MethodReference { name, owner } => {
            let owner = owner
                .clone()
                .unwrap_or_else(|| declaration.owner().name.clone());
            let reference = format!("{owner}::{name}");
            debug!(declaration = %declaration.qualified_name(), reference = %reference, "Invoking signature provider");

            let provider = providers
                .get(&owner, name)
                .ok_or_else(|| GenerateError::Resolution {
                    reference: reference.clone(),
                    source: format!("no signature provider registered for '{reference}'").into(),
                })?;
            let result = provider().map_err(|source| GenerateError::Resolution {
                reference: reference.clone(),
                source,
            })?;
            if result.text.trim().is_empty() {
                return Err(GenerateError::Resolution {
                    reference,
                    source: "signature provider returned empty text".into(),
                });
            }
            Ok(Resolution::with_dependents(
                TsType::Verbatim(result.text),
                result.extra_types,
            ))
        }
    }
}

impl TypeProcessor for OverrideResolver {
    fn process_type(
        &self,
        _ty: &SourceType,
        ctx: &mut Context<'_>,
    ) -> Result<Option<Resolution>, GenerateError> {
        match ctx.member() {
            Some(member) => Self::resolve_declaration(member, ctx.universe().providers()),
            None => Ok(None),
        }
    }
}
