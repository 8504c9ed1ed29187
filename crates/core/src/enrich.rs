//! Post-parse model enrichment.

use tracing::trace;

use crate::error::GenerateError;
use crate::model::Model;
use crate::source::SourceType;
use crate::universe::{ClassDecl, TypeUniverse};

/// A pass over the finished model, run in registration order.
pub trait ModelEnricher {
    /// Update `model` in place; `universe` is the one it was parsed from.
    fn enrich(&self, model: &mut Model, universe: &TypeUniverse) -> Result<(), GenerateError>;
}

/// Copies host documentation comments onto declarations and their members.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocCommentEnricher;

fn declaration_for<'u>(
    universe: &'u TypeUniverse,
    source: &SourceType,
) -> Option<&'u ClassDecl> {
    source.raw_name().and_then(|name| universe.get(name))
}

impl ModelEnricher for DocCommentEnricher {
    fn enrich(&self, model: &mut Model, universe: &TypeUniverse) -> Result<(), GenerateError> {
        for bean in model.beans_mut() {
            let Some(decl) = declaration_for(universe, &bean.source) else {
                continue;
            };
            trace!(class = %decl.name, "Harvesting comments");
            bean.comments = harvest_comments(&decl.comments);
            for property in &mut bean.properties {
                if let Some(field) = decl.fields.iter().find(|f| f.name == property.name) {
                    property.comments = harvest_comments(&field.comments);
                }
            }
            for method in &mut bean.methods {
                if let Some(found) = decl
                    .methods
                    .iter()
                    .find(|m| m.name == method.name && m.params.len() == method.arity)
                {
                    method.comments = harvest_comments(&found.comments);
                }
            }
        }

        for enum_model in model.enums_mut() {
            if let Some(decl) = declaration_for(universe, &enum_model.source) {
                enum_model.comments = harvest_comments(&decl.comments);
            }
        }
        Ok(())
    }
}

/// Normalize raw doc comment lines.
///
/// Strips `/**`, `*/` and leading `*` decorations, trims each line and drops
/// blank lines at either end. Blank lines inside the comment are kept.
pub fn harvest_comments(raw: &[String]) -> Vec<String> {
    let mut lines: Vec<String> = raw
        .iter()
        .flat_map(|chunk| chunk.lines())
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix("/**").unwrap_or(line);
            let line = line.strip_suffix("*/").unwrap_or(line).trim_end();
            let line = line.trim_start();
            let line = line.strip_prefix('*').unwrap_or(line);
            line.trim().to_string()
        })
        .collect();

    while lines.first().is_some_and(String::is_empty) {
        lines.remove(0);
    }
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}
