//! Errors raised while generating declarations.
//!
//! Every variant is fatal for the current run. A processor declining a type
//! is not an error; it returns `Ok(None)`.

use crate::source::TypeName;

/// Boxed cause carried by late-bound signature failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for the generation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// An override's verbatim text is empty or absent.
    #[error("Invalid signature annotation on '{declaration}': {reason}")]
    Configuration {
        /// Qualified name of the tagged declaration.
        declaration: String,
        /// What is wrong with the tag.
        reason: String,
    },

    /// More than one override tag on a single declaration.
    #[error("Only one signature annotation allowed, but found multiple on '{declaration}'")]
    AmbiguousOverride {
        /// Qualified name of the tagged declaration.
        declaration: String,
    },

    /// A late-bound signature could not be produced.
    #[error("Unable to process signature reference '{reference}': {source}")]
    Resolution {
        /// `Owner::name` of the provider.
        reference: String,
        /// Why the provider failed.
        #[source]
        source: BoxError,
    },

    /// Internal invariant violation.
    #[error("Structural error: {0}")]
    Structural(String),

    /// An entry point names a class the universe does not declare.
    #[error("Entry point '{0}' is not declared in the type universe")]
    UnknownRoot(TypeName),

    /// Malformed type expression.
    #[error("Invalid type expression '{input}' at {position}: {reason}")]
    Parse {
        /// The whole expression.
        input: String,
        /// Byte offset of the failure.
        position: usize,
        /// What was expected there.
        reason: String,
    },

    /// The universe JSON does not match the expected shape.
    #[error("Failed to parse type universe: {0}")]
    Universe(#[from] serde_json::Error),
}

impl GenerateError {
    pub(crate) fn configuration(declaration: impl Into<String>, reason: impl Into<String>) -> Self {
        GenerateError::Configuration {
            declaration: declaration.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error is an override ambiguity.
    pub fn is_ambiguous_override(&self) -> bool {
        matches!(self, GenerateError::AmbiguousOverride { .. })
    }

    /// Returns true if this error is a late-bound resolution failure.
    pub fn is_resolution(&self) -> bool {
        matches!(self, GenerateError::Resolution { .. })
    }

    /// Returns true if this error is an override configuration problem.
    pub fn is_configuration(&self) -> bool {
        matches!(self, GenerateError::Configuration { .. })
    }
}
