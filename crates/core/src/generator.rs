//! TypeScript generation from a type universe.
//!
//! The pipeline is:
//! 1. Parse: roots -> Model (worklist over the processor chain)
//! 2. Enrich: Model -> Model (doc comments and other post-passes)
//! 3. Emit: Model -> String (via the Emit trait)

use std::fmt;

use tracing::info;
use typeweave_common::Settings;

use crate::enrich::{DocCommentEnricher, ModelEnricher};
use crate::error::GenerateError;
use crate::ir::emit_model;
use crate::model::Model;
use crate::parser::{DeclaredMembers, MemberEnumerator, ModelParser, StructuralSource};
use crate::processor::{TypeProcessor, TypeProcessorChain};
use crate::source::SourceType;
use crate::universe::TypeUniverse;

/// Generate TypeScript declarations for everything reachable from `roots`
/// with the default chain and collaborators.
pub fn generate(
    universe: &TypeUniverse,
    roots: &[SourceType],
    settings: &Settings,
) -> Result<String, GenerateError> {
    Generator::new(settings.clone()).generate(universe, roots)
}

/// A configured pipeline. Reusable across universes; every run gets its own
/// symbol table.
pub struct Generator {
    settings: Settings,
    chain: TypeProcessorChain,
    sources: Vec<Box<dyn StructuralSource>>,
    enrichers: Vec<Box<dyn ModelEnricher>>,
    members: Box<dyn MemberEnumerator>,
}

impl Generator {
    /// Default chain for the configured SAM mode, doc comment enrichment and
    /// declared-member enumeration.
    pub fn new(settings: Settings) -> Self {
        let chain = TypeProcessorChain::with_defaults(settings.sam_mode);
        Self {
            settings,
            chain,
            sources: Vec::new(),
            enrichers: vec![Box::new(DocCommentEnricher)],
            members: Box::new(DeclaredMembers),
        }
    }

    /// Settings every run uses.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The processor chain.
    pub fn chain(&self) -> &TypeProcessorChain {
        &self.chain
    }

    /// The processor chain, for in-place changes.
    pub fn chain_mut(&mut self) -> &mut TypeProcessorChain {
        &mut self.chain
    }

    /// Replace the whole processor chain.
    pub fn with_chain(mut self, chain: TypeProcessorChain) -> Self {
        self.chain = chain;
        self
    }

    /// Append a processor after the defaults.
    pub fn push_processor(mut self, processor: impl TypeProcessor + 'static) -> Self {
        self.chain.push(processor);
        self
    }

    /// Insert a processor at `index`; index 0 takes precedence over everything.
    pub fn insert_processor(mut self, index: usize, processor: impl TypeProcessor + 'static) -> Self {
        self.chain.insert(index, processor);
        self
    }

    /// Add a structural source; sources are asked in registration order.
    pub fn with_source(mut self, source: impl StructuralSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Add an enricher after the existing ones.
    pub fn with_enricher(mut self, enricher: impl ModelEnricher + 'static) -> Self {
        self.enrichers.push(Box::new(enricher));
        self
    }

    /// Drop all enrichers, including the default one.
    pub fn without_enrichers(mut self) -> Self {
        self.enrichers.clear();
        self
    }

    /// Replace the member enumeration.
    pub fn with_members(mut self, members: impl MemberEnumerator + 'static) -> Self {
        self.members = Box::new(members);
        self
    }

    /// Parse and enrich the model for `roots`.
    pub fn parse(&self, universe: &TypeUniverse, roots: &[SourceType]) -> Result<Model, GenerateError> {
        let mut model = ModelParser::new(universe, &self.settings, &self.chain)
            .with_sources(&self.sources)
            .with_members(self.members.as_ref())
            .parse(roots.iter().cloned())?;

        for enricher in &self.enrichers {
            enricher.enrich(&mut model, universe)?;
        }

        info!(
            roots = roots.len(),
            beans = model.beans().len(),
            enums = model.enums().len(),
            externals = model.externals().len(),
            "Model built"
        );
        Ok(model)
    }

    /// Parse, enrich and emit.
    pub fn generate(&self, universe: &TypeUniverse, roots: &[SourceType]) -> Result<String, GenerateError> {
        let model = self.parse(universe, roots)?;
        Ok(emit_model(&model, &self.settings))
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("settings", &self.settings)
            .field("chain", &self.chain)
            .field("sources", &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("enrichers", &self.enrichers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ir::{TsPrimitive, TsType};
    use crate::processor::{Context, Resolution};

    const BEAN_JSON: &str = r#"{
  "classes": {
    "demo.Bean": {
      "comments": ["/** A bean. */"],
      "fields": [
        { "name": "when", "ty": "demo.Instant" },
        { "name": "count", "ty": "int" }
      ]
    },
    "demo.Instant": {
      "fields": [{ "name": "epoch", "ty": "long" }]
    }
  }
}"#;

    fn roots() -> Vec<SourceType> {
        vec![SourceType::class("demo.Bean")]
    }

    #[test]
    fn test_generate_defaults() {
        let universe = TypeUniverse::from_json(BEAN_JSON).unwrap();
        let output = generate(&universe, &roots(), &Settings::default()).unwrap();
        assert_eq!(
            output,
            "\n/** A bean. */\ninterface Bean {\n    count: number;\n    when: Instant;\n}\n\ninterface Instant {\n    epoch: number;\n}\n"
        );
    }

    #[test]
    fn test_inserted_processor_takes_precedence() {
        let universe = TypeUniverse::from_json(BEAN_JSON).unwrap();
        let instant_as_string =
            |ty: &SourceType, _: &mut Context<'_>| -> Result<Option<Resolution>, GenerateError> {
                Ok((*ty == SourceType::class("demo.Instant"))
                    .then(|| Resolution::new(TsType::Primitive(TsPrimitive::String))))
            };
        let output = Generator::new(Settings::default())
            .without_enrichers()
            .insert_processor(0, instant_as_string)
            .generate(&universe, &roots())
            .unwrap();
        assert_eq!(output, "\ninterface Bean {\n    count: number;\n    when: string;\n}\n");
    }

    #[test]
    fn test_generator_is_reusable() {
        let universe = TypeUniverse::from_json(BEAN_JSON).unwrap();
        let generator = Generator::new(Settings::default());
        let first = generator.generate(&universe, &roots()).unwrap();
        let second = generator.generate(&universe, &roots()).unwrap();
        assert_eq!(first, second);
        assert_eq!(generator.chain().len(), 3);
    }
}
