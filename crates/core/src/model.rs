//! Declaration model assembled by the parser.
//!
//! The [`Model`] holds at most one declaration per structural source type.
//! Members keep the resolved [`TsType`] trees; turning them into text is the
//! emitter's job.

use std::collections::HashSet;

use crate::error::GenerateError;
use crate::ir::{TsParam, TsType};
use crate::source::SourceType;
use crate::symbols::Symbol;

/// A bean property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyModel {
    /// Property name.
    pub name: String,
    /// `Verbatim` when an override replaced the whole member.
    pub ty: TsType,
    /// Emitted as `name?:`.
    pub optional: bool,
    /// Normalized doc comment lines.
    pub comments: Vec<String>,
}

/// A bean method or tagged constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodModel {
    /// Method name; `constructor` for tagged constructors.
    pub name: String,
    /// Resolved parameters; empty when the text is verbatim.
    pub params: Vec<TsParam>,
    /// `Verbatim` when an override replaced the whole member.
    pub ret: TsType,
    /// Parameter count of the host method; tells overloads apart.
    pub arity: usize,
    /// Emitted with `static`.
    pub is_static: bool,
    /// Interface default methods are emitted as optional (`name?(...)`).
    pub optional: bool,
    /// Normalized doc comment lines.
    pub comments: Vec<String>,
}

/// A structured record declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeanModel {
    /// Type the declaration was generated for.
    pub source: SourceType,
    /// Name the declaration is emitted under.
    pub symbol: Symbol,
    /// Declared type parameters.
    pub type_params: Vec<String>,
    /// Resolved super types that are themselves declarations.
    pub extends: Vec<TsType>,
    /// Type-level override text; replaces the emitted header.
    pub signature: Option<String>,
    /// Properties in declaration order.
    pub properties: Vec<PropertyModel>,
    /// Methods and tagged constructors in declaration order.
    pub methods: Vec<MethodModel>,
    /// Normalized doc comment lines.
    pub comments: Vec<String>,
}

/// One enum constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    /// Constant name in the host.
    pub source_name: String,
    /// String literal the constant is emitted as.
    pub display_name: String,
}

/// An enumeration declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumModel {
    /// Type the declaration was generated for.
    pub source: SourceType,
    /// Name the declaration is emitted under.
    pub symbol: Symbol,
    /// Type-level override text; replaces the emitted header.
    pub signature: Option<String>,
    /// Constants in declaration order.
    pub members: Vec<EnumMember>,
    /// Normalized doc comment lines.
    pub comments: Vec<String>,
}

/// A declaration contributed by a structural-source collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalDeclaration {
    /// Type the collaborator claimed.
    pub source: SourceType,
    /// Name used for ordering the output.
    pub name: String,
    /// Complete declaration text.
    pub body: String,
}

/// A declaration produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationModel {
    /// Interface declaration.
    Bean(BeanModel),
    /// String union declaration.
    Enum(EnumModel),
}

impl DeclarationModel {
    /// Type the declaration was generated for.
    pub fn source(&self) -> &SourceType {
        match self {
            DeclarationModel::Bean(bean) => &bean.source,
            DeclarationModel::Enum(model) => &model.source,
        }
    }
}

/// Everything discovered in one run.
#[derive(Debug, Default)]
pub struct Model {
    beans: Vec<BeanModel>,
    enums: Vec<EnumModel>,
    externals: Vec<ExternalDeclaration>,
    sources: HashSet<SourceType>,
}

impl Model {
    /// An empty model.
    pub fn new() -> Self {
        Self::default()
    }

    fn claim_source(&mut self, source: &SourceType) -> Result<(), GenerateError> {
        if !self.sources.insert(source.clone()) {
            return Err(GenerateError::Structural(format!(
                "'{source}' already has a declaration in the model"
            )));
        }
        Ok(())
    }

    /// Add a declaration. A second declaration for the same source type is a structural error.
    pub fn add_declaration(&mut self, declaration: DeclarationModel) -> Result<(), GenerateError> {
        self.claim_source(declaration.source())?;
        match declaration {
            DeclarationModel::Bean(bean) => self.beans.push(bean),
            DeclarationModel::Enum(model) => self.enums.push(model),
        }
        Ok(())
    }

    /// Add a collaborator's declaration, under the same uniqueness rule.
    pub fn add_external(&mut self, external: ExternalDeclaration) -> Result<(), GenerateError> {
        self.claim_source(&external.source)?;
        self.externals.push(external);
        Ok(())
    }

    /// Whether `source` already has a declaration.
    pub fn contains(&self, source: &SourceType) -> bool {
        self.sources.contains(source)
    }

    /// Interface declarations in discovery order.
    pub fn beans(&self) -> &[BeanModel] {
        &self.beans
    }

    /// Enum declarations in discovery order.
    pub fn enums(&self) -> &[EnumModel] {
        &self.enums
    }

    /// Collaborator declarations in discovery order.
    pub fn externals(&self) -> &[ExternalDeclaration] {
        &self.externals
    }

    /// Mutable access for enrichers.
    pub fn beans_mut(&mut self) -> &mut [BeanModel] {
        &mut self.beans
    }

    /// Mutable access for enrichers.
    pub fn enums_mut(&mut self) -> &mut [EnumModel] {
        &mut self.enums
    }

    /// Find an interface declaration by emitted name.
    pub fn bean(&self, name: &str) -> Option<&BeanModel> {
        self.beans.iter().find(|b| b.symbol.name() == name)
    }

    /// Find an enum declaration by emitted name.
    pub fn enum_model(&self, name: &str) -> Option<&EnumModel> {
        self.enums.iter().find(|e| e.symbol.name() == name)
    }

    /// Number of declarations of every kind.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether nothing was declared.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::symbols::SymbolTable;

    fn bean(table: &mut SymbolTable, name: &str) -> BeanModel {
        let source = SourceType::class(name);
        BeanModel {
            symbol: table.symbol(&source),
            source,
            type_params: vec![],
            extends: vec![],
            signature: None,
            properties: vec![],
            methods: vec![],
            comments: vec![],
        }
    }

    #[test]
    fn test_one_declaration_per_source() {
        let mut table = SymbolTable::new();
        let mut model = Model::new();
        model
            .add_declaration(DeclarationModel::Bean(bean(&mut table, "a.Foo")))
            .unwrap();
        let err = model
            .add_declaration(DeclarationModel::Bean(bean(&mut table, "a.Foo")))
            .unwrap_err();
        assert!(matches!(err, GenerateError::Structural(_)));
        assert_eq!(model.len(), 1);
        assert!(model.bean("Foo").is_some());
    }

    #[test]
    fn test_external_conflicts_with_bean() {
        let mut table = SymbolTable::new();
        let mut model = Model::new();
        model
            .add_declaration(DeclarationModel::Bean(bean(&mut table, "a.Api")))
            .unwrap();
        let err = model
            .add_external(ExternalDeclaration {
                source: SourceType::class("a.Api"),
                name: "Api".into(),
                body: "interface Api {}".into(),
            })
            .unwrap_err();
        assert!(err.to_string().contains("a.Api"), "{err}");
    }
}
