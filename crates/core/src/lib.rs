//! Structural TypeScript declarations from a nominal host type model.
//!
//! A [`TypeUniverse`] describes the host classes, interfaces and enums. Starting
//! from a set of root types, the [`ModelParser`] walks everything reachable,
//! resolving each type through an ordered [`TypeProcessorChain`]:
//!
//! 1. [`OverrideResolver`]: per-declaration override tags (verbatim text or a
//!    late-bound signature provider) replace a member or a declaration header.
//! 2. [`SamProcessor`]: single-abstract-method interfaces become function types.
//! 3. [`StructuralProcessor`]: primitives, collections, maps and references.
//!
//! The resulting [`Model`] is enriched and emitted as TypeScript text.
//!
//! ```
//! use typeweave_common::Settings;
//! use typeweave_core::{SourceType, TypeUniverse, generate};
//!
//! let universe = TypeUniverse::from_json(
//!     r#"{ "classes": { "demo.Point": { "fields": [{ "name": "x", "ty": "int" }] } } }"#,
//! )?;
//! let output = generate(&universe, &[SourceType::class("demo.Point")], &Settings::default())?;
//! assert_eq!(output, "\ninterface Point {\n    x: number;\n}\n");
//! # Ok::<(), typeweave_core::GenerateError>(())
//! ```

pub mod enrich;
pub mod error;
pub mod generator;
pub mod ir;
pub mod model;
pub mod parser;
pub mod processor;
pub mod source;
pub mod symbols;
pub mod universe;

pub use enrich::{DocCommentEnricher, ModelEnricher, harvest_comments};
pub use error::{BoxError, GenerateError};
pub use generator::{Generator, generate};
pub use ir::{Emit, TsParam, TsPrimitive, TsType};
pub use model::{
    BeanModel, DeclarationModel, EnumMember, EnumModel, ExternalDeclaration, MethodModel, Model,
    PropertyModel,
};
pub use parser::{Claim, DeclaredMembers, MemberEnumerator, ModelParser, StructuralSource};
pub use processor::{
    Context, OverrideResolver, Resolution, SamProcessor, StructuralProcessor, TypeProcessor,
    TypeProcessorChain,
};
pub use source::{HostPrimitive, SourceEntry, SourceType, TypeName};
pub use symbols::{Symbol, SymbolTable};
pub use universe::{
    ClassDecl, ClassKind, ConstructorDecl, Declaration, EnumConstant, FieldDecl, MethodDecl,
    MethodKind, OverrideTag, ParamDecl, SignatureProviders, SignatureResult, TypeUniverse,
};
