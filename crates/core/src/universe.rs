//! The introspection universe: every host declaration the pipeline may look at.
//!
//! A [`TypeUniverse`] is usually loaded from JSON produced by the host side,
//! then extended in Rust with [`SignatureProviders`] for late-bound overrides.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Deserialize;

use crate::error::{BoxError, GenerateError};
use crate::source::{HostPrimitive, SourceType, TypeName};

/// Declarative override metadata attached to a type or member.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideTag {
    /// Emit `text` as-is; `extra_types` are scheduled as if discovered here.
    Verbatim {
        /// Signature text emitted in place of the generated one.
        #[serde(default)]
        text: String,
        /// Types the text mentions that must be declared too.
        #[serde(default)]
        extra_types: Vec<SourceType>,
    },
    /// Ask a registered provider for the text. `owner` defaults to the declaring type.
    MethodReference {
        /// Provider name, registered with [`SignatureProviders::register`].
        name: String,
        /// Type the provider is registered on.
        #[serde(default)]
        owner: Option<TypeName>,
    },
}

/// What a late-bound signature provider returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureResult {
    /// Signature text.
    pub text: String,
    /// Types the text mentions.
    pub extra_types: Vec<SourceType>,
}

impl SignatureResult {
    /// Text with no extra types.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            extra_types: Vec::new(),
        }
    }

    /// Schedule `extra_types` alongside the text.
    pub fn with_extra_types(mut self, extra_types: Vec<SourceType>) -> Self {
        self.extra_types = extra_types;
        self
    }
}

/// A registered late-bound signature provider.
pub type ProviderFn = Box<dyn Fn() -> Result<SignatureResult, BoxError> + Send + Sync>;

/// Late-bound signature providers keyed by `(owner, name)`.
#[derive(Default)]
pub struct SignatureProviders {
    table: HashMap<(TypeName, String), ProviderFn>,
}

impl SignatureProviders {
    /// Register `provider` as `owner::name`, replacing any earlier one.
    pub fn register<F>(&mut self, owner: impl Into<TypeName>, name: impl Into<String>, provider: F)
    where
        F: Fn() -> Result<SignatureResult, BoxError> + Send + Sync + 'static,
    {
        self.table
            .insert((owner.into(), name.into()), Box::new(provider));
    }

    /// Look up the provider registered as `owner::name`.
    pub fn get(
        &self,
        owner: &TypeName,
        name: &str,
    ) -> Option<&ProviderFn> {
        self.table.get(&(owner.clone(), name.to_string()))
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no provider is registered.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl fmt::Debug for SignatureProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self
            .table
            .keys()
            .map(|(owner, name)| format!("{owner}::{name}"))
            .collect();
        keys.sort();
        f.debug_struct("SignatureProviders")
            .field("providers", &keys)
            .finish()
    }
}

/// Flavor of a host declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    /// Concrete or abstract class; emitted as an interface.
    #[default]
    Class,
    /// Interface; a candidate for function-type synthesis.
    Interface,
    /// Enumeration; emitted as a string union.
    Enum,
}

/// How a method is implemented, which decides whether it is emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// Declared without a body.
    Abstract,
    /// Interface method with a default body.
    Default,
    /// Static method, emitted with `static`.
    Static,
    /// Instance method with a body.
    #[default]
    Concrete,
}

/// A declared field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDecl {
    /// Field name, emitted as the property name.
    pub name: String,
    /// Declared type.
    pub ty: SourceType,
    /// Static fields are never emitted.
    #[serde(default)]
    pub is_static: bool,
    /// Override tags; at most one is allowed.
    #[serde(default)]
    pub tags: Vec<OverrideTag>,
    /// Marker names checked by the include, exclude and optional filters.
    #[serde(default)]
    pub markers: Vec<String>,
    /// Raw doc comment lines.
    #[serde(default)]
    pub comments: Vec<String>,
}

/// A method or constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamDecl {
    /// Absent when the host did not record parameter names.
    #[serde(default)]
    pub name: Option<String>,
    /// Declared type.
    pub ty: SourceType,
}

fn void_type() -> SourceType {
    SourceType::Primitive(HostPrimitive::Void)
}

/// A declared method.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodDecl {
    /// Method name.
    pub name: String,
    /// Parameters in declaration order.
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    /// Return type; `void` when absent.
    #[serde(default = "void_type")]
    pub return_type: SourceType,
    /// Implementation kind.
    #[serde(default)]
    pub kind: MethodKind,
    /// Method-level type parameters.
    #[serde(default)]
    pub type_params: Vec<String>,
    /// Override tags; at most one is allowed.
    #[serde(default)]
    pub tags: Vec<OverrideTag>,
    /// Marker names.
    #[serde(default)]
    pub markers: Vec<String>,
    /// Raw doc comment lines.
    #[serde(default)]
    pub comments: Vec<String>,
}

/// A declared constructor. Only tagged constructors are emitted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConstructorDecl {
    /// Parameters in declaration order.
    pub params: Vec<ParamDecl>,
    /// Override tags; at most one is allowed.
    pub tags: Vec<OverrideTag>,
    /// Marker names.
    pub markers: Vec<String>,
}

/// One enum constant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumConstant {
    /// Constant name in the host.
    pub name: String,
    /// Serialized name, when it differs from `name`.
    #[serde(default)]
    pub display: Option<String>,
}

/// A host class, interface or enum.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassDecl {
    /// Filled from the universe key when loading.
    #[serde(skip)]
    pub name: TypeName,
    /// Class, interface or enum.
    pub kind: ClassKind,
    /// Declared type parameters.
    pub type_params: Vec<String>,
    /// Superclass and implemented interfaces.
    pub super_types: Vec<SourceType>,
    /// Type-level override tags; one replaces the declaration header.
    pub tags: Vec<OverrideTag>,
    /// Marker names; include markers here admit every member.
    pub markers: Vec<String>,
    /// Explicitly marked as a functional interface.
    pub functional: bool,
    /// Declared fields.
    pub fields: Vec<FieldDecl>,
    /// Declared methods, overloads included.
    pub methods: Vec<MethodDecl>,
    /// Declared constructors.
    pub constructors: Vec<ConstructorDecl>,
    /// Enum constants in declaration order.
    pub constants: Vec<EnumConstant>,
    /// Raw doc comment lines.
    pub comments: Vec<String>,
}

impl ClassDecl {
    /// An empty declaration.
    pub fn new(name: impl Into<TypeName>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    /// Whether this is an interface.
    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    /// Whether this is an enum.
    pub fn is_enum(&self) -> bool {
        self.kind == ClassKind::Enum
    }

    /// Turn bare names matching type parameters into type variables.
    fn bind_type_params(&mut self) {
        let class_params = self.type_params.clone();
        for ty in &mut self.super_types {
            *ty = ty.bind_type_params(&class_params);
        }
        for field in &mut self.fields {
            field.ty = field.ty.bind_type_params(&class_params);
            bind_tag_types(&mut field.tags, &class_params);
        }
        for method in &mut self.methods {
            let mut params = class_params.clone();
            params.extend(method.type_params.iter().cloned());
            method.return_type = method.return_type.bind_type_params(&params);
            for param in &mut method.params {
                param.ty = param.ty.bind_type_params(&params);
            }
            bind_tag_types(&mut method.tags, &params);
        }
        for ctor in &mut self.constructors {
            for param in &mut ctor.params {
                param.ty = param.ty.bind_type_params(&class_params);
            }
        }
    }
}

fn bind_tag_types(tags: &mut [OverrideTag], params: &[String]) {
    for tag in tags {
        if let OverrideTag::Verbatim { extra_types, .. } = tag {
            for ty in extra_types.iter_mut() {
                *ty = ty.bind_type_params(params);
            }
        }
    }
}

/// A declaration that may carry override tags.
#[derive(Debug, Clone, Copy)]
pub enum Declaration<'a> {
    /// The type itself; a tag here replaces the whole declaration's signature.
    Type(&'a ClassDecl),
    /// A field of `owner`.
    Field {
        /// Declaring type.
        owner: &'a ClassDecl,
        /// The field.
        field: &'a FieldDecl,
    },
    /// A method of `owner`.
    Method {
        /// Declaring type.
        owner: &'a ClassDecl,
        /// The method.
        method: &'a MethodDecl,
    },
    /// A constructor of `owner`.
    Constructor {
        /// Declaring type.
        owner: &'a ClassDecl,
        /// The constructor.
        ctor: &'a ConstructorDecl,
    },
}

impl<'a> Declaration<'a> {
    /// The type the declaration belongs to.
    pub fn owner(&self) -> &'a ClassDecl {
        match *self {
            Declaration::Type(owner)
            | Declaration::Field { owner, .. }
            | Declaration::Method { owner, .. }
            | Declaration::Constructor { owner, .. } => owner,
        }
    }

    /// Override tags on this declaration.
    pub fn tags(&self) -> &'a [OverrideTag] {
        match *self {
            Declaration::Type(owner) => &owner.tags,
            Declaration::Field { field, .. } => &field.tags,
            Declaration::Method { method, .. } => &method.tags,
            Declaration::Constructor { ctor, .. } => &ctor.tags,
        }
    }

    /// Member name, `None` for the type itself.
    pub fn member_name(&self) -> Option<&'a str> {
        match *self {
            Declaration::Type(_) => None,
            Declaration::Field { field, .. } => Some(&field.name),
            Declaration::Method { method, .. } => Some(&method.name),
            Declaration::Constructor { .. } => Some("<init>"),
        }
    }

    /// `pkg.Type` or `pkg.Type.member`, used in diagnostics.
    pub fn qualified_name(&self) -> String {
        match self.member_name() {
            Some(member) => format!("{}.{member}", self.owner().name),
            None => self.owner().name.to_string(),
        }
    }
}

/// Every declaration known to one generation run.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeUniverse {
    #[serde(default)]
    classes: BTreeMap<TypeName, ClassDecl>,
    #[serde(skip)]
    providers: SignatureProviders,
}

impl TypeUniverse {
    /// An empty universe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a universe from its JSON description.
    pub fn from_json(json: &str) -> Result<Self, GenerateError> {
        let mut universe: TypeUniverse = serde_json::from_str(json)?;
        for (name, decl) in &mut universe.classes {
            decl.name = name.clone();
            decl.bind_type_params();
        }
        Ok(universe)
    }

    /// Add or replace a declaration.
    pub fn insert(&mut self, mut decl: ClassDecl) {
        decl.bind_type_params();
        self.classes.insert(decl.name.clone(), decl);
    }

    /// Look up a declaration.
    pub fn get(&self, name: &TypeName) -> Option<&ClassDecl> {
        self.classes.get(name)
    }

    /// Whether `name` is declared.
    pub fn contains(&self, name: &TypeName) -> bool {
        self.classes.contains_key(name)
    }

    /// All declarations, ordered by name.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.classes.values()
    }

    /// Registered late-bound signature providers.
    pub fn providers(&self) -> &SignatureProviders {
        &self.providers
    }

    /// Register a late-bound signature provider for `owner::name`.
    pub fn register_provider<F>(&mut self, owner: impl Into<TypeName>, name: impl Into<String>, provider: F)
    where
        F: Fn() -> Result<SignatureResult, BoxError> + Send + Sync + 'static,
    {
        self.providers.register(owner, name, provider);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const UNIVERSE_JSON: &str = r#"{
  "classes": {
    "demo.Box": {
      "type_params": ["T"],
      "fields": [
        { "name": "value", "ty": "T" },
        { "name": "history", "ty": "List<T>", "tags": [{ "verbatim": { "extra_types": ["demo.Other"] } }] }
      ],
      "methods": [
        { "name": "map", "type_params": ["R"], "params": [{ "ty": "Function<T, R>" }], "return_type": "demo.Box<R>" }
      ]
    },
    "demo.Color": {
      "kind": "enum",
      "constants": [{ "name": "RED", "display": "red" }, { "name": "GREEN" }]
    },
    "demo.Other": {
      "tags": [{ "method_reference": { "name": "signature" } }]
    }
  }
}"#;

    #[test]
    fn test_from_json_binds_names_and_type_params() {
        let universe = TypeUniverse::from_json(UNIVERSE_JSON).unwrap();
        let boxed = universe.get(&TypeName::new("demo.Box")).unwrap();
        assert_eq!(boxed.name.as_str(), "demo.Box");
        assert_eq!(boxed.fields[0].ty, SourceType::TypeVariable("T".into()));
        assert_eq!(
            boxed.methods[0].params[0].ty,
            SourceType::parameterized(
                "Function",
                vec![
                    SourceType::TypeVariable("T".into()),
                    SourceType::TypeVariable("R".into())
                ]
            )
        );
        assert_eq!(boxed.methods[0].kind, MethodKind::Concrete);
        assert_eq!(boxed.methods[0].params[0].name, None);
    }

    #[test]
    fn test_missing_verbatim_text_defaults_to_empty() {
        let universe = TypeUniverse::from_json(UNIVERSE_JSON).unwrap();
        let boxed = universe.get(&TypeName::new("demo.Box")).unwrap();
        assert_eq!(
            boxed.fields[1].tags[0],
            OverrideTag::Verbatim {
                text: String::new(),
                extra_types: vec![SourceType::class("demo.Other")]
            }
        );
    }

    #[test]
    fn test_enum_and_method_reference() {
        let universe = TypeUniverse::from_json(UNIVERSE_JSON).unwrap();
        let color = universe.get(&TypeName::new("demo.Color")).unwrap();
        assert!(color.is_enum());
        assert_eq!(color.constants[0].display.as_deref(), Some("red"));

        let other = universe.get(&TypeName::new("demo.Other")).unwrap();
        assert_eq!(
            other.tags[0],
            OverrideTag::MethodReference {
                name: "signature".into(),
                owner: None
            }
        );
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let err = TypeUniverse::from_json(r#"{ "classes": { "a.B": { "feilds": [] } } }"#)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to parse type universe"), "{err}");
    }

    #[test]
    fn test_bad_type_expression_is_reported() {
        let err = TypeUniverse::from_json(
            r#"{ "classes": { "a.B": { "fields": [{ "name": "x", "ty": "List<" }] } } }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("List<"), "{err}");
    }

    #[test]
    fn test_declaration_names() {
        let universe = TypeUniverse::from_json(UNIVERSE_JSON).unwrap();
        let boxed = universe.get(&TypeName::new("demo.Box")).unwrap();
        let field = Declaration::Field {
            owner: boxed,
            field: &boxed.fields[0],
        };
        assert_eq!(field.qualified_name(), "demo.Box.value");
        assert_eq!(Declaration::Type(boxed).qualified_name(), "demo.Box");
        assert!(Declaration::Type(boxed).tags().is_empty());
    }

    #[test]
    fn test_providers() {
        let mut universe = TypeUniverse::new();
        universe.register_provider("demo.Other", "signature", || {
            Ok(SignatureResult::new("Other"))
        });
        let provider = universe
            .providers()
            .get(&TypeName::new("demo.Other"), "signature")
            .unwrap();
        assert_eq!(provider().unwrap().text, "Other");
        assert!(
            universe
                .providers()
                .get(&TypeName::new("demo.Other"), "missing")
                .is_none()
        );
        assert!(format!("{:?}", universe.providers()).contains("demo.Other::signature"));
    }
}
