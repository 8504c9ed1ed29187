//! Source-side type occurrences.
//!
//! A [`SourceType`] describes a use of a host type, possibly parameterized.
//! Equality is structural: `List<Foo>` and `List<Bar>` are different types,
//! while two `List<Foo>` found on different paths are the same one. Where a
//! type was found is carried separately by [`SourceEntry`].

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::GenerateError;

/// Fully-qualified host type name, e.g. `com.example.Outer$Inner`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    /// Wrap a fully-qualified name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The fully-qualified name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Segment after the last `.` or `$`.
    pub fn simple_name(&self) -> &str {
        self.0
            .rsplit(['.', '$'])
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Built-in host types that have no declaration of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostPrimitive {
    /// `boolean`, `Boolean`.
    Boolean,
    /// `byte`, `Byte`.
    Byte,
    /// `short`, `Short`.
    Short,
    /// `int`, `Integer`.
    Int,
    /// `long`, `Long`.
    Long,
    /// `float`, `Float`.
    Float,
    /// `double`, `Double`, `Number`.
    Double,
    /// `char`, `Character`.
    Char,
    /// `String`, `CharSequence`.
    String,
    /// `void`, `Void`.
    Void,
    /// `Object`; emitted as `any`.
    Object,
}

impl HostPrimitive {
    /// Recognise a primitive, boxed or `java.lang` spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        let bare = name.strip_prefix("java.lang.").unwrap_or(name);
        let primitive = match bare {
            "boolean" | "Boolean" => HostPrimitive::Boolean,
            "byte" | "Byte" => HostPrimitive::Byte,
            "short" | "Short" => HostPrimitive::Short,
            "int" | "Integer" => HostPrimitive::Int,
            "long" | "Long" => HostPrimitive::Long,
            "float" | "Float" => HostPrimitive::Float,
            "double" | "Double" | "Number" => HostPrimitive::Double,
            "char" | "Character" => HostPrimitive::Char,
            "String" | "CharSequence" => HostPrimitive::String,
            "void" | "Void" => HostPrimitive::Void,
            "Object" => HostPrimitive::Object,
            _ => return None,
        };
        Some(primitive)
    }

    /// Canonical host spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            HostPrimitive::Boolean => "boolean",
            HostPrimitive::Byte => "byte",
            HostPrimitive::Short => "short",
            HostPrimitive::Int => "int",
            HostPrimitive::Long => "long",
            HostPrimitive::Float => "float",
            HostPrimitive::Double => "double",
            HostPrimitive::Char => "char",
            HostPrimitive::String => "String",
            HostPrimitive::Void => "void",
            HostPrimitive::Object => "Object",
        }
    }
}

/// A structural descriptor of a type occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum SourceType {
    /// Built-in type, boxed or not.
    Primitive(HostPrimitive),
    /// Bare class, interface or enum reference.
    Class(TypeName),
    /// Generic type applied to arguments at a use site.
    Parameterized {
        /// The generic declaration.
        raw: TypeName,
        /// Type arguments in declaration order.
        args: Vec<SourceType>,
    },
    /// A type parameter bound by the enclosing declaration or method.
    TypeVariable(String),
    /// Array of the element type.
    Array(Box<SourceType>),
}

impl SourceType {
    /// A bare class reference.
    pub fn class(name: impl Into<String>) -> Self {
        SourceType::Class(TypeName::new(name))
    }

    /// `raw` applied to `args`.
    pub fn parameterized(raw: impl Into<String>, args: Vec<SourceType>) -> Self {
        SourceType::Parameterized {
            raw: TypeName::new(raw),
            args,
        }
    }

    /// The class this type is declared by, if any.
    pub fn raw_name(&self) -> Option<&TypeName> {
        match self {
            SourceType::Class(name) | SourceType::Parameterized { raw: name, .. } => Some(name),
            _ => None,
        }
    }

    /// Rewrite bare names that match `params` into type variables.
    ///
    /// Type expressions are parsed without scope information, so `T` reads as
    /// a class until the enclosing declaration binds it.
    pub fn bind_type_params(&self, params: &[String]) -> SourceType {
        if params.is_empty() {
            return self.clone();
        }
        match self {
            SourceType::Class(name) if params.iter().any(|p| p == name.as_str()) => {
                SourceType::TypeVariable(name.as_str().to_string())
            }
            SourceType::Parameterized { raw, args } => SourceType::Parameterized {
                raw: raw.clone(),
                args: args.iter().map(|a| a.bind_type_params(params)).collect(),
            },
            SourceType::Array(elem) => SourceType::Array(Box::new(elem.bind_type_params(params))),
            other => other.clone(),
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Primitive(p) => f.write_str(p.as_str()),
            SourceType::Class(name) => write!(f, "{name}"),
            SourceType::Parameterized { raw, args } => {
                write!(f, "{raw}<")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
            SourceType::TypeVariable(name) => f.write_str(name),
            SourceType::Array(elem) => write!(f, "{elem}[]"),
        }
    }
}

impl FromStr for SourceType {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = TypeExprParser { src: s, pos: 0 };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos != s.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }
}

impl TryFrom<String> for SourceType {
    type Error = GenerateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Recursive-descent parser for `Name<Arg, ...>[]` type expressions.
struct TypeExprParser<'a> {
    src: &'a str,
    pos: usize,
}

impl TypeExprParser<'_> {
    fn error(&self, reason: &str) -> GenerateError {
        GenerateError::Parse {
            input: self.src.to_string(),
            position: self.pos,
            reason: reason.to_string(),
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.src[self.pos..].chars().next() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.src[self.pos..].starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn parse_name(&mut self) -> Result<&str, GenerateError> {
        self.skip_ws();
        let start = self.pos;
        let len = self.src[start..]
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '$' | '.')))
            .unwrap_or(self.src.len() - start);
        if len == 0 {
            return Err(self.error("expected a type name"));
        }
        self.pos += len;
        Ok(&self.src[start..start + len])
    }

    fn parse_type(&mut self) -> Result<SourceType, GenerateError> {
        let name = self.parse_name()?.to_string();
        let mut ty = if self.eat("<") {
            let mut args = vec![self.parse_type()?];
            while self.eat(",") {
                args.push(self.parse_type()?);
            }
            if !self.eat(">") {
                return Err(self.error("expected '>'"));
            }
            SourceType::Parameterized {
                raw: TypeName::new(name),
                args,
            }
        } else if let Some(primitive) = HostPrimitive::from_name(&name) {
            SourceType::Primitive(primitive)
        } else {
            SourceType::Class(TypeName::new(name))
        };
        while self.eat("[]") {
            ty = SourceType::Array(Box::new(ty));
        }
        Ok(ty)
    }
}

/// A worklist entry: a type plus where it was discovered.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    /// The type to process.
    pub ty: SourceType,
    /// Declaration the type was found on.
    pub used_in: Option<TypeName>,
    /// Member of `used_in` the type was found on.
    pub used_in_member: Option<String>,
}

impl SourceEntry {
    /// An entry point with no provenance.
    pub fn root(ty: SourceType) -> Self {
        Self {
            ty,
            used_in: None,
            used_in_member: None,
        }
    }

    /// A type found on `used_in`, optionally on one of its members.
    pub fn discovered(ty: SourceType, used_in: &TypeName, member: Option<&str>) -> Self {
        Self {
            ty,
            used_in: Some(used_in.clone()),
            used_in_member: member.map(str::to_string),
        }
    }

    /// Same provenance, different type.
    pub fn derive(&self, ty: SourceType) -> Self {
        Self {
            ty,
            used_in: self.used_in.clone(),
            used_in_member: self.used_in_member.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        assert_eq!(TypeName::new("com.example.Foo").simple_name(), "Foo");
        assert_eq!(TypeName::new("a.Outer$Inner").simple_name(), "Inner");
        assert_eq!(TypeName::new("Plain").simple_name(), "Plain");
    }

    #[test]
    fn test_parse_primitives_and_boxes() {
        assert_eq!(
            "int".parse::<SourceType>().unwrap(),
            SourceType::Primitive(HostPrimitive::Int)
        );
        assert_eq!(
            "java.lang.Integer".parse::<SourceType>().unwrap(),
            SourceType::Primitive(HostPrimitive::Int)
        );
        assert_eq!(
            "String".parse::<SourceType>().unwrap(),
            SourceType::Primitive(HostPrimitive::String)
        );
    }

    #[test]
    fn test_parse_nested_generics_and_arrays() {
        let ty: SourceType = "Map<String, List<com.x.Foo>>[]".parse().unwrap();
        assert_eq!(
            ty,
            SourceType::Array(Box::new(SourceType::parameterized(
                "Map",
                vec![
                    SourceType::Primitive(HostPrimitive::String),
                    SourceType::parameterized("List", vec![SourceType::class("com.x.Foo")]),
                ]
            )))
        );
        assert_eq!(ty.to_string(), "Map<String, List<com.x.Foo>>[]");
    }

    #[test]
    fn test_parse_errors() {
        assert!("List<Foo".parse::<SourceType>().is_err());
        assert!("".parse::<SourceType>().is_err());
        let err = "Foo Bar".parse::<SourceType>().unwrap_err();
        assert!(err.to_string().contains("trailing"), "{err}");
    }

    #[test]
    fn test_structural_equality() {
        let a: SourceType = "Box<Foo>".parse().unwrap();
        let b: SourceType = "Box< Foo >".parse().unwrap();
        let c: SourceType = "Box<Bar>".parse().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_bind_type_params() {
        let ty: SourceType = "Function<T, List<R>>".parse().unwrap();
        let bound = ty.bind_type_params(&["T".to_string(), "R".to_string()]);
        assert_eq!(
            bound,
            SourceType::parameterized(
                "Function",
                vec![
                    SourceType::TypeVariable("T".into()),
                    SourceType::parameterized("List", vec![SourceType::TypeVariable("R".into())]),
                ]
            )
        );
    }

    #[test]
    fn test_provenance_does_not_affect_type() {
        let ty = SourceType::class("a.Foo");
        let root = SourceEntry::root(ty.clone());
        let found = SourceEntry::discovered(ty, &TypeName::new("a.Bar"), Some("foo"));
        assert_eq!(root.ty, found.ty);
        assert_eq!(found.used_in_member.as_deref(), Some("foo"));
    }
}
