//! Default structural translation, the last link of the default chain.

use tracing::debug;

use super::{Context, Resolution, TypeProcessor};
use crate::error::GenerateError;
use crate::ir::{TsPrimitive, TsType};
use crate::source::{HostPrimitive, SourceType, TypeName};

/// Host library types with a built-in TypeScript shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WellKnown {
    Collection,
    Map,
    Optional,
}

const LIBRARY_PACKAGES: [&str; 3] = ["java.util.stream.", "java.util.", "java.lang."];

fn well_known(name: &TypeName) -> Option<WellKnown> {
    let bare = LIBRARY_PACKAGES
        .iter()
        .find_map(|pkg| name.as_str().strip_prefix(pkg))
        .unwrap_or(name.as_str());
    match bare {
        "List" | "ArrayList" | "LinkedList" | "Set" | "HashSet" | "LinkedHashSet" | "TreeSet"
        | "SortedSet" | "Collection" | "Iterable" | "Stream" => Some(WellKnown::Collection),
        "Map" | "HashMap" | "LinkedHashMap" | "TreeMap" | "SortedMap" => Some(WellKnown::Map),
        "Optional" => Some(WellKnown::Optional),
        _ => None,
    }
}

/// Whether `ty` names something the structural processor can translate
/// without a declaration in the universe.
pub fn is_builtin(ty: &SourceType) -> bool {
    match ty {
        SourceType::Class(name) | SourceType::Parameterized { raw: name, .. } => {
            well_known(name).is_some()
        }
        _ => true,
    }
}

fn primitive(p: HostPrimitive) -> TsType {
    let ts = match p {
        HostPrimitive::Boolean => TsPrimitive::Boolean,
        HostPrimitive::Byte
        | HostPrimitive::Short
        | HostPrimitive::Int
        | HostPrimitive::Long
        | HostPrimitive::Float
        | HostPrimitive::Double => TsPrimitive::Number,
        HostPrimitive::Char | HostPrimitive::String => TsPrimitive::String,
        HostPrimitive::Void => TsPrimitive::Void,
        HostPrimitive::Object => TsPrimitive::Any,
    };
    TsType::Primitive(ts)
}

fn any() -> TsType {
    TsType::Primitive(TsPrimitive::Any)
}

/// Fallback translation of primitives, containers and declared types.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralProcessor;

impl StructuralProcessor {
    /// Resolve a nested type, collecting its dependents. Unmatched types become `any`.
    fn nested(
        ctx: &mut Context<'_>,
        ty: Option<&SourceType>,
        dependents: &mut Vec<SourceType>,
    ) -> Result<TsType, GenerateError> {
        let Some(ty) = ty else {
            return Ok(any());
        };
        match ctx.process_type(ty)? {
            Some(resolution) => {
                dependents.extend(resolution.dependents);
                Ok(resolution.ty)
            }
            None => Ok(any()),
        }
    }

    fn well_known_shape(
        kind: WellKnown,
        args: &[SourceType],
        ctx: &mut Context<'_>,
    ) -> Result<Resolution, GenerateError> {
        let mut dependents = Vec::new();
        let ty = match kind {
            WellKnown::Collection => {
                TsType::Array(Box::new(Self::nested(ctx, args.first(), &mut dependents)?))
            }
            WellKnown::Map => {
                TsType::Record(Box::new(Self::nested(ctx, args.get(1), &mut dependents)?))
            }
            WellKnown::Optional => Self::nested(ctx, args.first(), &mut dependents)?,
        };
        Ok(Resolution::with_dependents(ty, dependents))
    }
}

impl TypeProcessor for StructuralProcessor {
    fn process_type(
        &self,
        ty: &SourceType,
        ctx: &mut Context<'_>,
    ) -> Result<Option<Resolution>, GenerateError> {
        let resolution = match ty {
            SourceType::Primitive(p) => Resolution::new(primitive(*p)),
            SourceType::TypeVariable(name) => Resolution::new(TsType::TypeVariable(name.clone())),
            SourceType::Array(elem) => {
                let mut dependents = Vec::new();
                let elem = Self::nested(ctx, Some(elem), &mut dependents)?;
                Resolution::with_dependents(TsType::Array(Box::new(elem)), dependents)
            }
            SourceType::Class(name) => {
                if let Some(kind) = well_known(name) {
                    Self::well_known_shape(kind, &[], ctx)?
                } else if ctx.universe().contains(name) {
                    let symbol = ctx.symbol(ty);
                    Resolution::with_dependents(TsType::reference(symbol), vec![ty.clone()])
                } else {
                    debug!(ty = %name, "Unknown class, using any");
                    Resolution::new(any())
                }
            }
            SourceType::Parameterized { raw, args } => {
                if let Some(kind) = well_known(raw) {
                    Self::well_known_shape(kind, args, ctx)?
                } else if ctx.universe().contains(raw) {
                    let raw_ty = SourceType::Class(raw.clone());
                    let symbol = ctx.symbol(&raw_ty);
                    let mut dependents = vec![raw_ty];
                    let mut resolved_args = Vec::with_capacity(args.len());
                    for arg in args {
                        resolved_args.push(Self::nested(ctx, Some(arg), &mut dependents)?);
                    }
                    Resolution::with_dependents(
                        TsType::Reference {
                            symbol,
                            args: resolved_args,
                        },
                        dependents,
                    )
                } else {
                    debug!(ty = %raw, "Unknown generic class, using any");
                    Resolution::new(any())
                }
            }
        };
        Ok(Some(resolution))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ir::Emit;
    use crate::processor::TypeProcessorChain;
    use crate::symbols::SymbolTable;
    use crate::universe::TypeUniverse;
    use typeweave_common::{SamMode, Settings};

    const UNIVERSE_JSON: &str = r#"{
  "classes": {
    "demo.Item": {},
    "demo.Page": { "type_params": ["T"] }
  }
}"#;

    fn emit(ty: &str) -> (String, Vec<SourceType>) {
        let universe = TypeUniverse::from_json(UNIVERSE_JSON).unwrap();
        let chain = TypeProcessorChain::with_defaults(SamMode::Structural);
        let settings = Settings::default();
        let mut symbols = SymbolTable::new();
        let mut ctx = Context::new(&mut symbols, &chain, &universe, &settings);
        let resolution = StructuralProcessor
            .process_type(&ty.parse().unwrap(), &mut ctx)
            .unwrap()
            .unwrap();
        (resolution.ty.emit(), resolution.dependents)
    }

    #[test]
    fn test_primitives() {
        assert_eq!(emit("int").0, "number");
        assert_eq!(emit("java.lang.Double").0, "number");
        assert_eq!(emit("char").0, "string");
        assert_eq!(emit("boolean").0, "boolean");
        assert_eq!(emit("void").0, "void");
        assert_eq!(emit("Object").0, "any");
    }

    #[test]
    fn test_collections_and_maps() {
        assert_eq!(emit("java.util.List<String>").0, "string[]");
        assert_eq!(emit("Set<demo.Item>").0, "Item[]");
        assert_eq!(emit("Map<String, List<Integer>>").0, "Record<string, number[]>");
        assert_eq!(emit("Optional<demo.Item>").0, "Item");
        assert_eq!(emit("List").0, "any[]");
        assert_eq!(emit("int[][]").0, "number[][]");
    }

    #[test]
    fn test_known_class_is_reference_and_dependent() {
        let (text, dependents) = emit("demo.Item");
        assert_eq!(text, "Item");
        assert_eq!(dependents, vec![SourceType::class("demo.Item")]);
    }

    #[test]
    fn test_parameterized_user_type() {
        let (text, dependents) = emit("demo.Page<demo.Item>");
        assert_eq!(text, "Page<Item>");
        assert_eq!(
            dependents,
            vec![SourceType::class("demo.Page"), SourceType::class("demo.Item")]
        );
    }

    #[test]
    fn test_nested_dependents_are_collected() {
        let (_, dependents) = emit("List<Map<String, demo.Item>>");
        assert_eq!(dependents, vec![SourceType::class("demo.Item")]);
    }

    #[test]
    fn test_unknown_class_is_any() {
        let (text, dependents) = emit("com.vendor.Opaque");
        assert_eq!(text, "any");
        assert!(dependents.is_empty());
        // Same simple name as a library type, different package
        assert_eq!(emit("demo.List<String>").0, "any");
    }

    #[test]
    fn test_is_builtin() {
        assert!(is_builtin(&"List<demo.Item>".parse().unwrap()));
        assert!(is_builtin(&"int".parse().unwrap()));
        assert!(!is_builtin(&"demo.Item".parse().unwrap()));
    }
}
