//! Model parser: the worklist that discovers every reachable declaration.
//!
//! Entries are taken from a FIFO queue. An entry whose type was already seen is
//! dropped, so each structural type is processed once per run. Unseen entries
//! are offered to the structural sources first, then resolved through the
//! processor chain in a fresh [`Context`]. A bare class that resolves to a
//! reference becomes a bean or enum declaration; every dependent type reported
//! along the way goes to the back of the queue.
//!
//! Termination relies on the set of distinct structural types being finite.
//! Generic types that expand into ever larger instantiations of themselves
//! are not detected.

mod members;
mod sources;

use std::collections::{HashSet, VecDeque};
use std::fmt;

use tracing::{debug, trace};
use typeweave_common::Settings;

use crate::error::GenerateError;
use crate::ir::{TsParam, TsPrimitive, TsType};
use crate::model::{
    BeanModel, DeclarationModel, EnumMember, EnumModel, MethodModel, Model, PropertyModel,
};
use crate::processor::{
    Context, OverrideResolver, Resolution, TypeProcessor, TypeProcessorChain, is_builtin,
};
use crate::source::{SourceEntry, SourceType, TypeName};
use crate::symbols::SymbolTable;
use crate::universe::{ClassDecl, Declaration, MethodKind, TypeUniverse};

pub use members::{DeclaredMembers, MemberEnumerator};
pub use sources::{Claim, StructuralSource};

/// One generation run over a type universe.
pub struct ModelParser<'a> {
    universe: &'a TypeUniverse,
    settings: &'a Settings,
    chain: &'a TypeProcessorChain,
    sources: &'a [Box<dyn StructuralSource>],
    members: &'a dyn MemberEnumerator,
    symbols: SymbolTable,
    queue: VecDeque<SourceEntry>,
    seen: HashSet<SourceType>,
    model: Model,
}

impl<'a> ModelParser<'a> {
    /// A parser with no structural sources and declared-member enumeration.
    pub fn new(
        universe: &'a TypeUniverse,
        settings: &'a Settings,
        chain: &'a TypeProcessorChain,
    ) -> Self {
        Self {
            universe,
            settings,
            chain,
            sources: Default::default(),
            members: &DeclaredMembers,
            symbols: SymbolTable::new(),
            queue: VecDeque::new(),
            seen: HashSet::new(),
            model: Model::new(),
        }
    }

    /// Structural sources, asked in order before the chain runs.
    pub fn with_sources(mut self, sources: &'a [Box<dyn StructuralSource>]) -> Self {
        self.sources = sources;
        self
    }

    /// Replace the member enumeration.
    pub fn with_members(mut self, members: &'a dyn MemberEnumerator) -> Self {
        self.members = members;
        self
    }

    /// Discover everything reachable from `roots` and assemble the model.
    pub fn parse(
        mut self,
        roots: impl IntoIterator<Item = SourceType>,
    ) -> Result<Model, GenerateError> {
        for root in roots {
            if let Some(raw) = root.raw_name() {
                if !is_builtin(&root) && !self.universe.contains(raw) {
                    return Err(GenerateError::UnknownRoot(raw.clone()));
                }
            }
            self.queue.push_back(SourceEntry::root(root));
        }

        while let Some(entry) = self.queue.pop_front() {
            if !self.seen.insert(entry.ty.clone()) {
                trace!(ty = %entry.ty, "Already processed");
                continue;
            }
            if self.offer_to_sources(&entry)? {
                continue;
            }

            let Some(Resolution { ty, dependents }) = self.resolve(&entry.ty, None)? else {
                debug!(ty = %entry.ty, "No processor matched, discarding");
                continue;
            };

            match (&entry.ty, &ty) {
                (SourceType::Class(name), TsType::Reference { .. }) => {
                    let universe = self.universe;
                    if let Some(decl) = universe.get(name) {
                        let declaration = self.parse_class(decl, &entry)?;
                        self.model.add_declaration(declaration)?;
                    }
                }
                _ => trace!(ty = %entry.ty, "Not a declaration shape, discarding"),
            }

            self.enqueue(&entry, dependents);
        }

        Ok(self.model)
    }

    fn offer_to_sources(&mut self, entry: &SourceEntry) -> Result<bool, GenerateError> {
        let sources = self.sources;
        for source in sources {
            let claim = {
                let mut ctx =
                    Context::new(&mut self.symbols, self.chain, self.universe, self.settings);
                source.try_claim(entry, &mut ctx)?
            };
            if let Some(claim) = claim {
                debug!(ty = %entry.ty, source = source.name(), "Claimed by structural source");
                for declaration in claim.declarations {
                    self.model.add_external(declaration)?;
                }
                self.enqueue(entry, claim.dependents);
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Run the chain in a fresh context.
    fn resolve(
        &mut self,
        ty: &SourceType,
        member: Option<Declaration<'a>>,
    ) -> Result<Option<Resolution>, GenerateError> {
        let chain = self.chain;
        let mut ctx = Context::new(&mut self.symbols, chain, self.universe, self.settings)
            .for_member(member);
        chain.process_type(ty, &mut ctx)
    }

    /// Resolve a member's type and schedule what it depends on.
    fn resolve_member(
        &mut self,
        ty: &SourceType,
        member: Declaration<'a>,
    ) -> Result<TsType, GenerateError> {
        match self.resolve(ty, Some(member))? {
            Some(resolution) => {
                self.enqueue_discovered(
                    &member.owner().name,
                    member.member_name(),
                    resolution.dependents,
                );
                Ok(resolution.ty)
            }
            None => Ok(TsType::Primitive(TsPrimitive::Any)),
        }
    }

    fn parse_class(
        &mut self,
        decl: &'a ClassDecl,
        entry: &SourceEntry,
    ) -> Result<DeclarationModel, GenerateError> {
        debug!(
            class = %decl.name,
            used_in = ?entry.used_in.as_ref().map(TypeName::as_str),
            member = ?entry.used_in_member,
            "Parsing declaration"
        );

        // A type-level override replaces the declaration header
        let header =
            OverrideResolver::resolve_declaration(Declaration::Type(decl), self.universe.providers())?;
        let signature = match header {
            Some(resolution) => {
                self.enqueue_discovered(&decl.name, None, resolution.dependents);
                match resolution.ty {
                    TsType::Verbatim(text) => Some(text),
                    _ => None,
                }
            }
            None => None,
        };
        let symbol = self.symbols.symbol(&entry.ty);

        if decl.is_enum() {
            let members = decl
                .constants
                .iter()
                .map(|constant| EnumMember {
                    source_name: constant.name.clone(),
                    display_name: constant.display.clone().unwrap_or_else(|| constant.name.clone()),
                })
                .collect();
            return Ok(DeclarationModel::Enum(EnumModel {
                source: entry.ty.clone(),
                symbol,
                signature,
                members,
                comments: Vec::new(),
            }));
        }

        let mut extends = Vec::new();
        for parent in &decl.super_types {
            if let Some(resolution) = self.resolve(parent, None)? {
                self.enqueue_discovered(&decl.name, None, resolution.dependents);
                if resolution.ty.is_reference() {
                    extends.push(resolution.ty);
                }
            }
        }

        let mut properties = Vec::new();
        let mut methods = Vec::new();
        for member in self.members.enumerate(decl, self.settings) {
            match member {
                Declaration::Field { field, .. } => {
                    let ty = self.resolve_member(&field.ty, member)?;
                    let optional = field
                        .markers
                        .iter()
                        .any(|m| self.settings.optional_markers.contains(m));
                    properties.push(PropertyModel {
                        name: field.name.clone(),
                        ty,
                        optional,
                        comments: Vec::new(),
                    });
                }
                Declaration::Method { method, .. } => {
                    let ret = self.resolve_member(&method.return_type, member)?;
                    let mut params = Vec::new();
                    // Override text already spells out the parameters
                    if !ret.is_verbatim() {
                        for (index, param) in method.params.iter().enumerate() {
                            let ty = self.resolve_member(&param.ty, member)?;
                            params.push(match &param.name {
                                Some(name) => TsParam::new(name.clone(), ty),
                                None => TsParam::positional(index, ty),
                            });
                        }
                    }
                    methods.push(MethodModel {
                        name: method.name.clone(),
                        params,
                        ret,
                        arity: method.params.len(),
                        is_static: method.kind == MethodKind::Static,
                        optional: method.kind == MethodKind::Default,
                        comments: Vec::new(),
                    });
                }
                Declaration::Constructor { ctor, .. } => {
                    let ret = self.resolve_member(&entry.ty, member)?;
                    if ret.is_verbatim() {
                        methods.push(MethodModel {
                            name: "constructor".to_string(),
                            params: Vec::new(),
                            ret,
                            arity: ctor.params.len(),
                            is_static: false,
                            optional: false,
                            comments: Vec::new(),
                        });
                    }
                }
                Declaration::Type(_) => {}
            }
        }

        Ok(DeclarationModel::Bean(BeanModel {
            source: entry.ty.clone(),
            symbol,
            type_params: decl.type_params.clone(),
            extends,
            signature,
            properties,
            methods,
            comments: Vec::new(),
        }))
    }

    /// Schedule types found while processing `entry`, keeping its provenance.
    fn enqueue(&mut self, entry: &SourceEntry, types: Vec<SourceType>) {
        for ty in types {
            self.queue.push_back(entry.derive(ty));
        }
    }

    /// Schedule types found on a member (or the header) of `owner`.
    fn enqueue_discovered(
        &mut self,
        owner: &TypeName,
        member: Option<&str>,
        types: Vec<SourceType>,
    ) {
        for ty in types {
            self.queue.push_back(SourceEntry::discovered(ty, owner, member));
        }
    }
}

impl fmt::Debug for ModelParser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelParser")
            .field("chain", self.chain)
            .field("sources", &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("queued", &self.queue.len())
            .field("seen", &self.seen.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::ExternalDeclaration;
    use crate::universe::SignatureResult;
    use typeweave_common::SamMode;

    const GRAPH_JSON: &str = r#"{
  "classes": {
    "demo.Order": {
      "fields": [
        { "name": "id", "ty": "String" },
        { "name": "lines", "ty": "List<demo.Line>" },
        { "name": "status", "ty": "demo.Status" },
        { "name": "customer", "ty": "demo.Customer" },
        { "name": "onChange", "ty": "fn.Callback<demo.Audit>" }
      ]
    },
    "demo.Line": {
      "fields": [
        { "name": "order", "ty": "demo.Order" },
        { "name": "amount", "ty": "double" }
      ]
    },
    "demo.Customer": {
      "super_types": ["demo.Party"],
      "fields": [{ "name": "lastOrder", "ty": "Optional<demo.Order>" }]
    },
    "demo.Party": {
      "fields": [{ "name": "name", "ty": "String" }]
    },
    "demo.Status": {
      "kind": "enum",
      "constants": [{ "name": "OPEN", "display": "open" }, { "name": "CLOSED" }]
    },
    "fn.Callback": {
      "kind": "interface",
      "type_params": ["T"],
      "methods": [{ "name": "call", "kind": "abstract", "params": [{ "ty": "T" }] }]
    },
    "demo.Audit": {},
    "demo.Unreached": {}
  }
}"#;

    fn parse(universe: &TypeUniverse, roots: &[&str]) -> Result<Model, GenerateError> {
        let settings = Settings::default();
        let chain = TypeProcessorChain::with_defaults(SamMode::Structural);
        ModelParser::new(universe, &settings, &chain)
            .parse(roots.iter().map(|r| r.parse::<SourceType>().unwrap()))
    }

    fn bean_names(model: &Model) -> Vec<String> {
        let mut names: Vec<String> = model
            .beans()
            .iter()
            .map(|b| b.symbol.name().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_closure_over_dependents() {
        let universe = TypeUniverse::from_json(GRAPH_JSON).unwrap();
        let model = parse(&universe, &["demo.Order"]).unwrap();
        assert_eq!(
            bean_names(&model),
            vec!["Audit", "Customer", "Line", "Order", "Party"]
        );
        let status = model.enum_model("Status").unwrap();
        assert_eq!(status.members[0].display_name, "open");
        assert_eq!(status.members[1].display_name, "CLOSED");
        assert!(model.bean("Unreached").is_none());
        // The functional interface became a function type, not a declaration
        assert!(model.bean("Callback").is_none());
    }

    #[test]
    fn test_each_type_declared_once() {
        let universe = TypeUniverse::from_json(GRAPH_JSON).unwrap();
        // Order is reachable from both roots and from Line and Customer
        let model = parse(&universe, &["demo.Order", "demo.Line", "demo.Order"]).unwrap();
        assert_eq!(model.beans().len(), 5);
        assert_eq!(model.len(), 6);
    }

    #[test]
    fn test_members_and_extends() {
        let universe = TypeUniverse::from_json(GRAPH_JSON).unwrap();
        let model = parse(&universe, &["demo.Order"]).unwrap();

        let order = model.bean("Order").unwrap();
        let lines = order.properties.iter().find(|p| p.name == "lines").unwrap();
        assert_eq!(crate::ir::Emit::emit(&lines.ty), "Line[]");
        let on_change = order.properties.iter().find(|p| p.name == "onChange").unwrap();
        assert_eq!(crate::ir::Emit::emit(&on_change.ty), "(arg0: Audit) => void");

        let customer = model.bean("Customer").unwrap();
        assert_eq!(customer.extends.len(), 1);
        assert_eq!(crate::ir::Emit::emit(&customer.extends[0]), "Party");
    }

    #[test]
    fn test_parameterized_root_declares_raw_class() {
        let universe = TypeUniverse::from_json(
            r#"{ "classes": { "demo.Page": { "type_params": ["T"], "fields": [{ "name": "items", "ty": "List<T>" }] }, "demo.Item": {} } }"#,
        )
        .unwrap();
        let model = parse(&universe, &["demo.Page<demo.Item>", "demo.Page<String>"]).unwrap();
        assert_eq!(bean_names(&model), vec!["Item", "Page"]);
        let page = model.bean("Page").unwrap();
        assert_eq!(page.type_params, vec!["T".to_string()]);
    }

    #[test]
    fn test_unknown_root_is_rejected() {
        let universe = TypeUniverse::from_json(GRAPH_JSON).unwrap();
        let err = parse(&universe, &["demo.Missing"]).unwrap_err();
        assert!(matches!(err, GenerateError::UnknownRoot(_)), "{err}");
        // Library types and primitives are fine and simply produce nothing
        let model = parse(&universe, &["List<String>", "int"]).unwrap();
        assert!(model.is_empty());
    }

    #[test]
    fn test_type_level_signature_and_extras() {
        let mut universe = TypeUniverse::from_json(
            r#"{ "classes": {
                "demo.Sig": { "tags": [{ "method_reference": { "name": "provide" } }], "fields": [{ "name": "str", "ty": "String" }] },
                "demo.Extra": {}
            } }"#,
        )
        .unwrap();
        universe.register_provider("demo.Sig", "provide", || {
            Ok(SignatureResult::new("ClassSignatureViaProvider")
                .with_extra_types(vec![SourceType::class("demo.Extra")]))
        });
        let model = parse(&universe, &["demo.Sig"]).unwrap();
        let sig = model.bean("Sig").unwrap();
        assert_eq!(sig.signature.as_deref(), Some("ClassSignatureViaProvider"));
        assert!(model.bean("Extra").is_some());
    }

    #[test]
    fn test_type_level_ambiguity_names_the_type() {
        let universe = TypeUniverse::from_json(
            r#"{ "classes": { "demo.Outer$Ambiguous": { "tags": [
                { "verbatim": { "text": "interface Ambiguous" } },
                { "method_reference": { "name": "sig" } }
            ] } } }"#,
        )
        .unwrap();
        let err = parse(&universe, &["demo.Outer$Ambiguous"]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Only one signature annotation allowed"), "{message}");
        assert!(message.contains("demo.Outer$Ambiguous"), "{message}");
    }

    struct ApiSource;

    impl StructuralSource for ApiSource {
        fn name(&self) -> &str {
            "api"
        }

        fn try_claim(
            &self,
            entry: &SourceEntry,
            ctx: &mut Context<'_>,
        ) -> Result<Option<Claim>, GenerateError> {
            if entry.ty != SourceType::class("demo.Api") {
                return Ok(None);
            }
            let symbol = ctx.symbol(&entry.ty);
            Ok(Some(
                Claim::new()
                    .with_declaration(ExternalDeclaration {
                        source: entry.ty.clone(),
                        name: symbol.name().to_string(),
                        body: "interface Api {}".into(),
                    })
                    .with_dependents(vec![SourceType::class("demo.Payload")]),
            ))
        }
    }

    #[test]
    fn test_structural_source_claims_entry() {
        let universe = TypeUniverse::from_json(
            r#"{ "classes": { "demo.Api": { "fields": [{ "name": "ignored", "ty": "demo.Hidden" }] }, "demo.Payload": {}, "demo.Hidden": {} } }"#,
        )
        .unwrap();
        let settings = Settings::default();
        let chain = TypeProcessorChain::with_defaults(SamMode::Structural);
        let sources: Vec<Box<dyn StructuralSource>> = vec![Box::new(ApiSource)];
        let model = ModelParser::new(&universe, &settings, &chain)
            .with_sources(&sources)
            .parse([SourceType::class("demo.Api")])
            .unwrap();

        assert_eq!(model.externals().len(), 1);
        // Claimed entries never become beans, so their fields are not walked
        assert!(model.bean("Api").is_none());
        assert!(model.bean("Hidden").is_none());
        assert!(model.bean("Payload").is_some());
    }

    #[test]
    fn test_source_declaration_clashing_with_bean_is_structural_error() {
        struct Greedy;
        impl StructuralSource for Greedy {
            fn name(&self) -> &str {
                "greedy"
            }
            fn try_claim(
                &self,
                entry: &SourceEntry,
                _ctx: &mut Context<'_>,
            ) -> Result<Option<Claim>, GenerateError> {
                if entry.ty != SourceType::class("demo.Api") {
                    return Ok(None);
                }
                // Contributes a declaration for a type the parser already declared
                Ok(Some(Claim::new().with_declaration(ExternalDeclaration {
                    source: SourceType::class("demo.Payload"),
                    name: "Payload".into(),
                    body: "interface Payload {}".into(),
                })))
            }
        }

        let universe = TypeUniverse::from_json(
            r#"{ "classes": { "demo.Api": {}, "demo.Payload": {} } }"#,
        )
        .unwrap();
        let settings = Settings::default();
        let chain = TypeProcessorChain::with_defaults(SamMode::Structural);
        let sources: Vec<Box<dyn StructuralSource>> = vec![Box::new(Greedy)];
        let err = ModelParser::new(&universe, &settings, &chain)
            .with_sources(&sources)
            .parse([SourceType::class("demo.Payload"), SourceType::class("demo.Api")])
            .unwrap_err();
        assert!(matches!(err, GenerateError::Structural(_)), "{err}");
    }

    #[test]
    fn test_debug_lists_chain_without_internals() {
        let universe = TypeUniverse::from_json(GRAPH_JSON).unwrap();
        let settings = Settings::default();
        let chain = TypeProcessorChain::with_defaults(SamMode::Structural);
        let parser = ModelParser::new(&universe, &settings, &chain);
        let debug = format!("{parser:?}");
        assert!(debug.starts_with("ModelParser {"), "{debug}");
        assert!(debug.contains("OverrideResolver"), "{debug}");
        assert!(debug.contains("queued: 0"), "{debug}");
    }
}
