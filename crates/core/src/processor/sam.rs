//! Functional-interface synthesis.
//!
//! An interface whose hierarchy leaves exactly one method without an
//! implementation becomes a function type. Generic arguments at the use site
//! are substituted into that method's signature. The substitution is shallow:
//! a parameter or return type is replaced only when it is exactly one of the
//! interface's type variables, anything else goes back through the chain as is.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::trace;
use typeweave_common::SamMode;

use super::{Context, Resolution, TypeProcessor};
use crate::error::GenerateError;
use crate::ir::{TsParam, TsPrimitive, TsType};
use crate::source::{SourceType, TypeName};
use crate::universe::{ClassDecl, MethodDecl, MethodKind, TypeUniverse};

/// Interfaces currently being synthesized further up the stack.
///
/// A self-referencing functional interface resolves structurally on the way
/// down instead of expanding forever.
#[derive(Debug, Clone, Default)]
struct InProgress(Vec<SourceType>);

type Substitution = HashMap<String, SourceType>;

/// Turns single-abstract-method interfaces into function types.
#[derive(Debug, Clone, Copy)]
pub struct SamProcessor {
    mode: SamMode,
}

impl SamProcessor {
    /// A synthesizer with the given eligibility rule.
    pub fn new(mode: SamMode) -> Self {
        Self { mode }
    }

    /// An override on the interface itself claims it before synthesis can.
    fn is_eligible(&self, decl: &ClassDecl) -> bool {
        decl.is_interface()
            && decl.tags.is_empty()
            && (self.mode == SamMode::Structural || decl.functional)
    }

    /// Use-site variant: `Function<String, Integer>`.
    fn process_parameterized(
        &self,
        ty: &SourceType,
        ctx: &mut Context<'_>,
    ) -> Result<Option<Resolution>, GenerateError> {
        let SourceType::Parameterized { raw, args } = ty else {
            return Ok(None);
        };
        let Some(decl) = ctx.universe().get(raw).filter(|d| self.is_eligible(d)) else {
            return Ok(None);
        };
        let use_site: Substitution = decl
            .type_params
            .iter()
            .cloned()
            .zip(args.iter().cloned())
            .collect();
        self.synthesize(ty, decl, &use_site, ctx)
    }

    /// Bare variant: `Runnable`, or a generic interface used raw.
    fn process_bare(
        &self,
        ty: &SourceType,
        ctx: &mut Context<'_>,
    ) -> Result<Option<Resolution>, GenerateError> {
        let SourceType::Class(name) = ty else {
            return Ok(None);
        };
        let Some(decl) = ctx.universe().get(name).filter(|d| self.is_eligible(d)) else {
            return Ok(None);
        };
        self.synthesize(ty, decl, &Substitution::new(), ctx)
    }

    fn synthesize(
        &self,
        ty: &SourceType,
        decl: &ClassDecl,
        use_site: &Substitution,
        ctx: &mut Context<'_>,
    ) -> Result<Option<Resolution>, GenerateError> {
        let in_progress = ctx.extension::<InProgress>().cloned().unwrap_or_default();
        if in_progress.0.contains(ty) {
            return Ok(None);
        }
        let Some((method, inherited)) = single_abstract_method(ctx.universe(), decl) else {
            return Ok(None);
        };
        trace!(interface = %decl.name, method = %method.name, "Synthesizing function type");

        let mut stack = in_progress;
        stack.0.push(ty.clone());
        let mut nested = ctx.with_extension(stack);

        let mut dependents = Vec::new();
        let mut params = Vec::with_capacity(method.params.len());
        for (index, param) in method.params.iter().enumerate() {
            let param_ty = substitute(&param.ty, &inherited, use_site);
            let resolved = resolve_or_any(&mut nested, &param_ty, &mut dependents)?;
            params.push(match &param.name {
                Some(name) => TsParam::new(name.clone(), resolved),
                None => TsParam::positional(index, resolved),
            });
        }
        let ret_ty = substitute(&method.return_type, &inherited, use_site);
        let ret = resolve_or_any(&mut nested, &ret_ty, &mut dependents)?;

        Ok(Some(Resolution::with_dependents(
            TsType::Function {
                params,
                ret: Box::new(ret),
            },
            dependents,
        )))
    }
}

impl TypeProcessor for SamProcessor {
    fn process_type(
        &self,
        ty: &SourceType,
        ctx: &mut Context<'_>,
    ) -> Result<Option<Resolution>, GenerateError> {
        if let Some(resolution) = self.process_parameterized(ty, ctx)? {
            return Ok(Some(resolution));
        }
        self.process_bare(ty, ctx)
    }
}

fn resolve_or_any(
    ctx: &mut Context<'_>,
    ty: &SourceType,
    dependents: &mut Vec<SourceType>,
) -> Result<TsType, GenerateError> {
    match ctx.process_type(ty)? {
        Some(resolution) => {
            dependents.extend(resolution.dependents);
            Ok(resolution.ty)
        }
        None => Ok(TsType::Primitive(TsPrimitive::Any)),
    }
}

/// Replace `ty` when it is exactly a mapped type variable.
fn substitute(ty: &SourceType, inherited: &Substitution, use_site: &Substitution) -> SourceType {
    let ty = match ty {
        SourceType::TypeVariable(name) => inherited.get(name).unwrap_or(ty),
        _ => ty,
    };
    match ty {
        SourceType::TypeVariable(name) => use_site.get(name).cloned().unwrap_or_else(|| ty.clone()),
        _ => ty.clone(),
    }
}

/// Find the one method `decl`'s hierarchy leaves unimplemented.
///
/// Walks super interfaces breadth first, so the most derived declaration of a
/// name is seen first. Methods inherited from a parameterized super interface
/// come with the mapping from that interface's type variables to the
/// arguments `decl` supplied.
fn single_abstract_method<'u>(
    universe: &'u TypeUniverse,
    decl: &'u ClassDecl,
) -> Option<(&'u MethodDecl, Substitution)> {
    let mut implemented: HashSet<&str> = HashSet::new();
    let mut candidates: Vec<(&'u MethodDecl, Substitution)> = Vec::new();
    let mut visited: HashSet<&TypeName> = HashSet::new();
    let mut queue: VecDeque<(&'u ClassDecl, Substitution)> = VecDeque::new();
    queue.push_back((decl, Substitution::new()));

    while let Some((current, mapping)) = queue.pop_front() {
        if !visited.insert(&current.name) {
            continue;
        }
        for method in &current.methods {
            match method.kind {
                MethodKind::Static => {}
                MethodKind::Abstract => {
                    if !implemented.contains(method.name.as_str())
                        && !candidates.iter().any(|(m, _)| {
                            m.name == method.name && m.params.len() == method.params.len()
                        })
                    {
                        candidates.push((method, mapping.clone()));
                    }
                }
                MethodKind::Default | MethodKind::Concrete => {
                    implemented.insert(method.name.as_str());
                }
            }
        }
        for parent in &current.super_types {
            let Some(parent_decl) = parent.raw_name().and_then(|name| universe.get(name)) else {
                continue;
            };
            let args: &[SourceType] = match parent {
                SourceType::Parameterized { args, .. } => args,
                _ => &[],
            };
            let parent_mapping: Substitution = parent_decl
                .type_params
                .iter()
                .cloned()
                .zip(args.iter().map(|arg| substitute(arg, &mapping, &Substitution::new())))
                .collect();
            queue.push_back((parent_decl, parent_mapping));
        }
    }

    // A default further down the hierarchy implements an abstract method above it
    candidates.retain(|(m, _)| !implemented.contains(m.name.as_str()));
    match candidates.len() {
        1 => candidates.pop(),
        _ => None,
    }
}
