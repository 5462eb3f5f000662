//! Subtyping, assignability, and the union/intersection algebra.
//!
//! `is_subtype` is a decision procedure over resolved types; named
//! references resolve on demand through the environment, and a
//! coinductive in-progress set keeps recursive aliases from looping:
//! a `(sub, sup)` reference pair already being decided is assumed true,
//! which makes `List<number> <: List<number>` terminate while
//! `List<number> <: List<string>` still fails on the first property
//! mismatch.

use rustc_hash::FxHashMap;

use crate::env::TypeEnvironment;
use crate::ty::{FunctionTy, LiteralValue, TableTy, Ty, TypeRef};

/// The three checking regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// No diagnostics at all.
    Nocheck,
    /// Permissive: `any`/`unknown` accepted bidirectionally, number to
    /// string and number to enum coercions allowed.
    Nonstrict,
    /// Tight checking.
    Strict,
}

/// Context threaded through subtype queries.
pub struct SubtypeCtx<'a> {
    pub mode: CheckMode,
    pub env: &'a TypeEnvironment,
    /// Reference pairs currently being decided (coinduction).
    in_progress: Vec<(String, String)>,
}

impl<'a> SubtypeCtx<'a> {
    pub fn new(mode: CheckMode, env: &'a TypeEnvironment) -> Self {
        SubtypeCtx {
            mode,
            env,
            in_progress: Vec::new(),
        }
    }
}

// ── Reference resolution ───────────────────────────────────────────────

/// Resolve a named reference one level through the environment:
/// alias (with generic substitution), then class, then enum.
pub fn resolve_reference(r: &TypeRef, env: &TypeEnvironment) -> Option<Ty> {
    if let Some(module) = &r.module {
        if module == "Enum" {
            return env.lookup_enum(&r.name).map(Ty::Enum);
        }
        // Foreign-module references stay opaque.
        return None;
    }
    if let Some(alias) = env.lookup_type_alias(&r.name) {
        if alias.generics.is_empty() {
            return Some(alias.ty.clone());
        }
        let mut map: FxHashMap<String, Ty> = FxHashMap::default();
        for (i, generic) in alias.generics.iter().enumerate() {
            map.insert(
                generic.clone(),
                r.args.get(i).cloned().unwrap_or(Ty::Any),
            );
        }
        return Some(substitute(&alias.ty, &map));
    }
    if let Some(class) = env.lookup_class(&r.name) {
        return Some(Ty::Class(class));
    }
    if let Some(e) = env.lookup_enum(&r.name) {
        return Some(Ty::Enum(e));
    }
    None
}

/// Replace generic-parameter references by name throughout a type.
pub fn substitute(ty: &Ty, map: &FxHashMap<String, Ty>) -> Ty {
    match ty {
        Ty::Reference(r) => {
            if r.module.is_none() && r.args.is_empty() {
                if let Some(replacement) = map.get(&r.name) {
                    return replacement.clone();
                }
            }
            if r.args.is_empty() {
                return ty.clone();
            }
            Ty::Reference(std::rc::Rc::new(TypeRef {
                name: r.name.clone(),
                module: r.module.clone(),
                args: r.args.iter().map(|a| substitute(a, map)).collect(),
            }))
        }
        Ty::Function(f) => {
            let mut new_fn = FunctionTy::clone(f);
            for param in &mut new_fn.params {
                param.ty = substitute(&param.ty, map);
            }
            if let Some(this) = &new_fn.this {
                new_fn.this = Some(substitute(this, map));
            }
            new_fn.ret = substitute(&new_fn.ret, map);
            Ty::Function(std::rc::Rc::new(new_fn))
        }
        Ty::Table(t) => {
            let mut new_table = TableTy::clone(t);
            for prop in &mut new_table.props {
                prop.ty = substitute(&prop.ty, map);
            }
            if let Some(indexer) = &mut new_table.indexer {
                indexer.key = substitute(&indexer.key, map);
                indexer.value = substitute(&indexer.value, map);
            }
            if let Some(metatable) = &new_table.metatable {
                new_table.metatable = Some(substitute(metatable, map));
            }
            Ty::Table(std::rc::Rc::new(new_table))
        }
        Ty::Union(members) => Ty::Union(members.iter().map(|m| substitute(m, map)).collect()),
        Ty::Intersection(members) => {
            Ty::Intersection(members.iter().map(|m| substitute(m, map)).collect())
        }
        Ty::Optional(inner) => Ty::Optional(Box::new(substitute(inner, map))),
        Ty::Variadic(inner) => Ty::Variadic(Box::new(substitute(inner, map))),
        _ => ty.clone(),
    }
}

// ── Subtyping ──────────────────────────────────────────────────────────

/// Decide `sub <: sup`.
pub fn is_subtype(sub: &Ty, sup: &Ty, ctx: &mut SubtypeCtx) -> bool {
    if ctx.mode == CheckMode::Nocheck {
        return true;
    }

    // Equal named references are subtypes without expansion; this is
    // what terminates recursive aliases.
    if let (Ty::Reference(a), Ty::Reference(b)) = (sub, sup) {
        if a == b {
            return true;
        }
    }

    if matches!(sub, Ty::Reference(_)) || matches!(sup, Ty::Reference(_)) {
        let key = (sub.to_string(), sup.to_string());
        if ctx.in_progress.contains(&key) {
            return true;
        }
        ctx.in_progress.push(key);

        let resolved_sub = match sub {
            Ty::Reference(r) => resolve_reference(r, ctx.env),
            _ => None,
        };
        let resolved_sup = match sup {
            Ty::Reference(r) => resolve_reference(r, ctx.env),
            _ => None,
        };
        // Re-enter the full procedure when a side resolved (aliases may
        // chain); fall through for references the environment does not
        // know, keeping the structural bridge below reachable.
        let result = if resolved_sub.is_some() || resolved_sup.is_some() {
            is_subtype(
                resolved_sub.as_ref().unwrap_or(sub),
                resolved_sup.as_ref().unwrap_or(sup),
                ctx,
            )
        } else {
            is_subtype_resolved(sub, sup, ctx)
        };

        ctx.in_progress.pop();
        return result;
    }

    is_subtype_resolved(sub, sup, ctx)
}

fn is_subtype_resolved(sub: &Ty, sup: &Ty, ctx: &mut SubtypeCtx) -> bool {
    // Structural equality.
    if sub == sup {
        return true;
    }

    // Sentinels.
    if matches!(sub, Ty::Any | Ty::Error(_) | Ty::Never) {
        return true;
    }
    if matches!(sup, Ty::Any | Ty::Unknown | Ty::Error(_)) {
        return true;
    }
    if ctx.mode == CheckMode::Nonstrict && matches!(sub, Ty::Unknown) {
        return true;
    }

    // `nil` slots into any optional and any union containing nil.
    if matches!(sub, Ty::Nil) {
        match sup {
            Ty::Optional(_) => return true,
            Ty::Union(members) if members.iter().any(|m| matches!(m, Ty::Nil | Ty::Optional(_))) => {
                return true;
            }
            _ => {}
        }
    }

    // Optionals reduce to unions with nil; the union rules below then
    // cover every combination uniformly.
    if let Ty::Optional(inner) = sub {
        let expanded = Ty::Union(vec![(**inner).clone(), Ty::Nil]);
        return is_subtype_resolved(&expanded, sup, ctx);
    }
    if let Ty::Optional(inner) = sup {
        let expanded = Ty::Union(vec![(**inner).clone(), Ty::Nil]);
        return is_subtype_resolved(sub, &expanded, ctx);
    }

    // Union on the left: all members must fit the right.
    if let Ty::Union(members) = sub {
        return members.iter().all(|m| is_subtype(m, sup, ctx));
    }
    // Union on the right: some member must accept the left.
    if let Ty::Union(members) = sup {
        return members.iter().any(|m| is_subtype(sub, m, ctx));
    }

    // Intersection on the right: all members must accept the left.
    if let Ty::Intersection(members) = sup {
        return members.iter().all(|m| is_subtype(sub, m, ctx));
    }
    // Intersection on the left: some member must fit the right.
    if let Ty::Intersection(members) = sub {
        return members.iter().any(|m| is_subtype(m, sup, ctx));
    }

    match (sub, sup) {
        // A literal is a subtype of its base primitive.
        (Ty::Literal(value), _) if &value.base_ty() == sup => true,

        (Ty::Variadic(a), Ty::Variadic(b)) => is_subtype(a, b, ctx),
        (Ty::Variadic(a), _) => is_subtype(a, sup, ctx),
        (_, Ty::Variadic(b)) => is_subtype(sub, b, ctx),

        (Ty::Function(a), Ty::Function(b)) => function_subtype(a, b, ctx),
        (Ty::Table(a), Ty::Table(b)) => table_subtype(a, b, ctx),

        // Classes: nominal inheritance.
        (Ty::Class(a), Ty::Class(b)) => ctx.env.class_has_ancestor(a, &b.name),

        // Non-strict structural escape hatch: a table satisfies a class
        // when it supplies all the class's properties and methods.
        (Ty::Table(t), Ty::Class(c)) if ctx.mode == CheckMode::Nonstrict => {
            table_satisfies_class(t, c, ctx)
        }

        // Nominal-structural bridge for datatype references that never
        // resolved: a bare reference is compatible with table shapes.
        (Ty::Reference(_), Ty::Table(_)) | (Ty::Table(_), Ty::Reference(_)) => true,

        _ => false,
    }
}

/// Contravariant in parameters, covariant in return.
fn function_subtype(sub: &FunctionTy, sup: &FunctionTy, ctx: &mut SubtypeCtx) -> bool {
    // An explicit `this` on the supertype requires one on the subtype.
    if sup.this.is_some() && sub.this.is_none() {
        return false;
    }
    if let (Some(sub_this), Some(sup_this)) = (&sub.this, &sup.this) {
        if !is_subtype(sup_this, sub_this, ctx) {
            return false;
        }
    }

    for (i, sup_param) in sup.params.iter().enumerate() {
        match sub.params.get(i) {
            Some(sub_param) => {
                if !is_subtype(&sup_param.ty, &sub_param.ty, ctx) {
                    return false;
                }
            }
            // Missing positions must be optional in the supertype, or
            // the subtype must be variadic.
            None => {
                if !(sup_param.optional || sub.vararg) {
                    return false;
                }
            }
        }
    }

    is_subtype(&sub.ret, &sup.ret, ctx)
}

fn table_subtype(sub: &TableTy, sup: &TableTy, ctx: &mut SubtypeCtx) -> bool {
    for sup_prop in &sup.props {
        match sub.prop(&sup_prop.name) {
            Some(sub_prop) => {
                if sup_prop.readonly {
                    // Readonly: covariant.
                    if !is_subtype(&sub_prop.ty, &sup_prop.ty, ctx) {
                        return false;
                    }
                } else {
                    // Mutable: invariant (two-way subtype).
                    if !is_subtype(&sub_prop.ty, &sup_prop.ty, ctx)
                        || !is_subtype(&sup_prop.ty, &sub_prop.ty, ctx)
                    {
                        return false;
                    }
                }
            }
            None => {
                if !sup_prop.optional {
                    return false;
                }
            }
        }
    }

    if let Some(sup_ix) = &sup.indexer {
        match &sub.indexer {
            Some(sub_ix) => {
                if !is_subtype(&sub_ix.key, &sup_ix.key, ctx)
                    || !is_subtype(&sub_ix.value, &sup_ix.value, ctx)
                {
                    return false;
                }
            }
            None => {
                // Without an indexer, every property must satisfy the
                // supertype's value type.
                for prop in &sub.props {
                    if !is_subtype(&prop.ty, &sup_ix.value, ctx) {
                        return false;
                    }
                }
            }
        }
    }

    true
}

/// Whether a structural table supplies every property and method of a
/// class (the non-strict table-to-class escape hatch).
fn table_satisfies_class(
    table: &TableTy,
    class: &crate::ty::ClassTy,
    ctx: &mut SubtypeCtx,
) -> bool {
    for (name, member) in class.properties.iter().chain(class.methods.iter()) {
        match table.prop(name) {
            Some(prop) => {
                if !is_subtype(&prop.ty, &member.ty, ctx) {
                    return false;
                }
            }
            None => return false,
        }
    }
    true
}

// ── Assignability ──────────────────────────────────────────────────────

/// One-directional "value of `source` may be written to a slot of
/// `target`": subtyping plus the non-strict coercions.
pub fn is_assignable(source: &Ty, target: &Ty, ctx: &mut SubtypeCtx) -> bool {
    if is_subtype(source, target, ctx) {
        return true;
    }
    if ctx.mode != CheckMode::Nonstrict {
        return false;
    }

    let numberish = matches!(source, Ty::Number | Ty::Literal(LiteralValue::Number(_)));
    if !numberish {
        return false;
    }
    // number -> string, number -> enum / Enum.* reference.
    let resolved;
    let target = match target {
        Ty::Reference(r) if r.module.as_deref() == Some("Enum") => return true,
        Ty::Reference(r) => match resolve_reference(r, ctx.env) {
            Some(ty) => {
                resolved = ty;
                &resolved
            }
            None => target,
        },
        _ => target,
    };
    matches!(target, Ty::String | Ty::Enum(_))
}

// ── Common type, narrowing, exclusion ──────────────────────────────────

/// The least common type of two types under this context.
pub fn common_type(a: &Ty, b: &Ty, ctx: &mut SubtypeCtx) -> Ty {
    if is_subtype(a, b, ctx) {
        return b.clone();
    }
    if is_subtype(b, a, ctx) {
        return a.clone();
    }
    make_union(vec![a.clone(), b.clone()])
}

/// Members of a type viewed as a union (optionals expand to
/// `inner | nil`, plain types are singleton unions).
fn union_members(ty: &Ty) -> Vec<Ty> {
    match ty {
        Ty::Union(members) => members.clone(),
        Ty::Optional(inner) => {
            let mut members = union_members(inner);
            members.push(Ty::Nil);
            members
        }
        other => vec![other.clone()],
    }
}

/// Keep the members of `ty` that are subtypes of `guard`.
pub fn narrow(ty: &Ty, guard: &Ty, ctx: &mut SubtypeCtx) -> Ty {
    let kept: Vec<Ty> = union_members(ty)
        .into_iter()
        .filter(|m| is_subtype(m, guard, ctx))
        .collect();
    match kept.len() {
        0 => Ty::Never,
        1 => kept.into_iter().next().expect("one member"),
        _ => Ty::Union(kept),
    }
}

/// Remove the members of `ty` that are subtypes of `excluded`.
pub fn exclude(ty: &Ty, excluded: &Ty, ctx: &mut SubtypeCtx) -> Ty {
    let kept: Vec<Ty> = union_members(ty)
        .into_iter()
        .filter(|m| !is_subtype(m, excluded, ctx))
        .collect();
    match kept.len() {
        0 => Ty::Never,
        1 => kept.into_iter().next().expect("one member"),
        _ => Ty::Union(kept),
    }
}

// ── Union/intersection constructors ────────────────────────────────────

fn flatten_union(ty: Ty, out: &mut Vec<Ty>) {
    match ty {
        Ty::Union(members) => {
            for member in members {
                flatten_union(member, out);
            }
        }
        other => out.push(other),
    }
}

/// Build a union: flatten nested unions, deduplicate structurally, drop
/// `never`, collapse singletons. `any` absorbs the whole union.
pub fn make_union(members: Vec<Ty>) -> Ty {
    let mut flat = Vec::new();
    for member in members {
        flatten_union(member, &mut flat);
    }
    if flat.iter().any(|m| matches!(m, Ty::Any)) {
        return Ty::Any;
    }
    let mut unique: Vec<Ty> = Vec::new();
    for member in flat {
        if matches!(member, Ty::Never) {
            continue;
        }
        if !unique.contains(&member) {
            unique.push(member);
        }
    }
    match unique.len() {
        0 => Ty::Never,
        1 => unique.into_iter().next().expect("one member"),
        _ => Ty::Union(unique),
    }
}

fn flatten_intersection(ty: Ty, out: &mut Vec<Ty>) {
    match ty {
        Ty::Intersection(members) => {
            for member in members {
                flatten_intersection(member, out);
            }
        }
        other => out.push(other),
    }
}

/// Build an intersection: flatten, deduplicate, drop `unknown`,
/// collapse singletons. `never` annihilates the whole intersection.
pub fn make_intersection(members: Vec<Ty>) -> Ty {
    let mut flat = Vec::new();
    for member in members {
        flatten_intersection(member, &mut flat);
    }
    if flat.iter().any(|m| matches!(m, Ty::Never)) {
        return Ty::Never;
    }
    let mut unique: Vec<Ty> = Vec::new();
    for member in flat {
        if matches!(member, Ty::Unknown) {
            continue;
        }
        if !unique.contains(&member) {
            unique.push(member);
        }
    }
    match unique.len() {
        0 => Ty::Unknown,
        1 => unique.into_iter().next().expect("one member"),
        _ => Ty::Intersection(unique),
    }
}
