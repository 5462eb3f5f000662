//! Algebraic laws of the subtyping engine, exercised over a small zoo
//! of types: reflexivity, transitivity, union/intersection membership,
//! narrow/exclude coverage, and common-type behavior.

use std::rc::Rc;

use lupa_typeck::env::TypeEnvironment;
use lupa_typeck::subtype::{
    common_type, exclude, is_subtype, make_intersection, make_union, narrow, CheckMode,
    SubtypeCtx,
};
use lupa_typeck::ty::{ClassTy, TableProp, Ty};

/// A representative sample of the type lattice.
fn zoo() -> Vec<Ty> {
    vec![
        Ty::Nil,
        Ty::Boolean,
        Ty::Number,
        Ty::String,
        Ty::Thread,
        Ty::Vector,
        Ty::number_literal(7.0),
        Ty::string_literal("tag"),
        Ty::function(vec![Ty::Number], Ty::String),
        Ty::table(vec![TableProp::new("x", Ty::Number)]),
        Ty::array(Ty::String),
        Ty::Union(vec![Ty::Number, Ty::String]),
        Ty::optional(Ty::Number),
        Ty::Any,
        Ty::Unknown,
        Ty::Never,
    ]
}

fn strict_check(f: impl FnOnce(&mut SubtypeCtx)) {
    let env = TypeEnvironment::new();
    let mut ctx = SubtypeCtx::new(CheckMode::Strict, &env);
    f(&mut ctx);
}

#[test]
fn reflexivity_holds_for_every_zoo_member() {
    strict_check(|ctx| {
        for t in zoo() {
            assert!(is_subtype(&t, &t, ctx), "{t} should be a subtype of itself");
        }
    });
}

#[test]
fn everything_fits_any_and_unknown() {
    strict_check(|ctx| {
        for t in zoo() {
            assert!(is_subtype(&t, &Ty::Any, ctx), "{t} <: any");
            assert!(is_subtype(&t, &Ty::Unknown, ctx), "{t} <: unknown");
            assert!(is_subtype(&Ty::Never, &t, ctx), "never <: {t}");
        }
    });
}

#[test]
fn union_membership_laws() {
    strict_check(|ctx| {
        for a in zoo() {
            for b in zoo() {
                let union = make_union(vec![a.clone(), b.clone()]);
                assert!(
                    is_subtype(&a, &union, ctx),
                    "{a} should fit union({a}, {b}) = {union}"
                );
            }
        }
    });
}

#[test]
fn intersection_projection_laws() {
    strict_check(|ctx| {
        let a = Ty::table(vec![TableProp::new("x", Ty::Number)]);
        let b = Ty::table(vec![TableProp::new("y", Ty::String)]);
        let both = make_intersection(vec![a.clone(), b.clone()]);
        assert!(is_subtype(&both, &a, ctx));
        assert!(is_subtype(&both, &b, ctx));
    });
}

#[test]
fn transitivity_over_chains() {
    strict_check(|ctx| {
        // literal <: primitive <: union <: optional-union <: any.
        let chain = [
            Ty::number_literal(1.0),
            Ty::Number,
            Ty::Union(vec![Ty::Number, Ty::String]),
            Ty::optional(Ty::Union(vec![Ty::Number, Ty::String])),
            Ty::Any,
        ];
        for window in chain.windows(2) {
            assert!(
                is_subtype(&window[0], &window[1], ctx),
                "{} <: {}",
                window[0],
                window[1]
            );
        }
        for i in 0..chain.len() {
            for j in i..chain.len() {
                assert!(
                    is_subtype(&chain[i], &chain[j], ctx),
                    "transitive step {} <: {}",
                    chain[i],
                    chain[j]
                );
            }
        }
    });
}

#[test]
fn narrow_picks_disjoint_members_exactly() {
    strict_check(|ctx| {
        let union = Ty::Union(vec![Ty::Number, Ty::String, Ty::Boolean]);
        assert_eq!(narrow(&union, &Ty::Number, ctx), Ty::Number);
        assert_eq!(narrow(&union, &Ty::String, ctx), Ty::String);
        assert_eq!(narrow(&union, &Ty::Thread, ctx), Ty::Never);
    });
}

#[test]
fn narrow_and_exclude_partition_a_union() {
    strict_check(|ctx| {
        let union = Ty::Union(vec![Ty::Number, Ty::String, Ty::Boolean]);
        let kept = narrow(&union, &Ty::Number, ctx);
        let dropped = exclude(&union, &Ty::Number, ctx);
        // Reassembling the parts covers the original union.
        let rebuilt = make_union(vec![kept, dropped]);
        for member in [Ty::Number, Ty::String, Ty::Boolean] {
            assert!(is_subtype(&member, &rebuilt, ctx), "{member} lost");
        }
        assert!(is_subtype(&rebuilt, &union, ctx));
    });
}

#[test]
fn exclude_to_nothing_is_never() {
    strict_check(|ctx| {
        assert_eq!(exclude(&Ty::Number, &Ty::Number, ctx), Ty::Never);
        assert_eq!(exclude(&Ty::optional(Ty::Number), &Ty::Any, ctx), Ty::Never);
    });
}

#[test]
fn common_type_is_idempotent_and_absorbing() {
    strict_check(|ctx| {
        for t in zoo() {
            assert_eq!(common_type(&t, &t, ctx), t, "common({t}, {t})");
        }
        assert_eq!(common_type(&Ty::number_literal(1.0), &Ty::Number, ctx), Ty::Number);
        assert_eq!(
            common_type(&Ty::Number, &Ty::Any, ctx),
            Ty::Any,
            "any absorbs"
        );
    });
}

#[test]
fn class_chains_are_transitive() {
    let mut env = TypeEnvironment::new();
    let mut part = ClassTy::new("Part");
    part.superclass = Some("BasePart".into());
    let mut base = ClassTy::new("BasePart");
    base.superclass = Some("Instance".into());
    let part = Rc::new(part);
    let base = Rc::new(base);
    let instance = Rc::new(ClassTy::new("Instance"));
    env.define_class(part.clone());
    env.define_class(base.clone());
    env.define_class(instance.clone());

    let mut ctx = SubtypeCtx::new(CheckMode::Strict, &env);
    let part = Ty::Class(part);
    let base = Ty::Class(base);
    let instance = Ty::Class(instance);

    assert!(is_subtype(&part, &base, &mut ctx));
    assert!(is_subtype(&base, &instance, &mut ctx));
    assert!(is_subtype(&part, &instance, &mut ctx));
    assert!(!is_subtype(&instance, &part, &mut ctx));

    // Classes participate in union rules like any other type.
    let either = make_union(vec![part.clone(), Ty::Nil]);
    assert!(is_subtype(&part, &either, &mut ctx));
    assert!(is_subtype(&Ty::Nil, &either, &mut ctx));
    assert_eq!(narrow(&either, &instance, &mut ctx), part);
}

#[test]
fn union_constructor_is_order_insensitive_up_to_membership() {
    strict_check(|ctx| {
        let ab = make_union(vec![Ty::Number, Ty::String]);
        let ba = make_union(vec![Ty::String, Ty::Number]);
        assert!(is_subtype(&ab, &ba, ctx));
        assert!(is_subtype(&ba, &ab, ctx));
    });
}
