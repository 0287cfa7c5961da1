//! Property tests: contract conformance and morph preservation over random signatures.

use metamorph_core::*;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const NAMES: &[&str] = &["a", "b", "c", "key", "rest", "opts"];

fn arb_kind() -> impl Strategy<Value = ParamKind> {
    prop_oneof![
        Just(ParamKind::PositionalOnly),
        Just(ParamKind::Positional),
        Just(ParamKind::VarPositional),
        Just(ParamKind::KeywordOnly),
        Just(ParamKind::VarKeyword),
    ]
}

fn arb_type() -> impl Strategy<Value = Option<TypeName>> {
    prop_oneof![
        Just(None),
        Just(Some(TypeName::from("int"))),
        Just(Some(TypeName::from("str"))),
        Just(Some(TypeName::from("bool"))),
    ]
}

/// Signatures with distinct parameter names.
fn arb_signature() -> impl Strategy<Value = Signature> {
    prop::sample::subsequence(NAMES, 0..=NAMES.len())
        .prop_flat_map(|names| {
            let n = names.len();
            (
                Just(names),
                prop::collection::vec((arb_kind(), arb_type()), n),
                arb_type(),
            )
        })
        .prop_map(|(names, shapes, returns)| Signature {
            params: names
                .into_iter()
                .zip(shapes)
                .map(|(name, (kind, ty))| Param {
                    name: name.to_string(),
                    kind,
                    ty,
                })
                .collect(),
            returns,
        })
}

#[derive(Clone, Debug)]
enum Mutation {
    AddParam,
    DropParam,
    Rename(prop::sample::Index),
    Retype(prop::sample::Index),
    Rekind(prop::sample::Index, ParamKind),
    Return,
}

fn arb_mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        Just(Mutation::AddParam),
        Just(Mutation::DropParam),
        any::<prop::sample::Index>().prop_map(Mutation::Rename),
        any::<prop::sample::Index>().prop_map(Mutation::Retype),
        (any::<prop::sample::Index>(), arb_kind()).prop_map(|(i, k)| Mutation::Rekind(i, k)),
        Just(Mutation::Return),
    ]
}

/// Apply `mutation`, returning `None` when it would leave the signature unchanged.
fn mutate(sig: &Signature, mutation: &Mutation) -> Option<Signature> {
    let mut out = sig.clone();
    match mutation {
        Mutation::AddParam => out.params.push(Param::positional("extra_zz")),
        Mutation::DropParam => {
            out.params.pop()?;
        }
        Mutation::Rename(i) => {
            if out.params.is_empty() {
                return None;
            }
            let i = i.index(out.params.len());
            out.params[i].name = "renamed_zz".into();
        }
        Mutation::Retype(i) => {
            if out.params.is_empty() {
                return None;
            }
            let i = i.index(out.params.len());
            out.params[i].ty = Some("mutated_zz".into());
        }
        Mutation::Rekind(i, kind) => {
            if out.params.is_empty() {
                return None;
            }
            let i = i.index(out.params.len());
            if out.params[i].kind == *kind {
                return None;
            }
            out.params[i].kind = *kind;
        }
        Mutation::Return => out.returns = Some("mutated_zz".into()),
    }
    Some(out)
}

fn nop(_: &mut Receiver<'_>, _: &[Value]) -> Result<Value, CallError> {
    Ok(Value::Unit)
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// A variant that repeats the root's contract exactly is always accepted.
    #[test]
    fn identical_contract_always_accepted(sig in arb_signature()) {
        let mut reg = Registry::new();
        let root = reg
            .define_root(RootBuilder::new("Root").method("act", sig.clone(), nop))
            .unwrap();
        let variant = reg.define_variant(VariantBuilder::new("Same", root).method("act", sig, nop));
        prop_assert!(variant.is_ok());
    }

    /// Any structural change to a strictly typed contract is rejected, and
    /// the rejected variant is never registered.
    #[test]
    fn mutated_contract_always_rejected(sig in arb_signature(), mutation in arb_mutation()) {
        if let Some(changed) = mutate(&sig, &mutation) {
            let mut reg = Registry::new();
            let root = reg
                .define_root(RootBuilder::new("Root").method("act", sig, nop))
                .unwrap();
            let err = reg
                .define_variant(VariantBuilder::new("Changed", root).method("act", changed, nop))
                .unwrap_err();
            let is_mismatch = matches!(err, ContractError::SignatureMismatch { .. });
            prop_assert!(is_mismatch);
            prop_assert!(reg.class_by_name("Changed").is_none());
            prop_assert_eq!(reg.len(), 1);
        }
    }

    /// Loose typing lets a variant add types wherever the root left them off.
    #[test]
    fn loose_typing_accepts_added_types(sig in arb_signature()) {
        let untyped = Signature {
            params: sig
                .params
                .iter()
                .map(|p| Param { ty: None, ..p.clone() })
                .collect(),
            returns: None,
        };
        let mut reg = Registry::new();
        let root = reg
            .define_root(
                RootBuilder::new("Root")
                    .policy(Policy::default().with_mixed_typing(true))
                    .method("act", untyped, nop),
            )
            .unwrap();
        let variant = reg.define_variant(VariantBuilder::new("Typed", root).method("act", sig, nop));
        prop_assert!(variant.is_ok());
    }

    /// Any sequence of in-family morphs keeps identity, fields and private
    /// slots, and leaves the last target active.
    #[test]
    fn morph_sequences_preserve_state(
        variants in 1usize..6,
        steps in prop::collection::vec(any::<prop::sample::Index>(), 1..20),
        value in any::<i64>(),
    ) {
        let mut reg = Registry::new();
        let root = reg
            .define_root(RootBuilder::new("Root").initializer(Signature::new(), move |rx, _| {
                rx.set_private("secret", value);
                Ok(Value::Unit)
            }))
            .unwrap();
        let mut members = vec![root];
        for i in 0..variants {
            members.push(
                reg.define_variant(VariantBuilder::new(format!("V{i}"), root))
                    .unwrap(),
            );
        }

        let mut inst = reg.instantiate(root, &[]).unwrap();
        inst.set_field("value", value);
        let id = inst.id();

        let mut last = root;
        for step in &steps {
            last = members[step.index(members.len())];
            reg.morph(&mut inst, last).unwrap();
        }

        prop_assert_eq!(inst.id(), id);
        prop_assert_eq!(inst.active_class(), last);
        prop_assert_eq!(inst.field("value"), Some(&Value::Int(value)));
        prop_assert_eq!(inst.private_len(), 1);
        let key = reg.resolve_private(&inst, last, "secret");
        prop_assert_eq!(key, PrivateKey::new(root, "secret"));
    }

    /// A failed cross-family morph never changes the instance.
    #[test]
    fn cross_family_morph_is_rejected(
        steps in prop::collection::vec(any::<bool>(), 1..10),
    ) {
        let mut reg = Registry::new();
        let a = reg.define_root(RootBuilder::new("A")).unwrap();
        let a1 = reg.define_variant(VariantBuilder::new("A1", a)).unwrap();
        let b = reg.define_root(RootBuilder::new("B")).unwrap();
        let b1 = reg.define_variant(VariantBuilder::new("B1", b)).unwrap();

        let mut inst = reg.instantiate(a, &[]).unwrap();
        for to_variant in steps {
            let before = inst.active_class();
            let foreign = if to_variant { b1 } else { b };
            prop_assert!(reg.morph(&mut inst, foreign).is_err());
            prop_assert_eq!(inst.active_class(), before);
            reg.morph(&mut inst, if to_variant { a1 } else { a }).unwrap();
        }
        prop_assert_eq!(inst.family(), a);
    }
}
