use tracing::debug;

use crate::class::ClassId;
use crate::error::MorphError;
use crate::instance::Instance;
use crate::registry::Registry;

impl Registry {
    /// Switch `instance` to `target`, keeping its identity and storage.
    ///
    /// Both the instance's active class and `target` must belong to the same
    /// family. No initializer runs. On error the instance is untouched.
    pub fn morph(&self, instance: &mut Instance, target: ClassId) -> Result<(), MorphError> {
        let current = instance.active_class();
        let instance_family = self
            .family_of(current)
            .ok_or(MorphError::InstanceNotMetamorphic(current))?;
        let target_family = self
            .family_of(target)
            .ok_or(MorphError::TargetNotMetamorphic(target))?;

        if instance_family != target_family || instance_family != instance.family {
            return Err(MorphError::FamilyMismatch {
                instance_family: self.class_name(instance.family),
                target: self.class_name(target),
                target_family: self.class_name(target_family),
            });
        }

        if current == target {
            debug!(instance = %instance.id, class = %target, "Morph target already active");
            return Ok(());
        }

        instance.active = target;
        debug!(
            instance = %instance.id,
            from = %current,
            to = %target,
            "Instance morphed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{RootBuilder, VariantBuilder};

    fn two_families() -> (Registry, ClassId, ClassId, ClassId, ClassId) {
        let mut reg = Registry::new();
        let a = reg.define_root(RootBuilder::new("RootA")).unwrap();
        let a1 = reg.define_variant(VariantBuilder::new("VariantA1", a)).unwrap();
        let b = reg.define_root(RootBuilder::new("RootB")).unwrap();
        let b1 = reg.define_variant(VariantBuilder::new("VariantB1", b)).unwrap();
        (reg, a, a1, b, b1)
    }

    #[test]
    fn morph_within_family() {
        let (reg, a, a1, _, _) = two_families();
        let mut inst = reg.instantiate(a, &[]).unwrap();
        let id = inst.id();
        reg.morph(&mut inst, a1).unwrap();
        assert_eq!(inst.active_class(), a1);
        assert_eq!(inst.id(), id);
        reg.morph(&mut inst, a).unwrap();
        assert_eq!(inst.active_class(), a);
    }

    #[test]
    fn cross_family_rejected_and_unchanged() {
        let (reg, a, _, _, b1) = two_families();
        let mut inst = reg.instantiate(a, &[]).unwrap();
        let err = reg.morph(&mut inst, b1).unwrap_err();
        assert_eq!(
            err,
            MorphError::FamilyMismatch {
                instance_family: "RootA".into(),
                target: "VariantB1".into(),
                target_family: "RootB".into(),
            }
        );
        assert_eq!(inst.active_class(), a);
    }

    #[test]
    fn unknown_target_rejected() {
        let (reg, a, _, _, _) = two_families();
        let mut inst = reg.instantiate(a, &[]).unwrap();
        let stranger = ClassId::from_raw(u64::MAX);
        assert_eq!(
            reg.morph(&mut inst, stranger),
            Err(MorphError::TargetNotMetamorphic(stranger))
        );
    }

    #[test]
    fn instance_from_other_registry_is_not_metamorphic_here() {
        let (reg, a, _, _, _) = two_families();
        let (other, other_root, _, _, _) = two_families();
        let mut foreign = other.instantiate(other_root, &[]).unwrap();
        assert_eq!(
            reg.morph(&mut foreign, a),
            Err(MorphError::InstanceNotMetamorphic(other_root))
        );
    }

    #[test]
    fn morph_is_idempotent() {
        let (reg, a, a1, _, _) = two_families();
        let mut inst = reg.instantiate(a, &[]).unwrap();
        inst.set_field("n", 1i64);
        reg.morph(&mut inst, a1).unwrap();
        reg.morph(&mut inst, a1).unwrap();
        assert_eq!(inst.active_class(), a1);
        assert_eq!(inst.field("n").and_then(|v| v.as_int()), Some(1));
    }
}
