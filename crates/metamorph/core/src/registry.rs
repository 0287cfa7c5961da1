use std::collections::HashMap;

use tracing::{info, warn};

use crate::class::{ClassDef, ClassId, RootBuilder, VariantBuilder};
use crate::error::ContractError;
use crate::policy::Policy;
use crate::validator::ContractValidator;

/// The type table: every defined class plus the live policy of each family.
///
/// Definition takes `&mut self`; dispatch and morph take `&self`. Callers
/// sharing a registry across threads wrap it in an `RwLock`.
#[derive(Debug, Default)]
pub struct Registry {
    classes: HashMap<ClassId, ClassDef>,
    by_name: HashMap<String, ClassId>,
    /// Current policy per family root, applied to the next variant definition.
    policies: HashMap<ClassId, Policy>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a new family root. Starts a family with the builder's policy.
    pub fn define_root(&mut self, builder: RootBuilder) -> Result<ClassId, ContractError> {
        self.check_body_shape(&builder.body.name, builder.body.duplicate_member())?;

        let id = ClassId::allocate();
        let policy = builder.policy;
        let def = ClassDef::from_body(id, builder.body, None, id, 0, policy.clone());

        info!(
            class = %def.name,
            id = %id,
            strict = policy.strict,
            "Family root defined"
        );

        self.by_name.insert(def.name.clone(), id);
        self.policies.insert(id, policy);
        self.classes.insert(id, def);
        Ok(id)
    }

    /// Define a variant. The variant is registered only if its contract holds
    /// against the family root under the family's current policy.
    pub fn define_variant(&mut self, builder: VariantBuilder) -> Result<ClassId, ContractError> {
        let result = self.validate_variant(&builder);
        if let Err(e) = &result {
            warn!(variant = %builder.body.name, error = %e, "Variant rejected");
        }
        let (root, depth, policy) = result?;

        let id = ClassId::allocate();
        let mut def = ClassDef::from_body(
            id,
            builder.body,
            Some(builder.parent),
            root,
            depth,
            policy,
        );
        def.mixins = builder.mixins;
        def.sealed = builder.sealed;

        info!(
            class = %def.name,
            id = %id,
            root = %root,
            depth,
            "Variant defined"
        );

        self.by_name.insert(def.name.clone(), id);
        self.classes.insert(id, def);
        Ok(id)
    }

    /// Classify the parent, then validate. Yields the cached root, the new
    /// depth and the policy snapshot the variant is accepted under.
    fn validate_variant(
        &self,
        builder: &VariantBuilder,
    ) -> Result<(ClassId, usize, Policy), ContractError> {
        self.check_body_shape(&builder.body.name, builder.body.duplicate_member())?;

        let root_id = self
            .family_of(builder.parent)
            .ok_or_else(|| ContractError::ParentNotMetamorphic {
                variant: builder.body.name.clone(),
                parent: builder.parent.to_string(),
            })?;
        let (Some(parent), Some(root), Some(policy)) = (
            self.classes.get(&builder.parent),
            self.classes.get(&root_id),
            self.policies.get(&root_id),
        ) else {
            return Err(ContractError::ParentNotMetamorphic {
                variant: builder.body.name.clone(),
                parent: builder.parent.to_string(),
            });
        };

        ContractValidator::new(builder, parent, root, policy).validate()?;
        Ok((root_id, parent.depth + 1, policy.clone()))
    }

    fn check_body_shape(&self, name: &str, duplicate: Option<&str>) -> Result<(), ContractError> {
        if self.by_name.contains_key(name) {
            return Err(ContractError::NameTaken(name.to_string()));
        }
        if let Some(member) = duplicate {
            return Err(ContractError::DuplicateMember {
                class: name.to_string(),
                member: member.to_string(),
            });
        }
        Ok(())
    }

    pub fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(&id)
    }

    pub fn class_by_name(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    /// Display name of a class, or its raw id when unknown.
    pub fn class_name(&self, id: ClassId) -> String {
        self.class(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Current policy of the family rooted at `root`.
    pub fn policy(&self, root: ClassId) -> Option<&Policy> {
        self.policies.get(&root)
    }

    /// Mutable access to a family's policy. Affects only variants defined afterwards.
    pub fn policy_mut(&mut self, root: ClassId) -> Option<&mut Policy> {
        self.policies.get_mut(&root)
    }

    /// Ids of every family root.
    pub fn roots(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.classes.values().filter(|c| c.is_root()).map(|c| c.id)
    }

    /// Every class of the family rooted at `root`, root included.
    pub fn family_members(&self, root: ClassId) -> Vec<ClassId> {
        let mut ids: Vec<_> = self
            .classes
            .values()
            .filter(|c| c.root == root)
            .map(|c| c.id)
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Walk from `class` up to its root, starting with `class` itself.
    pub(crate) fn ancestry(&self, class: ClassId) -> impl Iterator<Item = &ClassDef> + '_ {
        let mut current = self.classes.get(&class);
        std::iter::from_fn(move || {
            let def = current?;
            current = def.parent.and_then(|p| self.classes.get(&p));
            Some(def)
        })
    }
}
