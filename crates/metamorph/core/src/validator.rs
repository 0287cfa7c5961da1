//! Contract validation for variant definitions.
//!
//! Runs once per variant, before it is registered. Stages run in a fixed
//! order and the first violation aborts the definition:
//!
//! 1. **Ancestry**: mixins, chaining, sealed parents, depth bound
//! 2. **State**: no fields beyond the root's
//! 3. **Initializer**: only with `allow_init`, and then it must conform
//! 4. **Members**: every directly declared callable conforms to the root,
//!    as does any mixin method that reuses a root member's name
//!
//! Inherited members are never re-checked; only what the variant body itself
//! declares is compared.

use tracing::debug;

use crate::class::{ClassDef, Member, VariantBuilder};
use crate::contract::Signature;
use crate::error::ContractError;
use crate::policy::Policy;

/// Checks one variant body against its family root under a policy snapshot.
pub(crate) struct ContractValidator<'a> {
    variant: &'a VariantBuilder,
    parent: &'a ClassDef,
    root: &'a ClassDef,
    policy: &'a Policy,
}

impl<'a> ContractValidator<'a> {
    pub fn new(
        variant: &'a VariantBuilder,
        parent: &'a ClassDef,
        root: &'a ClassDef,
        policy: &'a Policy,
    ) -> Self {
        Self {
            variant,
            parent,
            root,
            policy,
        }
    }

    fn name(&self) -> String {
        self.variant.body.name.clone()
    }

    /// Run every stage.
    pub fn validate(&self) -> Result<(), ContractError> {
        self.check_ancestry()?;
        self.check_state()?;
        self.check_initializer()?;
        for (member_name, member) in &self.variant.body.members {
            if let Member::Method(method) = member {
                self.check_member(member_name, &method.signature)?;
            }
        }
        // Mixin methods that reuse a root member name dispatch in its place.
        for (member_name, member) in self.variant.mixins.iter().flat_map(|m| &m.members) {
            if let Member::Method(method) = member {
                if self.root.own_member(member_name).is_some() {
                    self.check_member(member_name, &method.signature)?;
                }
            }
        }
        debug!(
            variant = %self.variant.body.name,
            root = %self.root.name,
            "Variant contract satisfied"
        );
        Ok(())
    }

    fn check_ancestry(&self) -> Result<(), ContractError> {
        if self.policy.strict && !self.variant.mixins.is_empty() {
            return Err(ContractError::MultipleAncestors {
                variant: self.name(),
            });
        }

        if !self.parent.is_root() {
            if self.parent.is_sealed() {
                return Err(ContractError::SealedParent {
                    variant: self.name(),
                    parent: self.parent.name.clone(),
                });
            }
            if !self.policy.permits_chaining() {
                return Err(ContractError::ChainingNotAllowed {
                    variant: self.name(),
                    parent: self.parent.name.clone(),
                });
            }
        }

        let depth = self.parent.depth + 1;
        if let Some(max) = self.policy.max_chain_depth {
            if depth > max {
                return Err(ContractError::ChainTooDeep {
                    variant: self.name(),
                    depth,
                    max,
                });
            }
        }
        Ok(())
    }

    fn check_state(&self) -> Result<(), ContractError> {
        if !self.policy.strict {
            return Ok(());
        }
        match self
            .variant
            .body
            .fields
            .iter()
            .find(|f| !self.root.declares_field(&f.name))
        {
            Some(stray) => Err(ContractError::StrayState {
                variant: self.name(),
                field: stray.name.clone(),
                root: self.root.name.clone(),
            }),
            None => Ok(()),
        }
    }

    fn check_initializer(&self) -> Result<(), ContractError> {
        let Some(init) = &self.variant.body.initializer else {
            return Ok(());
        };
        if !self.policy.allow_init {
            return Err(ContractError::InitializerNotAllowed {
                variant: self.name(),
            });
        }
        let Some(root_init) = self.root.initializer() else {
            return Err(ContractError::NotAMember {
                variant: self.name(),
                member: "init".into(),
                root: self.root.name.clone(),
            });
        };
        self.conform(
            "init",
            &init.signature,
            &root_init.signature,
        )
    }

    fn check_member(&self, member_name: &str, signature: &Signature) -> Result<(), ContractError> {
        let expected = match self.root.own_member(member_name) {
            None => {
                return Err(ContractError::NotAMember {
                    variant: self.name(),
                    member: member_name.to_string(),
                    root: self.root.name.clone(),
                })
            }
            Some(Member::Attribute(_)) => {
                return Err(ContractError::NotCallable {
                    variant: self.name(),
                    member: member_name.to_string(),
                    root: self.root.name.clone(),
                })
            }
            Some(Member::Method(m)) => &m.signature,
        };
        self.conform(member_name, signature, expected)
    }

    fn conform(
        &self,
        member_name: &str,
        found: &Signature,
        expected: &Signature,
    ) -> Result<(), ContractError> {
        found
            .conforms_to(expected, self.policy.allow_mixed_typing)
            .map_err(|mismatch| ContractError::SignatureMismatch {
                variant: self.name(),
                member: member_name.to_string(),
                root: self.root.name.clone(),
                mismatch,
            })
    }
}
