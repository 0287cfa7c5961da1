//! Private state resolution.
//!
//! Private slots are qualified by a class so two classes can each own a
//! same-named slot. Method bodies qualify with the class that declared them.
//! Within a family the qualifier is rewritten to the family root before
//! storage is touched, so a slot written while one variant was active is
//! still found after morphing to a sibling.
//!
//! When the declaring class was validated with `private_members` enabled the
//! rewrite is skipped and the literal qualifier is used. Slots written by the
//! root are then out of reach of a variant's own bodies.

use serde::{Deserialize, Serialize};

use crate::class::ClassId;
use crate::instance::Instance;
use crate::registry::Registry;
use crate::value::Value;

/// Physical address of a private slot in instance storage.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrivateKey {
    pub qualifier: ClassId,
    pub name: String,
}

impl PrivateKey {
    pub fn new(qualifier: ClassId, name: impl Into<String>) -> Self {
        Self {
            qualifier,
            name: name.into(),
        }
    }
}

impl Registry {
    /// Translate a declaring-class-qualified slot into its storage key on `instance`.
    pub fn resolve_private(&self, instance: &Instance, declaring: ClassId, name: &str) -> PrivateKey {
        let qualifier = match self.class(declaring) {
            Some(def) if def.root() == instance.family && !def.policy().private_members => {
                instance.family
            }
            _ => declaring,
        };
        PrivateKey::new(qualifier, name)
    }

    pub(crate) fn read_private<'i>(
        &self,
        instance: &'i Instance,
        declaring: ClassId,
        name: &str,
    ) -> Option<&'i Value> {
        let key = self.resolve_private(instance, declaring, name);
        instance.private.get(&key)
    }

    pub(crate) fn write_private(
        &self,
        instance: &mut Instance,
        declaring: ClassId,
        name: &str,
        value: Value,
    ) {
        let key = self.resolve_private(instance, declaring, name);
        instance.private.insert(key, value);
    }
}
