use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::class::ClassId;
use crate::private::PrivateKey;
use crate::value::Value;

/// Stable identity of an instance. Never changes across morphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(Uuid);

impl InstanceId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An object of some family.
///
/// The active-type tag decides which member table dispatch uses. Storage is
/// allocated once at instantiation and never moved by a morph. Not `Clone`:
/// an `InstanceId` names exactly one object.
#[derive(Debug)]
pub struct Instance {
    pub(crate) id: InstanceId,
    pub(crate) family: ClassId,
    pub(crate) active: ClassId,
    pub(crate) fields: HashMap<String, Value>,
    pub(crate) private: HashMap<PrivateKey, Value>,
}

impl Instance {
    pub(crate) fn new(family: ClassId, active: ClassId) -> Self {
        Self {
            id: InstanceId::new(),
            family,
            active,
            fields: HashMap::new(),
            private: HashMap::new(),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Root of the family this instance was created in.
    pub fn family(&self) -> ClassId {
        self.family
    }

    /// Class member dispatch currently resolves against.
    pub fn active_class(&self) -> ClassId {
        self.active
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of private slots currently stored.
    pub fn private_len(&self) -> usize {
        self.private.len()
    }
}
