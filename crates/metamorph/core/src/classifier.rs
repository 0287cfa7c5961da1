use serde::{Deserialize, Serialize};

use crate::class::ClassId;
use crate::instance::Instance;
use crate::registry::Registry;

/// Where a class stands relative to the family machinery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Root,
    Variant { root: ClassId },
    Unrelated,
}

impl Classification {
    pub fn is_metamorphic(self) -> bool {
        !matches!(self, Self::Unrelated)
    }
}

/// Anything that can be classified: a class id or an instance (through its active class).
pub trait Subject {
    fn subject_class(&self) -> ClassId;
}

impl Subject for ClassId {
    fn subject_class(&self) -> ClassId {
        *self
    }
}

impl Subject for Instance {
    fn subject_class(&self) -> ClassId {
        self.active_class()
    }
}

impl<T: Subject + ?Sized> Subject for &T {
    fn subject_class(&self) -> ClassId {
        (**self).subject_class()
    }
}

impl Registry {
    pub fn classify(&self, subject: &impl Subject) -> Classification {
        match self.class(subject.subject_class()) {
            None => Classification::Unrelated,
            Some(def) if def.is_root() => Classification::Root,
            Some(def) => Classification::Variant { root: def.root() },
        }
    }

    /// Cached family root of a class or instance; `None` when unrelated.
    pub fn family_of(&self, subject: impl Subject) -> Option<ClassId> {
        match self.classify(&subject) {
            Classification::Root => Some(subject.subject_class()),
            Classification::Variant { root } => Some(root),
            Classification::Unrelated => None,
        }
    }

    pub fn is_metamorphic(&self, subject: impl Subject) -> bool {
        self.classify(&subject).is_metamorphic()
    }

    pub fn is_root(&self, subject: impl Subject) -> bool {
        self.classify(&subject) == Classification::Root
    }

    pub fn is_variant(&self, subject: impl Subject) -> bool {
        matches!(self.classify(&subject), Classification::Variant { .. })
    }

    /// Whether `instance`'s active class is `class` or derives from it.
    pub fn is_instance_of(&self, instance: &Instance, class: ClassId) -> bool {
        self.ancestry(instance.active_class()).any(|c| c.id() == class)
    }
}
