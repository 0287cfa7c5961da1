//! Member dispatch and instantiation.
//!
//! Calls resolve against the instance's active class, then its mixins, then up
//! the family chain. Method bodies receive a [`Receiver`], the only path to the
//! instance's storage from inside a body; private access through it always
//! goes via the private state resolver.

use tracing::debug;

use crate::class::{ClassId, Member, Method};
use crate::error::{CallError, MorphError};
use crate::instance::{Instance, InstanceId};
use crate::registry::Registry;
use crate::value::Value;

/// The `self` handed to a running method body.
pub struct Receiver<'a> {
    registry: &'a Registry,
    instance: &'a mut Instance,
    /// Class whose body is executing; qualifies private slots.
    declaring: ClassId,
}

impl<'a> Receiver<'a> {
    pub fn id(&self) -> InstanceId {
        self.instance.id()
    }

    pub fn active_class(&self) -> ClassId {
        self.instance.active_class()
    }

    pub fn declaring_class(&self) -> ClassId {
        self.declaring
    }

    pub fn registry(&self) -> &Registry {
        self.registry
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.instance.field(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.instance.set_field(name, value);
    }

    pub fn private(&self, name: &str) -> Option<&Value> {
        self.registry
            .read_private(self.instance, self.declaring, name)
    }

    pub fn set_private(&mut self, name: &str, value: impl Into<Value>) {
        self.registry
            .write_private(self.instance, self.declaring, name, value.into());
    }

    /// Class attribute visible from the active class.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.registry.attribute(self.instance.active_class(), name)
    }

    /// Dispatch another member on the same instance.
    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Value, CallError> {
        self.registry.call(self.instance, name, args)
    }

    /// Morph the receiver. Takes effect for the next dispatch.
    pub fn morph(&mut self, target: ClassId) -> Result<(), MorphError> {
        self.registry.morph(self.instance, target)
    }
}

impl Registry {
    /// Find `name` starting at `class`. Yields the class that declares it.
    pub fn resolve_member(&self, class: ClassId, name: &str) -> Option<(ClassId, &Member)> {
        self.ancestry(class).find_map(|def| {
            def.own_member(name)
                .or_else(|| def.mixin_member(name))
                .map(|m| (def.id(), m))
        })
    }

    /// Class attribute lookup following the same order as dispatch.
    pub fn attribute(&self, class: ClassId, name: &str) -> Option<&Value> {
        match self.resolve_member(class, name) {
            Some((_, Member::Attribute(v))) => Some(v),
            _ => None,
        }
    }

    /// Call member `name` on `instance` with positional `args`.
    pub fn call(
        &self,
        instance: &mut Instance,
        name: &str,
        args: &[Value],
    ) -> Result<Value, CallError> {
        let active = instance.active_class();
        let (declaring, member) =
            self.resolve_member(active, name)
                .ok_or_else(|| CallError::NoSuchMember {
                    class: self.class_name(active),
                    member: name.to_string(),
                })?;
        let Member::Method(method) = member else {
            return Err(CallError::NotCallable {
                class: self.class_name(active),
                member: name.to_string(),
            });
        };
        debug!(
            instance = %instance.id(),
            member = name,
            class = %self.class_name(declaring),
            "Dispatching"
        );
        self.invoke(instance, declaring, name, method, args)
    }

    fn invoke(
        &self,
        instance: &mut Instance,
        declaring: ClassId,
        name: &str,
        method: &Method,
        args: &[Value],
    ) -> Result<Value, CallError> {
        if !method.signature.accepts(args.len()) {
            return Err(CallError::Arity {
                class: self.class_name(declaring),
                member: name.to_string(),
                signature: method.signature.to_string(),
                found: args.len(),
            });
        }
        let mut receiver = Receiver {
            registry: self,
            instance,
            declaring,
        };
        (method.body)(&mut receiver, args)
    }

    /// Create an instance of `class` (root or variant).
    ///
    /// Declared field defaults are applied root first, then the nearest
    /// initializer up the chain runs with `args`.
    pub fn instantiate(&self, class: ClassId, args: &[Value]) -> Result<Instance, CallError> {
        let def = self.class(class).ok_or(CallError::UnknownClass(class))?;
        let mut instance = Instance::new(def.root(), class);

        let chain: Vec<_> = self.ancestry(class).collect();
        for ancestor in chain.iter().rev() {
            for field in ancestor.fields() {
                instance.set_field(field.name.clone(), field.default.clone());
            }
        }

        if let Some(owner) = chain.iter().find(|c| c.initializer().is_some()) {
            if let Some(init) = owner.initializer() {
                self.invoke(&mut instance, owner.id(), "init", init, args)?;
            }
        } else if !args.is_empty() {
            return Err(CallError::Arity {
                class: self.class_name(class),
                member: "init".into(),
                signature: "()".into(),
                found: args.len(),
            });
        }

        debug!(instance = %instance.id(), class = %def.name(), "Instance created");
        Ok(instance)
    }
}
