//! Class definitions and the builders used to declare roots and variants.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::contract::Signature;
use crate::dispatch::Receiver;
use crate::error::CallError;
use crate::policy::Policy;
use crate::value::Value;

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a defined class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(u64);

impl ClassId {
    pub(crate) fn allocate() -> Self {
        Self(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap a raw id. Ids not produced by a registry classify as unrelated.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class#{}", self.0)
    }
}

/// Body of a callable member.
pub type MethodFn =
    Arc<dyn Fn(&mut Receiver<'_>, &[Value]) -> Result<Value, CallError> + Send + Sync>;

/// A callable member: declared contract plus body.
#[derive(Clone)]
pub struct Method {
    pub signature: Signature,
    pub body: MethodFn,
}

impl Method {
    pub fn new<F>(signature: Signature, body: F) -> Self
    where
        F: Fn(&mut Receiver<'_>, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self {
            signature,
            body: Arc::new(body),
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("signature", &self.signature.to_string())
            .finish_non_exhaustive()
    }
}

/// A named entry in a class body.
#[derive(Clone, Debug)]
pub enum Member {
    Method(Method),
    /// Non-callable class-level value.
    Attribute(Value),
}

impl Member {
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Method(_))
    }

    pub fn signature(&self) -> Option<&Signature> {
        match self {
            Self::Method(m) => Some(&m.signature),
            Self::Attribute(_) => None,
        }
    }
}

/// Declared persistent field with the value new instances start with.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub default: Value,
}

/// Plain bundle of methods mixed into a variant. Only accepted by non-strict families.
#[derive(Clone, Debug)]
pub struct Mixin {
    pub name: String,
    pub(crate) members: Vec<(String, Member)>,
}

impl Mixin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn method<F>(mut self, name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(&mut Receiver<'_>, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        self.members
            .push((name.into(), Member::Method(Method::new(signature, body))));
        self
    }
}

/// Members declared directly in a class body, in declaration order.
#[derive(Clone, Debug, Default)]
pub(crate) struct ClassBody {
    pub name: String,
    pub members: Vec<(String, Member)>,
    pub fields: Vec<FieldDecl>,
    pub initializer: Option<Method>,
}

impl ClassBody {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// First member name that appears twice, if any.
    pub fn duplicate_member(&self) -> Option<&str> {
        self.members.iter().enumerate().find_map(|(i, (name, _))| {
            self.members[..i]
                .iter()
                .any(|(seen, _)| seen == name)
                .then_some(name.as_str())
        })
    }
}

macro_rules! body_setters {
    () => {
        /// Declare a callable member.
        pub fn method<F>(mut self, name: impl Into<String>, signature: Signature, body: F) -> Self
        where
            F: Fn(&mut Receiver<'_>, &[Value]) -> Result<Value, CallError>
                + Send
                + Sync
                + 'static,
        {
            self.body
                .members
                .push((name.into(), Member::Method(Method::new(signature, body))));
            self
        }

        /// Declare a non-callable class attribute.
        pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
            self.body
                .members
                .push((name.into(), Member::Attribute(value.into())));
            self
        }

        /// Declare a persistent public field.
        pub fn field(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
            self.body.fields.push(FieldDecl {
                name: name.into(),
                default: default.into(),
            });
            self
        }

        /// Declare the initializer run by `Registry::instantiate`.
        pub fn initializer<F>(mut self, signature: Signature, body: F) -> Self
        where
            F: Fn(&mut Receiver<'_>, &[Value]) -> Result<Value, CallError>
                + Send
                + Sync
                + 'static,
        {
            self.body.initializer = Some(Method::new(signature, body));
            self
        }
    };
}

/// Declares a new family root.
#[derive(Debug)]
pub struct RootBuilder {
    pub(crate) body: ClassBody,
    pub(crate) policy: Policy,
}

impl RootBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            body: ClassBody::new(name),
            policy: Policy::default(),
        }
    }

    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    body_setters!();
}

/// Declares a variant of an existing family.
#[derive(Debug)]
pub struct VariantBuilder {
    pub(crate) parent: ClassId,
    pub(crate) body: ClassBody,
    pub(crate) mixins: Vec<Mixin>,
    pub(crate) sealed: bool,
}

impl VariantBuilder {
    pub fn new(name: impl Into<String>, parent: ClassId) -> Self {
        Self {
            parent,
            body: ClassBody::new(name),
            mixins: Vec::new(),
            sealed: false,
        }
    }

    /// Add a further base of plain methods.
    pub fn mixin(mut self, mixin: Mixin) -> Self {
        self.mixins.push(mixin);
        self
    }

    /// Forbid any variant from being derived from this one.
    pub fn sealed(mut self) -> Self {
        self.sealed = true;
        self
    }

    body_setters!();
}

/// A registered class. Immutable once registered.
#[derive(Debug)]
pub struct ClassDef {
    pub(crate) id: ClassId,
    pub(crate) name: String,
    pub(crate) parent: Option<ClassId>,
    pub(crate) root: ClassId,
    pub(crate) depth: usize,
    pub(crate) members: HashMap<String, Member>,
    pub(crate) mixins: Vec<Mixin>,
    pub(crate) fields: Vec<FieldDecl>,
    pub(crate) initializer: Option<Method>,
    pub(crate) sealed: bool,
    pub(crate) policy: Policy,
}

impl ClassDef {
    pub(crate) fn from_body(
        id: ClassId,
        body: ClassBody,
        parent: Option<ClassId>,
        root: ClassId,
        depth: usize,
        policy: Policy,
    ) -> Self {
        Self {
            id,
            name: body.name,
            parent,
            root,
            depth,
            members: body.members.into_iter().collect(),
            mixins: Vec::new(),
            fields: body.fields,
            initializer: body.initializer,
            sealed: false,
            policy,
        }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Immediate parent; `None` for a root.
    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    /// Cached family root, resolved once at definition time.
    pub fn root(&self) -> ClassId {
        self.root
    }

    /// Distance from the root (the root itself is 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Policy this class was validated under.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Member declared directly on this class.
    pub fn own_member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    pub fn declares_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn initializer(&self) -> Option<&Method> {
        self.initializer.as_ref()
    }

    /// Member contributed by one of this class's mixins, first mixin wins.
    pub(crate) fn mixin_member(&self, name: &str) -> Option<&Member> {
        self.mixins
            .iter()
            .flat_map(|m| m.members.iter())
            .find(|(n, _)| n == name)
            .map(|(_, m)| m)
    }
}
