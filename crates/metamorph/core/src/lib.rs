#![deny(unsafe_code)]
//! # metamorph-core
//!
//! Runtime type families. An instance carries an active-type tag that can be
//! switched between the root of its family and any of the root's variants,
//! without changing the instance's identity or touching its storage.
//!
//! - **Classification**: every registered class is a family root or a variant
//!   with a cached root reference; anything else is unrelated.
//! - **Contract validation**: a variant is checked against its root once,
//!   when defined. A variant that fails is never registered and so can never
//!   be instantiated or morphed into.
//! - **Private state**: private slots are addressed by `(family root, name)`,
//!   so they survive morphs between siblings.
//! - **Morph**: an in-place rewrite of the active-type tag, checked for family
//!   membership and otherwise side-effect free.
//!
//! ```
//! use metamorph_core::{Registry, RootBuilder, Signature, Value, VariantBuilder};
//!
//! let mut reg = Registry::new();
//! let animal = reg
//!     .define_root(RootBuilder::new("Animal").method(
//!         "speak",
//!         Signature::new().returns("str"),
//!         |_, _| Ok("...".into()),
//!     ))
//!     .unwrap();
//! let dog = reg
//!     .define_variant(VariantBuilder::new("Dog", animal).method(
//!         "speak",
//!         Signature::new().returns("str"),
//!         |_, _| Ok("Woof".into()),
//!     ))
//!     .unwrap();
//!
//! let mut a = reg.instantiate(animal, &[]).unwrap();
//! reg.morph(&mut a, dog).unwrap();
//! assert_eq!(reg.call(&mut a, "speak", &[]).unwrap(), Value::from("Woof"));
//! ```

pub mod class;
pub mod classifier;
pub mod contract;
pub mod dispatch;
pub mod error;
pub mod instance;
pub mod manifest;
pub mod morph;
pub mod policy;
pub mod private;
pub mod registry;
mod validator;
pub mod value;

pub use class::{ClassDef, ClassId, FieldDecl, Member, Method, MethodFn, Mixin, RootBuilder, VariantBuilder};
pub use classifier::{Classification, Subject};
pub use contract::{Param, ParamKind, Signature, TypeName};
pub use dispatch::Receiver;
pub use error::{CallError, ConfigError, ContractError, MorphError, SignatureMismatch};
pub use instance::{Instance, InstanceId};
pub use manifest::{ClassOutcome, ClassSpec, FamilyManifest, FamilySpec, ManifestReport, MethodSpec};
pub use policy::Policy;
pub use private::PrivateKey;
pub use registry::Registry;
pub use value::Value;
