//! Declarative family manifests.
//!
//! A manifest describes families by contract only (no bodies), so a set of
//! variants can be checked against their roots without writing any code.
//! Registered methods fail with `CallError::Failed` if called.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::class::{ClassId, Mixin, RootBuilder, VariantBuilder};
use crate::contract::Signature;
use crate::error::{CallError, ConfigError, ContractError};
use crate::policy::Policy;
use crate::registry::Registry;
use crate::value::Value;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FamilyManifest {
    #[serde(default, rename = "family")]
    pub families: Vec<FamilySpec>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FamilySpec {
    #[serde(default)]
    pub policy: Policy,
    pub root: ClassSpec,
    #[serde(default)]
    pub variants: Vec<ClassSpec>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClassSpec {
    pub name: String,
    /// Parent class name; a variant without one derives from its family root.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub methods: Vec<MethodSpec>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub initializer: Option<Signature>,
    #[serde(default)]
    pub mixins: Vec<String>,
    #[serde(default)]
    pub sealed: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MethodSpec {
    pub name: String,
    #[serde(flatten)]
    pub signature: Signature,
}

/// Outcome of registering one class from a manifest.
#[derive(Debug)]
pub struct ClassOutcome {
    pub family: String,
    pub name: String,
    pub result: Result<ClassId, ContractError>,
}

impl ClassOutcome {
    pub fn is_accepted(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Default)]
pub struct ManifestReport {
    pub outcomes: Vec<ClassOutcome>,
}

impl ManifestReport {
    pub fn accepted(&self) -> impl Iterator<Item = &ClassOutcome> {
        self.outcomes.iter().filter(|o| o.is_accepted())
    }

    pub fn rejected(&self) -> impl Iterator<Item = &ClassOutcome> {
        self.outcomes.iter().filter(|o| !o.is_accepted())
    }

    pub fn is_clean(&self) -> bool {
        self.rejected().next().is_none()
    }
}

fn declared_only(
    _: &mut crate::dispatch::Receiver<'_>,
    _: &[Value],
) -> Result<Value, CallError> {
    Err(CallError::failed("declared only"))
}

impl FamilyManifest {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a manifest; `.json` files are read as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_toml_str(&contents),
        }
    }

    /// Replace every family's policy.
    pub fn override_policy(&mut self, policy: &Policy) {
        for family in &mut self.families {
            family.policy = policy.clone();
        }
    }

    /// Register every family into `registry`, roots first within each family,
    /// variants in file order. Rejections are reported, not fatal.
    pub fn register(&self, registry: &mut Registry) -> ManifestReport {
        let mut report = ManifestReport::default();
        for family in &self.families {
            let family_name = family.root.name.clone();
            let root = registry.define_root(root_builder(family));
            let root_id = root.as_ref().ok().copied();
            report.outcomes.push(ClassOutcome {
                family: family_name.clone(),
                name: family.root.name.clone(),
                result: root,
            });

            for spec in &family.variants {
                let result = match parent_id(registry, spec, &family.root.name, root_id) {
                    Ok(parent) => registry.define_variant(variant_builder(spec, parent)),
                    Err(e) => Err(e),
                };
                report.outcomes.push(ClassOutcome {
                    family: family_name.clone(),
                    name: spec.name.clone(),
                    result,
                });
            }
        }
        info!(
            accepted = report.accepted().count(),
            rejected = report.rejected().count(),
            "Manifest registered"
        );
        report
    }
}

fn parent_id(
    registry: &Registry,
    spec: &ClassSpec,
    root_name: &str,
    root_id: Option<ClassId>,
) -> Result<ClassId, ContractError> {
    let parent_name = spec.parent.as_deref().unwrap_or(root_name);
    let found = if parent_name == root_name {
        root_id
    } else {
        registry.class_by_name(parent_name)
    };
    let parent = found.ok_or_else(|| ContractError::ParentNotMetamorphic {
        variant: spec.name.clone(),
        parent: parent_name.to_string(),
    })?;

    // A named parent must sit in the family the variant is listed under.
    let family = registry.family_of(parent);
    if family.is_some() && family != root_id {
        return Err(ContractError::ForeignParent {
            variant: spec.name.clone(),
            parent: parent_name.to_string(),
            family: family.map(|f| registry.class_name(f)).unwrap_or_default(),
            expected: root_name.to_string(),
        });
    }
    Ok(parent)
}

fn root_builder(family: &FamilySpec) -> RootBuilder {
    let spec = &family.root;
    let mut b = RootBuilder::new(&spec.name).policy(family.policy.clone());
    for m in &spec.methods {
        b = b.method(&m.name, m.signature.clone(), declared_only);
    }
    for a in &spec.attributes {
        b = b.attribute(a, Value::Unit);
    }
    for f in &spec.fields {
        b = b.field(f, Value::Unit);
    }
    if let Some(sig) = &spec.initializer {
        b = b.initializer(sig.clone(), declared_only);
    }
    b
}

fn variant_builder(spec: &ClassSpec, parent: ClassId) -> VariantBuilder {
    let mut b = VariantBuilder::new(&spec.name, parent);
    for m in &spec.methods {
        b = b.method(&m.name, m.signature.clone(), declared_only);
    }
    for a in &spec.attributes {
        b = b.attribute(a, Value::Unit);
    }
    for f in &spec.fields {
        b = b.field(f, Value::Unit);
    }
    if let Some(sig) = &spec.initializer {
        b = b.initializer(sig.clone(), declared_only);
    }
    for m in &spec.mixins {
        b = b.mixin(Mixin::new(m));
    }
    if spec.sealed {
        b = b.sealed();
    }
    b
}
