//! Declared member contracts.
//!
//! A [`Signature`] is the structural shape of a callable member: an ordered
//! parameter list (name, kind, optional declared type) plus an optional return
//! type. Variants are checked against their root by comparing these shapes,
//! never by inspecting the bodies.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SignatureMismatch;

/// Declared type of a parameter or return value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(pub String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// How an argument binds to a parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    PositionalOnly,
    #[default]
    Positional,
    VarPositional,
    KeywordOnly,
    VarKeyword,
}

impl ParamKind {
    /// Positional parameters are matched by position, so their names must line up pairwise.
    pub fn is_positional(self) -> bool {
        matches!(self, Self::PositionalOnly | Self::Positional)
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PositionalOnly => "positional-only",
            Self::Positional => "positional",
            Self::VarPositional => "variadic positional",
            Self::KeywordOnly => "keyword-only",
            Self::VarKeyword => "variadic keyword",
        };
        f.write_str(s)
    }
}

/// A single declared parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(default)]
    pub kind: ParamKind,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeName>,
}

impl Param {
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ty: None,
        }
    }

    pub fn positional(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Positional)
    }

    pub fn with_type(mut self, ty: impl Into<TypeName>) -> Self {
        self.ty = Some(ty.into());
        self
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParamKind::VarPositional => write!(f, "*{}", self.name)?,
            ParamKind::VarKeyword => write!(f, "**{}", self.name)?,
            _ => write!(f, "{}", self.name)?,
        }
        if let Some(ty) = &self.ty {
            write!(f, ": {ty}")?;
        }
        Ok(())
    }
}

/// Structural contract of a callable member. The receiver is implicit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<TypeName>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Untyped positional parameter.
    pub fn arg(self, name: impl Into<String>) -> Self {
        self.param(Param::positional(name))
    }

    /// Typed positional parameter.
    pub fn typed_arg(self, name: impl Into<String>, ty: impl Into<TypeName>) -> Self {
        self.param(Param::positional(name).with_type(ty))
    }

    pub fn returns(mut self, ty: impl Into<TypeName>) -> Self {
        self.returns = Some(ty.into());
        self
    }

    fn positional_count(&self) -> usize {
        self.params.iter().filter(|p| p.kind.is_positional()).count()
    }

    fn is_variadic(&self) -> bool {
        self.params
            .iter()
            .any(|p| p.kind == ParamKind::VarPositional)
    }

    /// Whether a call with `n` positional arguments binds to this signature.
    pub fn accepts(&self, n: usize) -> bool {
        let required = self.positional_count();
        if self.is_variadic() {
            n >= required
        } else {
            n == required
        }
    }

    /// Compare this (variant) signature against the root's `expected` one.
    ///
    /// With `loose` set, an untyped root parameter or return accepts any
    /// declared type on the variant side. The first difference is reported.
    pub fn conforms_to(&self, expected: &Signature, loose: bool) -> Result<(), SignatureMismatch> {
        if expected.params.len() != self.params.len() {
            return Err(SignatureMismatch::ParamCount {
                expected: expected.params.len(),
                found: self.params.len(),
            });
        }

        for (position, (want, got)) in expected.params.iter().zip(&self.params).enumerate() {
            if want.kind.is_positional() && want.name != got.name {
                return Err(SignatureMismatch::ParamName {
                    position,
                    expected: want.name.clone(),
                    found: got.name.clone(),
                });
            }
        }

        for want in &expected.params {
            let got = self
                .params
                .iter()
                .find(|p| p.name == want.name)
                .ok_or_else(|| SignatureMismatch::MissingParam(want.name.clone()))?;
            if want.kind != got.kind {
                return Err(SignatureMismatch::ParamKind {
                    name: want.name.clone(),
                    expected: want.kind,
                    found: got.kind,
                });
            }
            if !types_match(want.ty.as_ref(), got.ty.as_ref(), loose) {
                return Err(SignatureMismatch::ParamType {
                    name: want.name.clone(),
                    expected: describe(want.ty.as_ref()),
                    found: describe(got.ty.as_ref()),
                });
            }
        }

        if !types_match(expected.returns.as_ref(), self.returns.as_ref(), loose) {
            return Err(SignatureMismatch::ReturnType {
                expected: describe(expected.returns.as_ref()),
                found: describe(self.returns.as_ref()),
            });
        }

        Ok(())
    }
}

fn types_match(root: Option<&TypeName>, variant: Option<&TypeName>, loose: bool) -> bool {
    (loose && root.is_none()) || root == variant
}

fn describe(ty: Option<&TypeName>) -> String {
    ty.map(|t| t.to_string()).unwrap_or_else(|| "<unset>".into())
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, ")")?;
        if let Some(ret) = &self.returns {
            write!(f, " -> {ret}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_sig() -> Signature {
        Signature::new().typed_arg("a", "str").arg("b")
    }

    #[test]
    fn identical_signatures_conform() {
        assert!(root_sig().conforms_to(&root_sig(), false).is_ok());
    }

    #[test]
    fn swapped_names_rejected() {
        let variant = Signature::new().arg("b").typed_arg("a", "str");
        let err = variant.conforms_to(&root_sig(), false).unwrap_err();
        assert!(matches!(err, SignatureMismatch::ParamName { position: 0, .. }));
    }

    #[test]
    fn extra_param_rejected() {
        let root = Signature::new().returns("str");
        let variant = Signature::new().arg("volume").returns("str");
        let err = variant.conforms_to(&root, false).unwrap_err();
        assert_eq!(
            err,
            SignatureMismatch::ParamCount {
                expected: 0,
                found: 1
            }
        );
    }

    #[test]
    fn added_type_needs_loose_mode() {
        let variant = Signature::new().typed_arg("a", "str").typed_arg("b", "str");
        assert!(matches!(
            variant.conforms_to(&root_sig(), false),
            Err(SignatureMismatch::ParamType { .. })
        ));
        assert!(variant.conforms_to(&root_sig(), true).is_ok());
    }

    #[test]
    fn loose_mode_still_rejects_conflicting_types() {
        let variant = Signature::new().typed_arg("a", "int").arg("b");
        assert!(variant.conforms_to(&root_sig(), true).is_err());
    }

    #[test]
    fn loose_mode_does_not_let_variant_drop_a_type() {
        let variant = Signature::new().arg("a").arg("b");
        assert!(variant.conforms_to(&root_sig(), true).is_err());
    }

    #[test]
    fn kind_mismatch_rejected() {
        let root = Signature::new().param(Param::new("opts", ParamKind::KeywordOnly));
        let variant = Signature::new().param(Param::new("opts", ParamKind::VarKeyword));
        assert!(matches!(
            variant.conforms_to(&root, false),
            Err(SignatureMismatch::ParamKind { .. })
        ));
    }

    #[test]
    fn keyword_params_paired_by_name() {
        let root = Signature::new()
            .param(Param::new("x", ParamKind::KeywordOnly))
            .param(Param::new("y", ParamKind::KeywordOnly));
        let reordered = Signature::new()
            .param(Param::new("y", ParamKind::KeywordOnly))
            .param(Param::new("x", ParamKind::KeywordOnly));
        assert!(reordered.conforms_to(&root, false).is_ok());

        let renamed = Signature::new()
            .param(Param::new("x", ParamKind::KeywordOnly))
            .param(Param::new("z", ParamKind::KeywordOnly));
        assert_eq!(
            renamed.conforms_to(&root, false),
            Err(SignatureMismatch::MissingParam("y".into()))
        );
    }

    #[test]
    fn return_type_compared() {
        let root = Signature::new().returns("str");
        let variant = Signature::new().returns("bool");
        assert!(matches!(
            variant.conforms_to(&root, false),
            Err(SignatureMismatch::ReturnType { .. })
        ));
        assert!(Signature::new().conforms_to(&root, false).is_err());
    }

    #[test]
    fn arity() {
        let sig = Signature::new()
            .arg("a")
            .param(Param::new("rest", ParamKind::VarPositional));
        assert!(sig.accepts(1));
        assert!(sig.accepts(4));
        assert!(!sig.accepts(0));
        assert!(root_sig().accepts(2));
        assert!(!root_sig().accepts(3));
    }

    #[test]
    fn display() {
        let sig = Signature::new()
            .typed_arg("a", "str")
            .param(Param::new("rest", ParamKind::VarPositional))
            .returns("bool");
        assert_eq!(sig.to_string(), "(a: str, *rest) -> bool");
    }
}
