use crate::class::ClassId;
use crate::contract::ParamKind;

/// Definition-time contract violation. The offending class is never registered.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContractError {
    #[error("parent {parent} of {variant} is not metamorphic")]
    ParentNotMetamorphic { variant: String, parent: String },

    #[error("parent {parent} of {variant} belongs to family {family}, not {expected}")]
    ForeignParent {
        variant: String,
        parent: String,
        family: String,
        expected: String,
    },

    #[error("metamorph child {variant} cannot have any other base classes")]
    MultipleAncestors { variant: String },

    #[error("cannot subclass metamorph child {parent} (chaining is not allowed in this family)")]
    ChainingNotAllowed { variant: String, parent: String },

    #[error("cannot subclass sealed variant {parent}")]
    SealedParent { variant: String, parent: String },

    #[error("{variant} would sit at chain depth {depth}, family allows at most {max}")]
    ChainTooDeep {
        variant: String,
        depth: usize,
        max: usize,
    },

    #[error("metamorph class {variant} cannot declare field {field} (not declared by {root})")]
    StrayState {
        variant: String,
        field: String,
        root: String,
    },

    #[error("the initializer is not allowed in metamorph class {variant} (set allow_init to permit it)")]
    InitializerNotAllowed { variant: String },

    #[error("the function {variant}.{member} is not a member of {root}")]
    NotAMember {
        variant: String,
        member: String,
        root: String,
    },

    #[error("the function {variant}.{member} is not a callable member of {root}")]
    NotCallable {
        variant: String,
        member: String,
        root: String,
    },

    #[error("the function {variant}.{member} does not match the signature of {root}.{member}: {mismatch}")]
    SignatureMismatch {
        variant: String,
        member: String,
        root: String,
        #[source]
        mismatch: SignatureMismatch,
    },

    #[error("{class} declares member {member} more than once")]
    DuplicateMember { class: String, member: String },

    #[error("class name {0} is already registered")]
    NameTaken(String),
}

/// The first structural difference found between two signatures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureMismatch {
    #[error("expected {expected} parameters, found {found}")]
    ParamCount { expected: usize, found: usize },

    #[error("parameter {position} should be named {expected}, found {found}")]
    ParamName {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("parameter {0} is missing")]
    MissingParam(String),

    #[error("parameter {name} should be {expected}, found {found}")]
    ParamKind {
        name: String,
        expected: ParamKind,
        found: ParamKind,
    },

    #[error("parameter {name} should be typed {expected}, found {found}")]
    ParamType {
        name: String,
        expected: String,
        found: String,
    },

    #[error("return type should be {expected}, found {found}")]
    ReturnType { expected: String, found: String },
}

/// Runtime morph failure. The instance is left exactly as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MorphError {
    #[error("object is not metamorphic (active type {0})")]
    InstanceNotMetamorphic(ClassId),

    #[error("morph target {0} is not metamorphic")]
    TargetNotMetamorphic(ClassId),

    #[error("object of family {instance_family} and morph {target} of family {target_family} do not belong to the same family")]
    FamilyMismatch {
        instance_family: String,
        target: String,
        target_family: String,
    },
}

/// Failure while dispatching a member call or instantiating a class.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("{class} has no member {member}")]
    NoSuchMember { class: String, member: String },

    #[error("{class}.{member} is not callable")]
    NotCallable { class: String, member: String },

    #[error("{class}.{member}{signature} cannot take {found} positional arguments")]
    Arity {
        class: String,
        member: String,
        signature: String,
        found: usize,
    },

    #[error("class {0} is not registered")]
    UnknownClass(ClassId),

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Morph(#[from] MorphError),
}

impl CallError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// Failure loading a policy or family manifest.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}
