use shave_template::error::ParseError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("decompile failed: {0}")]
    Decompile(#[from] DecompileError),
    #[error("parse artifact failed: {0}")]
    Parse(#[from] ParseError),
}

#[derive(thiserror::Error, Debug)]
pub enum DecompileError {
    #[error("invalid template: member `{member}` {problem}.")]
    InvalidArtifact { member: String, problem: String },

    #[error("unsupported HTMLBars/Ember version: `{revision}`.")]
    UnsupportedVersion { revision: String },

    #[error("Ember versions older than 1.10 are not supported.")]
    LegacyTemplate,

    #[error("buildRenderNodes() returned {morphs} morphs for {statements} statements.")]
    StructuralMismatch { morphs: usize, statements: usize },

    #[error("Ember.HTMLBars.template not invoked.")]
    MissingRegistration,

    #[error("Ember.HTMLBars.template called repeatedly.")]
    DuplicateRegistration,

    #[error("cannot create path `{path}`: `{segment}` is already taken by non-object.")]
    PathConflict { path: String, segment: String },

    #[error("child index {index} out of range for a node with {len} children.")]
    InvalidChildIndex { index: usize, len: usize },

    #[error("cannot create morph over children {start}..={end} of a node with {len} children.")]
    InvalidMorphRange { start: i64, end: i64, len: usize },

    #[error("{kind} morph was created but never bound.")]
    UnboundMorph { kind: String },

    #[error("`{statement}` cannot be applied to {found}.")]
    WrongMorphKind { statement: String, found: String },

    #[error("`{name}` is not a {expected}.")]
    NotCallable { name: String, expected: String },

    #[error("sandbox execution failed: {message}")]
    Execution { message: String },

    #[error("document node id have some problem.")]
    NodeId(#[from] id_tree::NodeIdError),
}

impl DecompileError {
    pub fn invalid_artifact(member: &str, problem: impl Into<String>) -> Self {
        Self::InvalidArtifact {
            member: member.to_string(),
            problem: problem.into(),
        }
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }
}

impl From<id_tree::NodeIdError> for Error {
    fn from(e: id_tree::NodeIdError) -> Self {
        Error::Decompile(e.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
