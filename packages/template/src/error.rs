use std::fmt;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("[ParseFailed] invalid {kind} `{opcode}`")]
    UnknownOpcode { kind: OpcodeKind, opcode: String },
    #[error("[ParseFailed] malformed {context}: {detail}")]
    Shape { context: String, detail: String },
    #[error("[ParseFailed] no `Ember@<major>` marker in revision `{revision}`")]
    InvalidRevision { revision: String },
    #[error("[ParseFailed] invalid alias path `{path}`")]
    InvalidPath { path: String },
}

impl ParseError {
    pub fn shape(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Shape {
            context: context.into(),
            detail: detail.into(),
        }
    }
}

/// Which opcode table an unknown tag was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeKind {
    Expression,
    Statement,
}

impl fmt::Display for OpcodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpcodeKind::Expression => write!(f, "expression"),
            OpcodeKind::Statement => write!(f, "statement"),
        }
    }
}
