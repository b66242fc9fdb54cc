use crate::edit::EditError;
use thiserror::Error;

/// Why a rewrite left the text alone. Never fatal to a session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteFailure {
    #[error("target belongs to an earlier parse")]
    Stale,

    #[error("no block {id} in the current tree")]
    UnknownBlock { id: String },

    #[error("{command} cannot target a {kind} node")]
    UnsupportedTarget {
        command: &'static str,
        kind: &'static str,
    },

    #[error("index {index} out of range for {len} item(s)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid value {value:?}: {reason}")]
    InvalidValue { value: String, reason: String },

    #[error("{0}")]
    Precondition(String),

    #[error("rewrite would introduce {count} parse error(s)")]
    ParseErrorIntroduced { count: usize },

    #[error("edit could not be applied: {0}")]
    Edit(#[from] EditError),

    #[error("parser unavailable: {0}")]
    Parser(String),
}

/// Result of one rewrite: the text to continue with, and whether it changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    Rewritten { text: String },
    Unchanged { text: String, reason: RewriteFailure },
}

impl RewriteOutcome {
    pub fn text(&self) -> &str {
        match self {
            RewriteOutcome::Rewritten { text } | RewriteOutcome::Unchanged { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            RewriteOutcome::Rewritten { text } | RewriteOutcome::Unchanged { text, .. } => text,
        }
    }

    pub fn is_rewritten(&self) -> bool {
        matches!(self, RewriteOutcome::Rewritten { .. })
    }

    pub fn failure(&self) -> Option<&RewriteFailure> {
        match self {
            RewriteOutcome::Rewritten { .. } => None,
            RewriteOutcome::Unchanged { reason, .. } => Some(reason),
        }
    }
}
