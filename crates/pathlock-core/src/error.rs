//! Error types for pathlock operations

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type for pathlock operations
pub type Result<T> = std::result::Result<T, PathlockError>;

/// Step of the lock sequence that failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockStage {
    CreateRuleset,
    OpenPath(String),
    AddRule(String),
    NoNewPrivs,
    RestrictSelf,
}

impl fmt::Display for LockStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockStage::CreateRuleset => write!(f, "create ruleset"),
            LockStage::OpenPath(path) => write!(f, "open path {}", path),
            LockStage::AddRule(path) => write!(f, "add rule for {}", path),
            LockStage::NoNewPrivs => write!(f, "no new privs"),
            LockStage::RestrictSelf => write!(f, "restrict self"),
        }
    }
}

/// Errors that can occur while describing or applying a filesystem lock
#[derive(Error, Debug)]
pub enum PathlockError {
    #[error("improper path")]
    ImproperPath,

    #[error("improper filetype")]
    ImproperType,

    #[error("improper mode")]
    ImproperMode,

    #[error("landlock not available: {0}")]
    NotSupported(String),

    #[error("landlock failed to lock ({stage}): {source}")]
    LockFailed {
        stage: LockStage,
        #[source]
        source: io::Error,
    },

    #[error("landlock restriction already applied to this process")]
    AlreadyLocked,

    #[error("invalid policy: {0}")]
    Policy(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl PathlockError {
    pub fn lock_failed(stage: LockStage, source: io::Error) -> Self {
        PathlockError::LockFailed { stage, source }
    }

    /// Whether the error describes malformed rule input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PathlockError::ImproperPath | PathlockError::ImproperType | PathlockError::ImproperMode
        )
    }
}
