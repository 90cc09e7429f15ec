use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_AUDIT_FAILURE: &str = "Audit failed";

/// Error envelope the backend function returns instead of a result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Failure of one audit invocation, normalized to a single message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    #[error("{message}")]
    Transport { message: String },
    #[error("{message}")]
    Application { message: String },
}

impl AuditError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: non_empty(message.into()),
        }
    }

    pub fn application(message: impl Into<String>) -> Self {
        Self::Application {
            message: non_empty(message.into()),
        }
    }

    /// Keeps the backend's `error` field as-is, blank or not.
    pub fn embedded(message: impl Into<String>) -> Self {
        Self::Application {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AuditError::Transport { message } | AuditError::Application { message } => message,
        }
    }
}

fn non_empty(message: String) -> String {
    if message.trim().is_empty() {
        DEFAULT_AUDIT_FAILURE.to_string()
    } else {
        message
    }
}
