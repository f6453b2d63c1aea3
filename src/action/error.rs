//! Error types for action registration and execution.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Why an executed request did not reach its declared outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum MismatchReason {
    /// No request is stored under the action's identity.
    NotRegistered,
    /// A gating condition did not hold; `failed` is its position.
    ConditionsUnmet { failed: usize },
    /// The executable ran but returned something else.
    UnexpectedOutcome { expected: Value, actual: Value },
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchReason::NotRegistered => write!(f, "no request registered"),
            MismatchReason::ConditionsUnmet { failed } => {
                write!(f, "gating condition #{failed} did not hold")
            }
            MismatchReason::UnexpectedOutcome { expected, actual } => {
                write!(f, "expected {expected}, got {actual}")
            }
        }
    }
}

/// Errors raised by the action registry and runner.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Outcome mismatch for action {action}: {reason}")]
    OutcomeMismatch {
        action: String,
        reason: MismatchReason,
    },

    #[error("Action {action} failed")]
    ExecutionFailed {
        action: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Binding into the process-wide namespace needs `allow_global_rebinding`.
    #[error("Global rebinding of {0} is disabled")]
    GlobalRebindingDisabled(String),
}

impl ActionError {
    pub fn mismatch(action: impl Into<String>, reason: MismatchReason) -> Self {
        ActionError::OutcomeMismatch {
            action: action.into(),
            reason,
        }
    }

    /// The mismatch reason, if this is an [`ActionError::OutcomeMismatch`].
    pub fn mismatch_reason(&self) -> Option<&MismatchReason> {
        match self {
            ActionError::OutcomeMismatch { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
