//! Error types for orchestration.
//!
//! Only structural misuse and budget exhaustion are caller-visible.
//! Per-call failures are recorded as `CallOutcome::Failed` and absorbed
//! by the aggregation step.

use crate::descriptor::Gas;

/// Result type for orchestration operations.
pub type Result<T> = std::result::Result<T, OrchestrationError>;

/// Failures of an orchestration as a whole.
#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    /// The plan violates the builder's structural rules.
    #[error("malformed plan: {0}")]
    MalformedPlan(String),

    /// Issuing a call would exceed the budget attached to the orchestration.
    #[error("budget exceeded issuing '{method}': requested {requested}, remaining {remaining}")]
    BudgetExceeded {
        method: String,
        requested: Gas,
        remaining: Gas,
    },
}

impl OrchestrationError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        OrchestrationError::MalformedPlan(msg.into())
    }

    /// Returns true if the plan was rejected for structural reasons.
    pub fn is_malformed_plan(&self) -> bool {
        matches!(self, OrchestrationError::MalformedPlan(_))
    }

    /// Returns true if the attached budget ran out.
    pub fn is_budget_exceeded(&self) -> bool {
        matches!(self, OrchestrationError::BudgetExceeded { .. })
    }
}

/// Serialization failures.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Why a single outcome slot could not produce a value.
///
/// Only seen inside aggregation, where it is turned into a default value
/// and a diagnostic.
#[derive(Debug, thiserror::Error)]
pub enum LeafError {
    #[error("remote call failed: {0}")]
    RemoteCallFailed(String),

    #[error(transparent)]
    Decode(#[from] CodecError),

    #[error("slot {0} is still pending")]
    Pending(usize),

    #[error("no slot at index {0}")]
    MissingSlot(usize),
}
