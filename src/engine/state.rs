//! Orchestration lifecycle.

use std::fmt;

use tracing::debug;
use uuid::Uuid;

/// Lifecycle of one orchestration. Strictly forward, one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OrchestrationState {
    Building,
    Submitted,
    Executing,
    Aggregating,
    Completed,
}

impl OrchestrationState {
    /// The state that follows this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            OrchestrationState::Building => Some(OrchestrationState::Submitted),
            OrchestrationState::Submitted => Some(OrchestrationState::Executing),
            OrchestrationState::Executing => Some(OrchestrationState::Aggregating),
            OrchestrationState::Aggregating => Some(OrchestrationState::Completed),
            OrchestrationState::Completed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == OrchestrationState::Completed
    }
}

impl fmt::Display for OrchestrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrchestrationState::Building => "building",
            OrchestrationState::Submitted => "submitted",
            OrchestrationState::Executing => "executing",
            OrchestrationState::Aggregating => "aggregating",
            OrchestrationState::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Tracks the state of one orchestration.
pub(crate) struct Lifecycle {
    id: Uuid,
    state: OrchestrationState,
}

impl Lifecycle {
    pub(crate) fn new(id: Uuid) -> Self {
        Self {
            id,
            state: OrchestrationState::Building,
        }
    }

    pub(crate) fn state(&self) -> OrchestrationState {
        self.state
    }

    /// Move to `next`, which must directly follow the current state.
    pub(crate) fn advance(&mut self, next: OrchestrationState) {
        debug_assert_eq!(
            self.state.next(),
            Some(next),
            "invalid orchestration transition {} -> {}",
            self.state,
            next
        );
        debug!(orchestration_id = %self.id, from = %self.state, to = %next, "Orchestration state change");
        self.state = next;
    }
}
