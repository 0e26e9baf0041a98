//! Remote invocation substrate abstraction.
//!
//! `Substrate` is the platform that actually carries calls to remote
//! services. The orchestration core only ever issues calls, registers for
//! their resolution and reads their outcomes through this trait.
//! - `local/`: in-process substrate dispatching to `RemoteService` handlers

pub mod local;

use std::fmt;

use async_trait::async_trait;

use crate::descriptor::RemoteCallDescriptor;

/// Opaque handle for one issued call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallId(pub u64);

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call-{}", self.0)
    }
}

/// State of one issued call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// Not yet resolved.
    Pending,
    /// Completed with a raw result payload.
    Resolved(Vec<u8>),
    /// Completed unsuccessfully. Contains the substrate's reason.
    Failed(String),
}

impl CallOutcome {
    /// Resolved or failed.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CallOutcome::Pending)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, CallOutcome::Resolved(_))
    }

    /// Raw payload of a resolved call.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            CallOutcome::Resolved(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Work to run once a set of calls has resolved. Invoked at most once.
pub type Continuation = Box<dyn FnOnce() + Send + 'static>;

/// Primitives the orchestration core needs from the remote platform.
#[async_trait]
pub trait Substrate: Send + Sync {
    /// Start one remote invocation. Resolves out-of-band.
    async fn issue_call(&self, call: &RemoteCallDescriptor) -> CallId;

    /// Start several calls on one target as a single submission unit.
    ///
    /// The substrate runs them in order. A failing call does not stop the
    /// calls after it.
    async fn issue_call_batch(&self, calls: &[&RemoteCallDescriptor]) -> Vec<CallId>;

    /// Run `continuation` once every referenced call is terminal.
    fn on_all_resolved(&self, ids: &[CallId], continuation: Continuation);

    /// Current outcome of an issued call.
    async fn read_outcome(&self, id: CallId) -> CallOutcome;
}
