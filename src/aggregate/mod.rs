//! Result aggregation.
//!
//! After every leaf of a plan is terminal, the engine hands an
//! `OutcomeTable` to the plan's `ResultAggregator`. The aggregator decodes
//! each slot, substitutes defaults for failed or undecodable slots, and
//! reports per-slot problems through the `DiagnosticLog`. It never fails.

mod diagnostics;

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec;
use crate::error::LeafError;
use crate::substrate::{CallId, CallOutcome};

pub use diagnostics::{Diagnostic, DiagnosticLevel, DiagnosticLog};

/// Outcome of one result-producing call, at a fixed index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeSlot {
    index: usize,
    call: Option<CallId>,
    outcome: CallOutcome,
}

impl OutcomeSlot {
    pub fn new(index: usize, call: Option<CallId>, outcome: CallOutcome) -> Self {
        Self {
            index,
            call,
            outcome,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Substrate call that produced this slot, if it came from one.
    pub fn call_id(&self) -> Option<CallId> {
        self.call
    }

    pub fn outcome(&self) -> &CallOutcome {
        &self.outcome
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome.is_resolved()
    }

    /// Decode the payload of a resolved slot.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, LeafError> {
        match &self.outcome {
            CallOutcome::Resolved(bytes) => Ok(codec::decode(bytes)?),
            CallOutcome::Failed(reason) => Err(LeafError::RemoteCallFailed(reason.clone())),
            CallOutcome::Pending => Err(LeafError::Pending(self.index)),
        }
    }
}

/// Ordered outcomes of one plan, indexed 0..N-1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeTable {
    slots: Vec<OutcomeSlot>,
}

impl OutcomeTable {
    /// Build a table from outcomes in slot order.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = CallOutcome>) -> Self {
        let slots = outcomes
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| OutcomeSlot::new(index, None, outcome))
            .collect();
        Self { slots }
    }

    pub(crate) fn from_slots(slots: Vec<OutcomeSlot>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&OutcomeSlot> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[OutcomeSlot] {
        &self.slots
    }

    /// True when no slot is pending.
    pub fn all_terminal(&self) -> bool {
        self.slots.iter().all(|s| s.outcome.is_terminal())
    }

    /// Decode one slot.
    pub fn decode<T: DeserializeOwned>(&self, index: usize) -> Result<T, LeafError> {
        self.get(index)
            .ok_or(LeafError::MissingSlot(index))?
            .decode()
    }

    /// Decode one slot, falling back to `T::default()` with a failure diagnostic.
    pub fn decode_or_default<T>(&self, index: usize, log: &mut DiagnosticLog) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.decode(index) {
            Ok(value) => value,
            Err(e) => {
                log.failure(Some(index), format!("Slot {index} unavailable: {e}"));
                T::default()
            }
        }
    }

    /// Decode every slot, dropping the ones that failed (each gets a diagnostic).
    pub fn decode_successful<T: DeserializeOwned>(&self, log: &mut DiagnosticLog) -> Vec<T> {
        self.slots
            .iter()
            .filter_map(|slot| match slot.decode() {
                Ok(value) => Some(value),
                Err(e) => {
                    log.failure(
                        Some(slot.index),
                        format!("Slot {} dropped: {e}", slot.index),
                    );
                    None
                }
            })
            .collect()
    }
}

/// The aggregation step attached to a plan with `then`.
///
/// Implementations must not fail: failed slots become defaults plus a
/// diagnostic. Aggregation is a pure function of the table, so running it
/// twice on the same table gives the same output.
pub trait ResultAggregator: Send + Sync + 'static {
    type Output: Serialize + Send;

    fn aggregate(&self, outcomes: &OutcomeTable, log: &mut DiagnosticLog) -> Self::Output;
}

/// Run an aggregator with a fresh log.
pub fn aggregate<A: ResultAggregator + ?Sized>(
    aggregator: &A,
    outcomes: &OutcomeTable,
) -> (A::Output, DiagnosticLog) {
    let mut log = DiagnosticLog::new();
    let output = aggregator.aggregate(outcomes, &mut log);
    (output, log)
}

/// Aggregator with its output encoded, so aggregators of different output
/// types can share one registry.
pub(crate) trait EncodedAggregator: Send + Sync {
    fn aggregate_encoded(&self, outcomes: &OutcomeTable, log: &mut DiagnosticLog) -> CallOutcome;
}

impl<A: ResultAggregator> EncodedAggregator for A {
    fn aggregate_encoded(&self, outcomes: &OutcomeTable, log: &mut DiagnosticLog) -> CallOutcome {
        let output = self.aggregate(outcomes, log);
        match codec::encode(&output) {
            Ok(bytes) => CallOutcome::Resolved(bytes),
            Err(e) => CallOutcome::Failed(e.to_string()),
        }
    }
}

/// Returns slot 0 decoded as `T`, or `T::default()` if it failed.
pub struct Passthrough<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Passthrough<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Passthrough<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResultAggregator for Passthrough<T>
where
    T: DeserializeOwned + Serialize + Default + Send + 'static,
{
    type Output = T;

    fn aggregate(&self, outcomes: &OutcomeTable, log: &mut DiagnosticLog) -> T {
        outcomes.decode_or_default(0, log)
    }
}

/// Returns every successfully decoded slot as `T`, in slot order.
pub struct CollectSuccessful<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> CollectSuccessful<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for CollectSuccessful<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResultAggregator for CollectSuccessful<T>
where
    T: DeserializeOwned + Serialize + Send + 'static,
{
    type Output = Vec<T>;

    fn aggregate(&self, outcomes: &OutcomeTable, log: &mut DiagnosticLog) -> Vec<T> {
        outcomes.decode_successful(log)
    }
}
