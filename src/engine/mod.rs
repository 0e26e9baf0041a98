//! Execution engine.
//!
//! `Orchestrator::submit` runs a plan against the substrate:
//! 1. Validate the root callback and reserve its fee
//! 2. Issue leaves, honouring sequence dependencies; join arms run concurrently
//! 3. Wait for every result-producing call to resolve
//! 4. Build the outcome table and run the registered aggregator exactly once
//!
//! Calls already issued when the budget runs out keep running on the
//! substrate; the failure is reported, not undone.

mod budget;
mod state;

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::aggregate::{
    DiagnosticLog, EncodedAggregator, OutcomeSlot, OutcomeTable, ResultAggregator,
};
use crate::codec;
use crate::config::OrchestratorConfig;
use crate::descriptor::{Gas, RemoteCallDescriptor, ServiceId};
use crate::error::{LeafError, OrchestrationError, Result};
use crate::plan::CallPlanNode;
use crate::substrate::{CallId, CallOutcome, Substrate};

use budget::FeeLedger;
use state::Lifecycle;

pub use state::OrchestrationState;

/// Result of a completed orchestration.
#[derive(Debug, Clone)]
pub struct PlanHandle {
    id: Uuid,
    state: OrchestrationState,
    output: CallOutcome,
    diagnostics: DiagnosticLog,
    slot_count: usize,
    remaining_budget: Gas,
}

impl PlanHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> OrchestrationState {
        self.state
    }

    /// Encoded aggregator output.
    pub fn output(&self) -> &CallOutcome {
        &self.output
    }

    /// Diagnostics emitted while aggregating.
    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    /// Number of slots the aggregator was given.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Budget left after every call, callback included, was charged.
    pub fn remaining_budget(&self) -> Gas {
        self.remaining_budget
    }

    /// Decode the aggregated result.
    pub fn result<T: DeserializeOwned>(&self) -> std::result::Result<T, LeafError> {
        match &self.output {
            CallOutcome::Resolved(bytes) => Ok(codec::decode(bytes)?),
            CallOutcome::Failed(reason) => Err(LeafError::RemoteCallFailed(reason.clone())),
            CallOutcome::Pending => Err(LeafError::Pending(0)),
        }
    }

    /// The aggregated result as an outcome, for use as a slot of a parent plan.
    pub fn into_outcome(self) -> CallOutcome {
        self.output
    }
}

/// Builder for an `Orchestrator`.
pub struct OrchestratorBuilder {
    config: OrchestratorConfig,
    substrate: Arc<dyn Substrate>,
    callbacks: HashMap<String, Arc<dyn EncodedAggregator>>,
}

impl OrchestratorBuilder {
    /// Register the aggregator invoked for callbacks named `method`.
    pub fn callback<A: ResultAggregator>(mut self, method: impl Into<String>, aggregator: A) -> Self {
        self.callbacks.insert(method.into(), Arc::new(aggregator));
        self
    }

    pub fn build(self) -> Orchestrator {
        Orchestrator {
            config: self.config,
            substrate: self.substrate,
            callbacks: self.callbacks,
        }
    }
}

/// Submits call plans and runs their aggregation step.
///
/// Holds no per-plan state: concurrent submissions are independent.
pub struct Orchestrator {
    config: OrchestratorConfig,
    substrate: Arc<dyn Substrate>,
    callbacks: HashMap<String, Arc<dyn EncodedAggregator>>,
}

impl Orchestrator {
    pub fn builder(config: OrchestratorConfig, substrate: Arc<dyn Substrate>) -> OrchestratorBuilder {
        OrchestratorBuilder {
            config,
            substrate,
            callbacks: HashMap::new(),
        }
    }

    /// Identity callbacks must be addressed to.
    pub fn self_id(&self) -> &ServiceId {
        &self.config.self_id
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Callback descriptor addressed to this orchestrator.
    pub fn callback(&self, method: impl Into<String>) -> RemoteCallDescriptor {
        RemoteCallDescriptor::no_args(self.config.self_id.clone(), method, self.config.call_fee)
    }

    /// Submit with the configured attached budget.
    pub async fn submit(&self, plan: CallPlanNode) -> Result<PlanHandle> {
        self.submit_with_budget(plan, self.config.attached_budget)
            .await
    }

    /// Submit with an explicit budget.
    #[tracing::instrument(name = "orchestration.submit", skip_all, fields(orchestration_id = tracing::field::Empty, calls = plan.call_count(), %budget))]
    pub async fn submit_with_budget(&self, plan: CallPlanNode, budget: Gas) -> Result<PlanHandle> {
        let id = Uuid::new_v4();
        tracing::Span::current().record("orchestration_id", tracing::field::display(id));
        let mut lifecycle = Lifecycle::new(id);

        let (body, callback) = plan.split_root()?;
        if callback.target() != self.self_id() {
            return Err(OrchestrationError::malformed(format!(
                "callback '{}' addressed to {}, expected {}",
                callback.method(),
                callback.target(),
                self.self_id()
            )));
        }
        let aggregator = self
            .callbacks
            .get(callback.method())
            .cloned()
            .ok_or_else(|| {
                OrchestrationError::malformed(format!(
                    "no callback registered as '{}'",
                    callback.method()
                ))
            })?;

        let ledger = FeeLedger::new(budget);
        ledger.charge(callback)?;
        lifecycle.advance(OrchestrationState::Submitted);

        lifecycle.advance(OrchestrationState::Executing);
        let ids = self.execute(body, &ledger).await?;
        self.wait_all(&ids).await;

        let mut slots = Vec::with_capacity(ids.len());
        for (index, call) in ids.iter().enumerate() {
            let mut outcome = self.substrate.read_outcome(*call).await;
            if !outcome.is_terminal() {
                warn!(%call, index, "Call reported resolved but outcome is pending");
                outcome = CallOutcome::Failed(format!("{call} never resolved"));
            }
            slots.push(OutcomeSlot::new(index, Some(*call), outcome));
        }
        let table = OutcomeTable::from_slots(slots);
        let slot_count = table.len();

        lifecycle.advance(OrchestrationState::Aggregating);
        info!(callback = %callback, slots = slot_count, "Invoking callback");
        let mut diagnostics = DiagnosticLog::new();
        let output = aggregator.aggregate_encoded(&table, &mut diagnostics);
        drop(table);
        lifecycle.advance(OrchestrationState::Completed);

        Ok(PlanHandle {
            id,
            state: lifecycle.state(),
            output,
            diagnostics,
            slot_count,
            remaining_budget: ledger.remaining(),
        })
    }

    /// Issue the calls of `node`; returns its result-producing call ids in slot order.
    fn execute<'a>(
        &'a self,
        node: &'a CallPlanNode,
        ledger: &'a FeeLedger,
    ) -> BoxFuture<'a, Result<Vec<CallId>>> {
        async move {
            match node {
                CallPlanNode::Single(call) => {
                    ledger.charge(call)?;
                    Ok(vec![self.substrate.issue_call(call).await])
                }
                CallPlanNode::Sequence(..) if node.batch_target().is_some() => {
                    let calls = node.batch_calls();
                    ledger.charge_all(&calls)?;
                    let ids = self.substrate.issue_call_batch(&calls).await;
                    // A batch reports through its last call only.
                    Ok(ids.last().copied().into_iter().collect())
                }
                CallPlanNode::Sequence(prior, call) => {
                    let prior_ids = self.execute(prior, ledger).await?;
                    self.wait_all(&prior_ids).await;
                    for id in &prior_ids {
                        if !self.substrate.read_outcome(*id).await.is_resolved() {
                            debug!(%id, next = %call, "Predecessor failed, issuing dependent call anyway");
                        }
                    }
                    ledger.charge(call)?;
                    Ok(vec![self.substrate.issue_call(call).await])
                }
                CallPlanNode::Join(a, b) => {
                    let (mut left, right) =
                        futures::future::try_join(self.execute(a, ledger), self.execute(b, ledger))
                            .await?;
                    left.extend(right);
                    Ok(left)
                }
                CallPlanNode::Then(..) => Err(OrchestrationError::malformed(
                    "callback nested inside plan body",
                )),
            }
        }
        .boxed()
    }

    /// Suspend until every call in `ids` is terminal.
    async fn wait_all(&self, ids: &[CallId]) {
        let (tx, rx) = oneshot::channel();
        self.substrate.on_all_resolved(
            ids,
            Box::new(move || {
                let _ = tx.send(());
            }),
        );
        if rx.await.is_err() {
            warn!(calls = ids.len(), "Substrate dropped resolution continuation");
        }
    }
}
