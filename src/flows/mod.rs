//! Built-in orchestration flows.
//!
//! Each flow builds a plan against the configured service accounts and
//! registers the aggregator that collects its results:
//! - `batch_actions`: one batch of four calls on the greeting service
//! - `multiple_contracts`: one call on each of three different services, joined
//! - `similar_contracts`: three set/get batches with the same result type, joined

mod batch;
mod multi_target;
mod similar;

use crate::codec;
use crate::config::{OrchestratorConfig, ServiceAccounts};
use crate::descriptor::{Gas, RemoteCallDescriptor, ServiceId};
use crate::engine::{Orchestrator, OrchestratorBuilder, PlanHandle};
use crate::error::{OrchestrationError, Result};
use crate::plan::CallPlanNode;

pub use batch::BatchActionsCallback;
pub use multi_target::MultipleContractsCallback;
pub use similar::SimilarContractsCallback;

/// Callback method of `batch_actions`.
pub const BATCH_ACTIONS_CALLBACK: &str = "batch_actions_callback";
/// Callback method of `multiple_contracts`.
pub const MULTIPLE_CONTRACTS_CALLBACK: &str = "multiple_contracts_callback";
/// Callback method of `similar_contracts`.
pub const SIMILAR_CONTRACTS_CALLBACK: &str = "similar_contracts_callback";

/// Plans and callbacks of the built-in flows.
///
/// Service accounts are captured at construction and never change.
#[derive(Debug, Clone)]
pub struct Flows {
    accounts: ServiceAccounts,
    self_id: ServiceId,
    call_fee: Gas,
}

impl Flows {
    pub fn new(accounts: ServiceAccounts, orchestrator: &OrchestratorConfig) -> Self {
        Self {
            accounts,
            self_id: orchestrator.self_id.clone(),
            call_fee: orchestrator.call_fee,
        }
    }

    /// Register every flow callback on `builder`.
    pub fn register(builder: OrchestratorBuilder) -> OrchestratorBuilder {
        builder
            .callback(BATCH_ACTIONS_CALLBACK, BatchActionsCallback)
            .callback(MULTIPLE_CONTRACTS_CALLBACK, MultipleContractsCallback)
            .callback(SIMILAR_CONTRACTS_CALLBACK, SimilarContractsCallback)
    }

    pub fn accounts(&self) -> &ServiceAccounts {
        &self.accounts
    }

    /// Set "hi", get, set "bye", get on the greeting service, as one batch.
    pub fn batch_actions(&self) -> Result<CallPlanNode> {
        batch::plan(self)
    }

    /// Read the greeting, the counter and two guestbook messages in parallel.
    pub fn multiple_contracts(&self) -> Result<CallPlanNode> {
        multi_target::plan(self)
    }

    /// Three concurrent set/get batches on the greeting service.
    pub fn similar_contracts(&self) -> Result<CallPlanNode> {
        similar::plan(self)
    }

    pub async fn run_batch_actions(&self, orchestrator: &Orchestrator) -> Result<PlanHandle> {
        orchestrator.submit(self.batch_actions()?).await
    }

    pub async fn run_multiple_contracts(&self, orchestrator: &Orchestrator) -> Result<PlanHandle> {
        orchestrator.submit(self.multiple_contracts()?).await
    }

    pub async fn run_similar_contracts(&self, orchestrator: &Orchestrator) -> Result<PlanHandle> {
        orchestrator.submit(self.similar_contracts()?).await
    }

    fn callback(&self, method: &str) -> RemoteCallDescriptor {
        RemoteCallDescriptor::no_args(self.self_id.clone(), method, self.call_fee)
    }

    fn set_greeting_args(greeting: &str) -> Result<Vec<u8>> {
        codec::encode(&serde_json::json!({ "greeting": greeting }))
            .map_err(|e| OrchestrationError::malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests;
