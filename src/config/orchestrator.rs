//! Orchestrator and remote service configuration types.

use serde::Deserialize;

use crate::descriptor::{Gas, ServiceId};

/// Default identity of the local orchestrator.
pub const DEFAULT_SELF_ID: &str = "orchestrator.local";

/// Default fee per remote call (10 TGas).
pub const DEFAULT_CALL_FEE: Gas = Gas::from_tgas(10);

/// Default budget attached to one orchestration (300 TGas).
pub const DEFAULT_ATTACHED_BUDGET: Gas = Gas::from_tgas(300);

/// Default greeting service address.
pub const DEFAULT_HELLO_SERVICE: &str = "hello.near-examples.testnet";
/// Default counter service address.
pub const DEFAULT_COUNTER_SERVICE: &str = "counter.near-examples.testnet";
/// Default guestbook service address.
pub const DEFAULT_GUESTBOOK_SERVICE: &str = "guestbook.near-examples.testnet";

/// Settings of the local orchestrator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Identity callbacks are addressed to.
    pub self_id: ServiceId,
    /// Budget attached to each orchestration, callback included.
    pub attached_budget: Gas,
    /// Fee attached to each call the built-in flows issue.
    pub call_fee: Gas,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            self_id: ServiceId::new(DEFAULT_SELF_ID),
            attached_budget: DEFAULT_ATTACHED_BUDGET,
            call_fee: DEFAULT_CALL_FEE,
        }
    }
}

/// Addresses of the remote services the built-in flows call.
///
/// Captured once when the flows are constructed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceAccounts {
    pub hello: ServiceId,
    pub counter: ServiceId,
    pub guestbook: ServiceId,
}

impl Default for ServiceAccounts {
    fn default() -> Self {
        Self {
            hello: ServiceId::new(DEFAULT_HELLO_SERVICE),
            counter: ServiceId::new(DEFAULT_COUNTER_SERVICE),
            guestbook: ServiceId::new(DEFAULT_GUESTBOOK_SERVICE),
        }
    }
}
