//! Crosscall - cross-service call orchestration
//!
//! Composes asynchronous remote calls into sequential and parallel plans,
//! executes them against a remote invocation substrate, and hands every
//! outcome, successful or failed, to exactly one aggregation callback.
//!
//! ```rust,ignore
//! let orchestrator = Orchestrator::builder(config, substrate)
//!     .callback("collect", Passthrough::<String>::new())
//!     .build();
//! let plan = then(single(call), orchestrator.callback("collect"))?;
//! let greeting: String = orchestrator.submit(plan).await?.result()?;
//! ```

pub mod aggregate;
pub mod codec;
pub mod config;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod flows;
pub mod plan;
pub mod services;
pub mod substrate;
pub mod utils;

pub use aggregate::{DiagnosticLog, OutcomeSlot, OutcomeTable, ResultAggregator};
pub use descriptor::{Gas, RemoteCallDescriptor, ServiceId};
pub use engine::{OrchestrationState, Orchestrator, PlanHandle};
pub use error::{OrchestrationError, Result};
pub use plan::{join, sequence, single, then, CallPlan, CallPlanNode};
pub use substrate::{CallId, CallOutcome, Substrate};
