//! Three calls sharing a result type; failures are dropped from the output.

use crate::aggregate::{DiagnosticLog, OutcomeTable, ResultAggregator};
use crate::error::{LeafError, Result};
use crate::plan::{CallPlan, CallPlanNode};

use super::{Flows, SIMILAR_CONTRACTS_CALLBACK};

const GREETINGS: [&str; 3] = ["hi", "howdy", "bye"];

pub(super) fn plan(flows: &Flows) -> Result<CallPlanNode> {
    let [first, rest @ ..] = GREETINGS;
    let mut plan = set_then_get(flows, first)?;
    for greeting in rest {
        plan = plan.and(set_then_get(flows, greeting)?);
    }
    plan.then(flows.callback(SIMILAR_CONTRACTS_CALLBACK))
}

fn set_then_get(flows: &Flows, greeting: &str) -> Result<CallPlan> {
    Ok(CallPlan::new(flows.accounts.hello.clone())
        .function_call("set_greeting", Flows::set_greeting_args(greeting)?, flows.call_fee)
        .function_call("get_greeting", Vec::new(), flows.call_fee))
}

/// Successful greetings in slot order.
pub struct SimilarContractsCallback;

impl ResultAggregator for SimilarContractsCallback {
    type Output = Vec<String>;

    fn aggregate(&self, outcomes: &OutcomeTable, log: &mut DiagnosticLog) -> Vec<String> {
        let mut messages = Vec::with_capacity(outcomes.len());
        for slot in outcomes.slots() {
            let index = slot.index();
            match slot.decode::<String>() {
                Ok(message) => {
                    log.info(Some(index), format!("Call {index} returned: {message}"));
                    messages.push(message);
                }
                Err(LeafError::Decode(_)) => {
                    log.failure(Some(index), format!("Error deserializing call {index} result."));
                }
                Err(_) => {
                    log.failure(Some(index), format!("Promise number {index} failed."));
                }
            }
        }
        messages
    }
}
