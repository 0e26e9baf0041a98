//! Several actions on one service, issued as a single batch.

use crate::aggregate::{DiagnosticLog, OutcomeTable, ResultAggregator};
use crate::error::Result;
use crate::plan::{CallPlan, CallPlanNode};

use super::{Flows, BATCH_ACTIONS_CALLBACK};

pub(super) fn plan(flows: &Flows) -> Result<CallPlanNode> {
    let fee = flows.call_fee;
    CallPlan::new(flows.accounts.hello.clone())
        .function_call("set_greeting", Flows::set_greeting_args("hi")?, fee)
        .function_call("get_greeting", Vec::new(), fee)
        .function_call("set_greeting", Flows::set_greeting_args("bye")?, fee)
        .function_call("get_greeting", Vec::new(), fee)
        .then(flows.callback(BATCH_ACTIONS_CALLBACK))
}

/// Returns the batch's last result, or `""` when the batch failed.
pub struct BatchActionsCallback;

impl ResultAggregator for BatchActionsCallback {
    type Output = String;

    fn aggregate(&self, outcomes: &OutcomeTable, log: &mut DiagnosticLog) -> String {
        // Only the last action of a batch reports a result.
        match outcomes.decode::<String>(0) {
            Ok(message) => {
                log.info(Some(0), format!("The last result is {message}"));
                message
            }
            Err(e) => {
                log.failure(
                    Some(0),
                    format!("The batch call failed and all calls got reverted: {e}"),
                );
                String::new()
            }
        }
    }
}
