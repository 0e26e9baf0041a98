//! One call on each of three services, joined; results of different types.

use serde::de::DeserializeOwned;

use crate::aggregate::{DiagnosticLog, OutcomeTable, ResultAggregator};
use crate::codec;
use crate::error::{OrchestrationError, Result};
use crate::plan::{CallPlan, CallPlanNode};
use crate::services::PostedMessage;

use super::{Flows, MULTIPLE_CONTRACTS_CALLBACK};

/// Guestbook page requested by the flow.
const MESSAGES_FROM: &str = "0";
const MESSAGES_LIMIT: usize = 2;

pub(super) fn plan(flows: &Flows) -> Result<CallPlanNode> {
    let fee = flows.call_fee;
    let page = codec::encode(&serde_json::json!({
        "from_index": MESSAGES_FROM,
        "limit": MESSAGES_LIMIT,
    }))
    .map_err(|e| OrchestrationError::malformed(e.to_string()))?;

    CallPlan::new(flows.accounts.hello.clone())
        .function_call("get_greeting", Vec::new(), fee)
        .and(CallPlan::new(flows.accounts.counter.clone()).function_call("get_num", Vec::new(), fee))
        .and(CallPlan::new(flows.accounts.guestbook.clone()).function_call("get_messages", page, fee))
        .then(flows.callback(MULTIPLE_CONTRACTS_CALLBACK))
}

/// Greeting, counter value and guestbook page; each defaults when its call failed.
pub struct MultipleContractsCallback;

impl ResultAggregator for MultipleContractsCallback {
    type Output = (String, i64, Vec<PostedMessage>);

    fn aggregate(&self, outcomes: &OutcomeTable, log: &mut DiagnosticLog) -> Self::Output {
        let greeting = slot_or_default(
            outcomes,
            0,
            log,
            |g: &String| format!("HelloNear says {g}"),
            "The call to HelloNear failed",
        );
        let counter = slot_or_default(
            outcomes,
            1,
            log,
            |n: &i64| format!("Counter is {n}"),
            "The call to Counter failed",
        );
        let messages = slot_or_default(
            outcomes,
            2,
            log,
            |m: &Vec<PostedMessage>| {
                let rendered = serde_json::to_string(m).unwrap_or_default();
                format!("The messages are {rendered}")
            },
            "The call to GuestBook failed",
        );
        (greeting, counter, messages)
    }
}

fn slot_or_default<T, F>(
    outcomes: &OutcomeTable,
    index: usize,
    log: &mut DiagnosticLog,
    describe: F,
    failed: &str,
) -> T
where
    T: DeserializeOwned + Default,
    F: FnOnce(&T) -> String,
{
    match outcomes.decode::<T>(index) {
        Ok(value) => {
            log.info(Some(index), describe(&value));
            value
        }
        Err(e) => {
            log.failure(Some(index), format!("{failed}: {e}"));
            T::default()
        }
    }
}
