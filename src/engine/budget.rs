//! Fee accounting for one orchestration.
//!
//! Each issued call burns its descriptor's fee from the budget attached to
//! the orchestration. A charge that would overdraw fails before the call is
//! issued; calls already issued are not refunded.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::descriptor::{Gas, RemoteCallDescriptor};
use crate::error::{OrchestrationError, Result};

pub(crate) struct FeeLedger {
    remaining: AtomicU64,
}

impl FeeLedger {
    pub(crate) fn new(budget: Gas) -> Self {
        Self {
            remaining: AtomicU64::new(budget.as_u64()),
        }
    }

    pub(crate) fn remaining(&self) -> Gas {
        Gas(self.remaining.load(Ordering::SeqCst))
    }

    /// Charge one call.
    pub(crate) fn charge(&self, call: &RemoteCallDescriptor) -> Result<()> {
        self.charge_all(&[call])
    }

    /// Charge a batch as one unit: either every fee is taken or none is.
    pub(crate) fn charge_all(&self, calls: &[&RemoteCallDescriptor]) -> Result<()> {
        let total = calls.iter().fold(Gas::ZERO, |acc, c| acc + c.fee());
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(total.as_u64())
            })
            .map(|_| ())
            .map_err(|remaining| overdraft(calls, Gas(remaining)))
    }
}

/// Name the first call in `calls` that does not fit in `remaining`.
fn overdraft(calls: &[&RemoteCallDescriptor], remaining: Gas) -> OrchestrationError {
    let mut left = remaining;
    for call in calls {
        match left.checked_sub(call.fee()) {
            Some(rest) => left = rest,
            None => {
                return OrchestrationError::BudgetExceeded {
                    method: call.method().to_string(),
                    requested: call.fee(),
                    remaining: left,
                }
            }
        }
    }
    // Unreachable when the charge failed; report the whole batch anyway.
    OrchestrationError::BudgetExceeded {
        method: calls.last().map(|c| c.method().to_string()).unwrap_or_default(),
        requested: Gas::ZERO,
        remaining,
    }
}
