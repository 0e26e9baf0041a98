//! Local (in-process) substrate.
//!
//! Dispatches calls to `RemoteService` handlers registered per service id.
//! Each call runs on its own tokio task; a batch runs on one task, calls in
//! order. A service executes one call or batch at a time, so a batch is never
//! interleaved with other work on its target. Outcomes are published through `watch` channels so resolution
//! waiters never miss a transition.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, warn};

use crate::descriptor::{RemoteCallDescriptor, ServiceId};

use super::{CallId, CallOutcome, Continuation, Substrate};

/// A service reachable through the local substrate.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Handle one call. `Err` carries the failure reason.
    async fn invoke(&self, method: &str, payload: &[u8]) -> Result<Vec<u8>, String>;
}

/// Record of a call as it was issued, kept for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCall {
    pub id: CallId,
    pub target: ServiceId,
    pub method: String,
    /// Position of the batch this call belonged to, if any.
    pub batch: Option<u64>,
}

type ServiceMap = HashMap<ServiceId, Arc<dyn RemoteService>>;
type TargetLock = Arc<Mutex<()>>;

/// In-process substrate backed by tokio tasks.
pub struct LocalSubstrate {
    services: Arc<RwLock<ServiceMap>>,
    calls: Arc<RwLock<HashMap<CallId, watch::Receiver<CallOutcome>>>>,
    issued: RwLock<Vec<IssuedCall>>,
    targets: Mutex<HashMap<ServiceId, TargetLock>>,
    next_id: AtomicU64,
    next_batch: AtomicU64,
}

impl LocalSubstrate {
    pub fn new() -> Self {
        Self {
            services: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(HashMap::new())),
            issued: RwLock::new(Vec::new()),
            targets: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            next_batch: AtomicU64::new(0),
        }
    }

    /// Register a service under `id`, replacing any previous one.
    pub async fn register(&self, id: impl Into<ServiceId>, service: Arc<dyn RemoteService>) {
        self.services.write().await.insert(id.into(), service);
    }

    /// Every call issued so far, in issue order.
    pub async fn issued(&self) -> Vec<IssuedCall> {
        self.issued.read().await.clone()
    }

    async fn target_lock(&self, target: &ServiceId) -> TargetLock {
        Arc::clone(self.targets.lock().await.entry(target.clone()).or_default())
    }

    /// Allocate an id and an outcome channel for a call about to be issued.
    async fn open(
        &self,
        call: &RemoteCallDescriptor,
        batch: Option<u64>,
    ) -> (CallId, watch::Sender<CallOutcome>) {
        let id = CallId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = watch::channel(CallOutcome::Pending);
        self.calls.write().await.insert(id, rx);
        self.issued.write().await.push(IssuedCall {
            id,
            target: call.target().clone(),
            method: call.method().to_string(),
            batch,
        });
        debug!(%id, call = %call, "Issued call");
        (id, tx)
    }
}

impl Default for LocalSubstrate {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one call against its service and publish the outcome.
async fn dispatch(
    services: &RwLock<ServiceMap>,
    id: CallId,
    call: &RemoteCallDescriptor,
    tx: watch::Sender<CallOutcome>,
) {
    let service = services.read().await.get(call.target()).cloned();
    let outcome = match service {
        Some(service) => match service.invoke(call.method(), call.payload()).await {
            Ok(bytes) => CallOutcome::Resolved(bytes),
            Err(reason) => {
                debug!(%id, call = %call, error = %reason, "Call failed");
                CallOutcome::Failed(reason)
            }
        },
        None => {
            warn!(%id, target = %call.target(), "No service registered for target");
            CallOutcome::Failed(format!("service '{}' not found", call.target()))
        }
    };
    tx.send_replace(outcome);
}

#[async_trait]
impl Substrate for LocalSubstrate {
    async fn issue_call(&self, call: &RemoteCallDescriptor) -> CallId {
        let (id, tx) = self.open(call, None).await;
        let lock = self.target_lock(call.target()).await;
        let services = Arc::clone(&self.services);
        let call = call.clone();
        tokio::spawn(async move {
            let _running = lock.lock_owned().await;
            dispatch(&services, id, &call, tx).await;
        });
        id
    }

    async fn issue_call_batch(&self, calls: &[&RemoteCallDescriptor]) -> Vec<CallId> {
        let batch = self.next_batch.fetch_add(1, Ordering::SeqCst);
        let mut ids = Vec::with_capacity(calls.len());
        let mut work = Vec::with_capacity(calls.len());
        for call in calls {
            let (id, tx) = self.open(call, Some(batch)).await;
            ids.push(id);
            work.push((id, (*call).clone(), tx));
        }

        // Batches address one target.
        let lock = match calls.first() {
            Some(call) => Some(self.target_lock(call.target()).await),
            None => None,
        };
        let services = Arc::clone(&self.services);
        tokio::spawn(async move {
            let _running = match lock {
                Some(lock) => Some(lock.lock_owned().await),
                None => None,
            };
            for (id, call, tx) in work {
                dispatch(&services, id, &call, tx).await;
            }
        });
        ids
    }

    fn on_all_resolved(&self, ids: &[CallId], continuation: Continuation) {
        let calls = Arc::clone(&self.calls);
        let ids = ids.to_vec();
        tokio::spawn(async move {
            for id in ids {
                let rx = calls.read().await.get(&id).cloned();
                let Some(mut rx) = rx else {
                    warn!(%id, "Waiting on unknown call");
                    continue;
                };
                // Err means the call's task died without publishing; the
                // outcome stays Pending and the reader decides what that means.
                let _ = rx.wait_for(CallOutcome::is_terminal).await;
            }
            continuation();
        });
    }

    async fn read_outcome(&self, id: CallId) -> CallOutcome {
        match self.calls.read().await.get(&id) {
            Some(rx) => rx.borrow().clone(),
            None => CallOutcome::Failed(format!("unknown call {id}")),
        }
    }
}
