//! Simulated remote services for the local substrate.
//!
//! Stand-ins for the greeting, counter and guestbook services the flows
//! talk to, plus `StaticService` for scripting fixed responses.

mod counter;
mod greeting;
mod guestbook;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::codec;
use crate::substrate::local::RemoteService;

pub use counter::CounterService;
pub use greeting::GreetingService;
pub use guestbook::{GuestbookService, PostedMessage};

/// Reason returned for methods a service does not expose.
pub(crate) fn unknown_method(service: &str, method: &str) -> String {
    format!("{service} has no method '{method}'")
}

/// Service that answers every call with the same response.
#[derive(Debug, Clone)]
pub struct StaticService {
    response: Result<Vec<u8>, String>,
    delay: Option<Duration>,
}

impl StaticService {
    /// Resolve with raw bytes.
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            response: Ok(bytes.into()),
            delay: None,
        }
    }

    /// Resolve with a JSON-encoded value.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        Self::raw(codec::encode(value).unwrap_or_default())
    }

    /// Fail every call with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            response: Err(reason.into()),
            delay: None,
        }
    }

    /// Wait before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl RemoteService for StaticService {
    async fn invoke(&self, _method: &str, _payload: &[u8]) -> Result<Vec<u8>, String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone()
    }
}
