//! Counter service: a signed integer.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;

use crate::codec;
use crate::substrate::local::RemoteService;

use super::unknown_method;

/// Methods: `get_num`, `increment`, `decrement`.
pub struct CounterService {
    value: AtomicI64,
}

impl CounterService {
    pub fn new(value: i64) -> Self {
        Self {
            value: AtomicI64::new(value),
        }
    }
}

impl Default for CounterService {
    fn default() -> Self {
        Self::new(0)
    }
}

#[async_trait]
impl RemoteService for CounterService {
    async fn invoke(&self, method: &str, _payload: &[u8]) -> Result<Vec<u8>, String> {
        let value = match method {
            "get_num" => self.value.load(Ordering::SeqCst),
            "increment" => self.value.fetch_add(1, Ordering::SeqCst) + 1,
            "decrement" => self.value.fetch_sub(1, Ordering::SeqCst) - 1,
            other => return Err(unknown_method("counter", other)),
        };
        codec::encode(&value).map_err(|e| e.to_string())
    }
}
