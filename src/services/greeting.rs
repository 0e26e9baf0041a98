//! Greeting service: stores one greeting string.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::codec;
use crate::substrate::local::RemoteService;

use super::unknown_method;

#[derive(Deserialize)]
struct SetGreeting {
    greeting: String,
}

/// Holds a greeting. Methods: `get_greeting`, `set_greeting {greeting}`.
pub struct GreetingService {
    greeting: RwLock<String>,
}

impl GreetingService {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            greeting: RwLock::new(greeting.into()),
        }
    }

    pub async fn greeting(&self) -> String {
        self.greeting.read().await.clone()
    }
}

impl Default for GreetingService {
    fn default() -> Self {
        Self::new("Hello")
    }
}

#[async_trait]
impl RemoteService for GreetingService {
    async fn invoke(&self, method: &str, payload: &[u8]) -> Result<Vec<u8>, String> {
        match method {
            "get_greeting" => {
                let greeting = self.greeting.read().await;
                codec::encode(&*greeting).map_err(|e| e.to_string())
            }
            "set_greeting" => {
                let args: SetGreeting = codec::decode(payload).map_err(|e| e.to_string())?;
                *self.greeting.write().await = args.greeting;
                Ok(Vec::new())
            }
            other => Err(unknown_method("greeting", other)),
        }
    }
}
