//! Guestbook service: an append-only list of posted messages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::codec;
use crate::substrate::local::RemoteService;

use super::unknown_method;

/// One guestbook entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedMessage {
    pub premium: bool,
    pub sender: String,
    pub text: String,
}

#[derive(Deserialize)]
struct GetMessages {
    from_index: String,
    limit: usize,
}

#[derive(Deserialize)]
struct AddMessage {
    text: String,
    #[serde(default)]
    sender: Option<String>,
    #[serde(default)]
    premium: bool,
}

/// Methods: `get_messages {from_index, limit}`, `add_message {text, sender?, premium?}`,
/// `total_messages`.
#[derive(Default)]
pub struct GuestbookService {
    messages: RwLock<Vec<PostedMessage>>,
}

impl GuestbookService {
    pub fn new(messages: Vec<PostedMessage>) -> Self {
        Self {
            messages: RwLock::new(messages),
        }
    }
}

#[async_trait]
impl RemoteService for GuestbookService {
    async fn invoke(&self, method: &str, payload: &[u8]) -> Result<Vec<u8>, String> {
        match method {
            "get_messages" => {
                let args: GetMessages = codec::decode(payload).map_err(|e| e.to_string())?;
                let from: usize = args
                    .from_index
                    .parse()
                    .map_err(|_| format!("invalid from_index '{}'", args.from_index))?;
                let messages = self.messages.read().await;
                let page: Vec<&PostedMessage> =
                    messages.iter().skip(from).take(args.limit).collect();
                codec::encode(&page).map_err(|e| e.to_string())
            }
            "add_message" => {
                let args: AddMessage = codec::decode(payload).map_err(|e| e.to_string())?;
                self.messages.write().await.push(PostedMessage {
                    premium: args.premium,
                    sender: args.sender.unwrap_or_else(|| "anonymous".to_string()),
                    text: args.text,
                });
                Ok(Vec::new())
            }
            "total_messages" => {
                let total = self.messages.read().await.len();
                codec::encode(&total).map_err(|e| e.to_string())
            }
            other => Err(unknown_method("guestbook", other)),
        }
    }
}
