use async_trait::async_trait;

use serde_json::Value;

use crate::Result;

/// Port for the homework-review API.
///
/// The reqwest implementation lives in `hwb-practicum`. The body is returned
/// as decoded JSON, not a typed struct: shape checks happen in
/// [`crate::response`] so they map onto the error taxonomy instead of opaque
/// deserialization failures.
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    /// Fetch homework status changes since the given Unix timestamp.
    async fn fetch(&self, since: i64) -> Result<Value>;
}

/// Port for the outbound notification channel.
///
/// Telegram is the first implementation (`hwb-telegram`); the destination
/// chat is fixed per instance.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<()>;
}
