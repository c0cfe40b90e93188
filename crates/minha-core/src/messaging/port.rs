use std::time::Duration;

use async_trait::async_trait;

use crate::{
    domain::ChatId,
    messaging::types::InboundUpdate,
    Result,
};

/// Outbound message sink. Delivery is best effort; callers log failures.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;
}

/// Pull-based inbound update source (Telegram `getUpdates` style).
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Fetch updates with id >= `offset` (all pending when `None`), waiting up
    /// to `timeout` for at least one to arrive.
    async fn poll(&self, offset: Option<i64>, timeout: Duration) -> Result<Vec<InboundUpdate>>;
}
