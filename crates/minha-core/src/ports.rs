use async_trait::async_trait;

use crate::Result;

/// Fetches the monitored page. Non-success statuses are errors; the body is
/// returned as opaque text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}
