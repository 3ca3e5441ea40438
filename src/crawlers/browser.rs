use crate::error::CrawlError;
use async_trait::async_trait;
use std::time::Duration;

/// Browser-automation session used to load pages
#[async_trait]
pub trait Browser: Send + Sync {
    /// Load `url` and return the page source.
    ///
    /// Must fail with [`CrawlError::FetchTimeout`] when the load exceeds `timeout`
    /// and with [`CrawlError::DriverFatal`] when the session itself is gone.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<String, CrawlError>;
}
