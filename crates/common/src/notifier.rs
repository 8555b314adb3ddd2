use async_trait::async_trait;

use crate::Result;

/// Outbound alert channel. A failed send is reported as `Error::Delivery`
/// and is never retried by the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}
