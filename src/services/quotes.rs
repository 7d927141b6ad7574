use async_trait::async_trait;

use crate::error::QuoteError;

/// Source of current instrument prices.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<f64, QuoteError>;
}
