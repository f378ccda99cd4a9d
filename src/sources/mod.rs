//! External collaborators: price history, symbol search and the language
//! model used for pattern analysis and chat.
//!
//! The services only see the traits below, so tests can substitute
//! in-process fakes for the HTTP clients.

pub mod anthropic;
pub mod yahoo;

pub use anthropic::AnthropicClient;
pub use yahoo::YahooFinanceClient;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::SourceError;
use crate::services::prompts::{AnalysisRequest, ChatPrompt};
use crate::types::{Interval, PriceSeries, SymbolMatch};

/// Historical bars for one symbol.
#[async_trait]
pub trait PriceHistory: Send + Sync {
    /// Fetch bars between `start` and `end` (inclusive). Invalid bars are
    /// dropped; a symbol with no usable bars is `SourceError::Unavailable`.
    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<PriceSeries, SourceError>;
}

/// Free-text symbol lookup. An empty result is valid.
#[async_trait]
pub trait SymbolSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>, SourceError>;
}

/// Pattern analysis model. Returns raw text expected to hold a JSON array.
#[async_trait]
pub trait PatternOracle: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String, SourceError>;
}

/// Conversational analysis model.
#[async_trait]
pub trait ChatAssistant: Send + Sync {
    async fn reply(&self, prompt: &ChatPrompt) -> Result<String, SourceError>;
}
