//! Conversational analysis of a single symbol.

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{ChatError, IndicatorError, SourceError};
use crate::services::indicators::{self, latest_readings};
use crate::services::prompts::chat_prompt;
use crate::sources::{ChatAssistant, PriceHistory};
use crate::types::{ChatReply, ChatRequest, ChatRole, IndicatorConfig, Interval, PriceSeries};

/// Days of history fetched when the client sends no bars.
const CONTEXT_LOOKBACK_DAYS: i64 = 60;

/// Answers chat turns about a symbol's chart.
pub struct ChatService {
    history: Arc<dyn PriceHistory>,
    assistant: Arc<dyn ChatAssistant>,
    indicators: Vec<IndicatorConfig>,
    timeout: Duration,
}

impl ChatService {
    pub fn new(
        history: Arc<dyn PriceHistory>,
        assistant: Arc<dyn ChatAssistant>,
        indicators: Vec<IndicatorConfig>,
        timeout: Duration,
    ) -> Result<Self, IndicatorError> {
        for config in &indicators {
            indicators::validate(config)?;
        }

        Ok(Self {
            history,
            assistant,
            indicators,
            timeout,
        })
    }

    /// Produce the assistant's next message.
    pub async fn reply(&self, request: ChatRequest) -> Result<ChatReply, ChatError> {
        let symbol = request.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ChatError::InvalidRequest("symbol is required".to_string()));
        }

        match request.messages.last() {
            None => return Err(ChatError::InvalidRequest("messages must not be empty".to_string())),
            Some(last) if last.role != ChatRole::User => {
                return Err(ChatError::InvalidRequest("last message must come from the user".to_string()))
            }
            Some(last) if last.content.trim().is_empty() => {
                return Err(ChatError::InvalidRequest("last message is empty".to_string()))
            }
            Some(_) => {}
        }

        let series = match request.bars {
            Some(bars) => PriceSeries::from_bars(&symbol, bars),
            None => self.fetch_context(&symbol).await?,
        };

        let readings = latest_readings(&series, &self.indicators).unwrap_or_default();
        let prompt = chat_prompt(&symbol, series.bars(), &readings, &request.messages);

        debug!("Chat turn for {} with {} bars", symbol, series.len());

        let content = tokio::time::timeout(self.timeout, self.assistant.reply(&prompt))
            .await
            .map_err(|_| SourceError::Timeout(self.timeout.as_secs()))??;

        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::EmptyReply);
        }

        info!("Chat reply for {} ({} chars)", symbol, content.len());

        Ok(ChatReply {
            symbol,
            content: content.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        })
    }

    async fn fetch_context(&self, symbol: &str) -> Result<PriceSeries, SourceError> {
        let end = Utc::now().date_naive();
        let start = end - ChronoDuration::days(CONTEXT_LOOKBACK_DAYS);
        let fetch = self.history.fetch_history(symbol, start, end, Interval::Daily);

        tokio::time::timeout(self.timeout, fetch)
            .await
            .map_err(|_| SourceError::Timeout(self.timeout.as_secs()))?
    }
}
