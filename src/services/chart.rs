//! Single-symbol chart loading with overlays.

use chrono::{Duration as ChronoDuration, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::{ChartError, SourceError};
use crate::services::indicators::{self, compute_indicators, readings_from};
use crate::sources::PriceHistory;
use crate::types::{IndicatorConfig, IndicatorReadings, IndicatorResult, Interval, PriceBar, PriceSeries};

/// Bars plus computed indicators for one symbol.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartView {
    pub symbol: String,
    pub interval: Interval,
    pub bars: Vec<PriceBar>,
    pub indicators: Vec<IndicatorResult>,
    pub readings: IndicatorReadings,
}

/// Loads price history and derives indicator overlays.
pub struct ChartService {
    history: Arc<dyn PriceHistory>,
    lookback_days: i64,
    fetch_timeout: Duration,
}

impl ChartService {
    pub fn new(history: Arc<dyn PriceHistory>, lookback_days: i64, fetch_timeout: Duration) -> Self {
        Self {
            history,
            lookback_days,
            fetch_timeout,
        }
    }

    /// Fetch `days` of history ending today.
    pub async fn history(&self, symbol: &str, interval: Interval, days: i64) -> Result<PriceSeries, SourceError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(SourceError::Request("symbol is required".to_string()));
        }

        let end = Utc::now().date_naive();
        let start = end - ChronoDuration::days(days.max(1));

        let fetch = self.history.fetch_history(&symbol, start, end, interval);
        let series = tokio::time::timeout(self.fetch_timeout, fetch)
            .await
            .map_err(|_| SourceError::Timeout(self.fetch_timeout.as_secs()))??;

        debug!("Loaded {} {} bars for {}", series.len(), interval.name(), symbol);
        Ok(series)
    }

    /// Load a chart with the requested overlays.
    ///
    /// Indicator configs are checked before any network call so a bad period
    /// never costs a fetch.
    pub async fn load(
        &self,
        symbol: &str,
        interval: Interval,
        configs: &[IndicatorConfig],
    ) -> Result<ChartView, ChartError> {
        for config in configs.iter().filter(|c| c.enabled) {
            indicators::validate(config)?;
        }

        let series = self.history(symbol, interval, self.lookback_days).await?;
        let indicators = compute_indicators(&series, configs)?;
        let readings = readings_from(&indicators);

        Ok(ChartView {
            symbol: series.symbol().to_string(),
            interval,
            bars: series.bars().to_vec(),
            indicators,
            readings,
        })
    }
}
