//! Yahoo Finance API client for historical stock data and symbol search.
//!
//! Uses the unofficial chart and search endpoints (no API key).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{PriceHistory, SymbolSearch};
use crate::error::SourceError;
use crate::types::{Interval, PriceBar, PriceSeries, SymbolMatch};

const YAHOO_URL: &str = "https://query1.finance.yahoo.com";
const SEARCH_RESULT_LIMIT: usize = 10;

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

/// Yahoo Finance search response.
#[derive(Debug, Deserialize)]
struct YahooSearchResponse {
    #[serde(default)]
    quotes: Vec<YahooSearchQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooSearchQuote {
    symbol: Option<String>,
    #[serde(rename = "shortname")]
    short_name: Option<String>,
    #[serde(rename = "longname")]
    long_name: Option<String>,
    quote_type: Option<String>,
}

/// Normalize symbol for Yahoo Finance API.
/// Yahoo uses hyphens instead of dots for share classes (e.g., BRK-B not BRK.B)
fn normalize_yahoo_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase().replace('.', "-")
}

/// Unix seconds at midnight UTC.
fn day_start_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Convert a chart payload into bars. Points missing any OHLC value are skipped.
fn bars_from_chart(data: YahooChartResponse) -> Result<Vec<PriceBar>, String> {
    if let Some(error) = data.chart.error {
        return Err(format!("Yahoo API error: {} - {}", error.code, error.description));
    }

    let result = data
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| "No results in response".to_string())?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| "No quote data in response".to_string())?;

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let field = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let bars = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            Some(PriceBar {
                date: DateTime::from_timestamp(ts, 0)?.date_naive(),
                open: field(&opens, i)?,
                high: field(&highs, i)?,
                low: field(&lows, i)?,
                close: field(&closes, i)?,
                volume: volumes.get(i).copied().flatten().unwrap_or(0),
            })
        })
        .collect();

    Ok(bars)
}

/// Symbols that look like tradable equities (no indices, futures or FX pairs).
fn is_equity_quote(quote: &YahooSearchQuote) -> bool {
    let type_ok = quote
        .quote_type
        .as_deref()
        .map_or(true, |t| t.eq_ignore_ascii_case("EQUITY"));
    let symbol_ok = quote
        .symbol
        .as_deref()
        .is_some_and(|s| !s.is_empty() && !s.contains(['^', '=']));
    type_ok && symbol_ok
}

/// Yahoo Finance API client.
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client.
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(YAHOO_URL, timeout)
    }

    /// Create a client against a different host (used by tests).
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PriceHistory for YahooFinanceClient {
    async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
    ) -> Result<PriceSeries, SourceError> {
        let yahoo_symbol = normalize_yahoo_symbol(symbol);
        let unavailable = |reason: String| SourceError::Unavailable {
            symbol: yahoo_symbol.clone(),
            reason,
        };

        let url = format!("{}/v8/finance/chart/{}", self.base_url, yahoo_symbol);
        // period2 is exclusive, so step past the end date
        let period1 = day_start_timestamp(start);
        let period2 = day_start_timestamp(end) + 86_400;

        debug!("Fetching Yahoo Finance data: {} {}..{} {}", yahoo_symbol, start, end, interval.name());

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", interval.yahoo_code().to_string()),
                ("includePrePost", "false".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(unavailable(format!("API error: {}", response.status())));
        }

        let data: YahooChartResponse = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        let bars = bars_from_chart(data).map_err(&unavailable)?;
        let series = PriceSeries::from_bars(symbol, bars);

        if series.is_empty() {
            return Err(unavailable("no usable bars".to_string()));
        }

        debug!("Fetched {} bars for {}", series.len(), yahoo_symbol);
        Ok(series)
    }
}

#[async_trait]
impl SymbolSearch for YahooFinanceClient {
    async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>, SourceError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/finance/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("quotesCount", "10"),
                ("newsCount", "0"),
                ("enableFuzzyQuery", "false"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Request(format!(
                "Search API error: {}",
                response.status()
            )));
        }

        let data: YahooSearchResponse = response
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        Ok(matches_from_search(data))
    }
}

fn matches_from_search(data: YahooSearchResponse) -> Vec<SymbolMatch> {
    data.quotes
        .into_iter()
        .filter(is_equity_quote)
        .filter_map(|q| {
            let symbol = q.symbol?;
            let display_name = q.short_name.or(q.long_name).unwrap_or_else(|| symbol.clone());
            Some(SymbolMatch {
                symbol,
                display_name,
            })
        })
        .take(SEARCH_RESULT_LIMIT)
        .collect()
}
