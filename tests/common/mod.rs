//! In-process collaborators shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate};
use patternscope::error::SourceError;
use patternscope::services::prompts::{AnalysisRequest, ChatPrompt};
use patternscope::sources::{ChatAssistant, PatternOracle, PriceHistory, SymbolSearch};
use patternscope::types::{Interval, PriceBar, PriceSeries, SymbolMatch};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

/// `count` rising daily bars starting 2024-01-01.
pub fn rising_bars(count: usize) -> Vec<PriceBar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..count)
        .map(|i| {
            let close = 100.0 + i as f64;
            PriceBar {
                date: start + ChronoDuration::days(i as i64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 10_000,
            }
        })
        .collect()
}

/// Price history that serves synthetic bars, failing for chosen symbols.
pub struct MockHistory {
    pub bars: usize,
    pub failing: HashSet<String>,
    pub slow: HashSet<String>,
    pub requested: Mutex<Vec<String>>,
}

impl MockHistory {
    pub fn new(bars: usize) -> Self {
        Self {
            bars,
            failing: HashSet::new(),
            slow: HashSet::new(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, symbols: &[&str]) -> Self {
        self.failing.extend(symbols.iter().map(|s| s.to_string()));
        self
    }

    pub fn slow(mut self, symbols: &[&str]) -> Self {
        self.slow.extend(symbols.iter().map(|s| s.to_string()));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceHistory for MockHistory {
    async fn fetch_history(
        &self,
        symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
        _interval: Interval,
    ) -> Result<PriceSeries, SourceError> {
        self.requested.lock().unwrap().push(symbol.to_string());

        if self.slow.contains(symbol) {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        if self.failing.contains(symbol) {
            return Err(SourceError::Unavailable {
                symbol: symbol.to_string(),
                reason: "mock failure".to_string(),
            });
        }
        Ok(PriceSeries::from_bars(symbol, rising_bars(self.bars)))
    }
}

/// Symbol search returning a fixed answer.
pub struct MockSearch {
    pub result: Result<Vec<SymbolMatch>, String>,
}

impl MockSearch {
    pub fn returning(symbols: &[&str]) -> Self {
        Self {
            result: Ok(symbols
                .iter()
                .map(|s| SymbolMatch {
                    symbol: s.to_string(),
                    display_name: format!("{} Inc.", s),
                })
                .collect()),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err("search down".to_string()),
        }
    }
}

#[async_trait]
impl SymbolSearch for MockSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SymbolMatch>, SourceError> {
        self.result.clone().map_err(SourceError::Request)
    }
}

/// Analysis model returning canned text and recording what it saw.
pub struct MockOracle {
    pub response: Result<String, String>,
    pub seen_symbols: Mutex<Vec<String>>,
    pub seen_pattern: Mutex<Option<String>>,
}

impl MockOracle {
    pub fn returning(text: &str) -> Self {
        Self {
            response: Ok(text.to_string()),
            seen_symbols: Mutex::new(Vec::new()),
            seen_pattern: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: Err("model overloaded".to_string()),
            seen_symbols: Mutex::new(Vec::new()),
            seen_pattern: Mutex::new(None),
        }
    }

    pub fn seen_symbols(&self) -> Vec<String> {
        self.seen_symbols.lock().unwrap().clone()
    }
}

#[async_trait]
impl PatternOracle for MockOracle {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String, SourceError> {
        *self.seen_symbols.lock().unwrap() = request.series.iter().map(|s| s.symbol().to_string()).collect();
        *self.seen_pattern.lock().unwrap() = Some(request.pattern_name.clone());
        self.response.clone().map_err(SourceError::Request)
    }
}

/// Chat model with a fixed reply.
pub struct MockAssistant {
    pub reply: String,
}

#[async_trait]
impl ChatAssistant for MockAssistant {
    async fn reply(&self, prompt: &ChatPrompt) -> Result<String, SourceError> {
        Ok(format!("{} ({} messages)", self.reply, prompt.messages.len()))
    }
}

/// A JSON match entry as the analysis model would write it.
pub fn match_json(symbol: &str, confidence: f64) -> String {
    format!(
        r#"{{"symbol":"{}","confidence":{},"price":123.45,"patternComplete":true,"volumeConfirms":false}}"#,
        symbol, confidence
    )
}
