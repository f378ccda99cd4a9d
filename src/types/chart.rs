use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bar interval requested from the price-history source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Interval {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "daily" | "1d" | "day" => Some(Interval::Daily),
            "weekly" | "1wk" | "week" => Some(Interval::Weekly),
            "monthly" | "1mo" | "month" => Some(Interval::Monthly),
            _ => None,
        }
    }

    /// Interval code understood by Yahoo Finance.
    pub fn yahoo_code(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        }
    }

    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            Interval::Daily => "daily",
            Interval::Weekly => "weekly",
            Interval::Monthly => "monthly",
        }
    }
}

/// One OHLCV observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// A bar is usable when every price is finite and positive and the
    /// high/low envelope contains both open and close.
    pub fn is_valid(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return false;
        }

        let body_low = self.open.min(self.close);
        let body_high = self.open.max(self.close);
        self.low <= body_low && body_high <= self.high
    }
}

/// Ordered daily bars for one symbol, ascending by date with no duplicates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series from raw bars.
    ///
    /// Invalid bars are dropped, the rest are ordered by date. When a date
    /// repeats, the first valid bar for that date is kept.
    pub fn from_bars(symbol: impl Into<String>, bars: impl IntoIterator<Item = PriceBar>) -> Self {
        let mut by_date: BTreeMap<NaiveDate, PriceBar> = BTreeMap::new();
        for bar in bars.into_iter().filter(PriceBar::is_valid) {
            by_date.entry(bar.date).or_insert(bar);
        }

        Self {
            symbol: symbol.into().to_uppercase(),
            bars: by_date.into_values().collect(),
        }
    }

    /// An empty series for a symbol.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self::from_bars(symbol, Vec::new())
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Closing prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// The most recent `n` bars (or all of them if fewer exist).
    pub fn last_bars(&self, n: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    /// Most recent bar.
    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn test_interval_from_str() {
        assert_eq!(Interval::from_str("daily"), Some(Interval::Daily));
        assert_eq!(Interval::from_str("1WK"), Some(Interval::Weekly));
        assert_eq!(Interval::from_str("1mo"), Some(Interval::Monthly));
        assert_eq!(Interval::from_str("hourly"), None);
    }

    #[test]
    fn test_interval_yahoo_code() {
        assert_eq!(Interval::Daily.yahoo_code(), "1d");
        assert_eq!(Interval::Weekly.yahoo_code(), "1wk");
        assert_eq!(Interval::Monthly.yahoo_code(), "1mo");
    }

    #[test]
    fn test_bar_validity() {
        assert!(bar(1, 100.0).is_valid());

        let mut zero_open = bar(1, 100.0);
        zero_open.open = 0.0;
        assert!(!zero_open.is_valid());

        let mut nan_close = bar(1, 100.0);
        nan_close.close = f64::NAN;
        assert!(!nan_close.is_valid());

        let mut broken_envelope = bar(1, 100.0);
        broken_envelope.high = 99.0;
        assert!(!broken_envelope.is_valid());
    }

    #[test]
    fn test_series_sorts_and_dedupes() {
        let mut duplicate = bar(2, 500.0);
        duplicate.volume = 7;
        let series = PriceSeries::from_bars("aapl", vec![bar(3, 103.0), bar(2, 102.0), duplicate, bar(1, 101.0)]);

        assert_eq!(series.symbol(), "AAPL");
        assert_eq!(series.closes(), vec![101.0, 102.0, 103.0]);
    }

    #[test]
    fn test_series_drops_invalid_bars() {
        let mut bad = bar(2, 102.0);
        bad.low = 0.0;
        let series = PriceSeries::from_bars("MSFT", vec![bar(1, 101.0), bad, bar(3, 103.0)]);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_last_bars() {
        let series = PriceSeries::from_bars("MSFT", (1..=5).map(|d| bar(d, 100.0 + d as f64)));
        assert_eq!(series.last_bars(2).len(), 2);
        assert_eq!(series.last_bars(2)[0].close, 104.0);
        assert_eq!(series.last_bars(50).len(), 5);
        assert_eq!(series.latest().map(|b| b.close), Some(105.0));
    }
}
