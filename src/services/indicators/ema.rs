//! Exponential Moving Average (EMA) indicator.

use super::{checked_period, to_line, Indicator};
use crate::error::IndicatorError;
use crate::types::{IndicatorSeries, PriceSeries};

/// EMA (Exponential Moving Average) indicator.
///
/// Seeded with the first close rather than an SMA of the first `period`
/// closes, so a value exists at every index and `ema[0] == close[0]`.
/// Charts built on this series have always used that seed; switching to the
/// textbook SMA seed would shift every early value.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: i64) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: checked_period("ema", period)?,
        })
    }

    /// Smoothing factor `2 / (period + 1)`.
    pub fn multiplier(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }

    /// EMA at every index.
    pub fn calculate(&self, closes: &[f64]) -> Vec<(usize, f64)> {
        let k = self.multiplier();
        let mut out = Vec::with_capacity(closes.len());
        let mut prev: Option<f64> = None;

        for (i, &close) in closes.iter().enumerate() {
            let ema = match prev {
                None => close,
                Some(p) => (close - p) * k + p,
            };
            out.push((i, ema));
            prev = Some(ema);
        }

        out
    }
}

impl Indicator for Ema {
    fn id(&self) -> String {
        format!("ema{}", self.period)
    }

    fn name(&self) -> String {
        format!("EMA ({})", self.period)
    }

    fn min_periods(&self) -> usize {
        1
    }

    fn compute(&self, series: &PriceSeries) -> IndicatorSeries {
        to_line(series, self.calculate(&series.closes()))
    }
}
