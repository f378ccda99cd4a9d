//! Relative Strength Index (RSI) indicator.

use super::{checked_period, to_line, Indicator};
use crate::error::IndicatorError;
use crate::types::{IndicatorSeries, PriceSeries};

/// RSI (Relative Strength Index) indicator.
///
/// Keeps running sums of gains and losses over the trailing `period` price
/// changes. Each step adds the newest change, emits once `i >= period`, then
/// drops the change leaving the window before moving on.
///
/// Values range from 0-100. When the window holds no losses the RSI is 100.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: i64) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: checked_period("rsi", period)?,
        })
    }

    fn rsi_value(gains: f64, losses: f64, period: f64) -> f64 {
        if losses <= 0.0 {
            return 100.0;
        }
        let rs = (gains / period) / (losses / period);
        100.0 - (100.0 / (1.0 + rs))
    }

    /// `(index, rsi)` for every `i >= period`.
    pub fn calculate(&self, closes: &[f64]) -> Vec<(usize, f64)> {
        let period = self.period;
        let mut out = Vec::with_capacity(closes.len().saturating_sub(period));
        let mut gains = 0.0_f64;
        let mut losses = 0.0_f64;

        for i in 1..closes.len() {
            let change = closes[i] - closes[i - 1];
            if change > 0.0 {
                gains += change;
            } else {
                losses -= change;
            }

            if i >= period {
                out.push((i, Self::rsi_value(gains, losses, period as f64)));

                let leaving = closes[i - period + 1] - closes[i - period];
                if leaving > 0.0 {
                    gains = (gains - leaving).max(0.0);
                } else {
                    losses = (losses + leaving).max(0.0);
                }
            }
        }

        out
    }
}

impl Indicator for Rsi {
    fn id(&self) -> String {
        format!("rsi{}", self.period)
    }

    fn name(&self) -> String {
        format!("RSI ({})", self.period)
    }

    fn min_periods(&self) -> usize {
        self.period + 1
    }

    fn compute(&self, series: &PriceSeries) -> IndicatorSeries {
        to_line(series, self.calculate(&series.closes()))
    }
}
