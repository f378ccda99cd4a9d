//! Bollinger Bands indicator.

use super::{Indicator, Sma};
use crate::error::IndicatorError;
use crate::types::{BandPoint, IndicatorSeries, PriceSeries};

/// Bollinger Bands indicator.
///
/// Consists of:
/// - Middle band: SMA(period)
/// - Upper band: SMA + k * StdDev
/// - Lower band: SMA - k * StdDev
///
/// The standard deviation is the population deviation over the same window
/// (divide by `period`). Dates before the first full window are omitted.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    sma: Sma,
    std_dev_multiplier: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            sma: Sma { period: 20 },
            std_dev_multiplier: 2.0,
        }
    }
}

impl BollingerBands {
    pub fn new(period: i64) -> Result<Self, IndicatorError> {
        Self::with_multiplier(period, 2.0)
    }

    pub fn with_multiplier(period: i64, std_dev_multiplier: f64) -> Result<Self, IndicatorError> {
        Ok(Self {
            sma: Sma::new(period)?,
            std_dev_multiplier,
        })
    }

    pub fn period(&self) -> usize {
        self.sma.period()
    }

    /// Population standard deviation.
    fn std_dev(values: &[f64], mean: f64) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let variance: f64 =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }

    /// `(index, upper, middle, lower)` for every full window.
    pub fn calculate(&self, closes: &[f64]) -> Vec<(usize, f64, f64, f64)> {
        let period = self.period();
        self.sma
            .calculate(closes)
            .into_iter()
            .map(|(i, middle)| {
                let window = &closes[i + 1 - period..=i];
                let width = self.std_dev_multiplier * Self::std_dev(window, middle);
                (i, middle + width, middle, middle - width)
            })
            .collect()
    }
}

impl Indicator for BollingerBands {
    fn id(&self) -> String {
        format!("bollinger{}", self.period())
    }

    fn name(&self) -> String {
        format!("Bollinger Bands ({})", self.period())
    }

    fn min_periods(&self) -> usize {
        self.period()
    }

    fn compute(&self, series: &PriceSeries) -> IndicatorSeries {
        let bars = series.bars();
        IndicatorSeries::Bands(
            self.calculate(&series.closes())
                .into_iter()
                .map(|(i, upper, middle, lower)| BandPoint {
                    date: bars[i].date,
                    upper,
                    middle,
                    lower,
                })
                .collect(),
        )
    }
}
