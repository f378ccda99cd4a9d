//! Simple Moving Average (SMA) indicator.

use super::{checked_period, to_line, Indicator};
use crate::error::IndicatorError;
use crate::types::{IndicatorSeries, PriceSeries};

/// SMA (Simple Moving Average) indicator.
///
/// Arithmetic mean of the closes over the trailing window `[i-period+1, i]`.
/// Indices before the first full window are omitted, so the output has
/// `len - period + 1` points when `len >= period` and none otherwise.
#[derive(Debug, Clone)]
pub struct Sma {
    pub(super) period: usize,
}

impl Sma {
    pub fn new(period: i64) -> Result<Self, IndicatorError> {
        Ok(Self {
            period: checked_period("sma", period)?,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// `(index, mean)` for every index that closes a full window.
    pub fn calculate(&self, closes: &[f64]) -> Vec<(usize, f64)> {
        closes
            .windows(self.period)
            .enumerate()
            .map(|(start, window)| {
                let mean = window.iter().sum::<f64>() / self.period as f64;
                (start + self.period - 1, mean)
            })
            .collect()
    }
}

impl Indicator for Sma {
    fn id(&self) -> String {
        format!("sma{}", self.period)
    }

    fn name(&self) -> String {
        format!("SMA ({})", self.period)
    }

    fn min_periods(&self) -> usize {
        self.period
    }

    fn compute(&self, series: &PriceSeries) -> IndicatorSeries {
        to_line(series, self.calculate(&series.closes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::indicators::test_support::series_from_closes;
    use chrono::NaiveDate;

    #[test]
    fn test_sma_id_and_name() {
        let sma = Sma::new(20).unwrap();
        assert_eq!(sma.id(), "sma20");
        assert_eq!(sma.name(), "SMA (20)");
        assert_eq!(sma.min_periods(), 20);
    }

    #[test]
    fn test_sma_rejects_zero_period() {
        assert!(Sma::new(0).is_err());
        assert!(Sma::new(-1).is_err());
    }

    #[test]
    fn test_sma_three_bar_example() {
        let series = series_from_closes(&[100.0, 102.0, 101.0]);
        let out = Sma::new(2).unwrap().compute(&series);
        let points = out.as_line().unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(points[0].value, 101.0);
        assert_eq!(points[1].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(points[1].value, 101.5);
    }

    #[test]
    fn test_sma_output_length() {
        let closes: Vec<f64> = (1..=10).map(f64::from).collect();
        for period in 1..=12 {
            let out = Sma::new(period).unwrap().calculate(&closes);
            let expected = if period as usize <= closes.len() {
                closes.len() - period as usize + 1
            } else {
                0
            };
            assert_eq!(out.len(), expected, "period {}", period);
        }
    }

    #[test]
    fn test_sma_period_one_is_identity() {
        let closes = [3.0, 7.0, 5.0];
        let out = Sma::new(1).unwrap().calculate(&closes);
        assert_eq!(out, vec![(0, 3.0), (1, 7.0), (2, 5.0)]);
    }

    #[test]
    fn test_sma_empty_input() {
        assert!(Sma::new(5).unwrap().calculate(&[]).is_empty());
    }
}
