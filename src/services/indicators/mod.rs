//! Technical indicator implementations.
//!
//! Every indicator is a pure function of a [`PriceSeries`]: the input is never
//! mutated and dates without enough history are omitted from the output.

pub mod bollinger;
pub mod ema;
pub mod rsi;
pub mod sma;

pub use bollinger::BollingerBands;
pub use ema::Ema;
pub use rsi::Rsi;
pub use sma::Sma;

use crate::error::IndicatorError;
use crate::types::{
    IndicatorConfig, IndicatorKind, IndicatorReading, IndicatorReadings, IndicatorResult,
    IndicatorSeries, LinePoint, MaVariant, PriceSeries,
};

/// Trait for implementing technical indicators.
pub trait Indicator: Send + Sync {
    /// Unique identifier for this indicator, e.g. `sma20`.
    fn id(&self) -> String;

    /// Human-readable name.
    fn name(&self) -> String;

    /// Number of bars needed before the first value is emitted.
    fn min_periods(&self) -> usize;

    /// Compute the derived series.
    fn compute(&self, series: &PriceSeries) -> IndicatorSeries;
}

/// Reject non-positive periods before any window is built.
pub(crate) fn checked_period(indicator: &str, period: i64) -> Result<usize, IndicatorError> {
    if period < 1 {
        return Err(IndicatorError::InvalidPeriod {
            indicator: indicator.to_string(),
            period,
        });
    }
    Ok(period as usize)
}

/// Map `(index, value)` pairs back onto the series dates.
pub(crate) fn to_line(series: &PriceSeries, values: Vec<(usize, f64)>) -> IndicatorSeries {
    let bars = series.bars();
    IndicatorSeries::Line(
        values
            .into_iter()
            .map(|(i, value)| LinePoint {
                date: bars[i].date,
                value,
            })
            .collect(),
    )
}

/// Validate a config without computing anything.
pub fn validate(config: &IndicatorConfig) -> Result<(), IndicatorError> {
    build(config).map(|_| ())
}

/// Build the indicator described by a config.
pub fn build(config: &IndicatorConfig) -> Result<Box<dyn Indicator>, IndicatorError> {
    let period = i64::from(config.period);
    let indicator: Box<dyn Indicator> = match config.kind {
        IndicatorKind::MovingAverage => match config.variant.unwrap_or_default() {
            MaVariant::Sma => Box::new(Sma::new(period)?),
            MaVariant::Ema => Box::new(Ema::new(period)?),
        },
        IndicatorKind::Rsi => Box::new(Rsi::new(period)?),
        IndicatorKind::Bollinger => Box::new(BollingerBands::new(period)?),
    };
    Ok(indicator)
}

/// Compute every enabled indicator.
///
/// All configs are validated first; a single bad period rejects the whole
/// request and no partial results are returned.
pub fn compute_indicators(
    series: &PriceSeries,
    configs: &[IndicatorConfig],
) -> Result<Vec<IndicatorResult>, IndicatorError> {
    let built = configs
        .iter()
        .filter(|c| c.enabled)
        .map(|c| build(c).map(|indicator| (*c, indicator)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(built
        .into_iter()
        .map(|(config, indicator)| IndicatorResult {
            id: indicator.id(),
            name: indicator.name(),
            config,
            series: indicator.compute(series),
        })
        .collect())
}

/// Latest value of each enabled indicator, skipping those with no output yet.
pub fn latest_readings(
    series: &PriceSeries,
    configs: &[IndicatorConfig],
) -> Result<IndicatorReadings, IndicatorError> {
    Ok(readings_from(&compute_indicators(series, configs)?))
}

/// Latest readings from results that were already computed.
pub fn readings_from(results: &[IndicatorResult]) -> IndicatorReadings {
    IndicatorReadings {
        readings: results.iter().filter_map(reading_from).collect(),
    }
}

/// Last point of one result, if it has any output.
pub fn reading_from(result: &IndicatorResult) -> Option<IndicatorReading> {
    match &result.series {
        IndicatorSeries::Line(points) => points.last().map(|p| IndicatorReading {
            id: result.id.clone(),
            name: result.name.clone(),
            date: p.date,
            value: p.value,
            upper: None,
            lower: None,
        }),
        IndicatorSeries::Bands(points) => points.last().map(|p| IndicatorReading {
            id: result.id.clone(),
            name: result.name.clone(),
            date: p.date,
            value: p.middle,
            upper: Some(p.upper),
            lower: Some(p.lower),
        }),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::{PriceBar, PriceSeries};
    use chrono::{Duration, NaiveDate};

    /// Series with the given closes on consecutive days from 2024-01-01.
    pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = PriceSeries::from_bars(
            "TEST",
            closes.iter().enumerate().map(|(i, &close)| PriceBar {
                date: start + Duration::days(i as i64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 1_000,
            }),
        );
        assert_eq!(series.len(), closes.len(), "fixture dropped bars");
        series
    }
}
