use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Moving average flavour for the trend overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MaVariant {
    #[default]
    Sma,
    Ema,
}

/// Indicators the engine knows how to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    /// Moving average, SMA or EMA depending on the variant.
    MovingAverage,
    Rsi,
    Bollinger,
}

impl IndicatorKind {
    /// Get display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            IndicatorKind::MovingAverage => "Moving Average",
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Bollinger => "Bollinger Bands",
        }
    }
}

/// User-controlled settings for one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorConfig {
    pub kind: IndicatorKind,
    pub enabled: bool,
    pub period: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<MaVariant>,
}

impl IndicatorConfig {
    pub fn new(kind: IndicatorKind, period: u32) -> Self {
        Self {
            kind,
            enabled: true,
            period,
            variant: None,
        }
    }

    pub fn sma(period: u32) -> Self {
        Self {
            variant: Some(MaVariant::Sma),
            ..Self::new(IndicatorKind::MovingAverage, period)
        }
    }

    pub fn ema(period: u32) -> Self {
        Self {
            variant: Some(MaVariant::Ema),
            ..Self::new(IndicatorKind::MovingAverage, period)
        }
    }

    pub fn rsi(period: u32) -> Self {
        Self::new(IndicatorKind::Rsi, period)
    }

    pub fn bollinger(period: u32) -> Self {
        Self::new(IndicatorKind::Bollinger, period)
    }

    /// Same config with the enabled flag flipped.
    pub fn disabled(self) -> Self {
        Self {
            enabled: false,
            ..self
        }
    }

    /// Default chart overlay set: SMA 20, EMA 20 (off), RSI 14, Bollinger 20.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::sma(20),
            Self::ema(20).disabled(),
            Self::rsi(14),
            Self::bollinger(20),
        ]
    }

    /// Stable identifier such as `sma20` or `rsi14`.
    pub fn id(&self) -> String {
        let prefix = match (self.kind, self.variant.unwrap_or_default()) {
            (IndicatorKind::MovingAverage, MaVariant::Sma) => "sma",
            (IndicatorKind::MovingAverage, MaVariant::Ema) => "ema",
            (IndicatorKind::Rsi, _) => "rsi",
            (IndicatorKind::Bollinger, _) => "bollinger",
        };
        format!("{}{}", prefix, self.period)
    }
}

/// A single-line indicator value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A Bollinger envelope value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPoint {
    pub date: NaiveDate,
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Derived series produced by the indicator engine.
///
/// Dates without enough history are left out, so the output may be shorter
/// than the input series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "points", rename_all = "snake_case")]
pub enum IndicatorSeries {
    Line(Vec<LinePoint>),
    Bands(Vec<BandPoint>),
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        match self {
            IndicatorSeries::Line(points) => points.len(),
            IndicatorSeries::Bands(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Line points, if this is a single-line series.
    pub fn as_line(&self) -> Option<&[LinePoint]> {
        match self {
            IndicatorSeries::Line(points) => Some(points),
            IndicatorSeries::Bands(_) => None,
        }
    }

    /// Band points, if this is a Bollinger series.
    pub fn as_bands(&self) -> Option<&[BandPoint]> {
        match self {
            IndicatorSeries::Bands(points) => Some(points),
            IndicatorSeries::Line(_) => None,
        }
    }
}

/// Output of one configured indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorResult {
    pub id: String,
    pub name: String,
    pub config: IndicatorConfig,
    pub series: IndicatorSeries,
}

/// Latest value of an enabled indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorReading {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
}

/// Current readings passed to the analysis and chat prompts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorReadings {
    pub readings: Vec<IndicatorReading>,
}

impl IndicatorReadings {
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Look up a reading by id.
    pub fn get(&self, id: &str) -> Option<&IndicatorReading> {
        self.readings.iter().find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_ids() {
        assert_eq!(IndicatorConfig::sma(20).id(), "sma20");
        assert_eq!(IndicatorConfig::ema(12).id(), "ema12");
        assert_eq!(IndicatorConfig::rsi(14).id(), "rsi14");
        assert_eq!(IndicatorConfig::bollinger(20).id(), "bollinger20");
    }

    #[test]
    fn test_moving_average_without_variant_is_sma() {
        let config = IndicatorConfig::new(IndicatorKind::MovingAverage, 10);
        assert_eq!(config.id(), "sma10");
    }

    #[test]
    fn test_defaults() {
        let defaults = IndicatorConfig::defaults();
        assert_eq!(defaults.len(), 4);
        assert_eq!(defaults.iter().filter(|c| c.enabled).count(), 3);
    }

    #[test]
    fn test_config_deserialization() {
        let json = r#"{"kind":"moving_average","enabled":true,"period":9,"variant":"ema"}"#;
        let config: IndicatorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config, IndicatorConfig::ema(9));
    }

    #[test]
    fn test_negative_period_rejected_by_deserializer() {
        let json = r#"{"kind":"rsi","enabled":true,"period":-3}"#;
        assert!(serde_json::from_str::<IndicatorConfig>(json).is_err());
    }

    #[test]
    fn test_series_serialization_tagged() {
        let series = IndicatorSeries::Line(vec![]);
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"{"type":"line","points":[]}"#);
    }
}
