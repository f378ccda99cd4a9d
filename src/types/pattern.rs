use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Market bias of a candlestick pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternCategory {
    Bullish,
    Bearish,
    Continuation,
}

impl PatternCategory {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bullish" => Some(Self::Bullish),
            "bearish" => Some(Self::Bearish),
            "continuation" | "neutral" => Some(Self::Continuation),
            _ => None,
        }
    }
}

/// Catalog entry describing a scannable pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatternKind {
    pub name: &'static str,
    pub description: &'static str,
    pub category: PatternCategory,
}

const fn pattern(name: &'static str, description: &'static str, category: PatternCategory) -> PatternKind {
    PatternKind {
        name,
        description,
        category,
    }
}

/// Patterns offered by the scanner.
pub const PATTERN_CATALOG: &[PatternKind] = &[
    pattern("Hammer", "Bullish reversal with a small body and long lower shadow", PatternCategory::Bullish),
    pattern("Inverted Hammer", "Bullish reversal with a small body and long upper shadow after a decline", PatternCategory::Bullish),
    pattern("Bullish Engulfing", "Large bullish candle completely engulfing the prior bearish candle", PatternCategory::Bullish),
    pattern("Morning Star", "Three-candle bottom reversal with a small middle body", PatternCategory::Bullish),
    pattern("Piercing Line", "Bullish candle closing above the midpoint of the prior bearish candle", PatternCategory::Bullish),
    pattern("Three White Soldiers", "Three consecutive long bullish candles with higher closes", PatternCategory::Bullish),
    pattern("Shooting Star", "Bearish reversal with a small body and long upper shadow", PatternCategory::Bearish),
    pattern("Hanging Man", "Bearish reversal with a small body and long lower shadow after a rally", PatternCategory::Bearish),
    pattern("Bearish Engulfing", "Large bearish candle completely engulfing the prior bullish candle", PatternCategory::Bearish),
    pattern("Evening Star", "Three-candle top reversal with a small middle body", PatternCategory::Bearish),
    pattern("Dark Cloud Cover", "Bearish candle closing below the midpoint of the prior bullish candle", PatternCategory::Bearish),
    pattern("Three Black Crows", "Three consecutive long bearish candles with lower closes", PatternCategory::Bearish),
    pattern("Doji", "Indecision candle with opening and closing prices nearly equal", PatternCategory::Continuation),
    pattern("Spinning Top", "Small body with upper and lower shadows of similar length", PatternCategory::Continuation),
    pattern("Rising Three Methods", "Bullish continuation with three small pullback candles inside a long bullish range", PatternCategory::Continuation),
    pattern("Falling Three Methods", "Bearish continuation with three small rally candles inside a long bearish range", PatternCategory::Continuation),
];

impl PatternKind {
    /// Find a catalog entry by name, ignoring case.
    pub fn find(name: &str) -> Option<&'static PatternKind> {
        let name = name.trim();
        PATTERN_CATALOG.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Catalog entries, optionally restricted to one category.
    pub fn catalog(category: Option<PatternCategory>) -> Vec<&'static PatternKind> {
        PATTERN_CATALOG
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .collect()
    }
}

/// Support, resistance and breakout target levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyLevels {
    pub support: f64,
    pub resistance: f64,
    pub breakout_target: f64,
}

/// Date window over which the pattern formed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormationPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// An annotated point on the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternPoint {
    pub date: NaiveDate,
    pub price: f64,
    pub significance: String,
}

/// Structured commentary attached to a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternAnalysis {
    pub description: String,
    pub key_levels: KeyLevels,
    pub formation_period: FormationPeriod,
    #[serde(default)]
    pub pattern_points: Vec<PatternPoint>,
    #[serde(default)]
    pub volume_analysis: String,
}

/// One candidate pattern match for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternMatch {
    pub symbol: String,
    /// Confidence score, 0 to 100.
    pub confidence: f64,
    pub price: f64,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub pattern_complete: bool,
    #[serde(default)]
    pub volume_confirms: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<PatternAnalysis>,
}
