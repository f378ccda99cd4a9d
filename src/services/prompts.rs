//! Prompt construction for the analysis and chat models.

use serde::Serialize;

use crate::types::{ChatMessage, IndicatorReadings, PriceBar, PriceSeries};

/// Bars included with each chat request.
pub const CHAT_CONTEXT_BARS: usize = 20;

/// Everything the analysis model needs for one scan.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub pattern_name: String,
    pub series: Vec<PriceSeries>,
    /// Latest indicator readings per symbol, in the same order as `series`.
    pub readings: Vec<IndicatorReadings>,
}

/// Rendered chat prompt: system context plus the running transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPrompt {
    pub system: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct FormattedBar {
    date: String,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: u64,
}

impl From<&PriceBar> for FormattedBar {
    fn from(bar: &PriceBar) -> Self {
        Self {
            date: bar.date.to_string(),
            open: format!("{:.2}", bar.open),
            high: format!("{:.2}", bar.high),
            low: format!("{:.2}", bar.low),
            close: format!("{:.2}", bar.close),
            volume: bar.volume,
        }
    }
}

#[derive(Serialize)]
struct SymbolData<'a> {
    symbol: &'a str,
    bars: Vec<FormattedBar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    indicators: Option<&'a IndicatorReadings>,
}

fn format_readings(readings: &IndicatorReadings) -> String {
    readings
        .readings
        .iter()
        .map(|r| match (r.upper, r.lower) {
            (Some(upper), Some(lower)) => format!(
                "- {}: middle {:.2}, upper {:.2}, lower {:.2} (as of {})",
                r.name, r.value, upper, lower, r.date
            ),
            _ => format!("- {}: {:.2} (as of {})", r.name, r.value, r.date),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const MATCH_SHAPE: &str = r#"[
  {
    "symbol": "TICKER",
    "confidence": 85,
    "price": 150.25,
    "sector": "technology",
    "patternComplete": true,
    "volumeConfirms": true,
    "analysis": {
      "description": "Why the pattern qualifies",
      "keyLevels": { "support": 145.0, "resistance": 155.0, "breakoutTarget": 162.5 },
      "formationPeriod": { "start": "2024-01-02", "end": "2024-01-10" },
      "patternPoints": [ { "date": "2024-01-05", "price": 146.1, "significance": "Hammer low" } ],
      "volumeAnalysis": "Volume commentary"
    }
  }
]"#;

/// Prompt asking the model to find `pattern_name` across the supplied series.
pub fn scan_prompt(request: &AnalysisRequest) -> String {
    let data: Vec<SymbolData> = request
        .series
        .iter()
        .enumerate()
        .map(|(i, series)| SymbolData {
            symbol: series.symbol(),
            bars: series.bars().iter().map(FormattedBar::from).collect(),
            indicators: request.readings.get(i).filter(|r| !r.is_empty()),
        })
        .collect();

    let data_json = serde_json::to_string(&data).unwrap_or_else(|_| "[]".to_string());

    format!(
        "You are a pattern analysis system that only outputs valid JSON.\n\n\
         For the following stock data, analyze for {pattern} patterns:\n{data}\n\n\
         Output a JSON array of matches in this exact format:\n{shape}\n\n\
         Include only stocks where you find the pattern with high confidence (>70%). \
         Try to find at least 3-5 matches if they exist.\n\
         Respond with ONLY the JSON array, no other text.",
        pattern = request.pattern_name,
        data = data_json,
        shape = MATCH_SHAPE,
    )
}

/// System context for a chat turn about `symbol`.
pub fn chat_system_prompt(symbol: &str, bars: &[PriceBar], readings: &IndicatorReadings) -> String {
    let recent: Vec<FormattedBar> = bars
        .iter()
        .rev()
        .take(CHAT_CONTEXT_BARS)
        .rev()
        .map(FormattedBar::from)
        .collect();
    let candles = serde_json::to_string_pretty(&recent).unwrap_or_else(|_| "[]".to_string());

    let mut prompt = format!(
        "You are a technical analysis expert specializing in candlestick patterns and market analysis.\n\
         You are analyzing {symbol} stock data.\n\n\
         Here are the recent candlesticks:\n{candles}\n",
    );

    if !readings.is_empty() {
        prompt.push_str("\nCurrent indicator readings:\n");
        prompt.push_str(&format_readings(readings));
        prompt.push('\n');
    }

    prompt.push_str(
        "\nPlease analyze:\n\
         1. Any significant candlestick patterns\n\
         2. The meaning and implications of these patterns\n\
         3. Key price levels and trends\n\
         4. Overall technical outlook\n\n\
         Format your response in clear sections with headers.",
    );

    prompt
}

/// Full chat prompt from a symbol, its bars and the transcript.
pub fn chat_prompt(
    symbol: &str,
    bars: &[PriceBar],
    readings: &IndicatorReadings,
    messages: &[ChatMessage],
) -> ChatPrompt {
    ChatPrompt {
        system: chat_system_prompt(symbol, bars, readings),
        messages: messages.to_vec(),
    }
}
