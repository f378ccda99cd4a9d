use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Anthropic API configuration.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key. Analysis and chat endpoints answer 503 without one.
    pub api_key: Option<String>,
    /// Model used for scans and chat.
    pub model: String,
    /// Maximum tokens per response.
    pub max_tokens: u32,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "claude-3-5-sonnet-20241022".to_string(),
            max_tokens: 1024,
        }
    }
}

/// Scan and chart tuning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Per-symbol history fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
    /// Analysis/chat model call timeout in seconds.
    pub analysis_timeout_secs: u64,
    /// Days of daily history sent to the analysis model per symbol.
    pub scan_lookback_days: i64,
    /// Days of history loaded for a chart.
    pub chart_lookback_days: i64,
    /// Let symbol search override specific-sector rosters.
    pub sector_search_enabled: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 15,
            analysis_timeout_secs: 60,
            scan_lookback_days: 30,
            chart_lookback_days: 180,
            sector_search_enabled: false,
        }
    }
}

impl ScanConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_timeout_secs)
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite file holding user-added sector symbols.
    pub database_path: String,
    pub anthropic: AnthropicConfig,
    pub scan: ScanConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let anthropic_defaults = AnthropicConfig::default();
        let scan_defaults = ScanConfig::default();

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var(&lookup, "PORT").unwrap_or(3001),
            database_path: lookup("DATABASE_PATH").unwrap_or_else(|| "data/sector_stocks.db".to_string()),
            anthropic: AnthropicConfig {
                api_key: lookup("ANTHROPIC_API_KEY").filter(|k| !k.trim().is_empty()),
                model: lookup("ANTHROPIC_MODEL").unwrap_or(anthropic_defaults.model),
                max_tokens: parse_positive(&lookup, "ANTHROPIC_MAX_TOKENS").unwrap_or(anthropic_defaults.max_tokens),
            },
            scan: ScanConfig {
                fetch_timeout_secs: parse_positive(&lookup, "FETCH_TIMEOUT_SECS")
                    .unwrap_or(scan_defaults.fetch_timeout_secs),
                analysis_timeout_secs: parse_positive(&lookup, "ANALYSIS_TIMEOUT_SECS")
                    .unwrap_or(scan_defaults.analysis_timeout_secs),
                scan_lookback_days: parse_positive(&lookup, "SCAN_LOOKBACK_DAYS")
                    .unwrap_or(scan_defaults.scan_lookback_days),
                chart_lookback_days: parse_positive(&lookup, "CHART_LOOKBACK_DAYS")
                    .unwrap_or(scan_defaults.chart_lookback_days),
                sector_search_enabled: lookup("SECTOR_SEARCH_ENABLED")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(scan_defaults.sector_search_enabled),
            },
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}

/// Like [`parse_var`], but zero and negative values count as unset.
fn parse_positive<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr + PartialOrd + Default,
    F: Fn(&str) -> Option<String>,
{
    parse_var(lookup, key).filter(|v: &T| *v > T::default())
}
