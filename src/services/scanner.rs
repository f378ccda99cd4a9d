//! Market-wide pattern scan: resolve a universe, fetch history for every
//! symbol in parallel, hand the data to the analysis model and validate what
//! comes back.

use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{IndicatorError, ScanError, SourceError};
use crate::services::indicators::{self, latest_readings};
use crate::services::matches::parse_matches;
use crate::services::prompts::AnalysisRequest;
use crate::services::UniverseResolver;
use crate::sources::{PatternOracle, PriceHistory};
use crate::types::{IndicatorConfig, Interval, PriceSeries, ScanReport, ScanRequest, SectorId};

/// Tunables for a scan.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Days of daily history sent per symbol.
    pub lookback_days: i64,
    /// Bound on each price-history fetch.
    pub fetch_timeout: Duration,
    /// Bound on the analysis call.
    pub analysis_timeout: Duration,
    /// Indicators whose latest readings accompany each symbol.
    pub indicators: Vec<IndicatorConfig>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            fetch_timeout: Duration::from_secs(15),
            analysis_timeout: Duration::from_secs(60),
            indicators: vec![IndicatorConfig::rsi(14), IndicatorConfig::sma(20)],
        }
    }
}

/// Runs pattern scans.
pub struct PatternScanner {
    resolver: Arc<UniverseResolver>,
    history: Arc<dyn PriceHistory>,
    oracle: Arc<dyn PatternOracle>,
    settings: ScanSettings,
}

impl PatternScanner {
    /// Create a scanner. Fails if any configured indicator has a bad period.
    pub fn new(
        resolver: Arc<UniverseResolver>,
        history: Arc<dyn PriceHistory>,
        oracle: Arc<dyn PatternOracle>,
        settings: ScanSettings,
    ) -> Result<Self, IndicatorError> {
        for config in &settings.indicators {
            indicators::validate(config)?;
        }

        Ok(Self {
            resolver,
            history,
            oracle,
            settings,
        })
    }

    /// Run one scan.
    ///
    /// Per-symbol fetch failures only remove that symbol. The scan fails with
    /// `NoData` when nothing could be fetched and with `Analysis` when the
    /// model call fails; an unusable model answer is an empty match list.
    pub async fn scan(&self, request: &ScanRequest) -> Result<ScanReport, ScanError> {
        let pattern = request.pattern_name.trim();
        if pattern.is_empty() {
            return Err(ScanError::InvalidRequest("pattern name is required".to_string()));
        }

        let sector = request.sector_filter;
        let symbols = self.resolver.resolve(sector).await;
        if symbols.is_empty() {
            return Err(ScanError::NoData {
                sector: sector.to_string(),
            });
        }

        let end = Utc::now().date_naive();
        let start = end - ChronoDuration::days(self.settings.lookback_days.max(1));

        info!("Scanning {} symbols in {} for {}", symbols.len(), sector, pattern);

        let fetches = symbols.iter().map(|symbol| self.fetch_one(symbol, start, end));
        let results = join_all(fetches).await;

        let mut series = Vec::new();
        let mut failed_symbols = Vec::new();
        for (symbol, result) in symbols.iter().zip(results) {
            match result {
                Some(s) => series.push(s),
                None => failed_symbols.push(symbol.clone()),
            }
        }

        if series.is_empty() {
            warn!("No price data for any of {} symbols in {}", symbols.len(), sector);
            return Err(ScanError::NoData {
                sector: sector.to_string(),
            });
        }

        let readings = series
            .iter()
            .map(|s| latest_readings(s, &self.settings.indicators).unwrap_or_default())
            .collect();
        let scanned_symbols: Vec<String> = series.iter().map(|s| s.symbol().to_string()).collect();

        let analysis = AnalysisRequest {
            pattern_name: pattern.to_string(),
            series,
            readings,
        };

        let text = match tokio::time::timeout(self.settings.analysis_timeout, self.oracle.analyze(&analysis)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(ScanError::Analysis(e)),
            Err(_) => {
                return Err(ScanError::Analysis(SourceError::Timeout(
                    self.settings.analysis_timeout.as_secs(),
                )))
            }
        };

        let mut matches = parse_matches(&text);
        for m in &mut matches {
            if m.sector.is_empty() {
                m.sector = self.sector_of(&m.symbol, sector).tag().to_string();
            }
        }

        info!(
            "Scan for {} in {} found {} match(es) across {} symbols ({} failed)",
            pattern,
            sector,
            matches.len(),
            scanned_symbols.len(),
            failed_symbols.len()
        );

        Ok(ScanReport {
            scan_id: Uuid::new_v4().to_string(),
            pattern: pattern.to_string(),
            sector,
            matches,
            scanned_symbols,
            failed_symbols,
            timestamp: Utc::now().timestamp_millis(),
        })
    }

    /// Fetch one symbol, mapping any failure or timeout to `None`.
    async fn fetch_one(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Option<PriceSeries> {
        let fetch = self.history.fetch_history(symbol, start, end, Interval::Daily);
        match tokio::time::timeout(self.settings.fetch_timeout, fetch).await {
            Ok(Ok(series)) if !series.is_empty() => Some(series),
            Ok(Ok(_)) => {
                debug!("No bars for {}", symbol);
                None
            }
            Ok(Err(e)) => {
                debug!("Fetch failed for {}: {}", symbol, e);
                None
            }
            Err(_) => {
                debug!("Fetch timed out for {}", symbol);
                None
            }
        }
    }

    /// Sector tag for a match the model left unlabelled.
    fn sector_of(&self, symbol: &str, requested: SectorId) -> SectorId {
        if requested != SectorId::All {
            return requested;
        }
        SectorId::SECTORS
            .into_iter()
            .find(|s| self.resolver.rosters().roster(*s).iter().any(|r| r == symbol))
            .unwrap_or(SectorId::All)
    }
}
