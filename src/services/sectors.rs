//! Sector rosters and scan-universe resolution.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::services::RosterStore;
use crate::sources::SymbolSearch;
use crate::types::SectorId;

/// Upper bound on the number of symbols in one scan.
pub const MAX_UNIVERSE: usize = 50;

/// Fixed default rosters, in sector enumeration order.
const DEFAULT_ROSTERS: &[(SectorId, &[&str])] = &[
    (SectorId::Technology, &["AAPL", "MSFT", "GOOGL", "NVDA", "META", "AVGO", "ORCL", "CRM", "ADBE", "AMD"]),
    (SectorId::Finance, &["JPM", "BAC", "WFC", "GS", "MS", "C", "V", "MA", "AXP", "BLK"]),
    (SectorId::Healthcare, &["JNJ", "UNH", "PFE", "MRK", "ABBV", "LLY", "TMO", "ABT", "DHR", "BMY"]),
    (SectorId::Consumer, &["AMZN", "TSLA", "WMT", "HD", "MCD", "NKE", "SBUX", "COST", "PG", "KO"]),
    (SectorId::Industrial, &["CAT", "BA", "HON", "GE", "UPS", "RTX", "LMT", "DE", "MMM", "UNP"]),
    (SectorId::Energy, &["XOM", "CVX", "COP", "SLB", "EOG", "MPC", "PSX", "OXY", "VLO", "KMI"]),
    (SectorId::Materials, &["LIN", "APD", "SHW", "ECL", "NEM", "FCX", "DOW", "DD", "NUE", "PPG"]),
    (SectorId::Utilities, &["NEE", "DUK", "SO", "D", "AEP", "EXC", "SRE", "XEL", "PEG", "ED"]),
    (SectorId::RealEstate, &["PLD", "AMT", "CCI", "EQIX", "PSA", "O", "SPG", "WELL", "DLR", "AVB"]),
];

/// Immutable sector → default roster table.
///
/// Built once at startup and shared; tests build substitute tables with
/// [`SectorRosters::from_entries`].
#[derive(Debug, Clone, Default)]
pub struct SectorRosters {
    rosters: HashMap<SectorId, Vec<String>>,
}

impl SectorRosters {
    /// The built-in rosters.
    pub fn defaults() -> Self {
        Self::from_entries(DEFAULT_ROSTERS.iter().map(|(sector, symbols)| {
            (*sector, symbols.iter().map(|s| s.to_string()).collect())
        }))
    }

    /// Build a table from explicit entries. `All` entries are ignored.
    pub fn from_entries(entries: impl IntoIterator<Item = (SectorId, Vec<String>)>) -> Self {
        let rosters = entries
            .into_iter()
            .filter(|(sector, _)| *sector != SectorId::All)
            .collect();
        Self { rosters }
    }

    /// Default roster for a concrete sector (empty for `All` or unknown).
    pub fn roster(&self, sector: SectorId) -> &[String] {
        self.rosters.get(&sector).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every roster concatenated in sector enumeration order, deduplicated
    /// and capped at [`MAX_UNIVERSE`].
    pub fn all_symbols(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        SectorId::SECTORS
            .iter()
            .flat_map(|sector| self.roster(*sector).iter())
            .filter(|s| seen.insert(s.as_str()))
            .take(MAX_UNIVERSE)
            .cloned()
            .collect()
    }
}

/// Resolves a sector filter into the list of symbols to scan.
pub struct UniverseResolver {
    rosters: Arc<SectorRosters>,
    search: Option<Arc<dyn SymbolSearch>>,
    store: Option<Arc<RosterStore>>,
    search_timeout: Duration,
}

impl UniverseResolver {
    pub fn new(rosters: Arc<SectorRosters>) -> Self {
        Self {
            rosters,
            search: None,
            store: None,
            search_timeout: Duration::from_secs(10),
        }
    }

    /// Let a symbol-search collaborator override specific-sector rosters.
    pub fn with_search(mut self, search: Arc<dyn SymbolSearch>, timeout: Duration) -> Self {
        self.search = Some(search);
        self.search_timeout = timeout;
        self
    }

    /// Append user-added symbols from the roster store.
    pub fn with_store(mut self, store: Arc<RosterStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn rosters(&self) -> &SectorRosters {
        &self.rosters
    }

    /// Resolve a sector filter into scan symbols.
    ///
    /// `All` concatenates the default rosters (capped). A specific sector
    /// uses the search override when it yields symbols and falls back to the
    /// default roster otherwise, then appends user-added symbols.
    pub async fn resolve(&self, sector: SectorId) -> Vec<String> {
        if sector == SectorId::All {
            return self.rosters.all_symbols();
        }

        let mut symbols = match self.search_override(sector).await {
            Some(found) => found,
            None => self.rosters.roster(sector).to_vec(),
        };

        if let Some(store) = &self.store {
            match store.symbols(sector) {
                Ok(extra) => {
                    for symbol in extra {
                        if !symbols.contains(&symbol) {
                            symbols.push(symbol);
                        }
                    }
                }
                Err(e) => warn!("Failed to read {} roster additions: {}", sector, e),
            }
        }

        symbols.truncate(MAX_UNIVERSE);
        debug!("Resolved {} universe to {} symbols", sector, symbols.len());
        symbols
    }

    /// Search results for a sector, or `None` when the search is disabled,
    /// fails, times out, or returns nothing usable.
    async fn search_override(&self, sector: SectorId) -> Option<Vec<String>> {
        let search = self.search.as_ref()?;
        let query = format!("{} stocks", sector.name());

        let found = match tokio::time::timeout(self.search_timeout, search.search(&query)).await {
            Ok(Ok(found)) => found,
            Ok(Err(e)) => {
                warn!("Symbol search for {} failed, using default roster: {}", sector, e);
                return None;
            }
            Err(_) => {
                warn!("Symbol search for {} timed out, using default roster", sector);
                return None;
            }
        };

        let mut symbols: Vec<String> = Vec::new();
        for m in found {
            let symbol = m.symbol.trim().to_uppercase();
            if !symbol.is_empty() && !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }

        if symbols.is_empty() {
            debug!("Symbol search for {} returned nothing, using default roster", sector);
            None
        } else {
            Some(symbols)
        }
    }
}
