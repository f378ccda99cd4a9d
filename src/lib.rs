//! PatternScope - candlestick pattern scanner and technical indicator server

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use axum::Router;
use config::Config;
use services::{ChartService, ChatService, PatternScanner, RosterStore, ScanBoard, ScanSettings, SectorRosters, UniverseResolver};
use sources::{ChatAssistant, PatternOracle, PriceHistory, SymbolSearch};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use types::IndicatorConfig;

/// External collaborators the services are built on.
#[derive(Clone)]
pub struct Collaborators {
    pub history: Arc<dyn PriceHistory>,
    pub search: Arc<dyn SymbolSearch>,
    pub oracle: Arc<dyn PatternOracle>,
    pub assistant: Arc<dyn ChatAssistant>,
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub charts: Arc<ChartService>,
    pub scanner: Arc<PatternScanner>,
    pub scans: Arc<ScanBoard>,
    pub chat: Arc<ChatService>,
    pub search: Arc<dyn SymbolSearch>,
    pub roster_store: Arc<RosterStore>,
}

impl AppState {
    /// Wire the services together.
    pub fn new(
        config: Arc<Config>,
        rosters: Arc<SectorRosters>,
        roster_store: Arc<RosterStore>,
        collaborators: Collaborators,
    ) -> anyhow::Result<Self> {
        let scan_config = &config.scan;

        let mut resolver = UniverseResolver::new(rosters).with_store(roster_store.clone());
        if scan_config.sector_search_enabled {
            resolver = resolver.with_search(collaborators.search.clone(), scan_config.fetch_timeout());
        }

        let scanner = PatternScanner::new(
            Arc::new(resolver),
            collaborators.history.clone(),
            collaborators.oracle,
            ScanSettings {
                lookback_days: scan_config.scan_lookback_days,
                fetch_timeout: scan_config.fetch_timeout(),
                analysis_timeout: scan_config.analysis_timeout(),
                ..ScanSettings::default()
            },
        )?;

        let charts = ChartService::new(
            collaborators.history.clone(),
            scan_config.chart_lookback_days,
            scan_config.fetch_timeout(),
        );

        let chat = ChatService::new(
            collaborators.history,
            collaborators.assistant,
            IndicatorConfig::defaults(),
            scan_config.analysis_timeout(),
        )?;

        Ok(Self {
            config,
            charts: Arc::new(charts),
            scanner: Arc::new(scanner),
            scans: Arc::new(ScanBoard::new()),
            chat: Arc::new(chat),
            search: collaborators.search,
            roster_store,
        })
    }
}

/// Full application router with CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
