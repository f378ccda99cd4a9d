use patternscope::config::Config;
use patternscope::services::{RosterStore, SectorRosters};
use patternscope::sources::{AnthropicClient, YahooFinanceClient};
use patternscope::{app, AppState, Collaborators};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "patternscope=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting PatternScope server on {}:{}", config.host, config.port);

    // Open the sector roster store
    if let Some(parent) = Path::new(&config.database_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let roster_store = Arc::new(RosterStore::new(&config.database_path)?);
    info!("Sector roster store at {}", config.database_path);

    // Market data
    let yahoo = Arc::new(YahooFinanceClient::new(config.scan.fetch_timeout()));

    // Language model
    let anthropic = Arc::new(AnthropicClient::new(
        config.anthropic.api_key.clone(),
        config.anthropic.model.clone(),
        config.anthropic.max_tokens,
        config.scan.analysis_timeout(),
    ));
    if !anthropic.is_configured() {
        warn!("ANTHROPIC_API_KEY not set, pattern scans and chat are disabled");
    }

    let collaborators = Collaborators {
        history: yahoo.clone(),
        search: yahoo,
        oracle: anthropic.clone(),
        assistant: anthropic,
    };

    let state = AppState::new(
        config.clone(),
        Arc::new(SectorRosters::defaults()),
        roster_store,
        collaborators,
    )?;

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("PatternScope server listening on {}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
