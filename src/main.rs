//  ██████╗ ██████╗ ███╗   ███╗██████╗ ███████╗████████╗██╗████████╗ ██████╗ ██████╗
// ██╔════╝██╔═══██╗████╗ ████║██╔══██╗██╔════╝╚══██╔══╝██║╚══██╔══╝██╔═══██╗██╔══██╗
// ██║     ██║   ██║██╔████╔██║██████╔╝█████╗     ██║   ██║   ██║   ██║   ██║██████╔╝
// ██║     ██║   ██║██║╚██╔╝██║██╔═══╝ ██╔══╝     ██║   ██║   ██║   ██║   ██║██╔══██╗
// ╚██████╗╚██████╔╝██║ ╚═╝ ██║██║     ███████╗   ██║   ██║   ██║   ╚██████╔╝██║  ██║
//  ╚═════╝ ╚═════╝ ╚═╝     ╚═╝╚═╝     ╚══════╝   ╚═╝   ╚═╝   ╚═╝    ╚═════╝ ╚═╝  ╚═╝
//
// S C A N   E N G I N E
//
// Who are my category peers, and what have they been doing in the press?
// One request in, one fan-out to the news wire, one ranked report out.

mod catalog;
mod circuit_breaker;
mod config;
mod error;
mod metrics;
mod models;
mod peer_cache;
mod recommendation;
mod scan;
mod server;
mod sources;
mod text_scanner;

use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::metrics::MetricsCollector;
use crate::scan::CompetitorScanner;
use crate::server::AppState;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(true).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(Config::from_env());
    init_tracing(config.log_json);

    info!(
        bind_addr = config.bind_addr.as_str(),
        live = config.has_news_api_key(),
        max_peers = config.max_peers,
        fetch_timeout_ms = config.fetch_timeout.as_millis() as u64,
        "Competitor scan engine starting"
    );

    let metrics = Arc::new(MetricsCollector::new());
    let scanner = CompetitorScanner::from_config(config.clone(), metrics)
        .context("failed to build the news API client")?;
    let state = AppState::new(Arc::new(scanner));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    server::run_server(listener, state).await?;

    info!("Competitor scan engine stopped");
    Ok(())
}
