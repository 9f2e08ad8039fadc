//! Issuewarden entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration** — merge the TOML file with flags and env vars.
//! 2. **Wire observability** — install `tracing-subscriber` (text or JSON) and,
//!    when an endpoint is configured, an OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure** — build the `GithubClient` and the rule
//!    registry, and inject both into the `IssueProcessor`.
//! 4. **Serve** — run the webhook listener until Ctrl-C.

mod config;
mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use github::{GithubClient, GithubConfig};
use listener::{build_router, run_server, ListenerState};
use pipeline::{IssueClient, IssueProcessor};
use tracing::{info, warn};

use crate::config::{Cli, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli).context("Failed to load configuration")?;
    let _telemetry = telemetry::init(config.log_format, config.otlp_endpoint.as_deref())?;

    let client: Arc<dyn IssueClient> = Arc::new(
        GithubClient::new(GithubConfig {
            api_base: config.api_base.clone(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            token: config.access_token.clone(),
            timeout: config.request_timeout,
        })
        .context("Failed to create GitHub client")?,
    );

    let rules = Arc::new(config.rule_set());
    info!(
        repository = %format!("{}/{}", config.owner, config.repo),
        rules = ?rules,
        signed = config.webhook_secret.is_some(),
        "starting issuewarden"
    );

    let processor = IssueProcessor::new(client, rules);
    let state = Arc::new(ListenerState::new(processor, config.webhook_secret.clone()));
    let router = build_router(state, config.body_limit);

    run_server(router, &config.http_listen, shutdown_signal()).await?;
    info!("issuewarden stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
