//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::auth::ApiKeyRing;
use crate::http_server::{AppState, HttpServer};
use crate::observability::{log_event_with_fields, Event, Logger, MetricsRegistry};
use crate::store::Store;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Serve { config, port } => serve(&config, port),
    }
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}

async fn open_store(config: &Config) -> CliResult<Store> {
    let store = Store::connect(
        &config.database_url,
        config.max_connections,
        Arc::new(MetricsRegistry::new()),
    )
    .await?;
    store.apply_schema().await?;
    log_event_with_fields(
        Event::SchemaApplied,
        &[("database_url", config.database_url.as_str())],
    );
    Ok(store)
}

/// Create the database and its tables. Safe to run against an existing
/// database.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);

    runtime()?.block_on(open_store(&config))?;

    write_response(json!({ "initialized": true }))
}

/// Boot the store and serve the HTTP API until the listener fails
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);

    let path = config_path.display().to_string();
    log_event_with_fields(Event::ConfigLoaded, &[("path", path.as_str())]);

    let http = config.http.clone().override_port(port);

    let rt = runtime()?;
    rt.block_on(async {
        let store = open_store(&config).await?;
        let state = Arc::new(AppState::new(
            store,
            ApiKeyRing::new(config.api_keys.clone()),
        ));
        let server = HttpServer::with_config(http, state);

        let addr = server.socket_addr();
        log_event_with_fields(Event::ServerStarting, &[("addr", addr.as_str())]);

        server.start().await.map_err(|e| {
            let reason = e.to_string();
            log_event_with_fields(Event::ServerFailed, &[("reason", reason.as_str())]);
            CliError::boot_failed(format!("HTTP server failed: {}", e))
        })
    })
}
