//! CLI command implementations
//!
//! `serve` boot sequence:
//! 1. Configuration load
//! 2. Schema load
//! 3. Record store open (local directory + remote backing)
//! 4. Notifier selection
//! 5. HTTP listener

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::info;

use crate::auth::ApiKey;
use crate::config::{RemoteConfig, ServiceConfig};
use crate::http_server::{AppState, HttpServer};
use crate::notify::{HttpNotifier, NoopNotifier, Notifier};
use crate::observability::{init_logging, Event, LogFormat};
use crate::schema::{to_wire, SchemaLoader};
use crate::store::{Backing, DirectoryBacking, LocalStore, TieredStore};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Main CLI entry point
///
/// Parses arguments, installs logging and dispatches.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    init_logging(cli.verbose, format);
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config, &mut io::stdout()),
        Command::Serve { config } => serve(&config),
        Command::Schemas { config } => schemas(&config, &mut io::stdout()),
    }
}

/// Write a starter configuration file.
///
/// Refuses to overwrite an existing file.
pub fn init(config_path: &Path, out: &mut impl Write) -> CliResult<()> {
    if config_path.exists() {
        return Err(CliError::AlreadyInitialized(config_path.to_path_buf()));
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let config = ServiceConfig::new("change-me");
    fs::write(config_path, serde_json::to_vec_pretty(&config)?)?;

    write_response(out, json!({ "config": config_path.display().to_string() }))
}

/// Print every loaded schema in its file format
pub fn schemas(config_path: &Path, out: &mut impl Write) -> CliResult<()> {
    let config = load_config(config_path)?;
    let loader = load_schemas(&config)?;

    let mut all = Map::new();
    for schema in loader.all_schemas() {
        all.insert(schema.name.clone(), to_wire(schema));
    }

    write_response(out, Value::Object(all))
}

/// Boot and serve until the process exits
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let schemas = load_schemas(&config)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::BootFailed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        let state = build_state(&config, schemas).await?;
        HttpServer::new(config.http.clone(), Arc::new(state))
            .start()
            .await
            .map_err(|e| CliError::BootFailed(format!("HTTP server failed: {}", e)))
    })
}

fn load_config(config_path: &Path) -> CliResult<ServiceConfig> {
    let config = ServiceConfig::load(config_path)?;
    info!(event = %Event::ConfigLoaded, path = %config_path.display(), "configuration loaded");
    Ok(config)
}

/// Schema directory from the config, or the built-in set
pub fn load_schemas(config: &ServiceConfig) -> CliResult<SchemaLoader> {
    let loader = match &config.schema_dir {
        Some(dir) => {
            let mut loader = SchemaLoader::new(dir);
            loader.load_all()?;
            loader
        }
        None => SchemaLoader::builtin()?,
    };

    info!(
        event = %Event::SchemasLoaded,
        count = loader.schema_count(),
        builtin = config.schema_dir.is_none(),
        "schemas loaded"
    );
    Ok(loader)
}

/// Wire the handler state from configuration
pub async fn build_state(config: &ServiceConfig, schemas: SchemaLoader) -> CliResult<AppState> {
    let local = LocalStore::open(config.local_dir.clone())?;
    let remote = build_backing(config).await?;
    let store = TieredStore::new(local, remote, config.async_timeout());

    let webhook = config.webhook();
    let notifier: Arc<dyn Notifier> = if webhook.is_some() {
        Arc::new(HttpNotifier::new())
    } else {
        Arc::new(NoopNotifier)
    };

    Ok(
        AppState::new(schemas, ApiKey::new(config.api_key.clone()), store, notifier)
            .with_webhook(webhook)
            .with_card_image_url(config.card_image_url.clone()),
    )
}

async fn build_backing(config: &ServiceConfig) -> CliResult<Arc<dyn Backing>> {
    match &config.remote {
        RemoteConfig::Directory { root } => Ok(Arc::new(DirectoryBacking::new(
            root.clone(),
            config.remote_prefix.clone(),
        ))),
        #[cfg(feature = "s3")]
        RemoteConfig::S3 { bucket } => Ok(Arc::new(
            crate::store::S3Backing::from_env(bucket.clone(), config.remote_prefix.clone()).await,
        )),
        #[cfg(not(feature = "s3"))]
        RemoteConfig::S3 { .. } => Err(CliError::Config(
            "remote kind 's3' needs a build with the 's3' feature".into(),
        )),
    }
}

/// Write a success response as one JSON line
fn write_response(out: &mut impl Write, data: Value) -> CliResult<()> {
    let response = json!({
        "status": "ok",
        "data": data
    });

    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}
