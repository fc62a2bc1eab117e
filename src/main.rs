//! Fedora Indexer - feeds repository change events into downstream indexes
//!
//! Usage:
//!   fedora-indexer --config indexer.toml listen
//!   fedora-indexer --config indexer.toml reindex --uri http://localhost:8080/rest/objects

use clap::{Parser, Subcommand};
use fedora_indexer::config::{IndexerConfig, SourceConfig};
use fedora_indexer::http::start_server_with_shutdown;
#[cfg(not(windows))]
use fedora_indexer::sources::KafkaSource;
use fedora_indexer::sources::{EventPipeline, MqttSource};
use fedora_indexer::IndexerGroup;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fedora-indexer")]
#[command(about = "Dispatch repository change events to search and triple-store indexes")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, default_value = "indexer.toml")]
    config: PathBuf,

    /// Override the repository URL from the configuration file
    #[arg(long)]
    repository_url: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Consume repository events and serve the control endpoint until Ctrl+C
    Listen,
    /// Reindex a resource (and its descendants) once, then exit
    Reindex {
        /// Resource to start from, defaults to the repository root
        #[arg(long)]
        uri: Option<String>,

        /// Only reindex the resource itself
        #[arg(long)]
        no_recursive: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("fedora_indexer=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fedora_indexer=info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = IndexerConfig::load(&cli.config)?;
    if let Some(url) = cli.repository_url {
        config.repository_url = url;
        config.validate()?;
    }

    let group = Arc::new(IndexerGroup::new(
        &config.repository_url,
        config.build_indexers()?,
        config.credentials(),
    )?);

    match cli.command {
        Command::Listen => listen(&config, &group),
        Command::Reindex { uri, no_recursive } => {
            let uri = uri.unwrap_or_else(|| config.repository_url.clone());
            let report = group.reindex(&uri, !no_recursive);
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

fn listen(config: &IndexerConfig, group: &Arc<IndexerGroup>) -> Result<(), Box<dyn std::error::Error>> {
    let mut pipeline = EventPipeline::new(Arc::clone(group));
    match &config.source {
        SourceConfig::Mqtt { connection, .. } => pipeline.add_source(Box::new(MqttSource::new(connection)?)),
        #[cfg(not(windows))]
        SourceConfig::Kafka { connection, .. } => pipeline.add_source(Box::new(KafkaSource::new(connection)?)),
        SourceConfig::None => tracing::warn!("No event source configured, only the control endpoint is served"),
    }
    pipeline.start(config.source.topics().to_vec())?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let shutdown_tx = Mutex::new(Some(shutdown_tx));
    ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl+C, stopping...");
        if let Some(tx) = shutdown_tx.lock().ok().and_then(|mut tx| tx.take()) {
            let _ = tx.send(());
        }
    })?;

    // The group stays owned here so its blocking HTTP clients are never dropped
    // on a runtime thread.
    let runtime = tokio::runtime::Runtime::new()?;
    let served = runtime.block_on(start_server_with_shutdown(
        &config.server.address(),
        Arc::clone(group),
        async move {
            let _ = shutdown_rx.await;
        },
    ));
    drop(runtime);

    pipeline.stop()?;
    tracing::info!("Indexer stopped");
    served
}
