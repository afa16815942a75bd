//! swarmgate - gated Prometheus exporter for swarm services
//!
//! Usage:
//!     swarmgate --service <name> [--config <path>]
//!
//! See --help for more options.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use swarmgate::config::{load_config, validate_config, Config};
use swarmgate::gate::{AccessGate, GateSettings};
use swarmgate::metrics::{exporter_handler, MetricsCollector};
use swarmgate::resolver::MembershipResolver;
use swarmgate::server::ExporterServer;
use swarmgate::util::{init_logging, ShutdownSignal};

/// Prometheus exporter that only admits tasks of a swarm service.
#[derive(Parser, Debug)]
#[command(name = "swarmgate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Swarm service allowed to scrape (empty disables access control)
    #[arg(short, long, value_name = "NAME")]
    service: Option<String>,

    /// Address to serve metrics on
    #[arg(long, value_name = "ADDR")]
    listen: Option<SocketAddr>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => load_config(path).with_context(|| {
            format!("failed to load configuration from '{}'", path.display())
        })?,
        None => Config::default(),
    };

    // CLI overrides config
    if let Some(service) = cli.service {
        config.access.service = service;
    }
    if let Some(listen) = cli.listen {
        config.server.address = listen;
    }
    if let Some(level) = cli.log_level {
        config.global.log_level = level;
    }
    validate_config(&config)
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;

    init_logging(&config.global.log_level, &config.global.log_format)
        .context("failed to initialize logging")?;

    if cli.validate {
        info!("Configuration is valid");
        println!("Configuration is valid.");
        println!("  Listen: {}{}", config.server.address, config.server.path);
        if config.access.service.is_empty() {
            println!("  Service: <none, access control disabled>");
        } else {
            println!(
                "  Service: {} (lookup {}{})",
                config.access.service, config.access.lookup_prefix, config.access.service
            );
        }
        return Ok(());
    }

    info!(
        address = %config.server.address,
        path = %config.server.path,
        service = %config.access.service,
        lookup_prefix = %config.access.lookup_prefix,
        "swarmgate starting"
    );

    run(config)
}

/// Run the exporter with the given configuration.
fn run(config: Config) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    runtime.block_on(async { run_async(config).await })
}

async fn run_async(config: Config) -> Result<()> {
    let shutdown = ShutdownSignal::new();
    let collector = MetricsCollector::new();

    let resolver = MembershipResolver::system()
        .with_prefix(config.access.lookup_prefix.clone())
        .with_metrics(collector.clone());
    let gate = AccessGate::new(Arc::new(resolver), Arc::new(GateSettings::new()))
        .with_metrics(collector.clone());
    let handler = gate.handler(&config.access.service, exporter_handler(collector));

    let server = ExporterServer::bind(config.server.address, &config.server.path, handler)
        .await
        .with_context(|| format!("failed to bind metrics server on {}", config.server.address))?;

    let handle = tokio::spawn(server.run(shutdown.subscribe()));

    info!("swarmgate is running");
    info!("press Ctrl+C to stop");

    shutdown.shutdown_on_ctrl_c().await;

    let _ = handle.await;

    info!("swarmgate shut down complete");
    Ok(())
}
