// Syslog relay - vendor syslog in, Wazuh-ready JSON out

mod config;
mod relay;

use clap::{Parser, Subcommand};
use config::{load_config, LoggingConfig, RelayConfig};
use relay::{Relay, RelayError};
use relay_core::line::decode_datagram;
use relay_core::DecoderRegistry;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::task::JoinSet;
use tracing::{error, info};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "syslog-relay")]
#[command(version)]
#[command(about = "Decode vendor syslog into JSON and relay it over UDP", long_about = None)]
struct Cli {
    /// Path to TOML config (built-in defaults when omitted)
    #[arg(short, long, env = "SYSLOG_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level / filter directive, overrides the config file
    #[arg(short = 'L', long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Listen for syslog datagrams and forward decoded JSON (default)
    Serve,

    /// Decode lines from stdin and print the result, one per line
    Decode {
        /// Vendor dialect (stormshield, synology)
        #[arg(short, long)]
        vendor: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    let command = cli.command.unwrap_or(Commands::Serve);

    // decoded output owns stdout in decode mode
    let to_stderr = matches!(command, Commands::Decode { .. });
    init_tracing(&config.logging, cli.log_level.as_deref(), to_stderr)?;

    let registry = DecoderRegistry::with_builtin()?;

    match command {
        Commands::Serve => serve(&config, &registry).await?,
        Commands::Decode { vendor } => decode_stdin(&registry, &vendor).await?,
    }
    Ok(())
}

fn init_tracing(
    logging: &LoggingConfig,
    level_override: Option<&str>,
    to_stderr: bool,
) -> Result<(), std::io::Error> {
    let level = level_override.unwrap_or(logging.level.as_str());
    let filter = EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    let console = if to_stderr {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        BoxMakeWriter::new(std::io::stdout)
    };

    let file_layer = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(console))
        .with(file_layer)
        .init();
    Ok(())
}

async fn serve(config: &RelayConfig, registry: &DecoderRegistry) -> Result<(), Box<dyn std::error::Error>> {
    config.validate(&registry.vendors())?;

    info!("{}", "=".repeat(60));
    info!("SYSLOG RELAY -> JSON FOR WAZUH");
    info!("{}", "=".repeat(60));

    // bind everything up front so a port conflict stops startup
    let mut relays = Vec::new();
    for listener in config.enabled_listeners() {
        let decoder = registry
            .get(&listener.vendor)
            .ok_or_else(|| RelayError::UnknownVendor(listener.vendor.clone()))?;
        let relay = Relay::bind(listener, decoder).await.inspect_err(|e| {
            error!(vendor = %listener.vendor, "{}", e);
        })?;
        info!(
            vendor = %listener.vendor,
            listen = %listener.listen,
            forward = %listener.forward,
            max_datagram = listener.max_datagram(),
            "Listener configured"
        );
        relays.push(relay);
    }
    info!("Output: JSON format (Wazuh native decoder)");

    let counters: Vec<(String, Arc<AtomicU64>)> = config
        .enabled_listeners()
        .map(|l| l.vendor.clone())
        .zip(relays.iter().map(Relay::processed))
        .collect();

    let mut tasks = JoinSet::new();
    for relay in relays {
        tasks.spawn(relay.run());
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Err(e)) => error!("Relay stopped: {}", e),
                Err(e) => error!("Relay task failed: {}", e),
                Ok(Ok(())) => {}
            }
        }
    }
    tasks.shutdown().await;

    for (vendor, processed) in &counters {
        info!(
            vendor = %vendor,
            "Total messages processed: {}",
            processed.load(Ordering::Relaxed)
        );
    }
    info!("Relay stopped");
    Ok(())
}

async fn decode_stdin(registry: &DecoderRegistry, vendor: &str) -> Result<(), RelayError> {
    let decoder = registry
        .get(vendor)
        .ok_or_else(|| RelayError::UnknownVendor(vendor.to_string()))?;

    // split on raw bytes so invalid UTF-8 is replaced, not an error
    let mut lines = BufReader::new(tokio::io::stdin()).split(b'\n');
    let mut stdout = tokio::io::stdout();
    while let Some(bytes) = lines.next_segment().await? {
        let line = decode_datagram(&bytes);
        let output = decoder.process(&line);
        stdout.write_all(output.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }
    stdout.flush().await?;
    Ok(())
}
