//! Ship lines read from stdin as log events

use clap::{Parser, ValueEnum};
use log_shipper::{Attribute, Result, Shipper, ShipperConfig, ShipperError};
use std::io::BufRead;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Parser)]
#[command(version, about = "Ship stdin lines to a log ingestion endpoint")]
struct Args {
    /// Service name attached to every event
    #[arg(long)]
    service_name: Option<String>,

    /// Ingestion host
    #[arg(long)]
    endpoint: Option<String>,

    /// Ingestion token
    #[arg(long, env = "LOG_SHIPPER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Use plain http
    #[arg(long)]
    insecure: bool,

    /// Level used for every line
    #[arg(long, value_enum, default_value_t = Level::Info)]
    level: Level,

    /// Extra attribute as KEY=VALUE, may be repeated
    #[arg(long = "attr", value_parser = parse_attribute)]
    attrs: Vec<Attribute>,
}

fn parse_attribute(raw: &str) -> std::result::Result<Attribute, String> {
    raw.split_once('=')
        .map(|(key, value)| Attribute::new(key, value))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))
}

fn main() -> Result<()> {
    initialize_tracing();

    let args = Args::parse();

    let mut config = ShipperConfig::from_env();
    if let Some(service_name) = args.service_name {
        config.service_name = service_name;
    }
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(token) = args.token {
        config.token = token;
    }
    if args.insecure {
        config.insecure = true;
    }

    info!(
        "Shipping stdin for service {} to {}",
        config.service_name,
        config.target_url()
    );

    let shipper = Shipper::start(config)?;

    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                shipper.shutdown();
                return Err(ShipperError::Io(e));
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match args.level {
            Level::Debug => shipper.debug(&line, &args.attrs),
            Level::Info => shipper.info(&line, &args.attrs),
            Level::Warn => shipper.warn(&line, &args.attrs),
            Level::Error => shipper.error(&line, None, &args.attrs),
        }
    }

    shipper.shutdown();
    Ok(())
}

/// Initialize structured diagnostics on stderr
fn initialize_tracing() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .json();

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
