//! Hestia - Entry point
//!
//! Loads configuration, initializes telemetry and serves the item API
//! until SIGTERM or SIGINT.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use hestia_config::{ConfigLoader, HestiaConfig};
use hestia_server::ShutdownSignal;

/// Default configuration file, read when present.
const DEFAULT_CONFIG_FILE: &str = "hestia.toml";

/// Prefix for `HESTIA__SECTION__KEY` environment overrides.
const ENV_PREFIX: &str = "HESTIA";

#[derive(Parser, Debug)]
#[command(name = "hestia", version)]
#[command(about = "In-memory item catalogue over HTTP", long_about = None)]
struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(short, long, env = "HESTIA_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address, overriding `server.http_addr`
    #[arg(short, long)]
    addr: Option<String>,

    /// Start from the development preset (pretty debug logs)
    #[arg(long)]
    dev: bool,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<HestiaConfig> {
        let loader = if self.dev {
            ConfigLoader::new().with_development()
        } else {
            ConfigLoader::new().with_defaults()
        };

        let loader = match &self.config {
            Some(path) => loader
                .with_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => loader.with_optional_file(DEFAULT_CONFIG_FILE)?,
        };

        let mut config = loader
            .with_dotenv()?
            .with_env_prefix(ENV_PREFIX)
            .load()
            .context("Invalid configuration")?;

        if let Some(addr) = &self.addr {
            config.server.http_addr.clone_from(addr);
            config.validate().context("Invalid --addr")?;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    hestia_telemetry::init_telemetry(&hestia::telemetry_config(&config))
        .context("Failed to initialize telemetry")?;

    tracing::info!(addr = %config.server.http_addr, "Configuration loaded");

    hestia::run(&config, ShutdownSignal::with_os_signals())
        .await
        .context("Server error")?;

    Ok(())
}
