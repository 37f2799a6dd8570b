use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::Level;
use waybill_aggregator::AggregatorConfig;

#[derive(Debug, Parser)]
#[command(name = "waybill")]
#[command(about = "Sync shipment tracking through the carrier-tracking aggregator")]
#[command(version)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) aggregator: AggregatorArgs,

    /// TOML file with skip rules; built-in rules are used when absent
    #[arg(long, env = "WAYBILL_SKIP_RULES")]
    pub(crate) skip_rules: Option<PathBuf>,

    /// Maximum number of shipments synced at the same time
    #[arg(long, env = "WAYBILL_CONCURRENCY", default_value_t = 4)]
    pub(crate) concurrency: usize,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "WAYBILL_LOG_LEVEL", value_enum, default_value = "info")]
    pub(crate) log_level: LogLevel,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, clap::Args)]
pub(crate) struct AggregatorArgs {
    /// Aggregator API root
    #[arg(long, env = "WAYBILL_BASE_URL")]
    pub(crate) base_url: String,

    /// Aggregator API key
    #[arg(long, env = "WAYBILL_API_KEY", hide_env_values = true)]
    pub(crate) api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "WAYBILL_TIMEOUT_SECS", default_value_t = 30)]
    pub(crate) timeout_secs: u64,
}

impl AggregatorArgs {
    pub(crate) fn into_config(self) -> AggregatorConfig {
        AggregatorConfig::new(self.base_url, self.api_key)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Sync a single tracking number and print its snapshot
    Track {
        /// Carrier tracking number
        number: String,
        /// Reference shown on the aggregator side, e.g. the part name
        #[arg(short = 'r', long)]
        reference: Option<String>,
        /// Carrier name, checked against the skip rules
        #[arg(short = 'c', long)]
        carrier: Option<String>,
    },
    /// Refresh every in-flight shipment of an owner from a JSON shipment file
    Refresh {
        /// JSON file holding an array of shipment records
        #[arg(short = 's', long)]
        shipments: PathBuf,
        /// Owner whose shipments are refreshed
        #[arg(short = 'o', long)]
        owner: String,
    },
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub(crate) enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

pub(crate) fn setup_tracing(log_level: LogLevel) {
    let level: Level = log_level.into();
    let default_filter =
        format!("waybill={level},waybill_core={level},waybill_aggregator={level}");

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_track_command() {
        let cli = Cli::try_parse_from([
            "waybill",
            "--base-url",
            "https://aggregator.example/v1",
            "--api-key",
            "secret",
            "--timeout-secs",
            "5",
            "track",
            "1Z999AA10123456784",
            "--reference",
            "Brake caliper",
        ])
        .unwrap();

        let config = cli.aggregator.into_config();
        assert_eq!(config.base_url, "https://aggregator.example/v1");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(matches!(
            cli.command,
            Command::Track { ref number, reference: Some(ref reference), carrier: None }
                if number == "1Z999AA10123456784" && reference == "Brake caliper"
        ));
    }

    #[test]
    fn parses_refresh_command() {
        let cli = Cli::try_parse_from([
            "waybill",
            "--base-url",
            "https://aggregator.example/v1",
            "--concurrency",
            "2",
            "refresh",
            "--shipments",
            "shipments.json",
            "--owner",
            "alice",
        ])
        .unwrap();

        assert_eq!(cli.concurrency, 2);
        assert!(matches!(
            cli.command,
            Command::Refresh { ref owner, .. } if owner == "alice"
        ));
    }

    #[test]
    fn every_global_option_is_documented() {
        let command = Cli::command();
        let undocumented: Vec<_> = command
            .get_arguments()
            .filter(|arg| !arg.is_positional() && arg.get_help().is_none())
            .map(|arg| arg.get_id().to_string())
            .collect();

        assert!(undocumented.is_empty(), "undocumented options: {undocumented:?}");
    }
}
