//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Lineage Replay - drives the catalog lineage listener from a scripted session
#[derive(Parser, Debug)]
#[command(
    name = "lineage-replay",
    author,
    version,
    about = "Replay catalog lifecycle events through the lineage listener",
    long_about = "Initializes the lineage listener from a config file or flat properties,\n\
                  replays a built-in or recorded sequence of catalog lifecycle events,\n\
                  and prints delivery statistics."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LINEAGE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "LINEAGE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay events through the listener
    Replay(ReplayArgs),

    /// Validate configuration and print the effective settings
    Validate(ValidateArgs),
}

/// Where the listener configuration comes from
#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "LINEAGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Flat host property, e.g. `--set transport.type=file` (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", conflicts_with = "config")]
    pub properties: Vec<String>,
}

/// Arguments for the `replay` command
#[derive(Parser, Debug, Clone)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub source: ConfigArgs,

    /// JSON array of lifecycle events (built-in session when omitted)
    #[arg(short, long)]
    pub events: Option<PathBuf>,

    /// Number of times to replay the event list
    #[arg(long, default_value = "1")]
    pub repeat: u32,

    /// How long to wait for outstanding deliveries before stopping
    #[arg(long, default_value = "5000", value_name = "MILLIS")]
    pub drain_millis: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "LINEAGE_METRICS_PORT")]
    pub metrics_port: u16,

    /// Print final statistics as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: ConfigArgs,

    /// Output effective configuration as JSON instead of TOML
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replay_with_properties() {
        let cli = Cli::try_parse_from([
            "lineage-replay",
            "replay",
            "--set",
            "transport.type=console",
            "--set",
            "namespace=lake",
            "--repeat",
            "3",
        ])
        .unwrap();
        let Commands::Replay(args) = cli.command else {
            panic!("expected replay");
        };
        assert_eq!(args.source.properties.len(), 2);
        assert_eq!(args.repeat, 3);
        assert!(args.source.config.is_none());
    }

    #[test]
    fn test_config_conflicts_with_properties() {
        let result = Cli::try_parse_from([
            "lineage-replay",
            "validate",
            "--config",
            "listener.toml",
            "--set",
            "namespace=lake",
        ]);
        assert!(result.is_err());
    }
}
