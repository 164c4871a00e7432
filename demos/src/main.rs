//! # Lineage Replay
//!
//! 血缘监听器的命令行回放工具。
//!
//! 提供：
//! - 配置加载与验证 (文件或扁平属性)
//! - 内置或录制事件序列的回放
//! - 投递统计输出

mod cli;
mod commands;
mod script;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_replay, run_validate};

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: None,
        default_log_level: default_log_level(&cli).to_string(),
    })?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Lineage replay starting"
    );

    let result = match &cli.command {
        Commands::Replay(args) => run_replay(args),
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

fn default_log_level(cli: &Cli) -> &'static str {
    if cli.quiet {
        return "warn";
    }
    match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}
