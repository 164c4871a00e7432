//! Command implementations.

mod replay;
mod validate;

pub use replay::run_replay;
pub use validate::run_validate;

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use config_loader::ConfigLoader;
use contracts::ListenerConfig;
use tracing::info;

use crate::cli::ConfigArgs;

/// Split a `KEY=VALUE` argument
pub(crate) fn parse_property(raw: &str) -> Result<(String, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("Expected KEY=VALUE, got '{raw}'");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("Empty property key in '{raw}'");
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Flat host properties from repeated `--set` arguments
pub(crate) fn collect_properties(raw: &[String]) -> Result<HashMap<String, String>> {
    raw.iter().map(|p| parse_property(p)).collect()
}

/// Build the listener configuration from a file or flat properties
pub(crate) fn resolve_config(source: &ConfigArgs) -> Result<ListenerConfig> {
    match &source.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration file");
            ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => {
            let props = collect_properties(&source.properties)?;
            info!(properties = props.len(), "Building configuration from properties");
            ConfigLoader::load_from_properties(&props).context("Invalid listener properties")
        }
    }
}
