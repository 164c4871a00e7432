//! `validate` command implementation.

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{ListenerConfig, TransportKind};
use tracing::info;

use super::resolve_config;
use crate::cli::ValidateArgs;

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    let config = resolve_config(&args.source)?;
    info!("Configuration is valid");

    for warning in collect_warnings(&config) {
        eprintln!("warning: {warning}");
    }

    let rendered = if args.json {
        ConfigLoader::to_json(&config)
    } else {
        ConfigLoader::to_toml(&config)
    }
    .context("Failed to render effective configuration")?;
    println!("{rendered}");
    Ok(())
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &ListenerConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let transport = &config.transport;

    if transport.kind == TransportKind::Http
        && transport.url.as_deref().map_or(true, |u| u.trim().is_empty())
    {
        warnings.push("transport.url is empty - records will go to the console".to_string());
    }
    if transport.kind != TransportKind::Http && transport.auth.is_some() {
        warnings.push(format!(
            "transport.auth is ignored by the {} transport",
            transport.kind.as_str()
        ));
    }
    if !config.tenant.required {
        warnings.push("tenant.required is off - events without a tenant are emitted".to_string());
    }
    if transport.retry.total <= 1 {
        warnings.push("transport.retry.total <= 1 - failed deliveries are not retried".to_string());
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_no_warnings() {
        assert!(collect_warnings(&ListenerConfig::default()).is_empty());
    }

    #[test]
    fn test_http_without_url_warns() {
        let mut config = ListenerConfig::default();
        config.transport.kind = TransportKind::Http;
        config.tenant.required = false;

        let warnings = collect_warnings(&config);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("transport.url"));
    }
}
