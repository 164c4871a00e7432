//! `replay` command implementation.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use lineage_listener::{LineageListener, ListenerStats};
use serde_json::json;
use tracing::{info, warn};

use super::resolve_config;
use crate::cli::ReplayArgs;
use crate::script;

/// Execute the `replay` command
pub fn run_replay(args: &ReplayArgs) -> Result<()> {
    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let config = resolve_config(&args.source)?;
    let events = match &args.events {
        Some(path) => script::load_events(path)?,
        None => script::builtin_session(now_ms()),
    };
    info!(
        events = events.len(),
        repeat = args.repeat,
        transport = config.transport.kind.as_str(),
        "Starting replay"
    );

    let mut listener = LineageListener::new();
    listener
        .init_with_config(config)
        .context("Failed to initialize listener")?;
    listener.start().context("Failed to start listener")?;

    let started = Instant::now();
    for round in 0..args.repeat {
        for event in &events {
            listener.on_post_event(event);
        }
        info!(round = round + 1, "Round replayed");
    }

    if !drain(&listener, Duration::from_millis(args.drain_millis)) {
        warn!(
            outstanding = listener.stats().pipeline.outstanding,
            "Deliveries still outstanding, stopping anyway"
        );
    }

    let stats = listener.stop().context("Failed to stop listener")?;
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "Replay finished");

    if args.json {
        let json = serde_json::to_string_pretty(&stats_json(&stats))
            .context("Failed to serialize statistics")?;
        println!("{json}");
    } else {
        println!("{stats}");
    }
    Ok(())
}

/// Wait until every accepted record is settled
fn drain(listener: &LineageListener, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if listener.stats().pipeline.outstanding == 0 {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn stats_json(stats: &ListenerStats) -> serde_json::Value {
    let i = &stats.ingress;
    let p = &stats.pipeline;
    json!({
        "ingress": {
            "received": i.received,
            "converted": i.converted,
            "unsupported": i.unsupported,
            "rejected": i.rejected,
            "failed": i.failed,
        },
        "delivery": {
            "submitted": p.submitted,
            "delivered": p.delivered,
            "delivery_rate": stats.delivery_rate(),
            "dropped": p.dropped,
            "failed_attempts": p.failed_attempts,
            "exhausted": p.exhausted,
            "abandoned": p.abandoned,
            "max_in_flight": p.max_in_flight,
            "outstanding": p.outstanding,
            "latency_ms": {
                "count": p.delivery_latency_ms.count,
                "min": p.delivery_latency_ms.min,
                "max": p.delivery_latency_ms.max,
                "mean": p.delivery_latency_ms.mean,
                "std_dev": p.delivery_latency_ms.std_dev,
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ConfigArgs;

    fn file_args(path: &std::path::Path) -> ReplayArgs {
        ReplayArgs {
            source: ConfigArgs {
                config: None,
                properties: vec![
                    "transport.type=file".to_string(),
                    format!("transport.file.path={}", path.display()),
                ],
            },
            events: None,
            repeat: 2,
            drain_millis: 5000,
            metrics_port: 0,
            json: true,
        }
    }

    #[test]
    fn test_replay_writes_every_routed_event() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("lineage.jsonl");

        run_replay(&file_args(&out)).unwrap();

        let routed = script::builtin_session(0).len() - 1;
        let lines = std::fs::read_to_string(&out).unwrap();
        assert_eq!(lines.lines().count(), routed * 2);
        for line in lines.lines() {
            let record: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(record["eventType"], "COMPLETE");
        }
    }

    #[test]
    fn test_replay_rejects_bad_properties() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = file_args(&dir.path().join("out.jsonl"));
        args.source.properties.push("broken".to_string());
        assert!(run_replay(&args).is_err());
    }
}
