//! 扁平属性解析
//!
//! 宿主以 `key -> value` 形式下发配置 (`transport.maxQueueSize = 10000`)。
//! 数值非法时记录 warn 并回退默认值；枚举取值未知时同样回退。

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use contracts::{
    AuthConfig, AuthKind, Compression, DropPolicy, ListenerConfig, SourceLabel, TransportKind,
};
use tracing::warn;

pub const NAMESPACE: &str = "namespace";
pub const PRODUCER: &str = "producer";
pub const TRANSPORT_TYPE: &str = "transport.type";
pub const TRANSPORT_URL: &str = "transport.url";
pub const TRANSPORT_ENDPOINT: &str = "transport.endpoint";
pub const TRANSPORT_TIMEOUT: &str = "transport.timeoutInMillis";
pub const TRANSPORT_COMPRESSION: &str = "transport.compression";
pub const TRANSPORT_AUTH_TYPE: &str = "transport.auth.type";
pub const TRANSPORT_AUTH_API_KEY: &str = "transport.auth.apiKey";
pub const TRANSPORT_HEADERS_PREFIX: &str = "transport.headers.";
pub const TRANSPORT_FILE_PATH: &str = "transport.file.path";
pub const TRANSPORT_MAX_QUEUE_SIZE: &str = "transport.maxQueueSize";
pub const TRANSPORT_MAX_CONCURRENT_REQUESTS: &str = "transport.maxConcurrentRequests";
pub const TRANSPORT_WORKERS: &str = "transport.workers";
pub const TRANSPORT_DROP_POLICY: &str = "transport.queue.dropPolicy";
pub const TRANSPORT_RETRY_TOTAL: &str = "transport.retry.total";
pub const TRANSPORT_RETRY_BACKOFF_FACTOR: &str = "transport.retry.backoffFactor";
pub const TENANT_REQUIRED: &str = "tenant.required";
pub const RUNTIME_WORKER_THREADS: &str = "runtime.workerThreads";
pub const SHUTDOWN_GRACE_MILLIS: &str = "shutdown.graceMillis";

/// 从扁平属性构建配置 (未校验)
pub fn from_properties(props: &HashMap<String, String>) -> ListenerConfig {
    let mut config = ListenerConfig::default();

    if let Some(ns) = non_empty(props, NAMESPACE) {
        config.namespace = SourceLabel::new(ns);
    }
    if let Some(producer) = non_empty(props, PRODUCER) {
        config.producer = producer.to_string();
    }

    let transport = &mut config.transport;
    transport.kind = transport_kind(props);
    transport.url = non_empty(props, TRANSPORT_URL).map(str::to_string);
    if let Some(endpoint) = non_empty(props, TRANSPORT_ENDPOINT) {
        transport.endpoint = endpoint.to_string();
    }
    transport.timeout_in_millis =
        value_or(props, TRANSPORT_TIMEOUT, transport.timeout_in_millis);
    transport.compression = compression(props);
    transport.auth = auth(props);
    transport.headers = props
        .iter()
        .filter_map(|(k, v)| {
            k.strip_prefix(TRANSPORT_HEADERS_PREFIX)
                .filter(|name| !name.is_empty())
                .map(|name| (name.to_string(), v.clone()))
        })
        .collect();
    if let Some(path) = non_empty(props, TRANSPORT_FILE_PATH) {
        transport.file.path = PathBuf::from(path);
    }
    transport.max_queue_size = value_or(props, TRANSPORT_MAX_QUEUE_SIZE, transport.max_queue_size);
    transport.max_concurrent_requests = value_or(
        props,
        TRANSPORT_MAX_CONCURRENT_REQUESTS,
        transport.max_concurrent_requests,
    );
    transport.workers = props
        .get(TRANSPORT_WORKERS)
        .and_then(|raw| parse_or_warn(TRANSPORT_WORKERS, raw));
    transport.queue.drop_policy = drop_policy(props);
    transport.retry.total = value_or(props, TRANSPORT_RETRY_TOTAL, transport.retry.total);
    transport.retry.backoff_factor = value_or(
        props,
        TRANSPORT_RETRY_BACKOFF_FACTOR,
        transport.retry.backoff_factor,
    );

    config.tenant.required = value_or(props, TENANT_REQUIRED, config.tenant.required);
    config.runtime.worker_threads =
        value_or(props, RUNTIME_WORKER_THREADS, config.runtime.worker_threads);
    config.shutdown.grace_millis =
        value_or(props, SHUTDOWN_GRACE_MILLIS, config.shutdown.grace_millis);

    config
}

fn non_empty<'a>(props: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    props
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn parse_or_warn<T: FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = raw, "Invalid value, using default");
            None
        }
    }
}

fn value_or<T: FromStr + Copy>(props: &HashMap<String, String>, key: &str, default: T) -> T {
    props
        .get(key)
        .and_then(|raw| parse_or_warn(key, raw))
        .unwrap_or(default)
}

fn transport_kind(props: &HashMap<String, String>) -> TransportKind {
    match non_empty(props, TRANSPORT_TYPE).map(str::to_ascii_lowercase).as_deref() {
        None | Some("console") => TransportKind::Console,
        Some("http") => TransportKind::Http,
        Some("file") => TransportKind::File,
        Some(other) => {
            warn!(transport = other, "Unknown transport type, falling back to console");
            TransportKind::Console
        }
    }
}

fn compression(props: &HashMap<String, String>) -> Option<Compression> {
    let raw = non_empty(props, TRANSPORT_COMPRESSION)?;
    if raw.eq_ignore_ascii_case("gzip") {
        Some(Compression::Gzip)
    } else {
        warn!(compression = raw, "Unsupported compression, sending uncompressed");
        None
    }
}

fn auth(props: &HashMap<String, String>) -> Option<AuthConfig> {
    let kind = non_empty(props, TRANSPORT_AUTH_TYPE)?;
    if !kind.eq_ignore_ascii_case("api_key") {
        warn!(auth = kind, "Unsupported auth type, ignoring");
        return None;
    }
    non_empty(props, TRANSPORT_AUTH_API_KEY).map(|key| AuthConfig {
        kind: AuthKind::ApiKey,
        api_key: key.to_string(),
    })
}

fn drop_policy(props: &HashMap<String, String>) -> DropPolicy {
    match non_empty(props, TRANSPORT_DROP_POLICY).map(str::to_ascii_lowercase).as_deref() {
        None | Some("drop_oldest") => DropPolicy::DropOldest,
        Some("drop_newest") => DropPolicy::DropNewest,
        Some(other) => {
            warn!(policy = other, "Unknown drop policy, using drop_oldest");
            DropPolicy::DropOldest
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_properties_use_defaults() {
        let config = from_properties(&HashMap::new());
        assert_eq!(config.namespace, "catalog");
        assert_eq!(config.transport.kind, TransportKind::Console);
        assert_eq!(config.transport.max_queue_size, 10_000);
        assert_eq!(config.transport.max_concurrent_requests, 100);
        assert_eq!(config.transport.retry.total, 5);
    }

    #[test]
    fn test_http_properties() {
        let config = from_properties(&props(&[
            ("namespace", "lake"),
            ("transport.type", "HTTP"),
            ("transport.url", "http://127.0.0.1:7000"),
            ("transport.endpoint", "/api/openlineage"),
            ("transport.timeoutInMillis", "2500"),
            ("transport.compression", "gzip"),
            ("transport.auth.type", "api_key"),
            ("transport.auth.apiKey", "secret"),
            ("transport.headers.X-Tenant", "t1"),
            ("transport.maxQueueSize", "16"),
            ("transport.maxConcurrentRequests", "4"),
            ("transport.retry.total", "3"),
            ("transport.retry.backoffFactor", "0.05"),
        ]));
        let t = &config.transport;
        assert_eq!(config.namespace, "lake");
        assert_eq!(t.kind, TransportKind::Http);
        assert_eq!(t.url.as_deref(), Some("http://127.0.0.1:7000"));
        assert_eq!(t.endpoint, "/api/openlineage");
        assert_eq!(t.timeout_in_millis, 2500);
        assert_eq!(t.compression, Some(Compression::Gzip));
        assert_eq!(t.auth.as_ref().map(|a| a.api_key.as_str()), Some("secret"));
        assert_eq!(t.headers.get("X-Tenant").map(String::as_str), Some("t1"));
        assert_eq!(t.max_queue_size, 16);
        assert_eq!(t.worker_count(), 4);
        assert_eq!(t.retry.total, 3);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = from_properties(&props(&[
            ("transport.maxQueueSize", "lots"),
            ("transport.retry.backoffFactor", "fast"),
            ("tenant.required", "maybe"),
        ]));
        assert_eq!(config.transport.max_queue_size, 10_000);
        assert!((config.transport.retry.backoff_factor - 0.3).abs() < f64::EPSILON);
        assert!(config.tenant.required);
    }

    #[test]
    fn test_unknown_transport_is_console() {
        let config = from_properties(&props(&[("transport.type", "kafka")]));
        assert_eq!(config.transport.kind, TransportKind::Console);
    }

    #[test]
    fn test_api_key_without_value_is_ignored() {
        let config = from_properties(&props(&[("transport.auth.type", "api_key")]));
        assert!(config.transport.auth.is_none());
    }
}
