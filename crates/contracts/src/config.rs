//! ListenerConfig - Config Loader 输出
//!
//! 描述监听器的完整配置：来源标签、传输方式、队列与并发、重试策略、租户校验。
//! 字段名与宿主下发的扁平属性键一致 (`transport.maxQueueSize` 等)。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

use crate::SourceLabel;

/// 监听器配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListenerConfig {
    /// 来源标签，作为 job namespace 与 job 名前缀
    #[serde(default)]
    pub namespace: SourceLabel,

    /// Producer URI written into every record and facet
    #[serde(default = "default_producer")]
    pub producer: String,

    #[serde(default)]
    #[validate(nested)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub tenant: TenantConfig,

    #[serde(default)]
    #[validate(nested)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

fn default_producer() -> String {
    concat!("urn:catalog-lineage-listener:", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            namespace: SourceLabel::default(),
            producer: default_producer(),
            transport: TransportConfig::default(),
            tenant: TenantConfig::default(),
            runtime: RuntimeConfig::default(),
            shutdown: ShutdownConfig::default(),
        }
    }
}

/// 传输类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    #[default]
    Console,
    File,
    Http,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::File => "file",
            Self::Http => "http",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    Gzip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    ApiKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    #[serde(rename = "type")]
    pub kind: AuthKind,
    pub api_key: String,
}

/// 队列满时的丢弃策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// 丢弃队首最旧的记录
    #[default]
    DropOldest,
    /// 丢弃新提交的记录
    DropNewest,
}

impl DropPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DropOldest => "drop_oldest",
            Self::DropNewest => "drop_newest",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueConfig {
    #[serde(default)]
    pub drop_policy: DropPolicy,
}

/// 重试配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    /// Attempt cap, first attempt included
    #[serde(default = "default_retry_total")]
    #[validate(range(min = 1))]
    pub total: u32,

    /// Seconds multiplier of the exponential backoff
    #[serde(default = "default_backoff_factor")]
    #[validate(range(min = 0.0))]
    pub backoff_factor: f64,
}

fn default_retry_total() -> u32 {
    5
}

fn default_backoff_factor() -> f64 {
    0.3
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            total: default_retry_total(),
            backoff_factor: default_backoff_factor(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTransportConfig {
    #[serde(default = "default_file_path")]
    pub path: PathBuf,
}

fn default_file_path() -> PathBuf {
    PathBuf::from("lineage-events.jsonl")
}

impl Default for FileTransportConfig {
    fn default() -> Self {
        Self {
            path: default_file_path(),
        }
    }
}

/// 传输与投递配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransportConfig {
    #[serde(rename = "type", default)]
    pub kind: TransportKind,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_ms")]
    #[validate(range(min = 1))]
    pub timeout_in_millis: u64,

    #[serde(default)]
    pub compression: Option<Compression>,

    #[serde(default)]
    pub auth: Option<AuthConfig>,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default)]
    pub file: FileTransportConfig,

    #[serde(default = "default_max_queue_size")]
    #[validate(range(min = 1))]
    pub max_queue_size: usize,

    #[serde(default = "default_max_concurrent")]
    #[validate(range(min = 1))]
    pub max_concurrent_requests: usize,

    /// Worker task count; defaults to `max_concurrent_requests`
    #[serde(default)]
    #[validate(range(min = 1))]
    pub workers: Option<usize>,

    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    #[validate(nested)]
    pub retry: RetryConfig,
}

fn default_endpoint() -> String {
    "/api/v1/lineage".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_max_queue_size() -> usize {
    10_000
}

fn default_max_concurrent() -> usize {
    100
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::default(),
            url: None,
            endpoint: default_endpoint(),
            timeout_in_millis: default_timeout_ms(),
            compression: None,
            auth: None,
            headers: BTreeMap::new(),
            file: FileTransportConfig::default(),
            max_queue_size: default_max_queue_size(),
            max_concurrent_requests: default_max_concurrent(),
            workers: None,
            queue: QueueConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl TransportConfig {
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or(self.max_concurrent_requests)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_in_millis)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Reject events without a tenant snapshot
    #[serde(default = "default_true")]
    pub required: bool,
}

fn default_true() -> bool {
    true
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self { required: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    #[serde(default = "default_worker_threads")]
    #[validate(range(min = 1))]
    pub worker_threads: usize,
}

fn default_worker_threads() -> usize {
    2
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShutdownConfig {
    #[serde(default = "default_grace_millis")]
    pub grace_millis: u64,
}

fn default_grace_millis() -> u64 {
    1000
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_millis: default_grace_millis(),
        }
    }
}

impl ShutdownConfig {
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listener_config_defaults() {
        let config = ListenerConfig::default();
        assert_eq!(config.namespace, "catalog");
        assert_eq!(config.transport.kind, TransportKind::Console);
        assert_eq!(config.transport.max_queue_size, 10_000);
        assert_eq!(config.transport.worker_count(), 100);
        assert_eq!(config.transport.retry.total, 5);
        assert!((config.transport.retry.backoff_factor - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.transport.queue.drop_policy, DropPolicy::DropOldest);
        assert!(config.tenant.required);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_retry_total_is_invalid() {
        let mut config = ListenerConfig::default();
        config.transport.retry.total = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn transport_keys_are_camel_case() {
        let json = r#"{"type": "http", "url": "http://collector:5000", "maxQueueSize": 8,
                       "retry": {"total": 2, "backoffFactor": 0.5}}"#;
        let transport: TransportConfig = serde_json::from_str(json).unwrap();
        assert_eq!(transport.kind, TransportKind::Http);
        assert_eq!(transport.max_queue_size, 8);
        assert_eq!(transport.retry.total, 2);
        assert_eq!(transport.endpoint, "/api/v1/lineage");
    }
}
