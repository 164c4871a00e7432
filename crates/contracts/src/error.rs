//! 错误定义
//!
//! Two families: configuration errors raised while building a listener, and
//! sink errors raised while delivering a record. Sink errors are always
//! retried by the emission pipeline, so they carry only a message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContractError {
    /// TOML / JSON 解析失败
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Value out of range, `field` is the dotted config path
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Sink reached the target but the write failed (non-2xx, disk full, ...)
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Target unreachable or timed out
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    /// 记录序列化失败
    #[error("cannot serialize record for job '{job}': {message}")]
    Serialization { job: String, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    pub fn sink_connection(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkConnection {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    pub fn serialization(job: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Serialization {
            job: job.into(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_source() {
        let err = ContractError::config_validation("transport.retry.total", "must be >= 1");
        assert_eq!(
            err.to_string(),
            "config validation error at 'transport.retry.total': must be >= 1"
        );

        let err = ContractError::sink_write("http", "503 Service Unavailable: busy");
        assert!(err.to_string().contains("'http'"));
    }

    #[test]
    fn test_serialization_names_job() {
        let err = ContractError::serialization("catalog.create_table", "key must be a string");
        assert!(err.to_string().contains("catalog.create_table"));
    }
}
