//! 配置校验模块
//!
//! 校验规则：
//! - 字段范围 (validator 派生): retry.total >= 1、队列与并发 > 0
//! - retry.backoffFactor 为有限非负数
//! - namespace 非空
//! - api_key 认证必须携带非空 key
//! - endpoint 以 `/` 开头

use contracts::{ContractError, ListenerConfig};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// 校验 ListenerConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &ListenerConfig) -> Result<(), ContractError> {
    validate_ranges(config)?;
    validate_backoff(config)?;
    validate_namespace(config)?;
    validate_transport(config)?;
    Ok(())
}

/// 派生的范围校验
fn validate_ranges(config: &ListenerConfig) -> Result<(), ContractError> {
    config
        .validate()
        .map_err(|errors| first_violation("", &errors))
}

/// Flatten the nested validator report down to its first leaf
fn first_violation(prefix: &str, errors: &ValidationErrors) -> ContractError {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                let message = list
                    .first()
                    .map(|e| format!("{} out of range", e.code))
                    .unwrap_or_else(|| "invalid value".to_string());
                return ContractError::config_validation(path, message);
            }
            ValidationErrorsKind::Struct(inner) => return first_violation(&path, inner),
            ValidationErrorsKind::List(map) => {
                if let Some(inner) = map.values().next() {
                    return first_violation(&path, inner);
                }
            }
        }
    }
    ContractError::config_validation(prefix, "invalid configuration")
}

/// 校验退避因子
fn validate_backoff(config: &ListenerConfig) -> Result<(), ContractError> {
    let factor = config.transport.retry.backoff_factor;
    if !factor.is_finite() || factor < 0.0 {
        return Err(ContractError::config_validation(
            "transport.retry.backoffFactor",
            format!("backoffFactor must be a finite value >= 0, got {factor}"),
        ));
    }
    Ok(())
}

fn validate_namespace(config: &ListenerConfig) -> Result<(), ContractError> {
    if config.namespace.trim().is_empty() {
        return Err(ContractError::config_validation(
            "namespace",
            "namespace cannot be empty",
        ));
    }
    Ok(())
}

/// 校验传输配置
fn validate_transport(config: &ListenerConfig) -> Result<(), ContractError> {
    let transport = &config.transport;

    if let Some(auth) = &transport.auth {
        if auth.api_key.is_empty() {
            return Err(ContractError::config_validation(
                "transport.auth.apiKey",
                "api_key auth requires a non-empty key",
            ));
        }
    }

    if !transport.endpoint.is_empty() && !transport.endpoint.starts_with('/') {
        return Err(ContractError::config_validation(
            "transport.endpoint",
            format!("endpoint must start with '/', got '{}'", transport.endpoint),
        ));
    }

    Ok(())
}
