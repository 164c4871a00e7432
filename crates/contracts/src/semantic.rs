//! 语义层实体快照：指标、标签、单位、值域、词根、修饰词

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Audit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricType {
    Atomic,
    Derived,
    Composite,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Atomic => "ATOMIC",
            Self::Derived => "DERIVED",
            Self::Composite => "COMPOSITE",
        }
    }
}

/// 指标快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricInfo {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    pub metric_type: MetricType,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub calculation_formula: Option<String>,
    #[serde(default)]
    pub parent_metric_codes: Vec<String>,
    #[serde(default)]
    pub ref_catalog_name: Option<String>,
    #[serde(default)]
    pub ref_schema_name: Option<String>,
    #[serde(default)]
    pub ref_table_name: Option<String>,
    /// Raw JSON text describing measure columns
    #[serde(default)]
    pub measure_columns: Option<String>,
    /// Raw JSON text describing filter columns
    #[serde(default)]
    pub filter_columns: Option<String>,
    #[serde(default)]
    pub audit: Option<Audit>,
}

impl MetricInfo {
    pub fn new(code: impl Into<String>, metric_type: MetricType) -> Self {
        Self {
            code: code.into(),
            name: None,
            metric_type,
            comment: None,
            unit: None,
            calculation_formula: None,
            parent_metric_codes: Vec::new(),
            ref_catalog_name: None,
            ref_schema_name: None,
            ref_table_name: None,
            measure_columns: None,
            filter_columns: None,
            audit: None,
        }
    }
}

/// 标签快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagInfo {
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// Object types a tag can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetadataObjectType {
    Metalake,
    Catalog,
    Schema,
    Table,
    Column,
    Fileset,
    Topic,
    Model,
}

impl MetadataObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metalake => "METALAKE",
            Self::Catalog => "CATALOG",
            Self::Schema => "SCHEMA",
            Self::Table => "TABLE",
            Self::Column => "COLUMN",
            Self::Fileset => "FILESET",
            Self::Topic => "TOPIC",
            Self::Model => "MODEL",
        }
    }
}

/// 标签关联变更
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagAssociation {
    pub object_type: MetadataObjectType,
    #[serde(default)]
    pub tags_to_add: Vec<String>,
    #[serde(default)]
    pub tags_to_remove: Vec<String>,
    /// Tags attached to the object after the change
    #[serde(default)]
    pub associated_tags: Vec<String>,
}

/// 单位快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitInfo {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainType {
    Enum,
    Range,
    Regex,
}

impl DomainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enum => "ENUM",
            Self::Range => "RANGE",
            Self::Regex => "REGEX",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainLevel {
    Builtin,
    #[default]
    Business,
}

impl DomainLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Builtin => "BUILTIN",
            Self::Business => "BUSINESS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueDomainItem {
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// 值域快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueDomainInfo {
    pub domain_code: String,
    #[serde(default)]
    pub domain_name: Option<String>,
    pub domain_type: DomainType,
    #[serde(default)]
    pub domain_level: DomainLevel,
    #[serde(default)]
    pub items: Vec<ValueDomainItem>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
}

/// 词根快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordRootInfo {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// 修饰词快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifierInfo {
    pub code: String,
    #[serde(default)]
    pub modifier_type: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}
