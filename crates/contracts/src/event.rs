//! LifecycleEvent - 目录层产生的生命周期事件
//!
//! 每次成功的元数据变更产生一个事件，事件不可变，核心逻辑只读不写。

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    CatalogInfo, MetricInfo, ModifierInfo, SchemaInfo, TableChange, TableInfo, TagAssociation,
    TagInfo, UnitInfo, ValueDomainInfo, WordRootInfo,
};

/// Hierarchical identifier: ordered namespace levels plus a leaf name.
///
/// For a table `lake.hive.sales.orders` the levels are
/// `["lake", "hive", "sales"]` and the leaf name is `orders`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameIdentifier {
    #[serde(default)]
    pub levels: Vec<String>,
    pub name: String,
}

impl NameIdentifier {
    pub fn new<I, S>(levels: I, name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            levels: levels.into_iter().map(Into::into).collect(),
            name: name.into(),
        }
    }

    /// Build from a dotted path, the last segment being the leaf name
    pub fn parse(path: &str) -> Option<Self> {
        let mut parts: Vec<&str> = path.split('.').collect();
        let name = parts.pop().filter(|n| !n.is_empty())?;
        Some(Self::new(parts, name))
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, idx: usize) -> Option<&str> {
        self.levels.get(idx).map(String::as_str)
    }
}

impl fmt::Display for NameIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in &self.levels {
            write!(f, "{level}.")?;
        }
        f.write_str(&self.name)
    }
}

/// 实体类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityFamily {
    Metalake,
    Catalog,
    Schema,
    Table,
    Fileset,
    Topic,
    Model,
    Metric,
    Tag,
    Unit,
    ValueDomain,
    WordRoot,
    Modifier,
}

impl EntityFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metalake => "metalake",
            Self::Catalog => "catalog",
            Self::Schema => "schema",
            Self::Table => "table",
            Self::Fileset => "fileset",
            Self::Topic => "topic",
            Self::Model => "model",
            Self::Metric => "metric",
            Self::Tag => "tag",
            Self::Unit => "unit",
            Self::ValueDomain => "value_domain",
            Self::WordRoot => "word_root",
            Self::Modifier => "modifier",
        }
    }
}

/// 操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Register,
    Alter,
    Drop,
    Load,
    List,
    Associate,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Register => "register",
            Self::Alter => "alter",
            Self::Drop => "drop",
            Self::Load => "load",
            Self::List => "list",
            Self::Associate => "associate",
        }
    }
}

/// Entity family × operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventKind {
    pub family: EntityFamily,
    pub operation: Operation,
}

impl EventKind {
    pub const fn new(family: EntityFamily, operation: Operation) -> Self {
        Self { family, operation }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.operation.as_str(), self.family.as_str())
    }
}

/// 租户快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantMarker {
    pub tenant_id: i64,
    pub tenant_code: String,
}

/// Immutable entity state attached to an event.
///
/// The variant normally matches the event family; `None` is used for drops
/// and for hosts that cannot supply the state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Snapshot {
    #[default]
    None,
    Table(TableInfo),
    TableAlteration {
        #[serde(default)]
        updated: Option<TableInfo>,
        #[serde(default)]
        changes: Vec<TableChange>,
    },
    Schema(SchemaInfo),
    Catalog(CatalogInfo),
    Metric(MetricInfo),
    Tag(TagInfo),
    TagAssociation(TagAssociation),
    Unit(UnitInfo),
    ValueDomain(ValueDomainInfo),
    WordRoot(WordRootInfo),
    Modifier(ModifierInfo),
}

impl Snapshot {
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Table(_) => "table",
            Self::TableAlteration { .. } => "table_alteration",
            Self::Schema(_) => "schema",
            Self::Catalog(_) => "catalog",
            Self::Metric(_) => "metric",
            Self::Tag(_) => "tag",
            Self::TagAssociation(_) => "tag_association",
            Self::Unit(_) => "unit",
            Self::ValueDomain(_) => "value_domain",
            Self::WordRoot(_) => "word_root",
            Self::Modifier(_) => "modifier",
        }
    }
}

/// One completed catalog mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub kind: EventKind,
    pub identifier: NameIdentifier,
    #[serde(default)]
    pub snapshot: Snapshot,
    /// 事件时间 (epoch millis)
    pub event_time_ms: i64,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub tenant: Option<TenantMarker>,
}

impl LifecycleEvent {
    pub fn new(kind: EventKind, identifier: NameIdentifier, event_time_ms: i64) -> Self {
        Self {
            kind,
            identifier,
            snapshot: Snapshot::None,
            event_time_ms,
            user: None,
            tenant: None,
        }
    }

    pub fn with_snapshot(mut self, snapshot: Snapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_tenant(mut self, tenant_id: i64, tenant_code: impl Into<String>) -> Self {
        self.tenant = Some(TenantMarker {
            tenant_id,
            tenant_code: tenant_code.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_parse() {
        let id = NameIdentifier::parse("lake.hive.sales.orders").unwrap();
        assert_eq!(id.levels, vec!["lake", "hive", "sales"]);
        assert_eq!(id.name, "orders");
        assert_eq!(id.to_string(), "lake.hive.sales.orders");

        let leaf = NameIdentifier::parse("solo").unwrap();
        assert_eq!(leaf.depth(), 0);
        assert!(NameIdentifier::parse("a.").is_none());
    }

    #[test]
    fn test_event_kind_display() {
        let kind = EventKind::new(EntityFamily::ValueDomain, Operation::Drop);
        assert_eq!(kind.to_string(), "drop_value_domain");
    }

    #[test]
    fn test_event_json_defaults() {
        let json = r#"{
            "kind": {"family": "table", "operation": "drop"},
            "identifier": {"levels": ["lake", "hive", "sales"], "name": "orders"},
            "event_time_ms": 1700000000000
        }"#;
        let event: LifecycleEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event.snapshot, Snapshot::None));
        assert!(event.tenant.is_none());
        assert_eq!(event.kind.family, EntityFamily::Table);
    }
}
