//! Event sources for a replay run

use std::path::Path;

use anyhow::{Context, Result};
use contracts::{
    CatalogInfo, Column, DomainLevel, DomainType, EntityFamily, EventKind, LifecycleEvent,
    MetadataObjectType, MetricInfo, MetricType, ModifierInfo, NameIdentifier, SchemaInfo,
    Snapshot, TableChange, TableInfo, TagAssociation, TagInfo, UnitInfo, ValueDomainInfo,
    ValueDomainItem, WordRootInfo,
};
use contracts::Operation as Op;

const METALAKE: &str = "lake";
const CATALOG: &str = "hive";
const SCHEMA: &str = "sales";

/// Load a JSON array of lifecycle events
pub fn load_events(path: &Path) -> Result<Vec<LifecycleEvent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read events file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse events file {}", path.display()))
}

fn event(
    family: EntityFamily,
    operation: Op,
    identifier: NameIdentifier,
    at_ms: i64,
    snapshot: Snapshot,
) -> LifecycleEvent {
    LifecycleEvent::new(EventKind::new(family, operation), identifier, at_ms)
        .with_snapshot(snapshot)
        .with_user("replay")
        .with_tenant(1, "demo")
}

fn in_lake(name: &str) -> NameIdentifier {
    NameIdentifier::new([METALAKE], name)
}

fn in_schema(name: &str) -> NameIdentifier {
    NameIdentifier::new([METALAKE, CATALOG, SCHEMA], name)
}

/// A short catalog session touching every routed family.
///
/// Ends with a fileset listing, which has no converter.
pub fn builtin_session(start_ms: i64) -> Vec<LifecycleEvent> {
    let orders = TableInfo::new("orders").with_columns(vec![
        Column::new("id", "bigint"),
        Column::new("amount", "decimal(10,2)").with_comment("order amount"),
        Column::new("created_at", "timestamp"),
    ]);
    let altered = {
        let mut table = orders.clone();
        table.columns.push(Column::new("status", "varchar(16)"));
        table
    };

    let mut revenue = MetricInfo::new("revenue", MetricType::Atomic);
    revenue.ref_catalog_name = Some(CATALOG.to_string());
    revenue.ref_schema_name = Some(SCHEMA.to_string());
    revenue.ref_table_name = Some("orders".to_string());
    revenue.measure_columns = Some("amount".to_string());
    revenue.unit = Some("CNY".to_string());

    let steps = vec![
        (
            EntityFamily::Catalog,
            Op::Create,
            NameIdentifier::new([METALAKE], CATALOG),
            Snapshot::Catalog(CatalogInfo {
                name: CATALOG.to_string(),
                catalog_type: Some("RELATIONAL".to_string()),
                provider: Some("hive".to_string()),
                ..CatalogInfo::default()
            }),
        ),
        (
            EntityFamily::Schema,
            Op::Create,
            NameIdentifier::new([METALAKE, CATALOG], SCHEMA),
            Snapshot::Schema(SchemaInfo {
                name: SCHEMA.to_string(),
                comment: Some("sales data".to_string()),
                ..SchemaInfo::default()
            }),
        ),
        (
            EntityFamily::Table,
            Op::Create,
            in_schema("orders"),
            Snapshot::Table(orders.clone()),
        ),
        (
            EntityFamily::Table,
            Op::Alter,
            in_schema("orders"),
            Snapshot::TableAlteration {
                updated: Some(altered),
                changes: vec![
                    TableChange::add_column("status", "varchar(16)"),
                    TableChange::SetProperty {
                        property: "owner".to_string(),
                        value: "finance".to_string(),
                    },
                ],
            },
        ),
        (
            EntityFamily::Table,
            Op::Load,
            in_schema("orders"),
            Snapshot::Table(orders),
        ),
        (
            EntityFamily::Unit,
            Op::Create,
            in_lake("CNY"),
            Snapshot::Unit(UnitInfo {
                code: "CNY".to_string(),
                name: Some("yuan".to_string()),
                symbol: Some("¥".to_string()),
                comment: None,
            }),
        ),
        (
            EntityFamily::Metric,
            Op::Register,
            in_lake("revenue"),
            Snapshot::Metric(revenue),
        ),
        (
            EntityFamily::Tag,
            Op::Create,
            in_lake("pii"),
            Snapshot::Tag(TagInfo {
                name: "pii".to_string(),
                comment: Some("personal data".to_string()),
                ..TagInfo::default()
            }),
        ),
        (
            EntityFamily::Tag,
            Op::Associate,
            NameIdentifier::new([METALAKE, CATALOG, SCHEMA, "orders"], "id"),
            Snapshot::TagAssociation(TagAssociation {
                object_type: MetadataObjectType::Column,
                tags_to_add: vec!["pii".to_string()],
                tags_to_remove: Vec::new(),
                associated_tags: vec!["pii".to_string()],
            }),
        ),
        (
            EntityFamily::ValueDomain,
            Op::Create,
            in_lake("order_status"),
            Snapshot::ValueDomain(ValueDomainInfo {
                domain_code: "order_status".to_string(),
                domain_name: Some("Order status".to_string()),
                domain_type: DomainType::Enum,
                domain_level: DomainLevel::Business,
                items: ["NEW", "PAID", "SHIPPED"]
                    .into_iter()
                    .map(|value| ValueDomainItem {
                        value: value.to_string(),
                        label: None,
                    })
                    .collect(),
                comment: None,
                data_type: Some("varchar".to_string()),
            }),
        ),
        (
            EntityFamily::WordRoot,
            Op::Create,
            in_lake("amt"),
            Snapshot::WordRoot(WordRootInfo {
                code: "amt".to_string(),
                name: Some("amount".to_string()),
                data_type: Some("decimal".to_string()),
                comment: None,
            }),
        ),
        (
            EntityFamily::Modifier,
            Op::Create,
            in_lake("daily"),
            Snapshot::Modifier(ModifierInfo {
                code: "daily".to_string(),
                modifier_type: Some("TIME".to_string()),
                comment: None,
            }),
        ),
        (
            EntityFamily::Tag,
            Op::Drop,
            in_lake("pii"),
            Snapshot::None,
        ),
        (
            EntityFamily::Fileset,
            Op::List,
            NameIdentifier::new([METALAKE, CATALOG, SCHEMA], "raw"),
            Snapshot::None,
        ),
    ];

    steps
        .into_iter()
        .zip(0i64..)
        .map(|((family, operation, identifier, snapshot), i)| {
            event(family, operation, identifier, start_ms + i * 1000, snapshot)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use converter::EventConverter;
    use std::io::Write;

    #[test]
    fn test_builtin_session_ends_with_unsupported_event() {
        let events = builtin_session(1_700_000_000_000);
        let (last, routed) = events.split_last().unwrap();
        assert!(!EventConverter::supports(last.kind));
        assert!(routed.iter().all(|e| EventConverter::supports(e.kind)));
    }

    #[test]
    fn test_builtin_session_is_ordered_in_time() {
        let events = builtin_session(0);
        assert!(events
            .windows(2)
            .all(|w| w[0].event_time_ms < w[1].event_time_ms));
        assert!(events.iter().all(|e| e.tenant.is_some()));
    }

    #[test]
    fn test_load_events_round_trips_builtin_session() {
        let events = builtin_session(42);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&events).unwrap().as_bytes())
            .unwrap();

        let loaded = load_events(file.path()).unwrap();
        assert_eq!(loaded.len(), events.len());
        assert_eq!(loaded[3].kind, events[3].kind);
        assert_eq!(loaded[3].identifier, events[3].identifier);
    }

    #[test]
    fn test_load_events_reports_path() {
        let err = load_events(Path::new("/nonexistent/events.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/events.json"));
    }
}
