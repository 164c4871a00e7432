//! Table 事件转换
//!
//! - create / alter: 输出 dataset，schema facet 列出字段
//! - drop: 仅生命周期标记
//! - load: 输入 dataset，无生命周期标记
//! - alter: 每个 `TableChange` 对应一个 `ChangeDescriptor`，顺序不变

use contracts::{
    ChangeDescriptor, ChangeKind, ColumnMetadata, DatasetFacets, LifecycleChange, LineageRecord,
    SchemaField, Snapshot, TableChange, TableInfo,
};

use super::apply_audit;
use crate::context::ConvertContext;
use crate::error::ConvertError;

pub fn create(ctx: &ConvertContext<'_>) -> Result<LineageRecord, ConvertError> {
    let info = table_snapshot(ctx)?;
    let mut facets = table_facets(ctx, info, Vec::new());
    facets.lifecycle_state_change = ctx.lifecycle(LifecycleChange::Create);
    Ok(ctx.output(ctx.dataset(facets)))
}

pub fn alter(ctx: &ConvertContext<'_>) -> Result<LineageRecord, ConvertError> {
    let (info, changes) = match &ctx.event.snapshot {
        Snapshot::TableAlteration { updated, changes } => (updated.as_ref(), changes.as_slice()),
        Snapshot::Table(info) => (Some(info), &[][..]),
        Snapshot::None => (None, &[][..]),
        _ => return Err(ctx.mismatch("table_alteration")),
    };
    let changes = changes.iter().map(describe_change).collect();
    let mut facets = table_facets(ctx, info, changes);
    facets.lifecycle_state_change = ctx.lifecycle(LifecycleChange::Alter);
    Ok(ctx.output(ctx.dataset(facets)))
}

pub fn drop(ctx: &ConvertContext<'_>) -> Result<LineageRecord, ConvertError> {
    Ok(ctx.output(ctx.dataset(DatasetFacets {
        lifecycle_state_change: ctx.lifecycle(LifecycleChange::Drop),
        ..DatasetFacets::default()
    })))
}

pub fn load(ctx: &ConvertContext<'_>) -> Result<LineageRecord, ConvertError> {
    let info = table_snapshot(ctx)?;
    Ok(ctx.input(ctx.dataset(table_facets(ctx, info, Vec::new()))))
}

fn table_snapshot<'a>(ctx: &ConvertContext<'a>) -> Result<Option<&'a TableInfo>, ConvertError> {
    match &ctx.event.snapshot {
        Snapshot::Table(info) => Ok(Some(info)),
        Snapshot::None => Ok(None),
        _ => Err(ctx.mismatch("table")),
    }
}

/// Schema facet (always present, possibly empty) plus the catalog facet.
///
/// Without a snapshot the catalog facet only exists when there are changes
/// to report.
fn table_facets(
    ctx: &ConvertContext<'_>,
    info: Option<&TableInfo>,
    changes: Vec<ChangeDescriptor>,
) -> DatasetFacets {
    let fields = info
        .map(|t| {
            t.columns
                .iter()
                .map(|c| SchemaField::new(&c.name, &c.data_type, c.comment.clone()))
                .collect()
        })
        .unwrap_or_default();

    let catalog = match info {
        Some(table) => {
            let mut facet = ctx.catalog_facet();
            facet.description = table.comment.clone();
            facet.properties = table.properties.clone();
            facet.columns = table
                .columns
                .iter()
                .map(|c| ColumnMetadata {
                    name: c.name.clone(),
                    nullable: c.nullable,
                    auto_increment: c.auto_increment,
                    default_value: c.default_value.clone(),
                })
                .collect();
            facet.partitions = join_non_empty(&table.partitioning);
            facet.distribution = table.distribution.as_ref().map(ToString::to_string);
            facet.sort_orders = join_non_empty(&table.sort_orders);
            facet.indexes = join_non_empty(&table.indexes);
            facet.changes = changes;
            apply_audit(&mut facet, table.audit.as_ref());
            Some(facet)
        }
        None if !changes.is_empty() => {
            let mut facet = ctx.catalog_facet();
            facet.changes = changes;
            Some(facet)
        }
        None => None,
    };

    DatasetFacets {
        schema: ctx.schema(fields),
        catalog,
        ..DatasetFacets::default()
    }
}

fn join_non_empty<T: ToString>(items: &[T]) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    Some(
        items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// Flatten one table change into its descriptor
pub fn describe_change(change: &TableChange) -> ChangeDescriptor {
    match change {
        TableChange::RenameTable { new_name } => ChangeDescriptor {
            new_name: Some(new_name.clone()),
            ..ChangeDescriptor::new(ChangeKind::RenameTable)
        },
        TableChange::UpdateComment { new_comment } => ChangeDescriptor {
            new_comment: Some(new_comment.clone()),
            ..ChangeDescriptor::new(ChangeKind::UpdateComment)
        },
        TableChange::SetProperty { property, value } => ChangeDescriptor {
            property_key: Some(property.clone()),
            property_value: Some(value.clone()),
            ..ChangeDescriptor::new(ChangeKind::SetProperty)
        },
        TableChange::RemoveProperty { property } => ChangeDescriptor {
            property_key: Some(property.clone()),
            ..ChangeDescriptor::new(ChangeKind::RemoveProperty)
        },
        TableChange::AddColumn {
            field_name,
            data_type,
            comment,
            position,
            nullable,
            auto_increment,
            default_value,
        } => ChangeDescriptor {
            column_name: Some(field_name.join(".")),
            data_type: Some(data_type.clone()),
            column_comment: comment.clone(),
            nullable: Some(*nullable),
            auto_increment: Some(*auto_increment),
            default_value: default_value.clone(),
            position: position.render(),
            ..ChangeDescriptor::new(ChangeKind::AddColumn)
        },
        TableChange::DeleteColumn { field_name, .. } => ChangeDescriptor {
            column_name: Some(field_name.join(".")),
            ..ChangeDescriptor::new(ChangeKind::DeleteColumn)
        },
        TableChange::RenameColumn {
            field_name,
            new_name,
        } => ChangeDescriptor {
            old_column_name: Some(field_name.join(".")),
            new_column_name: Some(new_name.clone()),
            ..ChangeDescriptor::new(ChangeKind::RenameColumn)
        },
        TableChange::UpdateColumnType {
            field_name,
            new_data_type,
        } => ChangeDescriptor {
            column_name: Some(field_name.join(".")),
            data_type: Some(new_data_type.clone()),
            ..ChangeDescriptor::new(ChangeKind::UpdateColumnType)
        },
        TableChange::UpdateColumnComment {
            field_name,
            new_comment,
        } => ChangeDescriptor {
            column_name: Some(field_name.join(".")),
            new_comment: Some(new_comment.clone()),
            ..ChangeDescriptor::new(ChangeKind::UpdateColumnComment)
        },
        TableChange::UpdateColumnPosition {
            field_name,
            position,
        } => ChangeDescriptor {
            column_name: Some(field_name.join(".")),
            position: position.render(),
            ..ChangeDescriptor::new(ChangeKind::UpdateColumnPosition)
        },
        TableChange::UpdateColumnNullability {
            field_name,
            nullable,
        } => ChangeDescriptor {
            column_name: Some(field_name.join(".")),
            nullable: Some(*nullable),
            ..ChangeDescriptor::new(ChangeKind::UpdateColumnNullability)
        },
        TableChange::UpdateColumnDefaultValue {
            field_name,
            new_default_value,
        } => ChangeDescriptor {
            column_name: Some(field_name.join(".")),
            default_value: new_default_value.clone(),
            ..ChangeDescriptor::new(ChangeKind::UpdateColumnDefaultValue)
        },
        TableChange::UpdateColumnAutoIncrement {
            field_name,
            auto_increment,
        } => ChangeDescriptor {
            column_name: Some(field_name.join(".")),
            auto_increment: Some(*auto_increment),
            ..ChangeDescriptor::new(ChangeKind::UpdateColumnAutoIncrement)
        },
        TableChange::AddIndex {
            index_type,
            name,
            field_names,
        } => ChangeDescriptor {
            index_name: Some(name.clone()),
            index_type: Some(index_type.as_str().to_string()),
            index_columns: Some(field_names.iter().map(|path| path.join(".")).collect()),
            ..ChangeDescriptor::new(ChangeKind::AddIndex)
        },
        TableChange::DeleteIndex { name, .. } => ChangeDescriptor {
            index_name: Some(name.clone()),
            ..ChangeDescriptor::new(ChangeKind::DeleteIndex)
        },
    }
}
