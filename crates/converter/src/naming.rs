//! Dataset naming
//!
//! | depth | namespace                  | name                |
//! |-------|----------------------------|---------------------|
//! | 0     | `{label}`                  | `{leaf}`            |
//! | 1     | `root://{l0}`              | `{leaf}`            |
//! | 2     | `root://{l0}/{l1}`         | `{leaf}`            |
//! | >= 3  | `root://{l0}/{l1}`         | `{l2}.{leaf}`       |
//!
//! Pure functions of the identifier hierarchy.

use contracts::{MetadataObjectType, NameIdentifier, SourceLabel};

pub const SCHEME: &str = "root://";

pub fn dataset_namespace(label: &SourceLabel, id: &NameIdentifier) -> String {
    match id.levels.as_slice() {
        [] => label.to_string(),
        [l0] => format!("{SCHEME}{l0}"),
        [l0, l1, ..] => format!("{SCHEME}{l0}/{l1}"),
    }
}

pub fn dataset_name(id: &NameIdentifier) -> String {
    match id.level(2) {
        Some(l2) => format!("{l2}.{}", id.name),
        None => id.name.clone(),
    }
}

/// Namespace scoped to the first level only (tag metadata objects)
pub fn root_namespace(label: &SourceLabel, id: &NameIdentifier) -> String {
    match id.level(0) {
        Some(l0) => format!("{SCHEME}{l0}"),
        None => label.to_string(),
    }
}

/// Namespace and name of the object a tag association targets.
///
/// Columns sit one level below their table, so the column name is
/// `{schema}.{table}.{column}` under the table's namespace. Object types
/// other than catalog/schema/table/column fall back to the source label.
pub fn tag_target(
    label: &SourceLabel,
    id: &NameIdentifier,
    object_type: MetadataObjectType,
) -> (String, String) {
    let levels = id.levels.as_slice();
    let namespace = match (object_type, levels) {
        (MetadataObjectType::Catalog, [l0, ..]) => format!("{SCHEME}{l0}"),
        (
            MetadataObjectType::Schema | MetadataObjectType::Table | MetadataObjectType::Column,
            [l0, l1, ..],
        ) => format!("{SCHEME}{l0}/{l1}"),
        _ => label.to_string(),
    };
    let name = match (object_type, levels) {
        (MetadataObjectType::Table, [_, _, l2, ..]) => format!("{l2}.{}", id.name),
        (MetadataObjectType::Column, [_, _, l2, l3, ..]) => format!("{l2}.{l3}.{}", id.name),
        _ => id.name.clone(),
    };
    (namespace, name)
}
