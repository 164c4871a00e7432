//! LineageRecord - 下游标准化血缘记录 (OpenLineage RunEvent 形态)
//!
//! 所有可选字段在序列化时省略，不输出 null 占位。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Schema URL of the emitted run event
pub const RUN_EVENT_SCHEMA_URL: &str =
    "https://openlineage.io/spec/2-0-2/OpenLineage.json#/definitions/RunEvent";

const SCHEMA_FACET_URL: &str =
    "https://openlineage.io/spec/facets/1-1-1/SchemaDatasetFacet.json#/$defs/SchemaDatasetFacet";
const LIFECYCLE_FACET_URL: &str = "https://openlineage.io/spec/facets/1-0-1/LifecycleStateChangeDatasetFacet.json#/$defs/LifecycleStateChangeDatasetFacet";
const DOCUMENTATION_FACET_URL: &str = "https://openlineage.io/spec/facets/1-0-1/DocumentationDatasetFacet.json#/$defs/DocumentationDatasetFacet";
const CUSTOM_FACET_URL: &str = "https://openlineage.io/spec/2-0-2/OpenLineage.json#/$defs/DatasetFacet";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPhase {
    Start,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub run_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub namespace: String,
    pub name: String,
}

/// Standardized lineage record handed to a sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageRecord {
    pub event_type: EventPhase,
    pub event_time: DateTime<Utc>,
    pub run: Run,
    pub job: Job,
    #[serde(default)]
    pub inputs: Vec<Dataset>,
    #[serde(default)]
    pub outputs: Vec<Dataset>,
    pub producer: String,
    #[serde(rename = "schemaURL")]
    pub schema_url: String,
}

impl LineageRecord {
    /// COMPLETE record with a fresh run id
    pub fn complete(
        job: Job,
        event_time: DateTime<Utc>,
        inputs: Vec<Dataset>,
        outputs: Vec<Dataset>,
        producer: impl Into<String>,
    ) -> Self {
        Self {
            event_type: EventPhase::Complete,
            event_time,
            run: Run {
                run_id: Uuid::new_v4(),
            },
            job,
            inputs,
            outputs,
            producer: producer.into(),
            schema_url: RUN_EVENT_SCHEMA_URL.to_string(),
        }
    }

    pub fn job_name(&self) -> &str {
        &self.job.name
    }

    /// First dataset of the record, outputs before inputs
    pub fn primary_dataset(&self) -> Option<&Dataset> {
        self.outputs.first().or_else(|| self.inputs.first())
    }
}

/// Dataset descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub facets: DatasetFacets,
}

impl Dataset {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            facets: DatasetFacets::default(),
        }
    }

    pub fn with_facets(mut self, facets: DatasetFacets) -> Self {
        self.facets = facets;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetFacets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaFacet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<DocumentationFacet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state_change: Option<LifecycleFacet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogFacet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_tag: Option<TagFacet>,
}

impl DatasetFacets {
    pub fn lifecycle(&self) -> Option<LifecycleChange> {
        self.lifecycle_state_change
            .as_ref()
            .map(|f| f.lifecycle_state_change)
    }
}

/// `_producer` / `_schemaURL` carried by every facet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetHeader {
    #[serde(rename = "_producer")]
    pub producer: String,
    #[serde(rename = "_schemaURL")]
    pub schema_url: String,
}

impl FacetHeader {
    fn new(producer: &str, schema_url: &str) -> Self {
        Self {
            producer: producer.to_string(),
            schema_url: schema_url.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SchemaField {
    pub fn new(
        name: impl Into<String>,
        field_type: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaFacet {
    #[serde(flatten)]
    pub header: FacetHeader,
    pub fields: Vec<SchemaField>,
}

impl SchemaFacet {
    pub fn new(producer: &str, fields: Vec<SchemaField>) -> Self {
        Self {
            header: FacetHeader::new(producer, SCHEMA_FACET_URL),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentationFacet {
    #[serde(flatten)]
    pub header: FacetHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DocumentationFacet {
    pub fn new(producer: &str, description: Option<String>) -> Self {
        Self {
            header: FacetHeader::new(producer, DOCUMENTATION_FACET_URL),
            description,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleChange {
    Create,
    Alter,
    Drop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleFacet {
    #[serde(flatten)]
    pub header: FacetHeader,
    pub lifecycle_state_change: LifecycleChange,
}

impl LifecycleFacet {
    pub fn new(producer: &str, change: LifecycleChange) -> Self {
        Self {
            header: FacetHeader::new(producer, LIFECYCLE_FACET_URL),
            lifecycle_state_change: change,
        }
    }
}

/// Per-column metadata that the schema facet cannot express
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    pub name: String,
    pub nullable: bool,
    pub auto_increment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// Custom catalog metadata facet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFacet {
    #[serde(flatten)]
    pub header: FacetHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partitions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_orders: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<ChangeDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_code: Option<String>,
}

impl CatalogFacet {
    pub fn new(producer: &str) -> Self {
        Self {
            header: FacetHeader::new(producer, CUSTOM_FACET_URL),
            description: None,
            properties: BTreeMap::new(),
            columns: Vec::new(),
            partitions: None,
            distribution: None,
            sort_orders: None,
            indexes: None,
            changes: Vec::new(),
            creator: None,
            create_time: None,
            last_modifier: None,
            last_modified_time: None,
            tenant_id: None,
            tenant_code: None,
        }
    }
}

/// Custom facet describing a tag association change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagFacet {
    #[serde(flatten)]
    pub header: FacetHeader,
    pub object_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags_to_add: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags_to_remove: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub associated_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_code: Option<String>,
}

impl TagFacet {
    pub fn new(producer: &str, object_type: impl Into<String>) -> Self {
        Self {
            header: FacetHeader::new(producer, CUSTOM_FACET_URL),
            object_type: object_type.into(),
            tags_to_add: Vec::new(),
            tags_to_remove: Vec::new(),
            associated_tags: Vec::new(),
            tenant_id: None,
            tenant_code: None,
        }
    }
}

/// Kind of a table change descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    RenameTable,
    UpdateComment,
    SetProperty,
    RemoveProperty,
    AddColumn,
    DeleteColumn,
    RenameColumn,
    UpdateColumnType,
    UpdateColumnComment,
    UpdateColumnPosition,
    UpdateColumnNullability,
    UpdateColumnDefaultValue,
    UpdateColumnAutoIncrement,
    AddIndex,
    DeleteIndex,
}

/// Flattened description of one table change.
///
/// Only the fields relevant to `kind` are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDescriptor {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_column_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_column_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_increment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_columns: Option<Vec<String>>,
}

impl ChangeDescriptor {
    pub fn new(kind: ChangeKind) -> Self {
        Self {
            kind,
            column_name: None,
            data_type: None,
            column_comment: None,
            new_name: None,
            new_comment: None,
            property_key: None,
            property_value: None,
            old_column_name: None,
            new_column_name: None,
            nullable: None,
            auto_increment: None,
            default_value: None,
            position: None,
            index_name: None,
            index_type: None,
            index_columns: None,
        }
    }
}
