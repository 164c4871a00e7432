//! Per-event conversion context
//!
//! Carries the immutable converter settings together with the event being
//! converted, and builds the record pieces shared by every entity family.

use chrono::{DateTime, Utc};
use contracts::{
    CatalogFacet, Dataset, DatasetFacets, DocumentationFacet, EventKind, Job, LifecycleChange,
    LifecycleEvent, LifecycleFacet, LineageRecord, SchemaFacet, SchemaField, SourceLabel,
    TagFacet,
};

use crate::error::ConvertError;
use crate::naming;

pub struct ConvertContext<'a> {
    pub label: &'a SourceLabel,
    pub producer: &'a str,
    /// Job name suffix, e.g. `create_table`
    pub job: &'static str,
    pub event: &'a LifecycleEvent,
    event_time: DateTime<Utc>,
}

impl<'a> ConvertContext<'a> {
    pub fn new(
        label: &'a SourceLabel,
        producer: &'a str,
        job: &'static str,
        event: &'a LifecycleEvent,
    ) -> Result<Self, ConvertError> {
        let event_time = DateTime::from_timestamp_millis(event.event_time_ms).ok_or(
            ConvertError::InvalidEventTime {
                kind: event.kind,
                millis: event.event_time_ms,
            },
        )?;
        Ok(Self {
            label,
            producer,
            job,
            event,
            event_time,
        })
    }

    pub fn kind(&self) -> EventKind {
        self.event.kind
    }

    /// Dataset named after the event identifier
    pub fn dataset(&self, facets: DatasetFacets) -> Dataset {
        let id = &self.event.identifier;
        Dataset::new(
            naming::dataset_namespace(self.label, id),
            naming::dataset_name(id),
        )
        .with_facets(facets)
    }

    /// Record with the dataset on the output side
    pub fn output(&self, dataset: Dataset) -> LineageRecord {
        LineageRecord::complete(
            self.job_descriptor(),
            self.event_time,
            Vec::new(),
            vec![dataset],
            self.producer,
        )
    }

    /// Record with the dataset on the input side (reads)
    pub fn input(&self, dataset: Dataset) -> LineageRecord {
        LineageRecord::complete(
            self.job_descriptor(),
            self.event_time,
            vec![dataset],
            Vec::new(),
            self.producer,
        )
    }

    pub fn lifecycle(&self, change: LifecycleChange) -> Option<LifecycleFacet> {
        Some(LifecycleFacet::new(self.producer, change))
    }

    pub fn schema(&self, fields: Vec<SchemaField>) -> Option<SchemaFacet> {
        Some(SchemaFacet::new(self.producer, fields))
    }

    pub fn documentation(&self, description: Option<String>) -> Option<DocumentationFacet> {
        Some(DocumentationFacet::new(self.producer, description))
    }

    /// Custom catalog facet stamped with the event tenant
    pub fn catalog_facet(&self) -> CatalogFacet {
        let mut facet = CatalogFacet::new(self.producer);
        if let Some(tenant) = &self.event.tenant {
            facet.tenant_id = Some(tenant.tenant_id);
            facet.tenant_code = Some(tenant.tenant_code.clone());
        }
        facet
    }

    /// Tag facet stamped with the event tenant
    pub fn tag_facet(&self, object_type: &str) -> TagFacet {
        let mut facet = TagFacet::new(self.producer, object_type);
        if let Some(tenant) = &self.event.tenant {
            facet.tenant_id = Some(tenant.tenant_id);
            facet.tenant_code = Some(tenant.tenant_code.clone());
        }
        facet
    }

    pub fn mismatch(&self, expected: &'static str) -> ConvertError {
        ConvertError::snapshot_mismatch(
            self.kind(),
            expected,
            self.event.snapshot.variant_name(),
        )
    }

    fn job_descriptor(&self) -> Job {
        Job {
            namespace: self.label.to_string(),
            name: self.label.job_name(self.job),
        }
    }
}

/// Ordered schema field list of a non-table entity.
///
/// Values travel in the field description; absent values produce no field.
#[derive(Debug, Default)]
pub struct FieldList(Vec<SchemaField>);

const STRING: &str = "STRING";
const JSON: &str = "JSON";

impl FieldList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(mut self, name: &str, value: impl Into<String>) -> Self {
        self.0.push(SchemaField::new(name, STRING, Some(value.into())));
        self
    }

    pub fn string_opt(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.string(name, v),
            None => self,
        }
    }

    pub fn json_opt(mut self, name: &str, value: Option<&str>) -> Self {
        if let Some(v) = value {
            self.0.push(SchemaField::new(name, JSON, Some(v.to_string())));
        }
        self
    }

    /// Comma-joined list; omitted when empty
    pub fn joined<I, S>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        if joined.is_empty() {
            self
        } else {
            self.string(name, joined)
        }
    }

    pub fn build(self) -> Vec<SchemaField> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{EntityFamily, NameIdentifier, Operation};

    fn event() -> LifecycleEvent {
        LifecycleEvent::new(
            EventKind::new(EntityFamily::Unit, Operation::Create),
            NameIdentifier::new(["m1", "cat1", "sch1"], "kg"),
            1_700_000_000_000,
        )
        .with_tenant(7, "acme")
    }

    #[test]
    fn test_job_descriptor() {
        let label = SourceLabel::new("lake");
        let event = event();
        let ctx = ConvertContext::new(&label, "urn:test", "create_unit", &event).unwrap();
        let record = ctx.output(ctx.dataset(DatasetFacets::default()));
        assert_eq!(record.job.namespace, "lake");
        assert_eq!(record.job.name, "lake.create_unit");
        assert_eq!(record.outputs[0].namespace, "root://m1/cat1");
        assert_eq!(record.outputs[0].name, "sch1.kg");
        assert!(record.inputs.is_empty());
    }

    #[test]
    fn test_tenant_stamped_facets() {
        let label = SourceLabel::default();
        let event = event();
        let ctx = ConvertContext::new(&label, "urn:test", "create_unit", &event).unwrap();
        assert_eq!(ctx.catalog_facet().tenant_id, Some(7));
        assert_eq!(ctx.tag_facet("TABLE").tenant_code.as_deref(), Some("acme"));
    }

    #[test]
    fn test_invalid_event_time() {
        let label = SourceLabel::default();
        let mut event = event();
        event.event_time_ms = i64::MAX;
        let result = ConvertContext::new(&label, "urn:test", "create_unit", &event);
        assert!(matches!(
            result,
            Err(ConvertError::InvalidEventTime { .. })
        ));
    }

    #[test]
    fn test_field_list_skips_absent() {
        let fields = FieldList::new()
            .string("code", "kg")
            .string_opt("name", None)
            .joined("parents", Vec::<String>::new())
            .json_opt("measureColumns", Some("[]"))
            .build();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].description.as_deref(), Some("kg"));
        assert_eq!(fields[1].field_type, "JSON");
    }
}
