//! Schema 事件转换

use contracts::{CatalogFacet, DatasetFacets, LifecycleChange, LineageRecord, SchemaInfo, Snapshot};

use super::apply_audit;
use crate::context::ConvertContext;
use crate::error::ConvertError;

pub fn create(ctx: &ConvertContext<'_>) -> Result<LineageRecord, ConvertError> {
    let mut facets = schema_facets(ctx)?;
    facets.lifecycle_state_change = ctx.lifecycle(LifecycleChange::Create);
    Ok(ctx.output(ctx.dataset(facets)))
}

pub fn alter(ctx: &ConvertContext<'_>) -> Result<LineageRecord, ConvertError> {
    let mut facets = schema_facets(ctx)?;
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
    Ok(ctx.input(ctx.dataset(schema_facets(ctx)?)))
}

/// Documentation + catalog facet when the snapshot is known
fn schema_facets(ctx: &ConvertContext<'_>) -> Result<DatasetFacets, ConvertError> {
    let info = match &ctx.event.snapshot {
        Snapshot::Schema(info) => info,
        Snapshot::None => return Ok(DatasetFacets::default()),
        _ => return Err(ctx.mismatch("schema")),
    };
    Ok(DatasetFacets {
        documentation: ctx.documentation(info.comment.clone()),
        catalog: Some(catalog_facet(ctx, info)),
        ..DatasetFacets::default()
    })
}

fn catalog_facet(ctx: &ConvertContext<'_>, info: &SchemaInfo) -> CatalogFacet {
    let mut facet = ctx.catalog_facet();
    facet.description = info.comment.clone();
    facet.properties = info.properties.clone();
    apply_audit(&mut facet, info.audit.as_ref());
    facet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::test_support::{context_for, event};
    use contracts::{EntityFamily, Operation};
    use std::collections::BTreeMap;

    fn sales() -> SchemaInfo {
        SchemaInfo {
            name: "sales".into(),
            comment: Some("sales mart".into()),
            properties: BTreeMap::from([("location".to_string(), "s3://lake".to_string())]),
            audit: None,
        }
    }

    #[test]
    fn test_alter_schema() {
        let event = event(EntityFamily::Schema, Operation::Alter, &["m1", "cat1"], "sales")
            .with_snapshot(Snapshot::Schema(sales()));
        let ctx = context_for(&event, "alter_schema");
        let record = alter(&ctx).unwrap();

        let dataset = &record.outputs[0];
        assert_eq!(dataset.namespace, "root://m1/cat1");
        assert_eq!(dataset.name, "sales");
        let doc = dataset.facets.documentation.as_ref().unwrap();
        assert_eq!(doc.description.as_deref(), Some("sales mart"));
        let facet = dataset.facets.catalog.as_ref().unwrap();
        assert_eq!(facet.properties.get("location").map(String::as_str), Some("s3://lake"));
        assert_eq!(dataset.facets.lifecycle(), Some(LifecycleChange::Alter));
    }

    #[test]
    fn test_load_schema_is_input() {
        let event = event(EntityFamily::Schema, Operation::Load, &["m1", "cat1"], "sales")
            .with_snapshot(Snapshot::Schema(sales()));
        let ctx = context_for(&event, "load_schema");
        let record = load(&ctx).unwrap();
        assert_eq!(record.inputs.len(), 1);
        assert!(record.inputs[0].facets.lifecycle().is_none());
        assert!(record.inputs[0].facets.documentation.is_some());
    }

    #[test]
    fn test_create_schema_without_snapshot() {
        let event = event(EntityFamily::Schema, Operation::Create, &["m1", "cat1"], "sales");
        let ctx = context_for(&event, "create_schema");
        let record = create(&ctx).unwrap();
        let facets = &record.outputs[0].facets;
        assert!(facets.catalog.is_none());
        assert!(facets.documentation.is_none());
        assert_eq!(facets.lifecycle(), Some(LifecycleChange::Create));
    }
}
