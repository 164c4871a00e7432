//! Tag events
//!
//! Tag definitions live under the metalake (`root://{metalake}`), while
//! association events are named after the object the tags are attached to.

use contracts::{
    Dataset, DatasetFacets, LifecycleChange, LineageRecord, Snapshot, TagAssociation, TagInfo,
};

use crate::context::{ConvertContext, FieldList};
use crate::error::ConvertError;
use crate::naming;

pub fn create(ctx: &ConvertContext<'_>) -> Result<LineageRecord, ConvertError> {
    upsert(ctx, LifecycleChange::Create)
}

pub fn alter(ctx: &ConvertContext<'_>) -> Result<LineageRecord, ConvertError> {
    upsert(ctx, LifecycleChange::Alter)
}

pub fn drop(ctx: &ConvertContext<'_>) -> Result<LineageRecord, ConvertError> {
    let fields = FieldList::new()
        .string("name", ctx.event.identifier.name.as_str())
        .build();
    Ok(ctx.output(tag_dataset(
        ctx,
        DatasetFacets {
            schema: ctx.schema(fields),
            lifecycle_state_change: ctx.lifecycle(LifecycleChange::Drop),
            ..DatasetFacets::default()
        },
    )))
}

pub fn associate(ctx: &ConvertContext<'_>) -> Result<LineageRecord, ConvertError> {
    let Snapshot::TagAssociation(association) = &ctx.event.snapshot else {
        return Err(ctx.mismatch("tag_association"));
    };
    let TagAssociation {
        object_type,
        tags_to_add,
        tags_to_remove,
        associated_tags,
    } = association;

    let mut facet = ctx.tag_facet(object_type.as_str());
    facet.tags_to_add = tags_to_add.clone();
    facet.tags_to_remove = tags_to_remove.clone();
    facet.associated_tags = associated_tags.clone();

    let (namespace, name) = naming::tag_target(ctx.label, &ctx.event.identifier, *object_type);
    let dataset = Dataset::new(namespace, name).with_facets(DatasetFacets {
        catalog_tag: Some(facet),
        ..DatasetFacets::default()
    });
    Ok(ctx.output(dataset))
}

fn upsert(ctx: &ConvertContext<'_>, change: LifecycleChange) -> Result<LineageRecord, ConvertError> {
    let fields = match &ctx.event.snapshot {
        Snapshot::Tag(info) => tag_fields(info),
        Snapshot::None => FieldList::new().string("name", ctx.event.identifier.name.as_str()),
        _ => return Err(ctx.mismatch("tag")),
    };
    Ok(ctx.output(tag_dataset(
        ctx,
        DatasetFacets {
            schema: ctx.schema(fields.build()),
            lifecycle_state_change: ctx.lifecycle(change),
            ..DatasetFacets::default()
        },
    )))
}

fn tag_dataset(ctx: &ConvertContext<'_>, facets: DatasetFacets) -> Dataset {
    let id = &ctx.event.identifier;
    Dataset::new(naming::root_namespace(ctx.label, id), id.name.as_str()).with_facets(facets)
}

fn tag_fields(info: &TagInfo) -> FieldList {
    FieldList::new()
        .string("name", info.name.as_str())
        .string_opt("comment", info.comment.as_deref())
        .joined(
            "properties",
            info.properties.iter().map(|(k, v)| format!("{k}={v}")),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::test_support::{context_for, event};
    use contracts::{EntityFamily, MetadataObjectType, Operation};
    use std::collections::BTreeMap;

    #[test]
    fn test_create_tag() {
        let info = TagInfo {
            name: "pii".into(),
            comment: Some("personal data".into()),
            properties: BTreeMap::from([
                ("level".to_string(), "high".to_string()),
                ("owner".to_string(), "sec".to_string()),
            ]),
        };
        let event = event(EntityFamily::Tag, Operation::Create, &["m1"], "pii")
            .with_snapshot(Snapshot::Tag(info));
        let ctx = context_for(&event, "create_tag");
        let record = create(&ctx).unwrap();

        let dataset = &record.outputs[0];
        assert_eq!(dataset.namespace, "root://m1");
        assert_eq!(dataset.name, "pii");
        let schema = dataset.facets.schema.as_ref().unwrap();
        assert_eq!(
            schema.field("properties").and_then(|f| f.description.as_deref()),
            Some("level=high,owner=sec")
        );
    }

    #[test]
    fn test_drop_tag() {
        let event = event(EntityFamily::Tag, Operation::Drop, &["m1"], "pii");
        let ctx = context_for(&event, "drop_tag");
        let record = drop(&ctx).unwrap();
        let dataset = &record.outputs[0];
        let schema = dataset.facets.schema.as_ref().unwrap();
        assert_eq!(schema.fields[0].name, "name");
        assert_eq!(dataset.facets.lifecycle(), Some(LifecycleChange::Drop));
    }

    #[test]
    fn test_associate_column_tags() {
        let event = event(
            EntityFamily::Tag,
            Operation::Associate,
            &["m1", "cat1", "sch1", "tbl1"],
            "email",
        )
        .with_snapshot(Snapshot::TagAssociation(TagAssociation {
            object_type: MetadataObjectType::Column,
            tags_to_add: vec!["pii".into()],
            tags_to_remove: vec![],
            associated_tags: vec!["pii".into(), "gold".into()],
        }));
        let ctx = context_for(&event, "associate_tags");
        let record = associate(&ctx).unwrap();

        let dataset = &record.outputs[0];
        assert_eq!(dataset.namespace, "root://m1/cat1");
        assert_eq!(dataset.name, "sch1.tbl1.email");
        let facet = dataset.facets.catalog_tag.as_ref().unwrap();
        assert_eq!(facet.object_type, "COLUMN");
        assert_eq!(facet.tags_to_add, ["pii"]);
        assert_eq!(facet.associated_tags.len(), 2);
        assert_eq!(facet.tenant_id, Some(1));
        assert!(dataset.facets.lifecycle().is_none());
    }

    #[test]
    fn test_associate_requires_snapshot() {
        let event = event(EntityFamily::Tag, Operation::Associate, &["m1"], "cat1");
        let ctx = context_for(&event, "associate_tags");
        assert!(matches!(
            associate(&ctx),
            Err(ConvertError::SnapshotMismatch { .. })
        ));
    }
}
