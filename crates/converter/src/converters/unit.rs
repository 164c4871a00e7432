//! 单位事件转换

use contracts::UnitInfo;

define_code_entity_converter!(Unit, "unit", "code", unit_fields);

fn unit_fields(info: &UnitInfo) -> FieldList {
    FieldList::new()
        .string("code", info.code.as_str())
        .string_opt("name", info.name.as_deref())
        .string_opt("symbol", info.symbol.as_deref())
        .string_opt("comment", info.comment.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::test_support::{context_for, event};
    use contracts::{EntityFamily, Operation};

    #[test]
    fn test_create_unit_fields() {
        let event = event(EntityFamily::Unit, Operation::Create, &["m1"], "kg").with_snapshot(
            Snapshot::Unit(UnitInfo {
                code: "kg".into(),
                name: Some("kilogram".into()),
                symbol: None,
                comment: Some("mass".into()),
            }),
        );
        let ctx = context_for(&event, "create_unit");
        let record = create(&ctx).unwrap();

        let dataset = &record.outputs[0];
        let schema = dataset.facets.schema.as_ref().unwrap();
        let names: Vec<_> = schema.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["code", "name", "comment"]);
        assert_eq!(
            schema.field("name").and_then(|f| f.description.as_deref()),
            Some("kilogram")
        );
        assert_eq!(dataset.facets.lifecycle(), Some(LifecycleChange::Create));
    }

    #[test]
    fn test_drop_unit_identity_only() {
        let event = event(EntityFamily::Unit, Operation::Drop, &["m1"], "kg");
        let ctx = context_for(&event, "drop_unit");
        let record = drop(&ctx).unwrap();

        let dataset = &record.outputs[0];
        let schema = dataset.facets.schema.as_ref().unwrap();
        assert_eq!(schema.fields.len(), 1);
        assert_eq!(schema.fields[0].name, "code");
        assert_eq!(schema.fields[0].description.as_deref(), Some("kg"));
        assert_eq!(dataset.facets.lifecycle(), Some(LifecycleChange::Drop));
    }

    #[test]
    fn test_alter_without_snapshot_degrades() {
        let event = event(EntityFamily::Unit, Operation::Alter, &["m1"], "kg");
        let ctx = context_for(&event, "alter_unit");
        let record = alter(&ctx).unwrap();
        let schema = record.outputs[0].facets.schema.as_ref().unwrap();
        assert_eq!(schema.fields.len(), 1);
    }

    #[test]
    fn test_foreign_snapshot_rejected() {
        let event = event(EntityFamily::Unit, Operation::Create, &["m1"], "kg")
            .with_snapshot(Snapshot::Tag(Default::default()));
        let ctx = context_for(&event, "create_unit");
        assert!(matches!(
            create(&ctx),
            Err(ConvertError::SnapshotMismatch { expected: "unit", found: "tag", .. })
        ));
    }
}
