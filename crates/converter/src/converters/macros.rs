//! Code entity converter macros
//!
//! Units, value domains, word roots and modifiers share one shape: a schema
//! facet of descriptive fields on create/alter, and a single identity field
//! on drop.

/// Define `create` / `alter` / `drop` for a code entity
///
/// The generated functions:
/// - build the field list from the matching snapshot, or only the identity
///   field when the host supplied no snapshot
/// - reject snapshots of another family
/// - on drop, emit the identity field plus the DROP marker
///
/// # Usage
/// ```ignore
/// define_code_entity_converter!(
///     Unit,          // Snapshot variant
///     "unit",        // Snapshot name reported on mismatch
///     "code",        // Identity field filled from the identifier leaf
///     unit_fields    // fn(&UnitInfo) -> FieldList
/// );
/// ```
macro_rules! define_code_entity_converter {
    (
        $variant:ident,
        $expected:literal,
        $identity_field:literal,
        $fields_fn:ident
    ) => {
        use contracts::{DatasetFacets, LifecycleChange, LineageRecord, Snapshot};

        use crate::context::{ConvertContext, FieldList};
        use crate::error::ConvertError;

        pub fn create(ctx: &ConvertContext<'_>) -> Result<LineageRecord, ConvertError> {
            upsert(ctx, LifecycleChange::Create)
        }

        pub fn alter(ctx: &ConvertContext<'_>) -> Result<LineageRecord, ConvertError> {
            upsert(ctx, LifecycleChange::Alter)
        }

        pub fn drop(ctx: &ConvertContext<'_>) -> Result<LineageRecord, ConvertError> {
            let fields = identity(ctx).build();
            Ok(ctx.output(ctx.dataset(DatasetFacets {
                schema: ctx.schema(fields),
                lifecycle_state_change: ctx.lifecycle(LifecycleChange::Drop),
                ..DatasetFacets::default()
            })))
        }

        fn upsert(
            ctx: &ConvertContext<'_>,
            change: LifecycleChange,
        ) -> Result<LineageRecord, ConvertError> {
            let fields = match &ctx.event.snapshot {
                Snapshot::$variant(info) => $fields_fn(info),
                Snapshot::None => identity(ctx),
                _ => return Err(ctx.mismatch($expected)),
            };
            Ok(ctx.output(ctx.dataset(DatasetFacets {
                schema: ctx.schema(fields.build()),
                lifecycle_state_change: ctx.lifecycle(change),
                ..DatasetFacets::default()
            })))
        }

        fn identity(ctx: &ConvertContext<'_>) -> FieldList {
            FieldList::new().string($identity_field, ctx.event.identifier.name.as_str())
        }
    };
}
