use contracts::{CatalogInfo, DatasetFacets, LifecycleChange, LineageRecord, Snapshot};

use super::apply_audit;
use crate::context::ConvertContext;
use crate::error::ConvertError;

pub fn create(ctx: &ConvertContext<'_>) -> Result<LineageRecord, ConvertError> {
    upsert(ctx, LifecycleChange::Create)
}

pub fn alter(ctx: &ConvertContext<'_>) -> Result<LineageRecord, ConvertError> {
    upsert(ctx, LifecycleChange::Alter)
}

pub fn drop(ctx: &ConvertContext<'_>) -> Result<LineageRecord, ConvertError> {
    Ok(ctx.output(ctx.dataset(DatasetFacets {
        lifecycle_state_change: ctx.lifecycle(LifecycleChange::Drop),
        ..DatasetFacets::default()
    })))
}

fn upsert(ctx: &ConvertContext<'_>, change: LifecycleChange) -> Result<LineageRecord, ConvertError> {
    let info = match &ctx.event.snapshot {
        Snapshot::Catalog(info) => Some(info),
        Snapshot::None => None,
        _ => return Err(ctx.mismatch("catalog")),
    };
    Ok(ctx.output(ctx.dataset(DatasetFacets {
        lifecycle_state_change: ctx.lifecycle(change),
        catalog: info.map(|info| catalog_facet(ctx, info)),
        ..DatasetFacets::default()
    })))
}

/// Catalog type and provider travel as reserved properties
fn catalog_facet(ctx: &ConvertContext<'_>, info: &CatalogInfo) -> contracts::CatalogFacet {
    let mut facet = ctx.catalog_facet();
    facet.description = info.comment.clone();
    facet.properties = info.properties.clone();
    if let Some(kind) = &info.catalog_type {
        facet.properties.insert("catalog.type".to_string(), kind.clone());
    }
    if let Some(provider) = &info.provider {
        facet.properties.insert("catalog.provider".to_string(), provider.clone());
    }
    apply_audit(&mut facet, info.audit.as_ref());
    facet
}
