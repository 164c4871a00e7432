//! 按实体族划分的转换函数
//!
//! 每个模块暴露与操作同名的函数 (`create` / `alter` / `drop` / `load` /
//! `associate`)，签名统一为 [`ConvertFn`](crate::ConvertFn)。

#[macro_use]
mod macros;

pub mod catalog;
pub mod metric;
pub mod modifier;
pub mod schema;
pub mod table;
pub mod tag;
pub mod unit;
pub mod value_domain;
pub mod word_root;

use contracts::{Audit, CatalogFacet};

fn apply_audit(facet: &mut CatalogFacet, audit: Option<&Audit>) {
    if let Some(audit) = audit {
        facet.creator = audit.creator.clone();
        facet.create_time = audit.create_time;
        facet.last_modifier = audit.last_modifier.clone();
        facet.last_modified_time = audit.last_modified_time;
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use contracts::{EntityFamily, EventKind, LifecycleEvent, NameIdentifier, Operation, SourceLabel};
    use std::sync::OnceLock;

    use crate::context::ConvertContext;

    pub fn event(
        family: EntityFamily,
        operation: Operation,
        levels: &[&str],
        name: &str,
    ) -> LifecycleEvent {
        LifecycleEvent::new(
            EventKind::new(family, operation),
            NameIdentifier::new(levels.iter().copied(), name),
            1_700_000_000_000,
        )
        .with_tenant(1, "t1")
    }

    pub fn context_for<'a>(event: &'a LifecycleEvent, job: &'static str) -> ConvertContext<'a> {
        static LABEL: OnceLock<SourceLabel> = OnceLock::new();
        let label = LABEL.get_or_init(SourceLabel::default);
        ConvertContext::new(label, "urn:test", job, event).unwrap()
    }
}
