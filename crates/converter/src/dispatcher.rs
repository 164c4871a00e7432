//! Event dispatcher
//!
//! Routes a lifecycle event to its converter through a static table keyed by
//! (family, operation). Adding an entity family is a table edit.

use contracts::{
    EntityFamily, EventKind, LifecycleEvent, LineageRecord, ListenerConfig, Operation, SourceLabel,
};
use tracing::{debug, instrument};

use crate::context::ConvertContext;
use crate::converters::{
    catalog, metric, modifier, schema, table, tag, unit, value_domain, word_root,
};
use crate::error::ConvertError;

pub type ConvertFn = fn(&ConvertContext<'_>) -> Result<LineageRecord, ConvertError>;

/// One supported event kind
pub struct Route {
    pub family: EntityFamily,
    pub operation: Operation,
    /// Job name suffix
    pub job: &'static str,
    pub convert: ConvertFn,
}

const fn route(
    family: EntityFamily,
    operation: Operation,
    job: &'static str,
    convert: ConvertFn,
) -> Route {
    Route {
        family,
        operation,
        job,
        convert,
    }
}

use EntityFamily as F;
use Operation as Op;

pub static ROUTES: &[Route] = &[
    route(F::Table, Op::Create, "create_table", table::create),
    route(F::Table, Op::Alter, "alter_table", table::alter),
    route(F::Table, Op::Drop, "drop_table", table::drop),
    route(F::Table, Op::Load, "load_table", table::load),
    route(F::Schema, Op::Create, "create_schema", schema::create),
    route(F::Schema, Op::Alter, "alter_schema", schema::alter),
    route(F::Schema, Op::Drop, "drop_schema", schema::drop),
    route(F::Schema, Op::Load, "load_schema", schema::load),
    route(F::Catalog, Op::Create, "create_catalog", catalog::create),
    route(F::Catalog, Op::Alter, "alter_catalog", catalog::alter),
    route(F::Catalog, Op::Drop, "drop_catalog", catalog::drop),
    route(F::Metric, Op::Register, "register_metric", metric::create),
    route(F::Metric, Op::Alter, "alter_metric", metric::alter),
    route(F::Metric, Op::Drop, "drop_metric", metric::drop),
    route(F::Tag, Op::Create, "create_tag", tag::create),
    route(F::Tag, Op::Alter, "alter_tag", tag::alter),
    route(F::Tag, Op::Drop, "drop_tag", tag::drop),
    route(F::Tag, Op::Associate, "associate_tags", tag::associate),
    route(F::Unit, Op::Create, "create_unit", unit::create),
    route(F::Unit, Op::Alter, "alter_unit", unit::alter),
    route(F::Unit, Op::Drop, "drop_unit", unit::drop),
    route(F::ValueDomain, Op::Create, "create_valuedomain", value_domain::create),
    route(F::ValueDomain, Op::Alter, "alter_valuedomain", value_domain::alter),
    route(F::ValueDomain, Op::Drop, "drop_valuedomain", value_domain::drop),
    route(F::WordRoot, Op::Create, "create_wordroot", word_root::create),
    route(F::WordRoot, Op::Alter, "alter_wordroot", word_root::alter),
    route(F::WordRoot, Op::Drop, "drop_wordroot", word_root::drop),
    route(F::Modifier, Op::Create, "create_modifier", modifier::create),
    route(F::Modifier, Op::Alter, "alter_modifier", modifier::alter),
    route(F::Modifier, Op::Drop, "drop_modifier", modifier::drop),
];

/// Stateless event converter
///
/// Holds only immutable settings; safe to share across threads.
#[derive(Debug, Clone)]
pub struct EventConverter {
    label: SourceLabel,
    producer: String,
    tenant_required: bool,
}

impl EventConverter {
    pub fn new(label: SourceLabel, producer: impl Into<String>) -> Self {
        Self {
            label,
            producer: producer.into(),
            tenant_required: true,
        }
    }

    pub fn from_config(config: &ListenerConfig) -> Self {
        Self::new(config.namespace.clone(), config.producer.as_str())
            .with_tenant_required(config.tenant.required)
    }

    pub fn with_tenant_required(mut self, required: bool) -> Self {
        self.tenant_required = required;
        self
    }

    pub fn label(&self) -> &SourceLabel {
        &self.label
    }

    pub fn route(kind: EventKind) -> Option<&'static Route> {
        ROUTES
            .iter()
            .find(|r| r.family == kind.family && r.operation == kind.operation)
    }

    pub fn supports(kind: EventKind) -> bool {
        Self::route(kind).is_some()
    }

    /// Convert one event.
    ///
    /// `Ok(None)` for kinds with no route; validation runs only for routed
    /// kinds.
    #[instrument(
        name = "converter_convert",
        skip(self, event),
        fields(kind = %event.kind, id = %event.identifier)
    )]
    pub fn convert(&self, event: &LifecycleEvent) -> Result<Option<LineageRecord>, ConvertError> {
        let Some(route) = Self::route(event.kind) else {
            debug!("No converter for event kind, ignoring");
            return Ok(None);
        };

        if self.tenant_required && event.tenant.is_none() {
            return Err(ConvertError::MissingTenant { kind: event.kind });
        }
        if event.identifier.name.trim().is_empty() {
            return Err(ConvertError::missing_field(event.kind, "identifier.name"));
        }

        let ctx = ConvertContext::new(&self.label, &self.producer, route.job, event)?;
        let record = (route.convert)(&ctx)?;
        debug!(job = %record.job_name(), "Event converted");
        Ok(Some(record))
    }
}
