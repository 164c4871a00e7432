//! 指标事件转换
//!
//! 指标以 register 而非 create 进入目录；register 路由到 [`create`]。

use contracts::MetricInfo;

define_code_entity_converter!(Metric, "metric", "code", metric_fields);

fn metric_fields(info: &MetricInfo) -> FieldList {
    FieldList::new()
        .string("code", info.code.as_str())
        .string("type", info.metric_type.as_str())
        .string_opt("comment", info.comment.as_deref())
        .string_opt("unit", info.unit.as_deref())
        .string_opt("calculationFormula", info.calculation_formula.as_deref())
        .joined("parentMetricCodes", &info.parent_metric_codes)
        .string_opt("refCatalogName", info.ref_catalog_name.as_deref())
        .string_opt("refSchemaName", info.ref_schema_name.as_deref())
        .string_opt("refTableName", info.ref_table_name.as_deref())
        .json_opt("measureColumns", info.measure_columns.as_deref())
        .json_opt("filterColumns", info.filter_columns.as_deref())
}
