//! 值域事件转换

use contracts::{ValueDomainInfo, ValueDomainItem};

define_code_entity_converter!(ValueDomain, "value_domain", "domainCode", value_domain_fields);

fn value_domain_fields(info: &ValueDomainInfo) -> FieldList {
    FieldList::new()
        .string("domainCode", info.domain_code.as_str())
        .string_opt("domainName", info.domain_name.as_deref())
        .string("domainType", info.domain_type.as_str())
        .string("domainLevel", info.domain_level.as_str())
        .joined("items", info.items.iter().map(render_item))
        .string_opt("comment", info.comment.as_deref())
        .string_opt("dataType", info.data_type.as_deref())
}

/// `value:label`, an absent label renders empty
fn render_item(item: &ValueDomainItem) -> String {
    format!("{}:{}", item.value, item.label.as_deref().unwrap_or_default())
}
