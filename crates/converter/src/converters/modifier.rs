use contracts::ModifierInfo;

define_code_entity_converter!(Modifier, "modifier", "code", modifier_fields);

fn modifier_fields(info: &ModifierInfo) -> FieldList {
    FieldList::new()
        .string("code", info.code.as_str())
        .string_opt("type", info.modifier_type.as_deref())
        .string_opt("comment", info.comment.as_deref())
}
