//! 词根事件转换

use contracts::WordRootInfo;

define_code_entity_converter!(WordRoot, "word_root", "code", word_root_fields);

fn word_root_fields(info: &WordRootInfo) -> FieldList {
    FieldList::new()
        .string("code", info.code.as_str())
        .string_opt("name", info.name.as_deref())
        .string_opt("dataType", info.data_type.as_deref())
        .string_opt("comment", info.comment.as_deref())
}
