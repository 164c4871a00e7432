//! 关系型实体快照：catalog / schema / table 以及表变更
//!
//! 可选字段用 `Option` 表示，集合为空而不是缺失。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 审计信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_modifier: Option<String>,
    #[serde(default)]
    pub last_modified_time: Option<DateTime<Utc>>,
}

/// 表字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub auto_increment: bool,
    /// Rendered default expression; `None` when unset
    #[serde(default)]
    pub default_value: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            comment: None,
            nullable: true,
            auto_increment: false,
            default_value: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Distribution (bucketing) of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub strategy: String,
    pub number: i32,
    #[serde(default)]
    pub expressions: Vec<String>,
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {})",
            self.strategy,
            self.number,
            self.expressions.join(", ")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortOrder {
    pub expression: String,
    pub direction: SortDirection,
    #[serde(default)]
    pub nulls_first: bool,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        let nulls = if self.nulls_first {
            "NULLS FIRST"
        } else {
            "NULLS LAST"
        };
        write!(f, "{} {} {}", self.expression, direction, nulls)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndexType {
    PrimaryKey,
    UniqueKey,
}

impl IndexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryKey => "PRIMARY_KEY",
            Self::UniqueKey => "UNIQUE_KEY",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub index_type: IndexType,
    #[serde(default)]
    pub name: Option<String>,
    /// Each entry is a field path, e.g. `["address", "city"]`
    pub field_names: Vec<Vec<String>>,
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<String> = self.field_names.iter().map(|p| p.join(".")).collect();
        match &self.name {
            Some(name) => write!(f, "{} {}({})", self.index_type.as_str(), name, columns.join(", ")),
            None => write!(f, "{}({})", self.index_type.as_str(), columns.join(", ")),
        }
    }
}

/// 表快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    /// Rendered partition transforms, e.g. `identity(dt)`
    #[serde(default)]
    pub partitioning: Vec<String>,
    #[serde(default)]
    pub distribution: Option<Distribution>,
    #[serde(default)]
    pub sort_orders: Vec<SortOrder>,
    #[serde(default)]
    pub indexes: Vec<Index>,
    #[serde(default)]
    pub audit: Option<Audit>,
}

impl TableInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }
}

/// Schema 快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub audit: Option<Audit>,
}

/// Catalog 快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogInfo {
    pub name: String,
    #[serde(default)]
    pub catalog_type: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub audit: Option<Audit>,
}

/// Target position of an added or moved column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPosition {
    First,
    After(String),
    #[default]
    Default,
}

impl ColumnPosition {
    /// `FIRST` / `AFTER col`; the default position renders as nothing
    pub fn render(&self) -> Option<String> {
        match self {
            Self::First => Some("FIRST".to_string()),
            Self::After(column) => Some(format!("AFTER {column}")),
            Self::Default => None,
        }
    }
}

/// One requested change of an alter-table call, in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum TableChange {
    RenameTable {
        new_name: String,
    },
    UpdateComment {
        new_comment: String,
    },
    SetProperty {
        property: String,
        value: String,
    },
    RemoveProperty {
        property: String,
    },
    AddColumn {
        field_name: Vec<String>,
        data_type: String,
        #[serde(default)]
        comment: Option<String>,
        #[serde(default)]
        position: ColumnPosition,
        #[serde(default = "default_nullable")]
        nullable: bool,
        #[serde(default)]
        auto_increment: bool,
        #[serde(default)]
        default_value: Option<String>,
    },
    DeleteColumn {
        field_name: Vec<String>,
        #[serde(default)]
        if_exists: bool,
    },
    RenameColumn {
        field_name: Vec<String>,
        new_name: String,
    },
    UpdateColumnType {
        field_name: Vec<String>,
        new_data_type: String,
    },
    UpdateColumnComment {
        field_name: Vec<String>,
        new_comment: String,
    },
    UpdateColumnPosition {
        field_name: Vec<String>,
        position: ColumnPosition,
    },
    UpdateColumnNullability {
        field_name: Vec<String>,
        nullable: bool,
    },
    UpdateColumnDefaultValue {
        field_name: Vec<String>,
        #[serde(default)]
        new_default_value: Option<String>,
    },
    UpdateColumnAutoIncrement {
        field_name: Vec<String>,
        auto_increment: bool,
    },
    AddIndex {
        index_type: IndexType,
        name: String,
        field_names: Vec<Vec<String>>,
    },
    DeleteIndex {
        name: String,
        #[serde(default)]
        if_exists: bool,
    },
}

impl TableChange {
    /// Convenience constructor for a top-level column
    pub fn add_column(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self::AddColumn {
            field_name: vec![name.into()],
            data_type: data_type.into(),
            comment: None,
            position: ColumnPosition::Default,
            nullable: true,
            auto_increment: false,
            default_value: None,
        }
    }
}
