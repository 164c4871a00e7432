//! SourceLabel - namespace label of the emitting catalog

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Label identifying the catalog that produced a lineage record.
///
/// Used as the job namespace of every record, as the prefix of every job
/// name (`{label}.{operation}_{entity}`), and as the dataset namespace of
/// identifiers that carry no namespace levels. Cloned once per record, so it
/// wraps an `Arc<str>`.
///
/// # Examples
/// ```
/// use contracts::SourceLabel;
///
/// let label = SourceLabel::new("catalog");
/// assert_eq!(label.job_name("create_table"), "catalog.create_table");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SourceLabel(Arc<str>);

impl SourceLabel {
    /// 默认标签
    pub const DEFAULT: &'static str = "catalog";

    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Job name for an operation suffix such as `alter_table`
    pub fn job_name(&self, suffix: &str) -> String {
        format!("{}.{}", self.0, suffix)
    }
}

impl Default for SourceLabel {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl Deref for SourceLabel {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for SourceLabel {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for SourceLabel {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceLabel({:?})", self.0)
    }
}

impl PartialEq<&str> for SourceLabel {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl Serialize for SourceLabel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SourceLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_name() {
        let label: SourceLabel = "warehouse".into();
        assert_eq!(label.job_name("drop_metric"), "warehouse.drop_metric");
    }

    #[test]
    fn test_default_label() {
        assert_eq!(SourceLabel::default(), "catalog");
    }

    #[test]
    fn test_clone_shares_storage() {
        let a = SourceLabel::new("catalog");
        let b = a.clone();
        assert_eq!(a.as_str().as_ptr(), b.as_str().as_ptr());
    }

    #[test]
    fn test_serde() {
        let label: SourceLabel = "lake".into();
        let json = serde_json::to_string(&label).unwrap();
        assert_eq!(json, "\"lake\"");
        let parsed: SourceLabel = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, label);
    }
}
