//! Schema-related data models.
//!
//! This module defines the table and index records reported by `get_table_info`.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TableInfo {
    pub name: String,
    /// Estimated row count from table statistics
    pub row_count: u64,
    /// Bytes (excluding indexes)
    pub data_size: u64,
    /// Bytes
    pub index_size: u64,
    /// Bytes (data + indexes)
    pub total_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_increment: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub indexes: Vec<IndexInfo>,
}

impl TableInfo {
    /// Create a new table info.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_row_count(mut self, row_count: u64) -> Self {
        self.row_count = row_count;
        self
    }

    /// Set data and index sizes; the total is derived from both.
    pub fn with_sizes(mut self, data_size: u64, index_size: u64) -> Self {
        self.data_size = data_size;
        self.index_size = index_size;
        self.total_size = data_size.saturating_add(index_size);
        self
    }

    pub fn with_auto_increment(mut self, value: Option<u64>) -> Self {
        self.auto_increment = value;
        self
    }

    /// Set the comment. Blank comments are dropped.
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_indexes(mut self, indexes: Vec<IndexInfo>) -> Self {
        self.indexes = indexes;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexInfo {
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<u64>,
}

impl IndexInfo {
    /// Create a new index info.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            is_unique: false,
            cardinality: None,
        }
    }

    /// Set whether this is a unique index.
    pub fn with_unique(mut self, is_unique: bool) -> Self {
        self.is_unique = is_unique;
        self
    }

    pub fn with_cardinality(mut self, cardinality: Option<u64>) -> Self {
        self.cardinality = cardinality;
        self
    }

    pub fn is_primary(&self) -> bool {
        self.name.eq_ignore_ascii_case("PRIMARY")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_info_total_size_is_derived() {
        let info = TableInfo::new("orders").with_sizes(65_536, 16_384);
        assert_eq!(info.total_size, 81_920);
    }

    #[test]
    fn test_blank_comment_is_dropped() {
        let info = TableInfo::new("t").with_comment(Some("   ".to_string()));
        assert!(info.comment.is_none());

        let info = TableInfo::new("t").with_comment(Some("customer orders".to_string()));
        assert_eq!(info.comment.as_deref(), Some("customer orders"));
    }

    #[test]
    fn test_index_info_builder() {
        let index = IndexInfo::new("PRIMARY", vec!["id".to_string()])
            .with_unique(true)
            .with_cardinality(Some(1024));
        assert!(index.is_primary());
        assert!(index.is_unique);
        assert_eq!(index.cardinality, Some(1024));
    }

    #[test]
    fn test_table_info_serialization_skips_absent_fields() {
        let info = TableInfo::new("users").with_row_count(10);
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"name\":\"users\""));
        assert!(!json.contains("auto_increment"));
        assert!(!json.contains("comment"));
    }
}
