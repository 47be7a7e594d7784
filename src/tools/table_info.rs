//! The `get_table_info` tool.

use crate::db::{MetadataInspector, QueryRunner};
use crate::error::DbResult;
use crate::models::TableInfo;
use crate::tools::format::{format_bytes, format_count};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Input for the get_table_info tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct TableInfoInput {
    /// Table to describe. Omit to describe every table in the database.
    #[serde(default)]
    pub table_name: Option<String>,
}

impl TableInfoInput {
    /// The requested table, with blank names treated as absent.
    pub fn table(&self) -> Option<&str> {
        self.table_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

pub struct TableInfoHandler<R> {
    inspector: MetadataInspector<R>,
}

impl<R: QueryRunner> TableInfoHandler<R> {
    pub fn new(runner: Arc<R>, database: impl Into<String>) -> Self {
        Self {
            inspector: MetadataInspector::new(runner, database),
        }
    }

    pub async fn handle(&self, input: TableInfoInput) -> DbResult<String> {
        let tables = match input.table() {
            Some(name) => vec![self.inspector.table_info(name).await?],
            None => self.inspector.all_tables().await?,
        };

        info!(tables = tables.len(), "get_table_info completed");
        Ok(render(&tables))
    }
}

/// Render table records, one block per table.
pub fn render(tables: &[TableInfo]) -> String {
    if tables.is_empty() {
        return "No tables found.".to_string();
    }
    tables
        .iter()
        .map(render_table)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_table(table: &TableInfo) -> String {
    let mut out = format!("Table: {}\n", table.name);
    out.push_str(&format!("  Rows: {}\n", format_count(table.row_count)));
    out.push_str(&format!("  Data size: {}\n", format_bytes(table.data_size)));
    out.push_str(&format!("  Index size: {}\n", format_bytes(table.index_size)));
    out.push_str(&format!("  Total size: {}\n", format_bytes(table.total_size)));
    if let Some(next) = table.auto_increment {
        out.push_str(&format!("  Auto increment: {}\n", next));
    }
    if let Some(comment) = &table.comment {
        out.push_str(&format!("  Comment: {}\n", comment));
    }

    if table.indexes.is_empty() {
        out.push_str("  Indexes: none\n");
    } else {
        out.push_str("  Indexes:\n");
        for index in &table.indexes {
            let mut line = format!("    {} ({})", index.name, index.columns.join(", "));
            if index.is_unique {
                line.push_str(" unique");
                if index.cardinality.is_some() {
                    line.push(',');
                }
            }
            if let Some(cardinality) = index.cardinality {
                line.push_str(&format!(" cardinality {}", cardinality));
            }
            out.push_str(&line);
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndexInfo;

    #[test]
    fn test_blank_table_name_means_all() {
        let input = TableInfoInput {
            table_name: Some("  ".into()),
        };
        assert!(input.table().is_none());
        assert!(TableInfoInput::default().table().is_none());
        let input = TableInfoInput {
            table_name: Some(" orders ".into()),
        };
        assert_eq!(input.table(), Some("orders"));
    }

    #[test]
    fn test_render_table() {
        let table = TableInfo::new("orders")
            .with_row_count(1024)
            .with_sizes(65_536, 16_384)
            .with_auto_increment(Some(1025))
            .with_comment(Some("customer orders".into()))
            .with_indexes(vec![
                IndexInfo::new("PRIMARY", vec!["id".into()])
                    .with_unique(true)
                    .with_cardinality(Some(1024)),
                IndexInfo::new("idx_customer", vec!["customer_id".into()])
                    .with_cardinality(Some(87)),
            ]);
        let out = render(&[table]);
        assert!(out.starts_with("Table: orders\n  Rows: 1,024\n  Data size: 65,536 bytes ("));
        assert!(out.contains("  Auto increment: 1025\n"));
        assert!(out.contains("  Comment: customer orders\n"));
        assert!(out.contains("    PRIMARY (id) unique, cardinality 1024\n"));
        assert!(out.contains("    idx_customer (customer_id) cardinality 87\n"));
    }

    #[test]
    fn test_render_no_tables() {
        assert_eq!(render(&[]), "No tables found.");
    }

    #[test]
    fn test_render_multiple_tables_in_order() {
        let out = render(&[TableInfo::new("a"), TableInfo::new("b")]);
        assert!(out.find("Table: a").unwrap() < out.find("Table: b").unwrap());
        assert!(!out.contains("Auto increment"));
    }
}
