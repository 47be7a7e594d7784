//! Table metadata introspection.
//!
//! SQL queries are organized in the `queries` submodule. All statements of one
//! call run on a single session and bind the schema and table names as
//! parameters, never by string interpolation.

use crate::db::runner::{QueryRunner, QuerySession};
use crate::db::types::{json_as_string, json_as_u64};
use crate::error::{DbError, DbResult};
use crate::models::{IndexInfo, Row, TableInfo};
use std::sync::Arc;
use tracing::debug;

mod queries {
    pub const TABLE_INFO: &str = r#"
        SELECT
            TABLE_NAME AS table_name,
            TABLE_ROWS AS table_rows,
            DATA_LENGTH AS data_length,
            INDEX_LENGTH AS index_length,
            AUTO_INCREMENT AS auto_increment,
            TABLE_COMMENT AS table_comment
        FROM information_schema.TABLES
        WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND TABLE_TYPE = 'BASE TABLE'
    "#;

    pub const LIST_TABLES: &str = r#"
        SELECT TABLE_NAME AS table_name
        FROM information_schema.TABLES
        WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'
        ORDER BY TABLE_NAME
    "#;

    pub const TABLE_INDEXES: &str = r#"
        SELECT
            INDEX_NAME AS index_name,
            GROUP_CONCAT(COLUMN_NAME ORDER BY SEQ_IN_INDEX SEPARATOR ',') AS column_names,
            MIN(NON_UNIQUE) AS non_unique,
            MAX(CARDINALITY) AS cardinality
        FROM information_schema.STATISTICS
        WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
        GROUP BY INDEX_NAME
        ORDER BY INDEX_NAME = 'PRIMARY' DESC, INDEX_NAME
    "#;
}

/// Collects [`TableInfo`] records for the configured database.
pub struct MetadataInspector<R> {
    runner: Arc<R>,
    database: String,
}

impl<R: QueryRunner> MetadataInspector<R> {
    pub fn new(runner: Arc<R>, database: impl Into<String>) -> Self {
        Self {
            runner,
            database: database.into(),
        }
    }

    /// Metadata for one table. An unknown name is `DbError::TableNotFound`.
    pub async fn table_info(&self, table_name: &str) -> DbResult<TableInfo> {
        let mut session = self.runner.acquire().await?;
        self.collect_table(&mut session, table_name)
            .await?
            .ok_or_else(|| DbError::table_not_found(table_name, &self.database))
    }

    /// Metadata for every base table, in the order the server lists them.
    pub async fn all_tables(&self) -> DbResult<Vec<TableInfo>> {
        let mut session = self.runner.acquire().await?;
        let listing = session
            .run(queries::LIST_TABLES, &[self.database.clone()])
            .await?;

        let names: Vec<String> = listing
            .rows
            .iter()
            .filter_map(|row| row.get("table_name").and_then(json_as_string))
            .collect();
        debug!(database = %self.database, count = names.len(), "Listing tables");

        let mut tables = Vec::with_capacity(names.len());
        for name in &names {
            match self.collect_table(&mut session, name).await? {
                Some(info) => tables.push(info),
                None => debug!(table = %name, "Table disappeared while listing, skipped"),
            }
        }
        Ok(tables)
    }

    async fn collect_table(
        &self,
        session: &mut R::Session,
        table_name: &str,
    ) -> DbResult<Option<TableInfo>> {
        let params = [self.database.clone(), table_name.to_string()];

        let result = session.run(queries::TABLE_INFO, &params).await?;
        let Some(row) = result.first_row() else {
            return Ok(None);
        };
        let mut info = table_from_row(row, table_name);

        let indexes = session.run(queries::TABLE_INDEXES, &params).await?;
        info.indexes = indexes.rows.iter().filter_map(index_from_row).collect();

        Ok(Some(info))
    }
}

fn get_u64(row: &Row, column: &str) -> Option<u64> {
    row.get(column).and_then(json_as_u64)
}

fn table_from_row(row: &Row, fallback_name: &str) -> TableInfo {
    let name = row
        .get("table_name")
        .and_then(json_as_string)
        .unwrap_or_else(|| fallback_name.to_string());

    TableInfo::new(name)
        .with_row_count(get_u64(row, "table_rows").unwrap_or(0))
        .with_sizes(
            get_u64(row, "data_length").unwrap_or(0),
            get_u64(row, "index_length").unwrap_or(0),
        )
        .with_auto_increment(get_u64(row, "auto_increment"))
        .with_comment(row.get("table_comment").and_then(json_as_string))
}

fn index_from_row(row: &Row) -> Option<IndexInfo> {
    let name = row.get("index_name").and_then(json_as_string)?;
    let columns = row
        .get("column_names")
        .and_then(json_as_string)
        .map(|s| s.split(',').map(|c| c.trim().to_string()).collect())
        .unwrap_or_default();

    Some(
        IndexInfo::new(name, columns)
            .with_unique(get_u64(row, "non_unique") == Some(0))
            .with_cardinality(get_u64(row, "cardinality")),
    )
}
