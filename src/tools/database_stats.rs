//! The `get_database_stats` tool.

use crate::db::{QueryRunner, StatisticsAggregator};
use crate::error::DbResult;
use crate::models::{DatabaseStats, StatValue};
use crate::tools::format::{format_bytes, format_count};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// get_database_stats takes no arguments.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct DatabaseStatsInput {}

pub struct DatabaseStatsHandler<R> {
    aggregator: StatisticsAggregator<R>,
}

impl<R: QueryRunner> DatabaseStatsHandler<R> {
    pub fn new(runner: Arc<R>, database: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            aggregator: StatisticsAggregator::new(runner, database, endpoint),
        }
    }

    pub async fn handle(&self) -> DbResult<String> {
        let stats = self.aggregator.collect().await?;
        info!(
            fields = stats.fields.len(),
            unavailable = stats.unavailable_count(),
            "get_database_stats completed"
        );
        Ok(render(&stats))
    }
}

fn render_value(value: &StatValue) -> String {
    match value {
        StatValue::Text(text) => text.clone(),
        StatValue::Count(n) => format_count(*n),
        StatValue::Bytes(n) => format_bytes(*n),
        StatValue::Unavailable(reason) => format!("unavailable ({})", reason),
    }
}

/// Render the report grouped by section, in probe order.
pub fn render(stats: &DatabaseStats) -> String {
    let mut out = String::from("Database Statistics\n===================\n");
    let mut current_section = "";

    for field in &stats.fields {
        if field.section != current_section {
            out.push_str(&format!("\n{}:\n", field.section));
            current_section = field.section;
        }
        out.push_str(&format!("  {}: {}\n", field.label, render_value(&field.value)));
    }

    out.trim_end().to_string()
}
