//! Database-wide statistics.
//!
//! The report is driven by a constant probe table. Every probe runs on the
//! same session; a probe that fails only marks its own field unavailable.

use crate::db::runner::{QueryRunner, QuerySession};
use crate::db::types::{json_as_string, json_as_u64};
use crate::error::DbResult;
use crate::models::{DatabaseStats, QueryResult, StatValue};
use std::sync::Arc;
use tracing::{debug, warn};

/// How a probe's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    Text,
    /// Integer counter; SQL NULL reads as zero
    Count,
    /// Byte total; SQL NULL reads as zero
    Bytes,
    /// Seconds, rendered as a duration
    Seconds,
}

/// Whether the probe binds the configured schema name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeScope {
    Server,
    Schema,
}

/// One entry of the statistics battery.
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    pub section: &'static str,
    pub label: &'static str,
    pub sql: &'static str,
    pub kind: ProbeKind,
    pub scope: ProbeScope,
    /// Column holding the value; `None` means the first column
    pub column: Option<&'static str>,
}

pub const PROBES: &[Probe] = &[
    Probe {
        section: "Server",
        label: "Database",
        sql: "SELECT DATABASE()",
        kind: ProbeKind::Text,
        scope: ProbeScope::Server,
        column: None,
    },
    Probe {
        section: "Server",
        label: "Version",
        sql: "SELECT VERSION()",
        kind: ProbeKind::Text,
        scope: ProbeScope::Server,
        column: None,
    },
    Probe {
        section: "Server",
        label: "Uptime",
        sql: "SHOW GLOBAL STATUS LIKE 'Uptime'",
        kind: ProbeKind::Seconds,
        scope: ProbeScope::Server,
        column: Some("Value"),
    },
    Probe {
        section: "Tables",
        label: "Total tables",
        sql: "SELECT COUNT(*) FROM information_schema.TABLES WHERE TABLE_SCHEMA = ?",
        kind: ProbeKind::Count,
        scope: ProbeScope::Schema,
        column: None,
    },
    Probe {
        section: "Tables",
        label: "Total rows",
        sql: "SELECT SUM(TABLE_ROWS) FROM information_schema.TABLES WHERE TABLE_SCHEMA = ?",
        kind: ProbeKind::Count,
        scope: ProbeScope::Schema,
        column: None,
    },
    Probe {
        section: "Tables",
        label: "Data size",
        sql: "SELECT SUM(DATA_LENGTH) FROM information_schema.TABLES WHERE TABLE_SCHEMA = ?",
        kind: ProbeKind::Bytes,
        scope: ProbeScope::Schema,
        column: None,
    },
    Probe {
        section: "Tables",
        label: "Index size",
        sql: "SELECT SUM(INDEX_LENGTH) FROM information_schema.TABLES WHERE TABLE_SCHEMA = ?",
        kind: ProbeKind::Bytes,
        scope: ProbeScope::Schema,
        column: None,
    },
    Probe {
        section: "Tables",
        label: "Total size",
        sql: "SELECT SUM(DATA_LENGTH + INDEX_LENGTH) FROM information_schema.TABLES WHERE TABLE_SCHEMA = ?",
        kind: ProbeKind::Bytes,
        scope: ProbeScope::Schema,
        column: None,
    },
    Probe {
        section: "Activity",
        label: "Active connections",
        sql: "SHOW STATUS LIKE 'Threads_connected'",
        kind: ProbeKind::Count,
        scope: ProbeScope::Server,
        column: Some("Value"),
    },
];

/// Runs [`PROBES`] and assembles a [`DatabaseStats`] report.
pub struct StatisticsAggregator<R> {
    runner: Arc<R>,
    database: String,
    endpoint: String,
}

impl<R: QueryRunner> StatisticsAggregator<R> {
    pub fn new(runner: Arc<R>, database: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            runner,
            database: database.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Collect the report. Only failing to acquire the session fails the call.
    pub async fn collect(&self) -> DbResult<DatabaseStats> {
        let mut session = self.runner.acquire().await?;
        let mut stats = DatabaseStats::default();

        stats.push("Server", "Endpoint", StatValue::Text(self.endpoint.clone()));

        for probe in PROBES {
            let params: Vec<String> = match probe.scope {
                ProbeScope::Server => Vec::new(),
                ProbeScope::Schema => vec![self.database.clone()],
            };

            let value = match session.run(probe.sql, &params).await {
                Ok(result) => interpret(probe, &result),
                Err(e) => StatValue::Unavailable(e.to_string()),
            };

            if let StatValue::Unavailable(reason) = &value {
                warn!(probe = probe.label, reason = %reason, "Statistics probe unavailable");
            } else {
                debug!(probe = probe.label, value = ?value, "Statistics probe");
            }
            stats.push(probe.section, probe.label, value);
        }

        Ok(stats)
    }
}

/// Turn a probe's result into a field value.
pub fn interpret(probe: &Probe, result: &QueryResult) -> StatValue {
    let Some(row) = result.first_row() else {
        return StatValue::Unavailable("no rows returned".to_string());
    };
    let value = match probe.column {
        Some(column) => row.get(column),
        None => result.scalar(),
    };
    let value = value.unwrap_or(&serde_json::Value::Null);

    match probe.kind {
        ProbeKind::Text => StatValue::Text(json_as_string(value).unwrap_or_else(|| "(none)".into())),
        ProbeKind::Count | ProbeKind::Bytes | ProbeKind::Seconds if value.is_null() => {
            zero_value(probe.kind)
        }
        kind => match json_as_u64(value) {
            Some(n) => match kind {
                ProbeKind::Bytes => StatValue::Bytes(n),
                ProbeKind::Seconds => StatValue::Text(format_uptime(n)),
                _ => StatValue::Count(n),
            },
            None => StatValue::Unavailable(format!("unexpected value {}", value)),
        },
    }
}

fn zero_value(kind: ProbeKind) -> StatValue {
    match kind {
        ProbeKind::Bytes => StatValue::Bytes(0),
        ProbeKind::Seconds => StatValue::Text(format_uptime(0)),
        _ => StatValue::Count(0),
    }
}

/// Render seconds as `1d 2h 3m 4s`, leading zero units omitted.
pub fn format_uptime(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if days > 0 || hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    parts.push(format!("{seconds}s"));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn probe(label: &str) -> &'static Probe {
        PROBES.iter().find(|p| p.label == label).unwrap()
    }

    fn single(column: &str, value: serde_json::Value) -> QueryResult {
        let row = json!({ column: value }).as_object().cloned().unwrap();
        QueryResult::rows(vec![column.to_string()], vec![row])
    }

    #[test]
    fn test_probe_table_shape() {
        let labels: Vec<_> = PROBES.iter().map(|p| p.label).collect();
        assert_eq!(
            labels,
            vec![
                "Database",
                "Version",
                "Uptime",
                "Total tables",
                "Total rows",
                "Data size",
                "Index size",
                "Total size",
                "Active connections",
            ]
        );
        for p in PROBES.iter().filter(|p| p.scope == ProbeScope::Schema) {
            assert!(p.sql.contains("TABLE_SCHEMA = ?"), "{} must bind the schema", p.label);
        }
    }

    #[test]
    fn test_interpret_null_sum_is_zero() {
        let result = single("SUM(DATA_LENGTH)", serde_json::Value::Null);
        assert_eq!(interpret(probe("Data size"), &result), StatValue::Bytes(0));
        assert_eq!(interpret(probe("Total rows"), &result), StatValue::Count(0));
    }

    #[test]
    fn test_interpret_decimal_sum() {
        let result = single("SUM(DATA_LENGTH)", json!("65536"));
        assert_eq!(interpret(probe("Data size"), &result), StatValue::Bytes(65536));
    }

    #[test]
    fn test_interpret_status_row() {
        let row = json!({ "Variable_name": "Threads_connected", "Value": "7" })
            .as_object()
            .cloned()
            .unwrap();
        let result = QueryResult::rows(vec!["Variable_name".into(), "Value".into()], vec![row]);
        assert_eq!(
            interpret(probe("Active connections"), &result),
            StatValue::Count(7)
        );
    }

    #[test]
    fn test_interpret_no_rows_is_unavailable() {
        let result = QueryResult::rows(vec!["Value".into()], Vec::new());
        assert!(matches!(
            interpret(probe("Uptime"), &result),
            StatValue::Unavailable(_)
        ));
    }

    #[test]
    fn test_interpret_text() {
        let result = single("VERSION()", json!("8.0.11-TiDB-v7.5.0"));
        assert_eq!(
            interpret(probe("Version"), &result),
            StatValue::Text("8.0.11-TiDB-v7.5.0".into())
        );
        let result = single("DATABASE()", serde_json::Value::Null);
        assert_eq!(
            interpret(probe("Database"), &result),
            StatValue::Text("(none)".into())
        );
    }

    #[test]
    fn test_interpret_garbage_is_unavailable() {
        let result = single("COUNT(*)", json!("many"));
        assert!(matches!(
            interpret(probe("Total tables"), &result),
            StatValue::Unavailable(_)
        ));
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "0s");
        assert_eq!(format_uptime(59), "59s");
        assert_eq!(format_uptime(61), "1m 1s");
        assert_eq!(format_uptime(3_600), "1h 0m 0s");
        assert_eq!(format_uptime(90_061), "1d 1h 1m 1s");
    }
}
