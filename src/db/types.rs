//! Row decoding for TiDB result sets.
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies the column's MySQL type name
//! 2. A category-specific decoder extracts the value as JSON
//!
//! Statements without parameters travel over the text protocol, so every
//! decoder falls back to the raw textual value before giving up on a column.

use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::{Column, Decode, Row, Type, TypeInfo};
use std::collections::HashSet;

/// Logical category for MySQL/TiDB column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Temporal,
    Text,
    Binary,
    Json,
}

/// Classify a column type name into a logical category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    let lower = type_name.to_lowercase();

    // Decimal - check first as "numeric" would otherwise never match
    if lower.contains("decimal") || lower.contains("numeric") {
        return TypeCategory::Decimal;
    }

    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    if lower.contains("int") || lower == "year" {
        return TypeCategory::Integer;
    }

    if lower.contains("float") || lower.contains("double") || lower == "real" {
        return TypeCategory::Float;
    }

    if lower.contains("date") || lower.contains("time") {
        return TypeCategory::Temporal;
    }

    if lower == "json" {
        return TypeCategory::Json;
    }

    if lower.contains("blob") || lower.contains("binary") || lower == "bit" {
        return TypeCategory::Binary;
    }

    // varchar, char, text, enum, set
    TypeCategory::Text
}

/// Wrapper type for raw DECIMAL values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

/// Encode binary column data as a JSON value.
///
/// Valid UTF-8 is returned as text, anything else as base64.
pub fn decode_binary_value(bytes: &[u8]) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    match std::str::from_utf8(bytes) {
        Ok(s) => JsonValue::String(s.to_string()),
        Err(_) => JsonValue::String(STANDARD.encode(bytes)),
    }
}

/// Trait for converting database rows to JSON maps.
pub trait RowToJson {
    fn to_json_map(&self) -> serde_json::Map<String, JsonValue>;
    fn column_names(&self) -> Vec<String>;
}

impl RowToJson for MySqlRow {
    fn to_json_map(&self) -> serde_json::Map<String, JsonValue> {
        let values = self
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let type_name = col.type_info().name();
                decode_column(self, idx, categorize_type(type_name))
            })
            .collect();
        zip_row(&self.column_names(), values)
    }

    fn column_names(&self) -> Vec<String> {
        unique_column_names(self.columns().iter().map(|col| col.name()))
    }
}

/// Make column labels usable as row keys.
///
/// A repeated label gets a `_2`, `_3`, ... suffix, skipping any suffix that is
/// already taken by another column. `SELECT o.id, c.id ...` yields `id, id_2`.
pub fn unique_column_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let names: Vec<&str> = names.into_iter().collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());
    let mut out = Vec::with_capacity(names.len());

    for (idx, name) in names.iter().enumerate() {
        let repeated = names[..idx].contains(name);
        let label = if repeated || taken.contains(*name) {
            (2..)
                .map(|n| format!("{}_{}", name, n))
                .find(|candidate| !taken.contains(candidate) && !names.contains(&candidate.as_str()))
                .unwrap_or_else(|| name.to_string())
        } else {
            name.to_string()
        };
        taken.insert(label.clone());
        out.push(label);
    }
    out
}

/// Pair unique column labels with decoded values, keeping select-list order.
pub fn zip_row(columns: &[String], values: Vec<JsonValue>) -> serde_json::Map<String, JsonValue> {
    columns.iter().cloned().zip(values).collect()
}

fn decode_column(row: &MySqlRow, idx: usize, category: TypeCategory) -> JsonValue {
    let value = match category {
        TypeCategory::Decimal => decode_decimal(row, idx),
        TypeCategory::Integer => decode_integer(row, idx),
        TypeCategory::Boolean => decode_boolean(row, idx),
        TypeCategory::Float => decode_float(row, idx),
        TypeCategory::Temporal => decode_temporal(row, idx),
        TypeCategory::Binary => decode_binary_col(row, idx),
        TypeCategory::Json => decode_json(row, idx),
        TypeCategory::Text => decode_text(row, idx),
    };
    match value {
        Some(v) => v,
        None => decode_raw(row, idx),
    }
}

fn decode_decimal(row: &MySqlRow, idx: usize) -> Option<JsonValue> {
    match row.try_get::<Option<RawDecimal>, _>(idx) {
        Ok(v) => Some(v.map(|d| JsonValue::String(d.0)).unwrap_or(JsonValue::Null)),
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to decode DECIMAL");
            None
        }
    }
}

fn decode_integer(row: &MySqlRow, idx: usize) -> Option<JsonValue> {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return Some(v.map(|n| JsonValue::Number(n.into())).unwrap_or(JsonValue::Null));
    }
    if let Ok(v) = row.try_get::<Option<u64>, _>(idx) {
        return Some(v.map(|n| JsonValue::Number(n.into())).unwrap_or(JsonValue::Null));
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
        return Some(v.map(|n| JsonValue::Number(n.into())).unwrap_or(JsonValue::Null));
    }
    if let Ok(v) = row.try_get::<Option<u16>, _>(idx) {
        return Some(v.map(|n| JsonValue::Number(n.into())).unwrap_or(JsonValue::Null));
    }
    None
}

fn decode_boolean(row: &MySqlRow, idx: usize) -> Option<JsonValue> {
    row.try_get::<Option<bool>, _>(idx)
        .ok()
        .map(|v| v.map(JsonValue::Bool).unwrap_or(JsonValue::Null))
}

fn float_value(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(v.to_string()))
}

fn decode_float(row: &MySqlRow, idx: usize) -> Option<JsonValue> {
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return Some(v.map(float_value).unwrap_or(JsonValue::Null));
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(idx) {
        return Some(v.map(|f| float_value(f as f64)).unwrap_or(JsonValue::Null));
    }
    None
}

fn decode_temporal(row: &MySqlRow, idx: usize) -> Option<JsonValue> {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

    if let Ok(v) = row.try_get::<Option<NaiveDateTime>, _>(idx) {
        return Some(
            v.map(|t| JsonValue::String(t.format("%Y-%m-%d %H:%M:%S%.f").to_string()))
                .unwrap_or(JsonValue::Null),
        );
    }
    if let Ok(v) = row.try_get::<Option<DateTime<Utc>>, _>(idx) {
        return Some(
            v.map(|t| JsonValue::String(t.format("%Y-%m-%d %H:%M:%S%.f").to_string()))
                .unwrap_or(JsonValue::Null),
        );
    }
    if let Ok(v) = row.try_get::<Option<NaiveDate>, _>(idx) {
        return Some(
            v.map(|d| JsonValue::String(d.to_string()))
                .unwrap_or(JsonValue::Null),
        );
    }
    if let Ok(v) = row.try_get::<Option<NaiveTime>, _>(idx) {
        return Some(
            v.map(|t| JsonValue::String(t.to_string()))
                .unwrap_or(JsonValue::Null),
        );
    }
    None
}

fn decode_binary_col(row: &MySqlRow, idx: usize) -> Option<JsonValue> {
    row.try_get::<Option<Vec<u8>>, _>(idx)
        .ok()
        .map(|v| v.map(|b| decode_binary_value(&b)).unwrap_or(JsonValue::Null))
}

fn decode_json(row: &MySqlRow, idx: usize) -> Option<JsonValue> {
    row.try_get::<Option<JsonValue>, _>(idx)
        .ok()
        .map(|v| v.unwrap_or(JsonValue::Null))
}

fn decode_text(row: &MySqlRow, idx: usize) -> Option<JsonValue> {
    row.try_get::<Option<String>, _>(idx)
        .ok()
        .map(|v| v.map(JsonValue::String).unwrap_or(JsonValue::Null))
}

/// Last resort: read the value bytes without a type check.
fn decode_raw(row: &MySqlRow, idx: usize) -> JsonValue {
    match row.try_get_unchecked::<Option<Vec<u8>>, _>(idx) {
        Ok(Some(bytes)) => decode_binary_value(&bytes),
        Ok(None) => JsonValue::Null,
        Err(e) => {
            tracing::warn!(column = idx, error = %e, "Failed to decode column");
            JsonValue::Null
        }
    }
}

/// Read a non-negative integer out of a decoded value.
///
/// Aggregates such as `SUM()` come back as DECIMAL text, so numeric strings
/// are accepted as well. Negative or fractional values yield `None`.
pub fn json_as_u64(value: &JsonValue) -> Option<u64> {
    match value {
        JsonValue::Number(n) => n.as_u64(),
        JsonValue::String(s) => {
            let s = s.trim();
            s.parse::<u64>().ok().or_else(|| {
                // "1234.0000" style decimals
                let (int, frac) = s.split_once('.')?;
                frac.chars()
                    .all(|c| c == '0')
                    .then(|| int.parse::<u64>().ok())
                    .flatten()
            })
        }
        JsonValue::Bool(b) => Some(u64::from(*b)),
        _ => None,
    }
}

/// Read a textual value; numbers are rendered, NULL yields `None`.
pub fn json_as_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
