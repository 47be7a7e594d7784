//! Database statistics report model.

use serde::Serialize;

/// Value of one statistics field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StatValue {
    Text(String),
    Count(u64),
    Bytes(u64),
    /// The probe failed or returned nothing; carries the reason
    Unavailable(String),
}

impl StatValue {
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable(_))
    }
}

/// One labelled line of the report.
#[derive(Debug, Clone, Serialize)]
pub struct StatField {
    pub section: &'static str,
    pub label: &'static str,
    pub value: StatValue,
}

/// Ordered statistics report for the configured database.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatabaseStats {
    pub fields: Vec<StatField>,
}

impl DatabaseStats {
    pub fn push(&mut self, section: &'static str, label: &'static str, value: StatValue) {
        self.fields.push(StatField {
            section,
            label,
            value,
        });
    }

    /// Look up a field by label.
    pub fn get(&self, label: &str) -> Option<&StatValue> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| &f.value)
    }

    pub fn unavailable_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| !f.value.is_available())
            .count()
    }
}
