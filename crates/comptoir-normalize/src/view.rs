//! Presentation view over raw document records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::category::map_category;
use crate::coerce::{format_amount, parse_date_safe};
use crate::status::{StatusDescriptor, describe_status};

/// Flattened presentation record handed to serialization layers (API
/// responses, PDF datasets).
#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    pub status: StatusDescriptor,
    pub category: String,
    pub date: Option<DateTime<Utc>>,
    pub total: f64,
}

impl DocumentView {
    /// Build the view from a raw record.
    ///
    /// Field access is forgiving: a missing `statut` goes through the
    /// status fallback, a missing `categorie` renders as "Inconnu", and
    /// a missing or malformed `date`/`montant` coerce to `None`/`0.0`.
    pub fn from_record(record: &Value) -> Self {
        let status_code = record.get("statut").and_then(Value::as_str).unwrap_or_default();
        let category_code = record.get("categorie").and_then(Value::as_str);
        Self {
            status: describe_status(status_code),
            category: map_category(category_code),
            date: record.get("date").and_then(parse_date_safe),
            total: format_amount(record.get("montant")),
        }
    }
}
