use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::CoreError;
use crate::models::category::Category;
use crate::models::expense::Expense;

/// Version tag written into every export envelope.
pub const EXPORT_VERSION: &str = "1.0.0";

/// Fixed keys of the local key/value schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Expenses,
    Categories,
    Settings,
    UserPreferences,
}

impl StorageKey {
    pub const ALL: [StorageKey; 4] = [
        StorageKey::Expenses,
        StorageKey::Categories,
        StorageKey::Settings,
        StorageKey::UserPreferences,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Expenses => "expenses",
            StorageKey::Categories => "categories",
            StorageKey::Settings => "settings",
            StorageKey::UserPreferences => "userPreferences",
        }
    }
}

/// Export/import document.
///
/// ```json
/// { "expenses": [...], "categories": [...],
///   "exportDate": "2025-01-15T10:00:00Z", "version": "1.0.0" }
/// ```
///
/// Every field is optional on import: only the collections present replace
/// stored data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expenses: Option<Vec<Expense>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Build the pretty-printed export document.
pub fn write_export(
    expenses: &[Expense],
    categories: &[Category],
    exported_at: DateTime<Utc>,
) -> Result<String, CoreError> {
    let envelope = ExportEnvelope {
        expenses: Some(expenses.to_vec()),
        categories: Some(categories.to_vec()),
        export_date: Some(exported_at),
        version: Some(EXPORT_VERSION.to_string()),
    };
    serde_json::to_string_pretty(&envelope)
        .map_err(|e| CoreError::Serialization(format!("Failed to export data: {e}")))
}

/// Parse an export document. Anything that is not a JSON object with the
/// expected field shapes is rejected as an invalid format.
pub fn read_export(data: &str) -> Result<ExportEnvelope, CoreError> {
    let value: serde_json::Value = serde_json::from_str(data)
        .map_err(|e| CoreError::Import(format!("Invalid format: {e}")))?;
    if !value.is_object() {
        return Err(CoreError::Import(
            "Invalid format: expected a JSON object".into(),
        ));
    }

    let envelope: ExportEnvelope = serde_json::from_value(value)
        .map_err(|e| CoreError::Import(format!("Invalid format: {e}")))?;

    if let Some(version) = envelope.version.as_deref() {
        if version != EXPORT_VERSION {
            warn!(
                version = %version,
                expected = EXPORT_VERSION,
                "Importing export envelope with a different version"
            );
        }
    }

    Ok(envelope)
}
