use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::category::{Category, CategoryId};
use crate::errors::CoreError;

/// Smallest amount accepted from a form.
pub const MIN_AMOUNT: f64 = 0.01;

/// Largest amount accepted from a form.
pub const MAX_AMOUNT: f64 = 999_999.99;

/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// A single recorded spending event.
///
/// `date` is the calendar day of the spend and is independent from the
/// record metadata (`created_at` / `updated_at`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Opaque unique identifier (UUID v4 when generated locally)
    pub id: String,

    /// Amount spent (always positive)
    pub amount: f64,

    pub description: String,

    /// Full category object, as carried by the API payloads
    pub category: Category,

    /// Day of the spend (no time component). Written as `YYYY-MM-DD`; full
    /// RFC 3339 timestamps are also accepted on read.
    #[serde(deserialize_with = "deserialize_iso_date")]
    pub date: NaiveDate,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new expense with a fresh id and both timestamps set to `now`.
    pub fn new(form: &ExpenseFormData, now: DateTime<Utc>) -> Result<Self, CoreError> {
        form.validate()?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            amount: form.amount,
            description: form.description.trim().to_string(),
            category: form.category.category(),
            date: form.date,
            created_at: now,
            updated_at: now,
        })
    }

    /// Build the edited version of this expense.
    /// The id and creation timestamp are kept; `updated_at` becomes `now`.
    pub fn edited(&self, form: &ExpenseFormData, now: DateTime<Utc>) -> Result<Self, CoreError> {
        form.validate()?;
        Ok(Self {
            id: self.id.clone(),
            amount: form.amount,
            description: form.description.trim().to_string(),
            category: form.category.category(),
            date: form.date,
            created_at: self.created_at,
            updated_at: now,
        })
    }

    #[must_use]
    pub fn category_id(&self) -> CategoryId {
        self.category.id
    }
}

/// User input for creating or editing an expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseFormData {
    pub amount: f64,
    pub description: String,
    pub category: CategoryId,
    pub date: NaiveDate,
}

impl ExpenseFormData {
    pub fn new(
        amount: f64,
        description: impl Into<String>,
        category: CategoryId,
        date: NaiveDate,
    ) -> Self {
        Self {
            amount,
            description: description.into(),
            category,
            date,
        }
    }

    /// Build form data from a raw category id string, as submitted by a
    /// category selector. Unknown ids fail with `CoreError::InvalidCategory`.
    pub fn parse(
        amount: f64,
        description: impl Into<String>,
        category: &str,
        date: NaiveDate,
    ) -> Result<Self, CoreError> {
        let category = category.parse::<CategoryId>()?;
        Ok(Self::new(amount, description, category, date))
    }

    /// Check amount and description against the form rules.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(CoreError::ValidationError(
                "Amount must be greater than 0".into(),
            ));
        }
        if self.amount < MIN_AMOUNT {
            return Err(CoreError::ValidationError(format!(
                "Amount must be at least {MIN_AMOUNT}"
            )));
        }
        if self.amount > MAX_AMOUNT {
            return Err(CoreError::ValidationError(format!(
                "Amount cannot exceed {MAX_AMOUNT}"
            )));
        }

        let description = self.description.trim();
        if description.is_empty() {
            return Err(CoreError::ValidationError(
                "Description is required".into(),
            ));
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(CoreError::ValidationError(format!(
                "Description must be {MAX_DESCRIPTION_LEN} characters or less"
            )));
        }
        Ok(())
    }
}

/// Partial update body for `PATCH /{entity}/{id}`. Absent fields are omitted
/// from the JSON so the server leaves them untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_category",
        deserialize_with = "deserialize_optional_category"
    )]
    pub category: Option<CategoryId>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_iso_date"
    )]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ExpensePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.date.is_none()
    }
}

/// Patches carry the registry entry for the chosen id, never a caller-built
/// category object.
fn serialize_optional_category<S>(
    id: &Option<CategoryId>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    id.map(|id| id.category()).serialize(serializer)
}

/// Accepts either the bare id (`"food"`) or a full category object; only the
/// id is kept.
fn deserialize_optional_category<'de, D>(deserializer: D) -> Result<Option<CategoryId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CategoryRef {
        Id(CategoryId),
        Full(Category),
    }

    let value: Option<CategoryRef> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        CategoryRef::Id(id) => id,
        CategoryRef::Full(category) => category.id,
    }))
}

/// Parse a stored expense date: either a bare `YYYY-MM-DD` day or a full
/// RFC 3339 timestamp, whose date is taken in the offset it was written with.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive())
}

pub fn deserialize_iso_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_iso_date(&s)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {s}")))
}

pub fn deserialize_optional_iso_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref() {
        None => Ok(None),
        Some(v) => parse_iso_date(v)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {v}"))),
    }
}
