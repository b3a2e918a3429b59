use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::category::{Category, CategoryId};

/// Aggregate totals over an expense collection.
/// Derived on every query, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummary {
    /// Sum of expenses dated within the current calendar month
    pub current_month_total: f64,

    /// Sum of all expenses
    pub all_time_total: f64,

    pub expense_count: usize,

    /// all_time_total / expense_count, or 0 for an empty collection
    pub average_amount: f64,
}

/// Share of total spending attributed to one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: Category,

    pub total: f64,

    /// total / all-time total × 100
    pub percentage: f64,

    pub count: usize,
}

/// Direction of month-over-month spending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Same,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Up => write!(f, "up"),
            TrendDirection::Down => write!(f, "down"),
            TrendDirection::Same => write!(f, "same"),
        }
    }
}

/// Current vs. previous calendar month comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    pub current_month_total: f64,

    pub previous_month_total: f64,

    /// Absolute percentage change. Exactly 100 when the previous month is
    /// empty and the current one is not.
    pub change_percentage: f64,

    pub trend: TrendDirection,
}

/// Optional criteria for `filter_service::filter`. Every supplied criterion
/// must match (AND semantics); `None` means "don't filter on this".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseFilters {
    pub query: Option<String>,
    pub category_id: Option<CategoryId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

impl ExpenseFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn with_amount_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_amount = min;
        self.max_amount = max;
        self
    }
}

/// Sort order for expense listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExpenseSortOrder {
    /// Newest date first (default for display)
    #[default]
    DateDesc,
    DateAsc,
    AmountDesc,
    AmountAsc,
    /// Alphabetical by description, case-insensitive
    DescriptionAsc,
    /// Registry order of the category
    CategoryAsc,
}
