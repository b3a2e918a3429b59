use chrono::{Datelike, NaiveDate};

use crate::models::analytics::{CategoryBreakdown, MonthlyTrend, SpendingSummary, TrendDirection};
use crate::models::category::{CategoryId, registry};
use crate::models::expense::Expense;
use crate::models::period::DateRange;

/// Number of categories returned by `top_spending_categories` when the caller
/// has no preference.
pub const DEFAULT_TOP_CATEGORIES: usize = 5;

/// Computes spending analytics over an expense collection.
///
/// Pure business logic: every method borrows the collection, never mutates
/// it, and is total over the empty slice. Methods that depend on "now" take
/// `today` explicitly so results are reproducible.
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    /// Totals for the current month and all time, count and average.
    pub fn spending_summary(&self, expenses: &[Expense], today: NaiveDate) -> SpendingSummary {
        let current_month_total = self.current_month_total(expenses, today);
        let all_time_total = self.total_amount(expenses);
        let expense_count = expenses.len();

        SpendingSummary {
            current_month_total,
            all_time_total,
            expense_count,
            average_amount: self.average_amount(expenses),
        }
    }

    /// Per-category totals, counts and share of the all-time total.
    ///
    /// Categories without spending are dropped. The result is sorted by total,
    /// highest first; equal totals keep registry order (stable sort).
    pub fn category_breakdown(&self, expenses: &[Expense]) -> Vec<CategoryBreakdown> {
        let all_time_total = self.total_amount(expenses);

        let mut breakdown: Vec<CategoryBreakdown> = registry()
            .into_iter()
            .map(|category| {
                let (total, count) = expenses
                    .iter()
                    .filter(|e| e.category.id == category.id)
                    .fold((0.0, 0usize), |(sum, n), e| (sum + e.amount, n + 1));

                let percentage = if all_time_total > 0.0 {
                    (total / all_time_total) * 100.0
                } else {
                    0.0
                };

                CategoryBreakdown {
                    category,
                    total,
                    percentage,
                    count,
                }
            })
            .filter(|item| item.total > 0.0)
            .collect();

        breakdown.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        breakdown
    }

    /// The first `limit` entries of `category_breakdown`.
    pub fn top_spending_categories(
        &self,
        expenses: &[Expense],
        limit: usize,
    ) -> Vec<CategoryBreakdown> {
        let mut breakdown = self.category_breakdown(expenses);
        breakdown.truncate(limit);
        breakdown
    }

    /// `top_spending_categories` with `DEFAULT_TOP_CATEGORIES` entries.
    pub fn top_categories(&self, expenses: &[Expense]) -> Vec<CategoryBreakdown> {
        self.top_spending_categories(expenses, DEFAULT_TOP_CATEGORIES)
    }

    /// Expenses in the given category.
    pub fn expenses_by_category<'a>(
        &self,
        expenses: &'a [Expense],
        category_id: CategoryId,
    ) -> Vec<&'a Expense> {
        expenses
            .iter()
            .filter(|e| e.category.id == category_id)
            .collect()
    }

    /// Expenses dated within `[start, end]` (inclusive on both ends).
    pub fn expenses_by_date_range<'a>(
        &self,
        expenses: &'a [Expense],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<&'a Expense> {
        let range = DateRange::new(start, end);
        expenses.iter().filter(|e| range.contains(e.date)).collect()
    }

    /// Expenses dated within the calendar month containing `today`.
    pub fn current_month_expenses<'a>(
        &self,
        expenses: &'a [Expense],
        today: NaiveDate,
    ) -> Vec<&'a Expense> {
        let month = DateRange::month_of(today);
        self.expenses_by_date_range(expenses, month.start, month.end)
    }

    /// Expenses dated within the calendar month before the one containing `today`.
    pub fn previous_month_expenses<'a>(
        &self,
        expenses: &'a [Expense],
        today: NaiveDate,
    ) -> Vec<&'a Expense> {
        let month = DateRange::previous_month_of(today);
        self.expenses_by_date_range(expenses, month.start, month.end)
    }

    /// Compare this month's spending with last month's.
    ///
    /// The change is reported as an absolute percentage with a separate
    /// direction. An empty previous month with current spending reports
    /// exactly 100% up.
    pub fn monthly_trend(&self, expenses: &[Expense], today: NaiveDate) -> MonthlyTrend {
        let current_month_total = sum(self.current_month_expenses(expenses, today));
        let previous_month_total = sum(self.previous_month_expenses(expenses, today));

        let mut change_percentage = 0.0;
        let mut trend = TrendDirection::Same;

        if previous_month_total > 0.0 {
            change_percentage =
                ((current_month_total - previous_month_total) / previous_month_total) * 100.0;
            if change_percentage > 0.0 {
                trend = TrendDirection::Up;
            } else if change_percentage < 0.0 {
                trend = TrendDirection::Down;
            }
        } else if current_month_total > 0.0 {
            change_percentage = 100.0;
            trend = TrendDirection::Up;
        }

        MonthlyTrend {
            current_month_total,
            previous_month_total,
            change_percentage: change_percentage.abs(),
            trend,
        }
    }

    /// Current-month total spread over the days elapsed so far this month.
    pub fn current_month_daily_average(&self, expenses: &[Expense], today: NaiveDate) -> f64 {
        let total = self.current_month_total(expenses, today);
        let day = today.day();
        if day > 0 {
            total / f64::from(day)
        } else {
            0.0
        }
    }

    /// Sum of all amounts.
    pub fn total_amount(&self, expenses: &[Expense]) -> f64 {
        expenses.iter().map(|e| e.amount).sum()
    }

    /// Mean amount, or 0 for an empty collection.
    pub fn average_amount(&self, expenses: &[Expense]) -> f64 {
        if expenses.is_empty() {
            0.0
        } else {
            self.total_amount(expenses) / expenses.len() as f64
        }
    }

    /// Sum of amounts dated within the current calendar month.
    pub fn current_month_total(&self, expenses: &[Expense], today: NaiveDate) -> f64 {
        sum(self.current_month_expenses(expenses, today))
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}

fn sum(expenses: Vec<&Expense>) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}
