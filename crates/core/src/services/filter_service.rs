use std::cmp::Ordering;

use crate::models::analytics::{ExpenseFilters, ExpenseSortOrder};
use crate::models::expense::Expense;
use crate::models::period::DateRange;

/// Search, filtering and ordering of expense listings.
///
/// Results borrow from the input slice and preserve its order unless sorted.
pub struct FilterService;

impl FilterService {
    pub fn new() -> Self {
        Self
    }

    /// Case-insensitive substring search over description and category name.
    /// A blank query returns every expense unchanged.
    pub fn search<'a>(&self, expenses: &'a [Expense], query: &str) -> Vec<&'a Expense> {
        search_refs(expenses.iter().collect(), query)
    }

    /// Apply every supplied criterion in turn: query, category, date range,
    /// minimum amount, maximum amount.
    ///
    /// The date range only applies when both bounds are given; amount bounds
    /// are inclusive and independent of each other.
    pub fn filter<'a>(
        &self,
        expenses: &'a [Expense],
        filters: &ExpenseFilters,
    ) -> Vec<&'a Expense> {
        let mut filtered: Vec<&Expense> = expenses.iter().collect();

        if let Some(query) = filters.query.as_deref().filter(|q| !q.is_empty()) {
            filtered = search_refs(filtered, query);
        }

        if let Some(category_id) = filters.category_id {
            filtered.retain(|e| e.category.id == category_id);
        }

        if let (Some(start), Some(end)) = (filters.start_date, filters.end_date) {
            let range = DateRange::new(start, end);
            filtered.retain(|e| range.contains(e.date));
        }

        if let Some(min) = filters.min_amount {
            filtered.retain(|e| e.amount >= min);
        }

        if let Some(max) = filters.max_amount {
            filtered.retain(|e| e.amount <= max);
        }

        filtered
    }

    /// Order expenses for display. Ties keep input order.
    pub fn sorted<'a>(&self, expenses: &'a [Expense], order: ExpenseSortOrder) -> Vec<&'a Expense> {
        let mut sorted: Vec<&Expense> = expenses.iter().collect();
        match order {
            ExpenseSortOrder::DateDesc => sorted.sort_by(|a, b| b.date.cmp(&a.date)),
            ExpenseSortOrder::DateAsc => sorted.sort_by(|a, b| a.date.cmp(&b.date)),
            ExpenseSortOrder::AmountDesc => {
                sorted.sort_by(|a, b| b.amount.partial_cmp(&a.amount).unwrap_or(Ordering::Equal))
            }
            ExpenseSortOrder::AmountAsc => {
                sorted.sort_by(|a, b| a.amount.partial_cmp(&b.amount).unwrap_or(Ordering::Equal))
            }
            ExpenseSortOrder::DescriptionAsc => {
                sorted.sort_by_key(|e| e.description.to_lowercase())
            }
            ExpenseSortOrder::CategoryAsc => sorted.sort_by_key(|e| e.category.id),
        }
        sorted
    }
}

impl Default for FilterService {
    fn default() -> Self {
        Self::new()
    }
}

fn search_refs<'a>(expenses: Vec<&'a Expense>, query: &str) -> Vec<&'a Expense> {
    let term = query.trim().to_lowercase();
    if term.is_empty() {
        return expenses;
    }

    expenses
        .into_iter()
        .filter(|e| {
            e.description.to_lowercase().contains(&term)
                || e.category.name.to_lowercase().contains(&term)
        })
        .collect()
}
