// ═══════════════════════════════════════════════════════════════════
// Service Tests: AnalyticsService, FilterService, format_service
// ═══════════════════════════════════════════════════════════════════

use chrono::{NaiveDate, TimeZone, Utc};

use expense_tracker_core::models::analytics::{
    ExpenseFilters, ExpenseSortOrder, SpendingSummary, TrendDirection,
};
use expense_tracker_core::models::category::CategoryId;
use expense_tracker_core::models::expense::Expense;
use expense_tracker_core::services::analytics_service::{AnalyticsService, DEFAULT_TOP_CATEGORIES};
use expense_tracker_core::services::filter_service::FilterService;
use expense_tracker_core::services::format_service::{
    format_currency, format_percentage, format_usd, LocaleFormat, DEFAULT_PERCENTAGE_DECIMALS,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn expense(id: &str, amount: f64, description: &str, category: CategoryId, date: NaiveDate) -> Expense {
    let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    Expense {
        id: id.to_string(),
        amount,
        description: description.to_string(),
        category: category.category(),
        date,
        created_at: ts,
        updated_at: ts,
    }
}

fn today() -> NaiveDate {
    d(2025, 3, 10)
}

/// Mixed collection spanning this month, last month and older.
fn sample() -> Vec<Expense> {
    vec![
        expense("1", 12.50, "Morning coffee", CategoryId::Food, d(2025, 3, 1)),
        expense("2", 45.00, "Train ticket", CategoryId::Transportation, d(2025, 3, 5)),
        expense("3", 120.00, "Electricity bill", CategoryId::Bills, d(2025, 2, 28)),
        expense("4", 60.00, "Concert", CategoryId::Entertainment, d(2025, 2, 14)),
        expense("5", 30.00, "Groceries", CategoryId::Food, d(2025, 1, 20)),
        expense("6", 150.00, "New shoes", CategoryId::Shopping, d(2025, 3, 31)),
    ]
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ═══════════════════════════════════════════════════════════════════
// Spending Summary
// ═══════════════════════════════════════════════════════════════════

mod spending_summary {
    use super::*;

    #[test]
    fn empty_collection_is_all_zero() {
        let s = AnalyticsService::new().spending_summary(&[], today());
        assert_eq!(s, SpendingSummary::default());
        assert_eq!(s.expense_count, 0);
        assert_eq!(s.average_amount, 0.0);
    }

    #[test]
    fn single_expense() {
        let e = vec![expense("1", 25.50, "Lunch", CategoryId::Food, today())];
        let s = AnalyticsService::new().spending_summary(&e, today());
        assert_eq!(s.all_time_total, 25.50);
        assert_eq!(s.average_amount, 25.50);
        assert_eq!(s.expense_count, 1);
        assert_eq!(s.current_month_total, 25.50);
    }

    #[test]
    fn mixed_months() {
        let s = AnalyticsService::new().spending_summary(&sample(), today());
        assert!(approx(s.current_month_total, 12.50 + 45.00 + 150.00));
        assert!(approx(s.all_time_total, 417.50));
        assert_eq!(s.expense_count, 6);
        assert!(approx(s.average_amount, 417.50 / 6.0));
    }

    #[test]
    fn month_boundaries_are_inclusive() {
        let svc = AnalyticsService::new();
        let e = vec![
            expense("first", 1.0, "a", CategoryId::Other, d(2025, 3, 1)),
            expense("last", 2.0, "b", CategoryId::Other, d(2025, 3, 31)),
            expense("before", 4.0, "c", CategoryId::Other, d(2025, 2, 28)),
            expense("after", 8.0, "d", CategoryId::Other, d(2025, 4, 1)),
        ];
        assert_eq!(svc.current_month_total(&e, today()), 3.0);
        let ids: Vec<&str> = svc
            .current_month_expenses(&e, today())
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["first", "last"]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Category Breakdown
// ═══════════════════════════════════════════════════════════════════

mod category_breakdown {
    use super::*;

    #[test]
    fn empty_collection_gives_empty_breakdown() {
        assert!(AnalyticsService::new().category_breakdown(&[]).is_empty());
    }

    #[test]
    fn sorted_by_total_descending_without_zero_categories() {
        let b = AnalyticsService::new().category_breakdown(&sample());
        let ids: Vec<CategoryId> = b.iter().map(|c| c.category.id).collect();
        assert_eq!(
            ids,
            vec![
                CategoryId::Shopping,
                CategoryId::Bills,
                CategoryId::Entertainment,
                CategoryId::Transportation,
                CategoryId::Food,
            ]
        );
        let food = b.iter().find(|c| c.category.id == CategoryId::Food).unwrap();
        assert_eq!(food.count, 2);
        assert!(approx(food.total, 42.50));
        assert!(!ids.contains(&CategoryId::Other));
    }

    #[test]
    fn totals_sum_to_all_time_total() {
        let svc = AnalyticsService::new();
        let e = sample();
        let sum: f64 = svc.category_breakdown(&e).iter().map(|c| c.total).sum();
        assert!(approx(sum, svc.total_amount(&e)));
    }

    #[test]
    fn percentages_sum_to_hundred() {
        let sum: f64 = AnalyticsService::new()
            .category_breakdown(&sample())
            .iter()
            .map(|c| c.percentage)
            .sum();
        assert!((sum - 100.0).abs() < 1e-6);
    }

    #[test]
    fn ties_keep_registry_order() {
        let e = vec![
            expense("1", 10.0, "x", CategoryId::Other, today()),
            expense("2", 10.0, "y", CategoryId::Food, today()),
            expense("3", 10.0, "z", CategoryId::Bills, today()),
        ];
        let ids: Vec<CategoryId> = AnalyticsService::new()
            .category_breakdown(&e)
            .iter()
            .map(|c| c.category.id)
            .collect();
        assert_eq!(ids, vec![CategoryId::Food, CategoryId::Bills, CategoryId::Other]);
    }

    #[test]
    fn top_categories_truncates() {
        let svc = AnalyticsService::new();
        let top = svc.top_spending_categories(&sample(), 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].category.id, CategoryId::Shopping);
        assert_eq!(top[1].category.id, CategoryId::Bills);
        assert_eq!(svc.top_spending_categories(&sample(), 50).len(), 5);
        assert!(svc.top_spending_categories(&sample(), 0).is_empty());
    }

    #[test]
    fn top_categories_defaults_to_five() {
        let mut e = sample();
        e.push(expense("7", 1.0, "Stamps", CategoryId::Other, today()));
        let svc = AnalyticsService::new();
        assert_eq!(svc.category_breakdown(&e).len(), 6);

        let top = svc.top_categories(&e);
        assert_eq!(top.len(), DEFAULT_TOP_CATEGORIES);
        assert!(top.iter().all(|c| c.category.id != CategoryId::Other));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Monthly Trend
// ═══════════════════════════════════════════════════════════════════

mod monthly_trend {
    use super::*;

    #[test]
    fn increase_over_previous_month() {
        let e = vec![
            expense("1", 100.0, "a", CategoryId::Food, d(2025, 3, 2)),
            expense("2", 50.0, "b", CategoryId::Food, d(2025, 3, 3)),
            expense("3", 25.0, "c", CategoryId::Food, d(2025, 2, 10)),
        ];
        let t = AnalyticsService::new().monthly_trend(&e, today());
        assert_eq!(t.current_month_total, 150.0);
        assert_eq!(t.previous_month_total, 25.0);
        assert!(approx(t.change_percentage, 500.0));
        assert_eq!(t.trend, TrendDirection::Up);
    }

    #[test]
    fn decrease_reports_absolute_change() {
        let e = vec![
            expense("1", 50.0, "a", CategoryId::Food, d(2025, 3, 2)),
            expense("2", 200.0, "b", CategoryId::Food, d(2025, 2, 10)),
        ];
        let t = AnalyticsService::new().monthly_trend(&e, today());
        assert!(approx(t.change_percentage, 75.0));
        assert_eq!(t.trend, TrendDirection::Down);
    }

    #[test]
    fn empty_previous_month_is_hundred_percent_up() {
        let e = vec![expense("1", 10.0, "a", CategoryId::Food, d(2025, 3, 2))];
        let t = AnalyticsService::new().monthly_trend(&e, today());
        assert_eq!(t.change_percentage, 100.0);
        assert_eq!(t.trend, TrendDirection::Up);
    }

    #[test]
    fn equal_months_are_same() {
        let e = vec![
            expense("1", 40.0, "a", CategoryId::Food, d(2025, 3, 2)),
            expense("2", 40.0, "b", CategoryId::Food, d(2025, 2, 2)),
        ];
        let t = AnalyticsService::new().monthly_trend(&e, today());
        assert_eq!(t.change_percentage, 0.0);
        assert_eq!(t.trend, TrendDirection::Same);
    }

    #[test]
    fn no_spending_is_same() {
        let t = AnalyticsService::new().monthly_trend(&[], today());
        assert_eq!(t.current_month_total, 0.0);
        assert_eq!(t.previous_month_total, 0.0);
        assert_eq!(t.trend, TrendDirection::Same);
    }

    #[test]
    fn january_compares_with_previous_december() {
        let e = vec![
            expense("1", 30.0, "a", CategoryId::Food, d(2025, 1, 5)),
            expense("2", 60.0, "b", CategoryId::Food, d(2024, 12, 31)),
        ];
        let t = AnalyticsService::new().monthly_trend(&e, d(2025, 1, 20));
        assert_eq!(t.previous_month_total, 60.0);
        assert!(approx(t.change_percentage, 50.0));
        assert_eq!(t.trend, TrendDirection::Down);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Other Aggregates
// ═══════════════════════════════════════════════════════════════════

mod aggregates {
    use super::*;

    #[test]
    fn daily_average_divides_by_day_of_month() {
        let svc = AnalyticsService::new();
        let avg = svc.current_month_daily_average(&sample(), today());
        assert!(approx(avg, 207.50 / 10.0));
        assert_eq!(svc.current_month_daily_average(&[], today()), 0.0);
    }

    #[test]
    fn by_category_and_date_range() {
        let svc = AnalyticsService::new();
        let e = sample();
        assert_eq!(svc.expenses_by_category(&e, CategoryId::Food).len(), 2);
        assert!(svc.expenses_by_category(&e, CategoryId::Other).is_empty());

        let feb = svc.expenses_by_date_range(&e, d(2025, 2, 14), d(2025, 2, 28));
        let ids: Vec<&str> = feb.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "4"]);
    }

    #[test]
    fn previous_month_expenses() {
        let e = sample();
        let prev = AnalyticsService::new().previous_month_expenses(&e, today());
        assert_eq!(prev.len(), 2);
    }

    #[test]
    fn analytics_are_pure() {
        let svc = AnalyticsService::new();
        let e = sample();
        let before = e.clone();
        assert_eq!(svc.spending_summary(&e, today()), svc.spending_summary(&e, today()));
        assert_eq!(svc.category_breakdown(&e), svc.category_breakdown(&e));
        assert_eq!(svc.monthly_trend(&e, today()), svc.monthly_trend(&e, today()));
        assert_eq!(e, before);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Search & Filter
// ═══════════════════════════════════════════════════════════════════

mod search_filter {
    use super::*;

    fn ids(items: Vec<&Expense>) -> Vec<&str> {
        items.into_iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn search_is_case_insensitive_on_description() {
        let e = sample();
        assert_eq!(ids(FilterService::new().search(&e, "COFFEE")), vec!["1"]);
    }

    #[test]
    fn search_matches_category_name() {
        let e = sample();
        assert_eq!(ids(FilterService::new().search(&e, "food")), vec!["1", "5"]);
    }

    #[test]
    fn blank_search_returns_everything() {
        let e = sample();
        let svc = FilterService::new();
        assert_eq!(svc.search(&e, "").len(), 6);
        assert_eq!(svc.search(&e, "   ").len(), 6);
    }

    #[test]
    fn amount_bounds_are_inclusive() {
        let e = sample();
        let f = ExpenseFilters::new().with_amount_range(Some(45.0), Some(120.0));
        assert_eq!(ids(FilterService::new().filter(&e, &f)), vec!["2", "3", "4"]);
    }

    #[test]
    fn fifty_to_one_fifty_inclusive() {
        let e = sample();
        let f = ExpenseFilters::new().with_amount_range(Some(50.0), Some(150.0));
        assert_eq!(ids(FilterService::new().filter(&e, &f)), vec!["3", "4", "6"]);
    }

    #[test]
    fn min_and_max_work_independently() {
        let e = sample();
        let svc = FilterService::new();
        let min_only = ExpenseFilters::new().with_amount_range(Some(100.0), None);
        assert_eq!(ids(svc.filter(&e, &min_only)), vec!["3", "6"]);
        let max_only = ExpenseFilters::new().with_amount_range(None, Some(30.0));
        assert_eq!(ids(svc.filter(&e, &max_only)), vec!["1", "5"]);
    }

    #[test]
    fn date_range_needs_both_bounds() {
        let e = sample();
        let svc = FilterService::new();
        let mut f = ExpenseFilters::new();
        f.start_date = Some(d(2025, 3, 1));
        assert_eq!(svc.filter(&e, &f).len(), 6);

        let f = ExpenseFilters::new().with_date_range(d(2025, 3, 1), d(2025, 3, 31));
        assert_eq!(ids(svc.filter(&e, &f)), vec!["1", "2", "6"]);
    }

    #[test]
    fn criteria_combine_with_and() {
        let e = sample();
        let f = ExpenseFilters::new()
            .with_category(CategoryId::Food)
            .with_date_range(d(2025, 3, 1), d(2025, 3, 31));
        assert_eq!(ids(FilterService::new().filter(&e, &f)), vec!["1"]);

        let f = ExpenseFilters::new()
            .with_query("t")
            .with_amount_range(Some(50.0), None);
        assert_eq!(ids(FilterService::new().filter(&e, &f)), vec!["3", "4"]);
    }

    #[test]
    fn empty_filters_keep_input_order() {
        let e = sample();
        assert_eq!(
            ids(FilterService::new().filter(&e, &ExpenseFilters::default())),
            vec!["1", "2", "3", "4", "5", "6"]
        );
    }
}

// ═══════════════════════════════════════════════════════════════════
// Sorting
// ═══════════════════════════════════════════════════════════════════

mod sorting {
    use super::*;

    fn ids(items: Vec<&Expense>) -> Vec<&str> {
        items.into_iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn by_date() {
        let e = sample();
        let svc = FilterService::new();
        assert_eq!(ids(svc.sorted(&e, ExpenseSortOrder::DateDesc)), vec!["6", "2", "1", "3", "4", "5"]);
        assert_eq!(ids(svc.sorted(&e, ExpenseSortOrder::DateAsc)), vec!["5", "4", "3", "1", "2", "6"]);
    }

    #[test]
    fn by_amount() {
        let e = sample();
        let svc = FilterService::new();
        assert_eq!(ids(svc.sorted(&e, ExpenseSortOrder::AmountDesc)), vec!["6", "3", "4", "2", "5", "1"]);
        assert_eq!(ids(svc.sorted(&e, ExpenseSortOrder::AmountAsc)), vec!["1", "5", "2", "4", "3", "6"]);
    }

    #[test]
    fn by_description_ignores_case() {
        let e = vec![
            expense("a", 1.0, "banana", CategoryId::Food, today()),
            expense("b", 1.0, "Apple", CategoryId::Food, today()),
            expense("c", 1.0, "cherry", CategoryId::Food, today()),
        ];
        assert_eq!(
            ids(FilterService::new().sorted(&e, ExpenseSortOrder::DescriptionAsc)),
            vec!["b", "a", "c"]
        );
    }

    #[test]
    fn by_category_uses_registry_order() {
        let e = sample();
        assert_eq!(
            ids(FilterService::new().sorted(&e, ExpenseSortOrder::CategoryAsc)),
            vec!["1", "5", "2", "4", "6", "3"]
        );
    }
}

// ═══════════════════════════════════════════════════════════════════
// Formatting
// ═══════════════════════════════════════════════════════════════════

mod formatting {
    use super::*;

    #[test]
    fn usd_default() {
        assert_eq!(format_usd(1234.5), "$1,234.50");
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(999_999.99), "$999,999.99");
        assert_eq!(format_usd(1_000_000.0), "$1,000,000.00");
    }

    #[test]
    fn rounding_to_cents() {
        assert_eq!(format_usd(2.005_1), "$2.01");
        assert_eq!(format_usd(12.344), "$12.34");
    }

    #[test]
    fn negative_amounts() {
        assert_eq!(format_usd(-42.0), "-$42.00");
        assert_eq!(format_usd(-0.001), "$0.00");
    }

    #[test]
    fn symbol_after_amount_for_european_locales() {
        assert_eq!(format_currency(1234.5, "de-DE", "EUR"), "1.234,50\u{a0}€");
        assert_eq!(format_currency(1234.5, "pl-PL", "PLN"), "1\u{a0}234,50\u{a0}zł");
    }

    #[test]
    fn unknown_currency_uses_code() {
        assert_eq!(format_currency(5.0, "en-US", "chf"), "CHF\u{a0}5.00");
        assert_eq!(format_currency(5.0, "de-DE", "CHF"), "5,00\u{a0}CHF");
    }

    #[test]
    fn zero_decimal_currencies() {
        assert_eq!(format_currency(1500.0, "en-US", "JPY"), "¥1,500");
    }

    #[test]
    fn unknown_locale_falls_back_to_us_conventions() {
        assert_eq!(LocaleFormat::for_locale("xx-YY"), LocaleFormat::for_locale("en-US"));
        assert_eq!(format_currency(10.0, "xx-YY", "GBP"), "£10.00");
    }

    #[test]
    fn percentages() {
        assert_eq!(format_percentage(12.345, DEFAULT_PERCENTAGE_DECIMALS), "12.3%");
        assert_eq!(format_percentage(100.0, 0), "100%");
        assert_eq!(format_percentage(33.3333, 2), "33.33%");
    }
}
