pub mod api;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;
pub mod store;

use chrono::{Local, NaiveDate, Utc};
use tracing::{debug, info, warn};

use api::rest_client::RestClient;
use api::traits::EntityApi;
use config::{ApiConfig, TrackerOptions};
use errors::CoreError;
use models::{
    analytics::{CategoryBreakdown, ExpenseFilters, ExpenseSortOrder, MonthlyTrend, SpendingSummary},
    category::{registry, CategoryId},
    expense::{Expense, ExpenseFormData, ExpensePatch},
};
use services::{analytics_service::AnalyticsService, filter_service::FilterService};
use storage::traits::StorageBackend;
use store::{ExpenseStore, Mutation, MutationKind};

/// Main entry point for the expense-tracker core library.
///
/// Keeps a cached view of the remote expense collection and exposes CRUD
/// operations that update both the server (through `EntityApi<Expense>`) and
/// the cache. Mutations are applied optimistically and rolled back if the
/// server rejects them. Every failure is recorded as the single
/// `last_error()` and also returned to the caller.
#[must_use]
pub struct ExpenseTracker {
    api: Box<dyn EntityApi<Expense>>,
    store: ExpenseStore,
    options: TrackerOptions,
    analytics_service: AnalyticsService,
    filter_service: FilterService,
}

impl std::fmt::Debug for ExpenseTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpenseTracker")
            .field("entity", &self.api.entity())
            .field("expenses", &self.store.expenses().len())
            .field("pending", &self.store.pending_count())
            .field("stale", &self.store.is_stale())
            .field("last_error", &self.store.last_error())
            .finish()
    }
}

impl ExpenseTracker {
    /// Tracker backed by any `EntityApi<Expense>` implementation.
    pub fn new(api: Box<dyn EntityApi<Expense>>) -> Self {
        Self::with_options(api, TrackerOptions::default())
    }

    pub fn with_options(api: Box<dyn EntityApi<Expense>>, options: TrackerOptions) -> Self {
        Self {
            api,
            store: ExpenseStore::new(),
            options,
            analytics_service: AnalyticsService::new(),
            filter_service: FilterService::new(),
        }
    }

    /// Tracker talking to the REST API described by `config`.
    pub fn connect(config: ApiConfig) -> Self {
        let client = RestClient::new(config);
        Self::new(Box::new(client.expenses()))
    }

    // ── Fetching ────────────────────────────────────────────────────

    /// Load the full collection from the server, replacing the cache.
    ///
    /// On failure the cache is left as it was and the error is recorded;
    /// calling `refresh` again is the retry.
    pub async fn refresh(&mut self) -> Result<(), CoreError> {
        self.store.clear_error();
        self.store.set_fetching(true);
        let result = self.api.get_all(&[]).await;
        self.store.set_fetching(false);

        match result {
            Ok(page) => {
                let expenses = page.into_items();
                info!(count = expenses.len(), "Expenses loaded");
                self.store.replace_all(expenses);
                Ok(())
            }
            Err(e) => {
                self.store.set_error(format!("Failed to load expenses: {e}"));
                Err(e)
            }
        }
    }

    /// Fetch a single expense straight from the server. The cache is not
    /// touched. A 404 is reported as `ExpenseNotFound`.
    pub async fn fetch_expense(&mut self, expense_id: &str) -> Result<Expense, CoreError> {
        self.store.clear_error();
        match self.api.get_by_id(expense_id).await {
            Ok(expense) => Ok(expense),
            Err(CoreError::Api { status: 404, .. }) => {
                Err(self.fail(CoreError::ExpenseNotFound(expense_id.to_string())))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Create an expense from form input. Returns the expense as stored by
    /// the server.
    pub async fn add_expense(&mut self, form: &ExpenseFormData) -> Result<Expense, CoreError> {
        self.store.clear_error();
        let expense = Expense::new(form, Utc::now()).map_err(|e| self.fail(e))?;

        debug!(expense_id = %expense.id, amount = expense.amount, "Adding expense");
        let mutation_id = self.store.begin(Mutation::Add(expense.clone()));

        match self.api.save_new(&expense).await {
            Ok(created) => {
                self.store.confirm(mutation_id, Some(created.clone()))?;
                info!(expense_id = %created.id, "Expense added");
                self.after_mutation().await;
                Ok(created)
            }
            Err(e) => {
                self.store.rollback(mutation_id)?;
                Err(self.fail(e))
            }
        }
    }

    /// Create an expense from raw form fields, resolving the category id
    /// string against the registry first.
    pub async fn add_expense_raw(
        &mut self,
        amount: f64,
        description: &str,
        category: &str,
        date: NaiveDate,
    ) -> Result<Expense, CoreError> {
        let form = ExpenseFormData::parse(amount, description, category, date).map_err(|e| {
            self.store.clear_error();
            self.fail(e)
        })?;
        self.add_expense(&form).await
    }

    /// Replace an expense's fields. The id and creation timestamp are kept;
    /// the modification timestamp is refreshed.
    pub async fn update_expense(
        &mut self,
        expense_id: &str,
        form: &ExpenseFormData,
    ) -> Result<Expense, CoreError> {
        self.store.clear_error();
        let now = Utc::now();
        let built = match self.store.get(expense_id) {
            Some(existing) => existing.edited(form, now),
            None => Expense::new(form, now).map(|mut e| {
                e.id = expense_id.to_string();
                e
            }),
        };
        let updated = built.map_err(|e| self.fail(e))?;

        debug!(expense_id = %expense_id, "Updating expense");
        let mutation_id = self.store.begin(Mutation::Update(updated.clone()));

        match self.api.update(expense_id, &updated).await {
            Ok(saved) => {
                self.store.confirm(mutation_id, Some(saved.clone()))?;
                info!(expense_id = %expense_id, "Expense updated");
                self.after_mutation().await;
                Ok(saved)
            }
            Err(e) => {
                self.store.rollback(mutation_id)?;
                Err(self.fail(e))
            }
        }
    }

    /// Change only some fields of an expense (`PATCH`). The cache is updated
    /// with the server's copy once it answers.
    pub async fn patch_expense(
        &mut self,
        expense_id: &str,
        patch: &ExpensePatch,
    ) -> Result<Expense, CoreError> {
        self.store.clear_error();
        if patch.is_empty() {
            return Err(self.fail(CoreError::ValidationError(
                "Patch must change at least one field".into(),
            )));
        }
        if let Some(amount) = patch.amount {
            if !amount.is_finite() || amount <= 0.0 {
                return Err(self.fail(CoreError::ValidationError(
                    "Amount must be greater than 0".into(),
                )));
            }
        }
        if patch.description.as_deref().is_some_and(|d| d.trim().is_empty()) {
            return Err(self.fail(CoreError::ValidationError(
                "Description is required".into(),
            )));
        }

        let mut patch = patch.clone();
        patch.updated_at = Some(Utc::now());
        let changes = serde_json::to_value(&patch).map_err(|e| {
            self.fail(CoreError::Serialization(format!("Failed to serialize patch: {e}")))
        })?;

        match self.api.patch(expense_id, &changes).await {
            Ok(saved) => {
                // Nothing was applied optimistically; confirm straight away.
                let mutation_id = self.store.begin(Mutation::Update(saved.clone()));
                self.store.confirm(mutation_id, Some(saved.clone()))?;
                info!(expense_id = %expense_id, "Expense patched");
                self.after_mutation().await;
                Ok(saved)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Delete an expense by id.
    pub async fn delete_expense(&mut self, expense_id: &str) -> Result<(), CoreError> {
        self.store.clear_error();
        debug!(expense_id = %expense_id, "Deleting expense");
        let mutation_id = self.store.begin(Mutation::Delete(expense_id.to_string()));

        match self.api.delete(expense_id).await {
            Ok(()) => {
                self.store.confirm(mutation_id, None)?;
                info!(expense_id = %expense_id, "Expense deleted");
                self.after_mutation().await;
                Ok(())
            }
            Err(e) => {
                self.store.rollback(mutation_id)?;
                Err(self.fail(e))
            }
        }
    }

    // ── Error & Status ──────────────────────────────────────────────

    /// Message of the most recent failure, if not cleared since.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.store.last_error()
    }

    pub fn clear_error(&mut self) {
        self.store.clear_error();
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.store.is_fetching() || self.store.pending_count() > 0
    }

    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.store.is_fetching()
    }

    #[must_use]
    pub fn is_adding(&self) -> bool {
        self.store.has_pending(MutationKind::Add)
    }

    #[must_use]
    pub fn is_updating(&self) -> bool {
        self.store.has_pending(MutationKind::Update)
    }

    #[must_use]
    pub fn is_deleting(&self) -> bool {
        self.store.has_pending(MutationKind::Delete)
    }

    /// `true` while the cache may lag behind the server (a refetch after a
    /// mutation was skipped or failed).
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.store.is_stale()
    }

    /// Read access to the underlying state container.
    #[must_use]
    pub fn store(&self) -> &ExpenseStore {
        &self.store
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// All cached expenses, in server order.
    #[must_use]
    pub fn expenses(&self) -> &[Expense] {
        self.store.expenses()
    }

    #[must_use]
    pub fn get_expense_by_id(&self, expense_id: &str) -> Option<&Expense> {
        self.store.get(expense_id)
    }

    #[must_use]
    pub fn get_expenses_by_category(&self, category_id: CategoryId) -> Vec<&Expense> {
        self.analytics_service
            .expenses_by_category(self.store.expenses(), category_id)
    }

    /// Expenses dated within `[start, end]` (inclusive).
    #[must_use]
    pub fn get_expenses_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Expense> {
        self.analytics_service
            .expenses_by_date_range(self.store.expenses(), start, end)
    }

    #[must_use]
    pub fn total_amount(&self) -> f64 {
        self.analytics_service.total_amount(self.store.expenses())
    }

    #[must_use]
    pub fn average_amount(&self) -> f64 {
        self.analytics_service.average_amount(self.store.expenses())
    }

    #[must_use]
    pub fn current_month_expenses(&self) -> Vec<&Expense> {
        self.analytics_service
            .current_month_expenses(self.store.expenses(), today())
    }

    #[must_use]
    pub fn current_month_total(&self) -> f64 {
        self.analytics_service
            .current_month_total(self.store.expenses(), today())
    }

    // ── Analytics ───────────────────────────────────────────────────

    #[must_use]
    pub fn spending_summary(&self) -> SpendingSummary {
        self.analytics_service
            .spending_summary(self.store.expenses(), today())
    }

    #[must_use]
    pub fn category_breakdown(&self) -> Vec<CategoryBreakdown> {
        self.analytics_service.category_breakdown(self.store.expenses())
    }

    #[must_use]
    pub fn monthly_trend(&self) -> MonthlyTrend {
        self.analytics_service
            .monthly_trend(self.store.expenses(), today())
    }

    #[must_use]
    pub fn top_spending_categories(&self, limit: usize) -> Vec<CategoryBreakdown> {
        self.analytics_service
            .top_spending_categories(self.store.expenses(), limit)
    }

    /// The five biggest categories.
    #[must_use]
    pub fn top_categories(&self) -> Vec<CategoryBreakdown> {
        self.analytics_service.top_categories(self.store.expenses())
    }

    #[must_use]
    pub fn current_month_daily_average(&self) -> f64 {
        self.analytics_service
            .current_month_daily_average(self.store.expenses(), today())
    }

    // ── Search & Sorting ────────────────────────────────────────────

    /// Case-insensitive search over description and category name.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Expense> {
        self.filter_service.search(self.store.expenses(), query)
    }

    #[must_use]
    pub fn filter(&self, filters: &ExpenseFilters) -> Vec<&Expense> {
        self.filter_service.filter(self.store.expenses(), filters)
    }

    #[must_use]
    pub fn sorted(&self, order: ExpenseSortOrder) -> Vec<&Expense> {
        self.filter_service.sorted(self.store.expenses(), order)
    }

    // ── Offline Storage ─────────────────────────────────────────────

    /// Write the cached expenses and the category registry to `storage`.
    pub async fn save_offline(&mut self, storage: &dyn StorageBackend) -> Result<(), CoreError> {
        let mut result = storage.save_expenses(self.store.expenses()).await;
        if result.is_ok() {
            result = storage.save_categories(&registry()).await;
        }

        match result {
            Ok(()) => {
                info!(
                    backend = storage.name(),
                    count = self.store.expenses().len(),
                    "Expenses saved offline"
                );
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Replace the cache with the expenses held in `storage`. The cache is
    /// marked stale since it may be behind the server.
    pub async fn load_offline(&mut self, storage: &dyn StorageBackend) -> Result<usize, CoreError> {
        match storage.get_expenses().await {
            Ok(expenses) => {
                let count = expenses.len();
                self.store.replace_all(expenses);
                self.store.invalidate();
                info!(backend = storage.name(), count, "Expenses restored from offline storage");
                Ok(count)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Record `error` as the last error and hand it back for returning.
    fn fail(&mut self, error: CoreError) -> CoreError {
        warn!(error = %error, "Expense operation failed");
        self.store.set_error(error.to_string());
        error
    }

    /// Invalidate the cache, then refetch if configured. A failed refetch
    /// leaves the (already confirmed) cache in place, marked stale.
    async fn after_mutation(&mut self) {
        self.store.invalidate();
        if !self.options.refetch_after_mutation {
            return;
        }

        self.store.set_fetching(true);
        let result = self.api.get_all(&[]).await;
        self.store.set_fetching(false);

        match result {
            Ok(page) => self.store.replace_all(page.into_items()),
            Err(e) => warn!(error = %e, "Refetch after mutation failed; cache left stale"),
        }
    }
}

/// Today's date on the host's local calendar.
fn today() -> NaiveDate {
    Local::now().date_naive()
}
