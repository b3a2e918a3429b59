use async_trait::async_trait;
use chrono::Utc;

use crate::errors::CoreError;
use crate::models::category::Category;
use crate::models::expense::Expense;

use super::format;

/// Durable client-side storage for the expense and category collections.
///
/// Collections are read and written whole (replace-all). `export_data` and
/// `import_data` are built on the four collection methods, so every backend
/// speaks the same envelope format.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait StorageBackend: Send + Sync {
    /// Human-readable backend name (for logs/errors).
    fn name(&self) -> &str;

    async fn get_expenses(&self) -> Result<Vec<Expense>, CoreError>;

    async fn save_expenses(&self, expenses: &[Expense]) -> Result<(), CoreError>;

    async fn get_categories(&self) -> Result<Vec<Category>, CoreError>;

    async fn save_categories(&self, categories: &[Category]) -> Result<(), CoreError>;

    /// Remove everything this backend stores.
    async fn clear_all(&self) -> Result<(), CoreError>;

    /// Serialize both collections into a pretty-printed export envelope.
    async fn export_data(&self) -> Result<String, CoreError> {
        let expenses = self
            .get_expenses()
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to export data: {e}")))?;
        let categories = self
            .get_categories()
            .await
            .map_err(|e| CoreError::Storage(format!("Failed to export data: {e}")))?;
        format::write_export(&expenses, &categories, Utc::now())
    }

    /// Replace the collections present in an export envelope. Collections
    /// missing from the envelope are left untouched.
    async fn import_data(&self, data: &str) -> Result<(), CoreError> {
        let envelope = format::read_export(data)?;
        if let Some(expenses) = envelope.expenses {
            self.save_expenses(&expenses).await?;
        }
        if let Some(categories) = envelope.categories {
            self.save_categories(&categories).await?;
        }
        Ok(())
    }
}
