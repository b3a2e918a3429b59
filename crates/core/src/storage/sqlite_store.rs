use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::errors::CoreError;
use crate::models::category::{Category, CategoryId};
use crate::models::expense::{parse_iso_date, Expense};

use super::traits::StorageBackend;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS expenses (
        id TEXT PRIMARY KEY,
        amount REAL NOT NULL,
        description TEXT NOT NULL,
        category_id TEXT NOT NULL,
        category TEXT NOT NULL,
        date TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);
    CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category_id);
    CREATE TABLE IF NOT EXISTS categories (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        color TEXT NOT NULL,
        icon TEXT NOT NULL,
        description TEXT
    );
";

/// Embedded-database storage for larger datasets.
///
/// Unlike `JsonFileStorage`, read failures are reported, not swallowed.
/// Each save replaces the whole table inside one transaction, so a failed
/// save (e.g. a duplicate id) leaves the previous contents intact.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open (or create) a database file and make sure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        Self::init(Connection::open(path)?)
    }

    /// A private database that lives only as long as this value.
    pub fn open_in_memory() -> Result<Self, CoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, CoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.conn
            .lock()
            .map_err(|_| CoreError::Database("connection lock poisoned".into()))
    }

    fn load_expenses(&self) -> Result<Vec<Expense>, CoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, amount, description, category, date, created_at, updated_at
             FROM expenses
             ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ExpenseRow {
                    id: row.get(0)?,
                    amount: row.get(1)?,
                    description: row.get(2)?,
                    category: row.get(3)?,
                    date: row.get(4)?,
                    created_at: row.get(5)?,
                    updated_at: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(ExpenseRow::into_expense).collect()
    }

    fn store_expenses(&self, expenses: &[Expense]) -> Result<(), CoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM expenses", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO expenses
                    (id, amount, description, category_id, category, date, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for expense in expenses {
                let category = serde_json::to_string(&expense.category).map_err(|e| {
                    CoreError::Serialization(format!(
                        "Failed to serialize category of {}: {e}",
                        expense.id
                    ))
                })?;
                stmt.execute(params![
                    expense.id,
                    expense.amount,
                    expense.description,
                    expense.category.id.as_str(),
                    category,
                    expense.date.format("%Y-%m-%d").to_string(),
                    expense.created_at.to_rfc3339(),
                    expense.updated_at.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;
        debug!(count = expenses.len(), "Expenses table replaced");
        Ok(())
    }

    fn load_categories(&self) -> Result<Vec<Category>, CoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, color, icon, description FROM categories ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, name, color, icon, description)| {
                Ok(Category {
                    id: id.parse::<CategoryId>()?,
                    name,
                    color,
                    icon,
                    description,
                })
            })
            .collect()
    }

    fn store_categories(&self, categories: &[Category]) -> Result<(), CoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM categories", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO categories (id, name, color, icon, description)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for category in categories {
                stmt.execute(params![
                    category.id.as_str(),
                    category.name,
                    category.color,
                    category.icon,
                    category.description,
                ])?;
            }
        }
        tx.commit()?;
        debug!(count = categories.len(), "Categories table replaced");
        Ok(())
    }

    fn wipe(&self) -> Result<(), CoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM expenses", [])?;
        tx.execute("DELETE FROM categories", [])?;
        tx.commit()?;
        Ok(())
    }
}

struct ExpenseRow {
    id: String,
    amount: f64,
    description: String,
    category: String,
    date: String,
    created_at: String,
    updated_at: String,
}

impl ExpenseRow {
    fn into_expense(self) -> Result<Expense, CoreError> {
        let category: Category = serde_json::from_str(&self.category).map_err(|e| {
            CoreError::Deserialization(format!("Invalid category for expense {}: {e}", self.id))
        })?;
        let date = parse_iso_date(&self.date).ok_or_else(|| {
            CoreError::Deserialization(format!(
                "Invalid date for expense {}: {}",
                self.id, self.date
            ))
        })?;
        Ok(Expense {
            amount: self.amount,
            description: self.description,
            category,
            date,
            created_at: parse_timestamp(&self.created_at, &self.id)?,
            updated_at: parse_timestamp(&self.updated_at, &self.id)?,
            id: self.id,
        })
    }
}

fn parse_timestamp(raw: &str, expense_id: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            CoreError::Deserialization(format!("Invalid timestamp for expense {expense_id}: {e}"))
        })
}

#[async_trait]
impl StorageBackend for SqliteStorage {
    fn name(&self) -> &str {
        "embedded database"
    }

    async fn get_expenses(&self) -> Result<Vec<Expense>, CoreError> {
        self.load_expenses()
    }

    async fn save_expenses(&self, expenses: &[Expense]) -> Result<(), CoreError> {
        self.store_expenses(expenses)
    }

    async fn get_categories(&self) -> Result<Vec<Category>, CoreError> {
        self.load_categories()
    }

    async fn save_categories(&self, categories: &[Category]) -> Result<(), CoreError> {
        self.store_categories(categories)
    }

    async fn clear_all(&self) -> Result<(), CoreError> {
        self.wipe()
    }
}
