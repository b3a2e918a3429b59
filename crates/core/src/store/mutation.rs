use crate::models::expense::Expense;

/// Identifier handed out by `ExpenseStore::begin`.
pub type MutationId = u64;

/// A change to the expense collection, applied locally before the server
/// confirms it.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Append a newly created expense.
    Add(Expense),
    /// Replace the cached expense with the same id.
    Update(Expense),
    /// Remove the expense with this id.
    Delete(String),
}

impl Mutation {
    #[must_use]
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Add(_) => MutationKind::Add,
            Mutation::Update(_) => MutationKind::Update,
            Mutation::Delete(_) => MutationKind::Delete,
        }
    }

    /// Id of the expense this mutation touches.
    #[must_use]
    pub fn expense_id(&self) -> &str {
        match self {
            Mutation::Add(expense) | Mutation::Update(expense) => &expense.id,
            Mutation::Delete(id) => id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Add,
    Update,
    Delete,
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MutationKind::Add => write!(f, "add"),
            MutationKind::Update => write!(f, "update"),
            MutationKind::Delete => write!(f, "delete"),
        }
    }
}

/// Lifecycle of a mutation: `Pending` → `Confirmed` | `RolledBack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    /// Applied to the cache, waiting for the server.
    Pending,
    /// The server accepted it; the cache holds the server's copy.
    Confirmed,
    /// The server rejected it; the optimistic change was undone.
    RolledBack,
}

/// What an optimistic application displaced, so it can be put back.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Undo {
    /// Remove the expense that was appended.
    RemoveAdded { expense_id: String },
    /// Put the previous version back in place of the updated one.
    RestoreReplaced { previous: Expense },
    /// Re-insert the removed expense at its former position.
    ReinsertDeleted { index: usize, expense: Expense },
    /// The mutation did not touch the cache.
    Nothing,
}

/// One tracked mutation.
#[derive(Debug, Clone)]
pub(crate) struct MutationRecord {
    pub id: MutationId,
    pub mutation: Mutation,
    pub phase: MutationPhase,
    pub undo: Undo,
}
