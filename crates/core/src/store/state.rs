use tracing::debug;

use crate::errors::CoreError;
use crate::models::expense::Expense;

use super::mutation::{Mutation, MutationId, MutationKind, MutationPhase, MutationRecord, Undo};

/// Settled mutations kept for inspection; older ones are forgotten.
const MAX_SETTLED_HISTORY: usize = 64;

/// Client-side cache of the expense collection plus the bookkeeping around it.
///
/// The store never talks to the network. The owner drives it:
/// `begin` a mutation (applied optimistically), then `confirm` or `rollback`
/// it once the remote call finishes. Fetch results go through `replace_all`.
#[derive(Debug, Default)]
pub struct ExpenseStore {
    expenses: Vec<Expense>,
    mutations: Vec<MutationRecord>,
    next_mutation_id: MutationId,
    last_error: Option<String>,
    fetching: bool,
    stale: bool,
}

impl ExpenseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `expenses` (e.g. restored from offline storage).
    pub fn with_expenses(expenses: Vec<Expense>) -> Self {
        Self {
            expenses,
            ..Self::default()
        }
    }

    // ── Cache ───────────────────────────────────────────────────────

    #[must_use]
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    #[must_use]
    pub fn get(&self, expense_id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == expense_id)
    }

    /// Install a freshly fetched collection and clear the stale flag.
    /// Mutations still pending are re-applied on top so they stay visible.
    pub fn replace_all(&mut self, expenses: Vec<Expense>) {
        self.expenses = expenses;
        self.stale = false;

        let pending: Vec<(usize, Mutation)> = self
            .mutations
            .iter()
            .enumerate()
            .filter(|(_, r)| r.phase == MutationPhase::Pending)
            .map(|(i, r)| (i, r.mutation.clone()))
            .collect();
        for (index, mutation) in pending {
            let undo = self.apply(&mutation);
            self.mutations[index].undo = undo;
        }

        debug!(count = self.expenses.len(), "Expense cache replaced");
    }

    /// Mark the cache as out of date with the server.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Apply `mutation` to the cache right away and track it as pending.
    pub fn begin(&mut self, mutation: Mutation) -> MutationId {
        let id = self.next_mutation_id;
        self.next_mutation_id += 1;

        let undo = self.apply(&mutation);
        debug!(
            mutation_id = id,
            kind = %mutation.kind(),
            expense_id = %mutation.expense_id(),
            "Mutation pending"
        );
        self.mutations.push(MutationRecord {
            id,
            mutation,
            phase: MutationPhase::Pending,
            undo,
        });
        id
    }

    /// The server accepted the mutation. For adds and updates, `server_copy`
    /// (the item as the server returned it) replaces the optimistic entry.
    pub fn confirm(
        &mut self,
        id: MutationId,
        server_copy: Option<Expense>,
    ) -> Result<(), CoreError> {
        let index = self.pending_index(id)?;
        let record = &mut self.mutations[index];
        record.phase = MutationPhase::Confirmed;
        let kind = record.mutation.kind();
        let local_id = record.mutation.expense_id().to_string();

        if let Some(server_copy) = server_copy {
            match kind {
                MutationKind::Add => match self.position(&local_id) {
                    Some(pos) => self.expenses[pos] = server_copy,
                    None => self.expenses.push(server_copy),
                },
                MutationKind::Update => {
                    if let Some(pos) = self.position(&local_id) {
                        self.expenses[pos] = server_copy;
                    }
                }
                MutationKind::Delete => {}
            }
        }

        debug!(mutation_id = id, kind = %kind, "Mutation confirmed");
        self.prune_history();
        Ok(())
    }

    /// The server rejected the mutation: undo its optimistic change.
    pub fn rollback(&mut self, id: MutationId) -> Result<(), CoreError> {
        let index = self.pending_index(id)?;
        let record = &mut self.mutations[index];
        record.phase = MutationPhase::RolledBack;
        let kind = record.mutation.kind();
        let undo = std::mem::replace(&mut record.undo, Undo::Nothing);

        match undo {
            Undo::RemoveAdded { expense_id } => {
                if let Some(pos) = self.expenses.iter().rposition(|e| e.id == expense_id) {
                    self.expenses.remove(pos);
                }
            }
            Undo::RestoreReplaced { previous } => {
                if let Some(pos) = self.position(&previous.id) {
                    self.expenses[pos] = previous;
                }
            }
            Undo::ReinsertDeleted { index, expense } => {
                let index = index.min(self.expenses.len());
                self.expenses.insert(index, expense);
            }
            Undo::Nothing => {}
        }

        debug!(mutation_id = id, kind = %kind, "Mutation rolled back");
        self.prune_history();
        Ok(())
    }

    /// Phase of a tracked mutation, or `None` once it has been forgotten.
    #[must_use]
    pub fn mutation_phase(&self, id: MutationId) -> Option<MutationPhase> {
        self.mutations.iter().find(|r| r.id == id).map(|r| r.phase)
    }

    /// Whether any mutation of `kind` is still waiting for the server.
    #[must_use]
    pub fn has_pending(&self, kind: MutationKind) -> bool {
        self.mutations
            .iter()
            .any(|r| r.phase == MutationPhase::Pending && r.mutation.kind() == kind)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.mutations
            .iter()
            .filter(|r| r.phase == MutationPhase::Pending)
            .count()
    }

    // ── Status ──────────────────────────────────────────────────────

    pub fn set_fetching(&mut self, fetching: bool) {
        self.fetching = fetching;
    }

    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Internal ────────────────────────────────────────────────────

    fn apply(&mut self, mutation: &Mutation) -> Undo {
        match mutation {
            Mutation::Add(expense) => {
                self.expenses.push(expense.clone());
                Undo::RemoveAdded {
                    expense_id: expense.id.clone(),
                }
            }
            Mutation::Update(expense) => match self.position(&expense.id) {
                Some(pos) => {
                    let previous = std::mem::replace(&mut self.expenses[pos], expense.clone());
                    Undo::RestoreReplaced { previous }
                }
                None => Undo::Nothing,
            },
            Mutation::Delete(expense_id) => match self.position(expense_id) {
                Some(index) => Undo::ReinsertDeleted {
                    index,
                    expense: self.expenses.remove(index),
                },
                None => Undo::Nothing,
            },
        }
    }

    fn position(&self, expense_id: &str) -> Option<usize> {
        self.expenses.iter().position(|e| e.id == expense_id)
    }

    fn pending_index(&self, id: MutationId) -> Result<usize, CoreError> {
        self.mutations
            .iter()
            .position(|r| r.id == id && r.phase == MutationPhase::Pending)
            .ok_or(CoreError::MutationNotFound(id))
    }

    fn prune_history(&mut self) {
        let settled = self
            .mutations
            .iter()
            .filter(|r| r.phase != MutationPhase::Pending)
            .count();
        let mut excess = settled.saturating_sub(MAX_SETTLED_HISTORY);
        if excess > 0 {
            self.mutations.retain(|r| {
                if excess > 0 && r.phase != MutationPhase::Pending {
                    excess -= 1;
                    false
                } else {
                    true
                }
            });
        }
    }
}
