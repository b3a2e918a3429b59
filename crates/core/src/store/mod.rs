pub mod mutation;
pub mod state;

pub use mutation::{Mutation, MutationId, MutationKind, MutationPhase};
pub use state::ExpenseStore;
