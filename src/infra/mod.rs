//! Infrastructure adapters backing the task contract.

pub mod claim;

pub use claim::{ClaimRecord, ClaimStore, InMemoryClaimStore};
