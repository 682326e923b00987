//! Interfaces the import pipeline needs from the host application.
//!
//! The pipeline never reaches for a global database handle; callers pass
//! these in.

use crate::error::Result;
use crate::models::{Expense, Fillup, User, Vehicle};

/// Read-only lookups against the host's user and vehicle records.
pub trait Directory {
    /// All vehicles belonging to `user_id`.
    fn vehicles_for(&self, user_id: &str) -> Result<Vec<Vehicle>>;

    /// Currency and distance unit of `user_id`.
    fn user_profile(&self, user_id: &str) -> Result<User>;
}

pub trait Store {
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>>;
}

/// One open write transaction.
///
/// Implementations must discard everything staged when dropped without a
/// successful `commit`, so an unwinding panic cannot leave rows behind.
pub trait StoreTransaction {
    fn insert_fillups(&mut self, fillups: &[Fillup]) -> Result<()>;

    fn insert_expenses(&mut self, expenses: &[Expense]) -> Result<()>;

    fn commit(self: Box<Self>) -> Result<()>;

    fn rollback(self: Box<Self>) -> Result<()>;
}
