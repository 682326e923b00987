use tracing::{debug, info, warn};

use crate::error::WriteError;
use crate::models::ImportBatch;
use crate::ports::{Store, StoreTransaction};

/// Where a batch write is. Any failure moves straight to `RolledBack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    Pending,
    InsertingFillups,
    InsertingExpenses,
    Committed,
    RolledBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    pub fillups: usize,
    pub expenses: usize,
    pub stage: WriteStage,
}

/// Persist a validated batch in one transaction: all of it, or none of it.
///
/// Expenses are only staged when the batch has some, which in practice means
/// Fuelly imports. If an insert fails the transaction is rolled back before
/// the error is returned; if anything unwinds mid-write, dropping the open
/// transaction rolls it back.
pub fn write_batch(store: &dyn Store, batch: &ImportBatch) -> Result<WriteReport, WriteError> {
    let mut stage = WriteStage::Pending;
    debug!(?stage, "opening transaction");
    let mut tx = store.begin().map_err(WriteError::Begin)?;

    stage = WriteStage::InsertingFillups;
    debug!(?stage, count = batch.fillups.len());
    if let Err(e) = tx.insert_fillups(&batch.fillups) {
        roll_back(tx, stage);
        return Err(WriteError::Fillups(e));
    }

    if !batch.expenses.is_empty() {
        stage = WriteStage::InsertingExpenses;
        debug!(?stage, count = batch.expenses.len());
        if let Err(e) = tx.insert_expenses(&batch.expenses) {
            roll_back(tx, stage);
            return Err(WriteError::Expenses(e));
        }
    }

    if let Err(e) = tx.commit() {
        warn!(?stage, error = %e, "commit failed");
        return Err(WriteError::Commit(e));
    }

    stage = WriteStage::Committed;
    info!(
        fillups = batch.fillups.len(),
        expenses = batch.expenses.len(),
        "import committed"
    );
    Ok(WriteReport {
        fillups: batch.fillups.len(),
        expenses: batch.expenses.len(),
        stage,
    })
}

fn roll_back(tx: Box<dyn StoreTransaction + '_>, failed_at: WriteStage) {
    match tx.rollback() {
        Ok(()) => warn!(?failed_at, stage = ?WriteStage::RolledBack, "import rolled back"),
        Err(e) => warn!(?failed_at, error = %e, "rollback reported an error"),
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    use chrono::NaiveDate;

    use super::*;
    use crate::models::{Expense, Fillup, Source};
    use crate::testing::{FailAt, MemoryStore};

    fn batch(fillups: usize, expenses: usize) -> ImportBatch {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        let fillup = Fillup {
            vehicle_id: "veh-1".into(),
            fuel_unit: "US Gallon".into(),
            fuel_quantity: 10.0,
            per_unit_price: 3.5,
            total_amount: 35.0,
            odo_reading: 1000,
            is_tank_full: true,
            has_missed_fillup: false,
            comments: String::new(),
            filling_station: String::new(),
            currency: "USD".into(),
            distance_unit: "Miles".into(),
            date,
            source: Source::Fuelly,
            user_id: "u1".into(),
        };
        let expense = Expense {
            vehicle_id: "veh-1".into(),
            amount: 80.0,
            odo_reading: 1000,
            expense_type: "Oil Change".into(),
            comments: String::new(),
            currency: "USD".into(),
            distance_unit: "Miles".into(),
            date,
            source: Source::Fuelly,
            user_id: "u1".into(),
        };
        ImportBatch {
            fillups: vec![fillup; fillups],
            expenses: vec![expense; expenses],
        }
    }

    #[test]
    fn test_commits_everything() {
        let store = MemoryStore::default();
        let report = write_batch(&store, &batch(2, 1)).unwrap();
        assert_eq!(report.stage, WriteStage::Committed);
        assert_eq!((report.fillups, report.expenses), (2, 1));
        assert_eq!(store.persisted(), 3);
        assert_eq!(store.rollbacks.get(), 0);
    }

    #[test]
    fn test_begin_failure_does_no_further_work() {
        let store = MemoryStore::failing_at(FailAt::Begin);
        let err = write_batch(&store, &batch(1, 0)).unwrap_err();
        assert!(matches!(err, WriteError::Begin(_)));
        assert_eq!(store.begun.get(), 0);
        assert_eq!(store.rollbacks.get(), 0);
    }

    #[test]
    fn test_fillup_failure_rolls_back() {
        let store = MemoryStore::failing_at(FailAt::Fillups);
        let err = write_batch(&store, &batch(2, 1)).unwrap_err();
        assert!(matches!(err, WriteError::Fillups(_)));
        assert_eq!(err.to_string(), "no such table: fillups");
        assert_eq!(store.persisted(), 0);
        assert_eq!(store.rollbacks.get(), 1);
    }

    #[test]
    fn test_expense_failure_undoes_staged_fillups() {
        let store = MemoryStore::failing_at(FailAt::Expenses);
        let err = write_batch(&store, &batch(2, 1)).unwrap_err();
        assert!(matches!(err, WriteError::Expenses(_)));
        assert_eq!(store.persisted(), 0);
        assert_eq!(store.rollbacks.get(), 1);
    }

    #[test]
    fn test_expenses_skipped_when_none() {
        let store = MemoryStore::failing_at(FailAt::Expenses);
        let report = write_batch(&store, &batch(1, 0)).unwrap();
        assert_eq!(report.expenses, 0);
        assert_eq!(store.persisted(), 1);
    }

    #[test]
    fn test_commit_failure_is_reported() {
        let store = MemoryStore::failing_at(FailAt::Commit);
        let err = write_batch(&store, &batch(1, 1)).unwrap_err();
        assert!(matches!(err, WriteError::Commit(_)));
        assert!(err.to_string().contains("may not have been saved"));
        assert_eq!(store.persisted(), 0);
    }

    #[test]
    fn test_panic_mid_write_still_rolls_back() {
        let store = MemoryStore::failing_at(FailAt::PanicInFillups);
        let outcome = catch_unwind(AssertUnwindSafe(|| write_batch(&store, &batch(1, 1))));
        assert!(outcome.is_err());
        assert_eq!(store.persisted(), 0);
        assert_eq!(store.rollbacks.get(), 1);
    }
}
