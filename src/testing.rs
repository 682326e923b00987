//! In-memory stand-ins for the host ports.

use std::cell::{Cell, RefCell};

use crate::error::{FuelbookError, Result};
use crate::models::{Expense, Fillup, User, Vehicle};
use crate::ports::{Directory, Store, StoreTransaction};

pub fn vehicle(id: &str, nickname: &str) -> Vehicle {
    Vehicle {
        id: id.to_string(),
        nickname: nickname.to_string(),
        fuel_unit: "US Gallon".to_string(),
    }
}

pub struct MemoryDirectory {
    pub user: User,
    pub vehicles: Vec<Vehicle>,
}

impl MemoryDirectory {
    /// User `u1` (USD, miles) owning one vehicle per nickname, with ids `veh-<n>`.
    pub fn with_fleet(nicknames: &[&str]) -> Self {
        Self {
            user: User {
                id: "u1".to_string(),
                currency: "USD".to_string(),
                distance_unit: "Miles".to_string(),
            },
            vehicles: nicknames
                .iter()
                .enumerate()
                .map(|(i, n)| vehicle(&format!("veh-{}", i + 1), n))
                .collect(),
        }
    }
}

impl Directory for MemoryDirectory {
    fn vehicles_for(&self, user_id: &str) -> Result<Vec<Vehicle>> {
        if user_id == self.user.id {
            Ok(self.vehicles.clone())
        } else {
            Ok(Vec::new())
        }
    }

    fn user_profile(&self, user_id: &str) -> Result<User> {
        if user_id == self.user.id {
            Ok(self.user.clone())
        } else {
            Err(FuelbookError::UnknownUser(user_id.to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailAt {
    #[default]
    Nowhere,
    Begin,
    Fillups,
    Expenses,
    Commit,
    PanicInFillups,
}

/// Keeps committed rows in vectors and counts rollbacks, explicit or on drop.
#[derive(Default)]
pub struct MemoryStore {
    pub fail_at: FailAt,
    pub fillups: RefCell<Vec<Fillup>>,
    pub expenses: RefCell<Vec<Expense>>,
    pub begun: Cell<usize>,
    pub rollbacks: Cell<usize>,
}

impl MemoryStore {
    pub fn failing_at(fail_at: FailAt) -> Self {
        Self {
            fail_at,
            ..Self::default()
        }
    }

    pub fn persisted(&self) -> usize {
        self.fillups.borrow().len() + self.expenses.borrow().len()
    }
}

impl Store for MemoryStore {
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>> {
        if self.fail_at == FailAt::Begin {
            return Err(FuelbookError::Other("cannot start transaction".into()));
        }
        self.begun.set(self.begun.get() + 1);
        Ok(Box::new(MemoryTransaction {
            store: self,
            fillups: Vec::new(),
            expenses: Vec::new(),
            finished: false,
        }))
    }
}

struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    fillups: Vec<Fillup>,
    expenses: Vec<Expense>,
    finished: bool,
}

impl StoreTransaction for MemoryTransaction<'_> {
    fn insert_fillups(&mut self, fillups: &[Fillup]) -> Result<()> {
        match self.store.fail_at {
            FailAt::Fillups => Err(FuelbookError::Other("no such table: fillups".into())),
            FailAt::PanicInFillups => panic!("storage driver fault"),
            _ => {
                self.fillups.extend_from_slice(fillups);
                Ok(())
            }
        }
    }

    fn insert_expenses(&mut self, expenses: &[Expense]) -> Result<()> {
        if self.store.fail_at == FailAt::Expenses {
            return Err(FuelbookError::Other("no such table: expenses".into()));
        }
        self.expenses.extend_from_slice(expenses);
        Ok(())
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        if self.store.fail_at == FailAt::Commit {
            return Err(FuelbookError::Other("database is locked".into()));
        }
        self.store.fillups.borrow_mut().append(&mut self.fillups);
        self.store.expenses.borrow_mut().append(&mut self.expenses);
        self.finished = true;
        Ok(())
    }

    fn rollback(mut self: Box<Self>) -> Result<()> {
        self.finished = true;
        self.store.rollbacks.set(self.store.rollbacks.get() + 1);
        Ok(())
    }
}

impl Drop for MemoryTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.store.rollbacks.set(self.store.rollbacks.get() + 1);
        }
    }
}
