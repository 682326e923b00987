use std::fmt;

use chrono::NaiveDateTime;

/// A fleet member, owned by the host application. Never written by an import.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: String,
    pub nickname: String,
    pub fuel_unit: String,
}

/// The importing user's profile; the source of currency and distance unit defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub currency: String,
    pub distance_unit: String,
}

/// Where an imported record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Fuelly,
    GasBuddy,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fuelly => "Fuelly",
            Self::GasBuddy => "GasBuddy",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fillup {
    pub vehicle_id: String,
    pub fuel_unit: String,
    pub fuel_quantity: f64,
    pub per_unit_price: f64,
    pub total_amount: f64,
    pub odo_reading: i64,
    pub is_tank_full: bool,
    pub has_missed_fillup: bool,
    pub comments: String,
    pub filling_station: String,
    pub currency: String,
    pub distance_unit: String,
    pub date: NaiveDateTime,
    pub source: Source,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub vehicle_id: String,
    pub amount: f64,
    pub odo_reading: i64,
    pub expense_type: String,
    pub comments: String,
    pub currency: String,
    pub distance_unit: String,
    pub date: NaiveDateTime,
    pub source: Source,
    pub user_id: String,
}

/// Everything one import will write, built only after every row validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportBatch {
    pub fillups: Vec<Fillup>,
    pub expenses: Vec<Expense>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowProblem {
    UnmappedVehicle,
    InvalidDate,
    InvalidTotalCost,
    InvalidOdometer,
    InvalidUnitPrice,
    InvalidQuantity,
}

impl RowProblem {
    fn describe(&self) -> &'static str {
        match self {
            Self::UnmappedVehicle => "unmapped vehicle entry",
            Self::InvalidDate => "invalid date/time",
            Self::InvalidTotalCost => "invalid total cost",
            Self::InvalidOdometer => "invalid odo reading",
            Self::InvalidUnitPrice => "invalid cost per gallon",
            Self::InvalidQuantity => "invalid quantity",
        }
    }
}

/// A validation failure pinned to one line of the input.
///
/// `row` is 1-based with the header counted as row 1, so the first data row is row 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub row: usize,
    pub problem: RowProblem,
}

impl RowError {
    pub fn new(row: usize, problem: RowProblem) -> Self {
        Self { row, problem }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Found an {} at row {}", self.problem.describe(), self.row)
    }
}
