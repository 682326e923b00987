use chrono::NaiveDateTime;
use clap::ValueEnum;
use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ImportFailure;
use crate::models::{Expense, Fillup, ImportBatch, RowError, RowProblem, Source, User, Vehicle};
use crate::normalize::{parse_amount, parse_datetime, parse_odometer};
use crate::ports::{Directory, Store};
use crate::resolver::Resolver;
use crate::schema::{ColumnSchema, NoteField, NumberStyle, FUELLY, GASBUDDY};
use crate::writer::write_batch;

// ---------------------------------------------------------------------------
// Vendor adapters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Vendor {
    Fuelly,
    #[value(name = "gasbuddy")]
    GasBuddy,
}

/// What a row turns into once it validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Fillup,
    Expense,
    /// Validated like any other row, never persisted.
    Other,
}

/// Raw cell text pulled out of one record, before any parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorRow<'r> {
    pub kind: RowKind,
    pub vehicle: &'r str,
    pub date: String,
    pub total_cost: &'r str,
    pub odometer: &'r str,
    pub unit_price: &'r str,
    pub quantity: &'r str,
    pub tank_full: bool,
    pub station: String,
    pub notes: Vec<(Option<&'static str>, &'r str)>,
    pub expense_type: &'r str,
}

impl Vendor {
    pub fn schema(&self) -> &'static ColumnSchema {
        match self {
            Self::Fuelly => &FUELLY,
            Self::GasBuddy => &GASBUDDY,
        }
    }

    pub fn source(&self) -> Source {
        match self {
            Self::Fuelly => Source::Fuelly,
            Self::GasBuddy => Source::GasBuddy,
        }
    }

    pub fn name(&self) -> &'static str {
        self.schema().name
    }

    fn kind(&self, record: &StringRecord) -> RowKind {
        let Some(column) = self.schema().record_type else {
            return RowKind::Fillup;
        };
        match cell(record, column) {
            "Gas" => RowKind::Fillup,
            "Service" => RowKind::Expense,
            _ => RowKind::Other,
        }
    }

    fn station(&self, record: &StringRecord) -> String {
        let parts: Vec<&str> = self.schema().station.iter().map(|&c| cell(record, c)).collect();
        match (self, parts.split_first()) {
            (Self::GasBuddy, Some((name, address))) => format!("{name} at {}", address.join(", ")),
            _ => parts.concat(),
        }
    }

    /// Pull the cells one record needs. The record must be at least `schema().width()` wide.
    pub fn extract<'r>(&self, record: &'r StringRecord) -> VendorRow<'r> {
        let schema = self.schema();
        let kind = self.kind(record);
        let date = match schema.time {
            Some(time) => format!("{} {}", cell(record, schema.date), cell(record, time)),
            None => cell(record, schema.date).to_string(),
        };
        let note_fields: &[NoteField] = match kind {
            RowKind::Fillup => schema.fillup_notes,
            RowKind::Expense => schema.expense_notes,
            RowKind::Other => &[],
        };
        VendorRow {
            kind,
            vehicle: cell(record, schema.vehicle),
            date,
            total_cost: cell(record, schema.total_cost),
            odometer: cell(record, schema.odometer),
            unit_price: cell(record, schema.unit_price),
            quantity: cell(record, schema.quantity),
            tank_full: cell(record, schema.tank_full) == schema.tank_full_marker,
            station: self.station(record),
            notes: note_fields
                .iter()
                .map(|n| (n.label, cell(record, n.column)))
                .collect(),
            expense_type: schema.expense_type.map_or("", |c| cell(record, c)),
        }
    }
}

fn cell(record: &StringRecord, column: usize) -> &str {
    record.get(column).unwrap_or("")
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Tokenize the whole file. The header is skipped and never checked by name.
pub fn read_records(vendor: Vendor, content: &[u8]) -> Result<Vec<StringRecord>, ImportFailure> {
    let width = vendor.schema().width();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content);

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(|e| ImportFailure::Parse(e.to_string()))?;
        if record.len() < width {
            return Err(ImportFailure::Parse(format!(
                "{} export needs {width} columns, found {} at row {}",
                vendor.name(),
                record.len(),
                i + 2
            )));
        }
        records.push(record);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Fillup {
        quantity: f64,
        unit_price: f64,
        tank_full: bool,
        station: String,
    },
    Expense {
        expense_type: String,
    },
    Other,
}

/// A row whose every field parsed and whose vehicle resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub row: usize,
    pub vehicle: Vehicle,
    pub date: NaiveDateTime,
    pub total_cost: f64,
    pub odometer: i64,
    pub notes: Vec<(Option<&'static str>, String)>,
    pub entry: Entry,
}

fn checked<T>(value: Option<T>, row: usize, problem: RowProblem, errors: &mut Vec<RowError>) -> Option<T> {
    if value.is_none() {
        errors.push(RowError::new(row, problem));
    }
    value
}

/// Run every check on one record, in a fixed order, without stopping at the first failure.
///
/// Checks: vehicle, date, total cost, odometer, then unit price and quantity
/// for fillup rows. Quantity is never unformatted, for either vendor.
pub fn validate_row(
    vendor: Vendor,
    row: usize,
    record: &StringRecord,
    resolver: &Resolver,
) -> Result<NormalizedRow, Vec<RowError>> {
    let schema = vendor.schema();
    let currency = resolver.user.currency.as_str();
    let raw = vendor.extract(record);
    let mut errors = Vec::new();

    let vehicle = checked(
        resolver.vehicle(raw.vehicle).cloned(),
        row,
        RowProblem::UnmappedVehicle,
        &mut errors,
    );
    let date = checked(
        parse_datetime(&raw.date, schema.date_layouts),
        row,
        RowProblem::InvalidDate,
        &mut errors,
    );
    let total_cost = checked(
        parse_amount(raw.total_cost, schema.number_style, currency),
        row,
        RowProblem::InvalidTotalCost,
        &mut errors,
    );
    let odometer = checked(
        parse_odometer(raw.odometer, schema.number_style, currency),
        row,
        RowProblem::InvalidOdometer,
        &mut errors,
    );

    let entry = match raw.kind {
        RowKind::Fillup => {
            let unit_price = checked(
                parse_amount(raw.unit_price, schema.number_style, currency),
                row,
                RowProblem::InvalidUnitPrice,
                &mut errors,
            );
            let quantity = checked(
                parse_amount(raw.quantity, NumberStyle::Plain, currency),
                row,
                RowProblem::InvalidQuantity,
                &mut errors,
            );
            match (unit_price, quantity) {
                (Some(unit_price), Some(quantity)) => Some(Entry::Fillup {
                    quantity,
                    unit_price,
                    tank_full: raw.tank_full,
                    station: raw.station,
                }),
                _ => None,
            }
        }
        RowKind::Expense => Some(Entry::Expense {
            expense_type: raw.expense_type.to_string(),
        }),
        RowKind::Other => Some(Entry::Other),
    };

    match (vehicle, date, total_cost, odometer, entry) {
        (Some(vehicle), Some(date), Some(total_cost), Some(odometer), Some(entry)) => Ok(NormalizedRow {
            row,
            vehicle,
            date,
            total_cost,
            odometer,
            notes: raw
                .notes
                .into_iter()
                .map(|(label, value)| (label, value.to_string()))
                .collect(),
            entry,
        }),
        _ => Err(errors),
    }
}

/// Validate every data row; any error anywhere fails the whole set.
///
/// Row numbers count the header as row 1.
pub fn validate_rows(
    vendor: Vendor,
    records: &[StringRecord],
    resolver: &Resolver,
) -> Result<Vec<NormalizedRow>, Vec<RowError>> {
    let mut rows = Vec::with_capacity(records.len());
    let mut errors = Vec::new();
    for (i, record) in records.iter().enumerate() {
        match validate_row(vendor, i + 2, record, resolver) {
            Ok(row) => rows.push(row),
            Err(row_errors) => errors.extend(row_errors),
        }
    }
    if errors.is_empty() {
        Ok(rows)
    } else {
        Err(errors)
    }
}

// ---------------------------------------------------------------------------
// Building records
// ---------------------------------------------------------------------------

/// `Label:value` lines joined with newlines; unlabelled notes are the bare value.
pub fn render_notes(notes: &[(Option<&'static str>, String)]) -> String {
    notes
        .iter()
        .map(|(label, value)| match label {
            Some(label) => format!("{label}:{value}"),
            None => value.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turn validated rows into the records to write. Units and currency come from the profile.
pub fn build_batch(vendor: Vendor, rows: Vec<NormalizedRow>, user: &User) -> ImportBatch {
    let mut batch = ImportBatch::default();
    for row in rows {
        let comments = render_notes(&row.notes);
        match row.entry {
            Entry::Fillup {
                quantity,
                unit_price,
                tank_full,
                station,
            } => batch.fillups.push(Fillup {
                vehicle_id: row.vehicle.id,
                fuel_unit: row.vehicle.fuel_unit,
                fuel_quantity: quantity,
                per_unit_price: unit_price,
                total_amount: row.total_cost,
                odo_reading: row.odometer,
                is_tank_full: tank_full,
                has_missed_fillup: false,
                comments,
                filling_station: station,
                currency: user.currency.clone(),
                distance_unit: user.distance_unit.clone(),
                date: row.date,
                source: vendor.source(),
                user_id: user.id.clone(),
            }),
            Entry::Expense { expense_type } => batch.expenses.push(Expense {
                vehicle_id: row.vehicle.id,
                amount: row.total_cost,
                odo_reading: row.odometer,
                expense_type,
                comments,
                currency: user.currency.clone(),
                distance_unit: user.distance_unit.clone(),
                date: row.date,
                source: vendor.source(),
                user_id: user.id.clone(),
            }),
            Entry::Other => {}
        }
    }
    batch
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub vendor: Vendor,
    pub rows: usize,
    pub fillups: usize,
    pub expenses: usize,
}

/// Import one vendor export for `user_id`: parse, validate, build, write.
///
/// Nothing is written unless every row validates, and the write itself is a
/// single transaction.
pub fn import_bytes(
    vendor: Vendor,
    content: &[u8],
    user_id: &str,
    directory: &dyn Directory,
    store: &dyn Store,
) -> Result<ImportSummary, ImportFailure> {
    let records = read_records(vendor, content)?;
    debug!(vendor = vendor.name(), rows = records.len(), "read export");

    let resolver = Resolver::load(directory, user_id).map_err(ImportFailure::Lookup)?;

    let rows = validate_rows(vendor, &records, &resolver).map_err(|errors| {
        warn!(vendor = vendor.name(), errors = errors.len(), "rows failed validation");
        ImportFailure::Rows(errors)
    })?;

    let batch = build_batch(vendor, rows, &resolver.user);
    let report = write_batch(store, &batch).map_err(ImportFailure::Persistence)?;

    info!(
        vendor = vendor.name(),
        user = user_id,
        fillups = report.fillups,
        expenses = report.expenses,
        "import finished"
    );
    Ok(ImportSummary {
        vendor,
        rows: records.len(),
        fillups: report.fillups,
        expenses: report.expenses,
    })
}

/// Serialized as `{}` on success, `{"errors": [...]}` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportResponse {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ImportResponse {
    pub fn from_result(result: &Result<ImportSummary, ImportFailure>) -> Self {
        match result {
            Ok(_) => Self::default(),
            Err(failure) => Self {
                errors: failure.messages(),
            },
        }
    }
}
