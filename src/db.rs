use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Transaction};

use crate::error::{FuelbookError, Result};
use crate::models::{Expense, Fillup, User, Vehicle};
use crate::ports::{Directory, Store, StoreTransaction};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    currency TEXT NOT NULL,
    distance_unit TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS vehicles (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    nickname TEXT NOT NULL,
    fuel_unit TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS fillups (
    id INTEGER PRIMARY KEY,
    vehicle_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    fuel_unit TEXT NOT NULL,
    fuel_quantity REAL NOT NULL,
    per_unit_price REAL NOT NULL,
    total_amount REAL NOT NULL,
    odo_reading INTEGER NOT NULL,
    is_tank_full INTEGER NOT NULL,
    has_missed_fillup INTEGER NOT NULL DEFAULT 0,
    comments TEXT,
    filling_station TEXT,
    currency TEXT NOT NULL,
    distance_unit TEXT NOT NULL,
    date TEXT NOT NULL,
    source TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (vehicle_id) REFERENCES vehicles(id),
    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS expenses (
    id INTEGER PRIMARY KEY,
    vehicle_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    amount REAL NOT NULL,
    odo_reading INTEGER NOT NULL,
    expense_type TEXT NOT NULL,
    comments TEXT,
    currency TEXT NOT NULL,
    distance_unit TEXT NOT NULL,
    date TEXT NOT NULL,
    source TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (vehicle_id) REFERENCES vehicles(id),
    FOREIGN KEY (user_id) REFERENCES users(id)
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

pub fn add_user(conn: &Connection, user: &User) -> Result<()> {
    conn.execute(
        "INSERT INTO users (id, currency, distance_unit) VALUES (?1, ?2, ?3)",
        rusqlite::params![user.id, user.currency, user.distance_unit],
    )?;
    Ok(())
}

pub fn add_vehicle(conn: &Connection, user_id: &str, vehicle: &Vehicle) -> Result<()> {
    conn.execute(
        "INSERT INTO vehicles (id, user_id, nickname, fuel_unit) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![vehicle.id, user_id, vehicle.nickname, vehicle.fuel_unit],
    )?;
    Ok(())
}

/// Row counts of `fillups` or `expenses`, grouped by source.
pub fn count_by_source(conn: &Connection, table: &str) -> Result<Vec<(String, i64)>> {
    let table = match table {
        "fillups" | "expenses" => table,
        other => return Err(FuelbookError::Other(format!("Not an import table: {other}"))),
    };
    let mut stmt = conn.prepare(&format!(
        "SELECT source, count(*) FROM {table} GROUP BY source ORDER BY source"
    ))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Both host ports over one SQLite connection.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl Directory for SqliteStore<'_> {
    fn vehicles_for(&self, user_id: &str) -> Result<Vec<Vehicle>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, nickname, fuel_unit FROM vehicles WHERE user_id = ?1 ORDER BY rowid",
        )?;
        let vehicles = stmt
            .query_map([user_id], |row| {
                Ok(Vehicle {
                    id: row.get(0)?,
                    nickname: row.get(1)?,
                    fuel_unit: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(vehicles)
    }

    fn user_profile(&self, user_id: &str) -> Result<User> {
        self.conn
            .query_row(
                "SELECT id, currency, distance_unit FROM users WHERE id = ?1",
                [user_id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        currency: row.get(1)?,
                        distance_unit: row.get(2)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| FuelbookError::UnknownUser(user_id.to_string()))
    }
}

impl Store for SqliteStore<'_> {
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>> {
        // rusqlite rolls back on drop unless committed
        let tx = self.conn.unchecked_transaction()?;
        Ok(Box::new(SqliteTransaction { tx }))
    }
}

struct SqliteTransaction<'c> {
    tx: Transaction<'c>,
}

impl StoreTransaction for SqliteTransaction<'_> {
    fn insert_fillups(&mut self, fillups: &[Fillup]) -> Result<()> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO fillups (vehicle_id, user_id, fuel_unit, fuel_quantity, per_unit_price, \
             total_amount, odo_reading, is_tank_full, has_missed_fillup, comments, filling_station, \
             currency, distance_unit, date, source) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        )?;
        for f in fillups {
            stmt.execute(rusqlite::params![
                f.vehicle_id,
                f.user_id,
                f.fuel_unit,
                f.fuel_quantity,
                f.per_unit_price,
                f.total_amount,
                f.odo_reading,
                f.is_tank_full,
                f.has_missed_fillup,
                f.comments,
                f.filling_station,
                f.currency,
                f.distance_unit,
                f.date.format(DATE_FORMAT).to_string(),
                f.source.as_str(),
            ])?;
        }
        Ok(())
    }

    fn insert_expenses(&mut self, expenses: &[Expense]) -> Result<()> {
        let mut stmt = self.tx.prepare_cached(
            "INSERT INTO expenses (vehicle_id, user_id, amount, odo_reading, expense_type, comments, \
             currency, distance_unit, date, source) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for e in expenses {
            stmt.execute(rusqlite::params![
                e.vehicle_id,
                e.user_id,
                e.amount,
                e.odo_reading,
                e.expense_type,
                e.comments,
                e.currency,
                e.distance_unit,
                e.date.format(DATE_FORMAT).to_string(),
                e.source.as_str(),
            ])?;
        }
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }

    fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback()?;
        Ok(())
    }
}
