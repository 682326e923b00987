use std::collections::BTreeMap;

use comfy_table::{Cell, Table};
use rusqlite::Connection;

use fuelbook::db::{count_by_source, get_connection};
use fuelbook::error::Result;
use fuelbook::settings::load_settings;

/// Fillup and expense counts keyed by source.
fn imported_by_source(conn: &Connection) -> Result<BTreeMap<String, (i64, i64)>> {
    let mut counts: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    for (source, n) in count_by_source(conn, "fillups")? {
        counts.entry(source).or_default().0 = n;
    }
    for (source, n) in count_by_source(conn, "expenses")? {
        counts.entry(source).or_default().1 = n;
    }
    Ok(counts)
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = settings.db_path();

    println!("Default user: {}", settings.default_user.as_deref().unwrap_or("(not set)"));
    println!("Data dir:     {}", settings.data_dir);
    println!("Database:     {}", db_path.display());

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `fuelbook init` to set up.");
        return Ok(());
    }

    let conn = get_connection(&db_path)?;
    let users: i64 = conn.query_row("SELECT count(*) FROM users", [], |r| r.get(0))?;
    let vehicles: i64 = conn.query_row("SELECT count(*) FROM vehicles", [], |r| r.get(0))?;
    println!();
    println!("Users:        {users}");
    println!("Vehicles:     {vehicles}");

    let counts = imported_by_source(&conn)?;
    if counts.is_empty() {
        println!("Nothing imported yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Source", "Fillups", "Expenses"]);
    for (source, (fillups, expenses)) in counts {
        table.add_row(vec![Cell::new(source), Cell::new(fillups), Cell::new(expenses)]);
    }
    println!("\nImported\n{table}");
    Ok(())
}
