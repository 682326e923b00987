use std::path::{Path, PathBuf};

use rusqlite::Connection;

use fuelbook::db::{add_user, add_vehicle};
use fuelbook::error::Result;
use fuelbook::models::{User, Vehicle};
use fuelbook::settings::{load_settings, save_settings};

use super::open_db;

const DEMO_USER: &str = "demo";

const FLEET: &[(&str, &str, &str)] = &[
    ("demo-civic", "Civic", "US Gallon"),
    ("demo-outback", "Outback", "US Gallon"),
];

const FUELLY_SAMPLE: &str = "\
Type,MPG,Date,Time,Vehicle,Odometer,Fill,Price,Quantity,Total,Octane,Brand,Location,Tags,Payment,TirePressure,Notes,ServiceType
Gas,,2024-01-05,07:45,Civic,\"45,120\",Full,$3.199,10.412,$33.31,87,Shell,Main St,commute,Visa,35,,
Gas,33.4,2024-01-19,6:10 PM,Civic,\"45,468\",Full,$3.259,10.418,$33.95,87,Costco,Route 9,commute,Amex,35,,
Gas,,2024-01-08,12:20,Outback,\"61,002\",Partial,$3.289,8.000,$26.31,87,Mobil,Elm Ave,,Visa,32,half tank,
Service,,2024-02-01,9:15 AM,Civic,\"46,000\",,,,$89.99,,,Jiffy Lube,maintenance,Amex,,synthetic,Oil Change
";

const GASBUDDY_SAMPLE: &str = "\
Date,Station,Address,City,State,Zip,Country,Total,Currency,FuelType,Quantity,Unit,Vehicle,Price,Odometer,Trip,Notes,FullTank
2024-03-02 08:14:09,Costco,123 Main St,Springfield,IL,62701,US,41.25,USD,Regular,11.000,gallons,Outback,3.750,61310,,,Yes
2024-03-16 17:40:55,Speedway,9 Lake Rd,Springfield,IL,62704,US,38.10,USD,Regular,10.027,gallons,Outback,3.799,61622,,,Yes
";

const FUELLY_SAMPLE_FILE: &str = "fuelly-sample.csv";
const GASBUDDY_SAMPLE_FILE: &str = "gasbuddy-sample.csv";

/// Insert the demo user and fleet. Returns false when they already exist.
fn insert_demo_data(conn: &Connection) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
        [DEMO_USER],
        |r| r.get(0),
    )?;
    if exists {
        return Ok(false);
    }

    let tx = conn.unchecked_transaction()?;
    add_user(&tx, &User {
        id: DEMO_USER.to_string(),
        currency: "USD".to_string(),
        distance_unit: "Miles".to_string(),
    })?;
    for (id, nickname, fuel_unit) in FLEET {
        add_vehicle(&tx, DEMO_USER, &Vehicle {
            id: id.to_string(),
            nickname: nickname.to_string(),
            fuel_unit: fuel_unit.to_string(),
        })?;
    }
    tx.commit()?;
    Ok(true)
}

fn write_samples(data_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let fuelly = data_dir.join(FUELLY_SAMPLE_FILE);
    let gasbuddy = data_dir.join(GASBUDDY_SAMPLE_FILE);
    std::fs::write(&fuelly, FUELLY_SAMPLE)?;
    std::fs::write(&gasbuddy, GASBUDDY_SAMPLE)?;
    Ok((fuelly, gasbuddy))
}

pub fn run() -> Result<()> {
    let mut settings = load_settings();
    let conn = open_db(&settings)?;

    if insert_demo_data(&conn)? {
        println!("Demo data loaded!");
    } else {
        println!("Demo data already loaded (user '{DEMO_USER}' exists).");
    }
    let (fuelly, gasbuddy) = write_samples(Path::new(&settings.data_dir))?;

    settings.default_user = Some(DEMO_USER.to_string());
    save_settings(&settings)?;

    println!("  User:      {DEMO_USER} (now the default)");
    println!(
        "  Vehicles:  {}",
        FLEET.iter().map(|(_, nickname, _)| *nickname).collect::<Vec<_>>().join(", ")
    );
    println!();
    println!("Try these next:");
    println!("  fuelbook import fuelly {}", fuelly.display());
    println!("  fuelbook import gasbuddy {}", gasbuddy.display());
    println!("  fuelbook status");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuelbook::db::{get_connection, init_db, SqliteStore};
    use fuelbook::importer::{import_bytes, Vendor};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    #[test]
    fn test_demo_data_is_idempotent() {
        let (_dir, conn) = test_db();
        assert!(insert_demo_data(&conn).unwrap());
        assert!(!insert_demo_data(&conn).unwrap());
        let vehicles: i64 = conn.query_row("SELECT count(*) FROM vehicles", [], |r| r.get(0)).unwrap();
        assert_eq!(vehicles, FLEET.len() as i64);
    }

    #[test]
    fn test_fuelly_sample_imports_cleanly() {
        let (_dir, conn) = test_db();
        insert_demo_data(&conn).unwrap();
        let store = SqliteStore::new(&conn);
        let summary =
            import_bytes(Vendor::Fuelly, FUELLY_SAMPLE.as_bytes(), DEMO_USER, &store, &store).unwrap();
        assert_eq!((summary.fillups, summary.expenses), (3, 1));
    }

    #[test]
    fn test_gasbuddy_sample_imports_cleanly() {
        let (_dir, conn) = test_db();
        insert_demo_data(&conn).unwrap();
        let store = SqliteStore::new(&conn);
        let summary =
            import_bytes(Vendor::GasBuddy, GASBUDDY_SAMPLE.as_bytes(), DEMO_USER, &store, &store).unwrap();
        assert_eq!((summary.fillups, summary.expenses), (2, 0));
    }

    #[test]
    fn test_samples_written_to_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let (fuelly, gasbuddy) = write_samples(dir.path()).unwrap();
        assert!(fuelly.ends_with(FUELLY_SAMPLE_FILE));
        assert_eq!(std::fs::read_to_string(gasbuddy).unwrap(), GASBUDDY_SAMPLE);
    }
}
