use colored::Colorize;

use fuelbook::db::SqliteStore;
use fuelbook::error::{FuelbookError, Result};
use fuelbook::importer::{import_bytes, ImportResponse, Vendor};
use fuelbook::settings::load_settings;

use super::open_db;

pub fn run(vendor: Vendor, file: &str, user: Option<&str>, json: bool) -> Result<()> {
    let settings = load_settings();
    let user_id = user
        .map(str::to_string)
        .or_else(|| settings.default_user.clone())
        .ok_or_else(|| {
            FuelbookError::Settings("No user given. Pass --user or run `fuelbook demo`.".to_string())
        })?;

    let content = std::fs::read(file)?;
    let conn = open_db(&settings)?;
    let store = SqliteStore::new(&conn);
    let result = import_bytes(vendor, &content, &user_id, &store, &store);

    if json {
        let body = serde_json::to_string(&ImportResponse::from_result(&result))
            .map_err(|e| FuelbookError::Other(e.to_string()))?;
        println!("{body}");
    }

    match result {
        Ok(summary) => {
            if !json {
                println!(
                    "{}: {} rows read, {} fillups and {} expenses imported",
                    summary.vendor.name(),
                    summary.rows,
                    summary.fillups.to_string().green(),
                    summary.expenses.to_string().green()
                );
            }
            Ok(())
        }
        Err(failure) => {
            let messages = failure.messages();
            if !json {
                for message in &messages {
                    eprintln!("  {}", message.red());
                }
            }
            Err(FuelbookError::Other(format!(
                "{} import failed with {} error(s)",
                vendor.name(),
                messages.len()
            )))
        }
    }
}
