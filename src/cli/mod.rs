pub mod demo;
pub mod import;
pub mod init;
pub mod status;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use fuelbook::db::{get_connection, init_db};
use fuelbook::error::{FuelbookError, Result};
use fuelbook::importer::Vendor;
use fuelbook::settings::Settings;

#[derive(Parser)]
#[command(name = "fuelbook", about = "Import Fuelly and GasBuddy fuel logs into a vehicle expense ledger.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for fuelbook data (default: ~/Documents/fuelbook)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Import a vendor CSV export. Nothing is saved unless every row is valid.
    Import {
        /// Export format
        #[arg(value_enum)]
        vendor: Vendor,
        /// Path to the CSV export
        file: String,
        /// User to import for (default: `default_user` from settings)
        #[arg(long)]
        user: Option<String>,
        /// Print the `{}` / `{"errors": [...]}` response instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Load a demo user, two vehicles and sample exports to try an import with.
    Demo,
    /// Show data locations and record counts.
    Status,
}

/// Open the configured database, refusing to create one outside `init`.
pub(crate) fn open_db(settings: &Settings) -> Result<Connection> {
    let db_path = settings.db_path();
    if !db_path.exists() {
        return Err(FuelbookError::Settings(
            "No database found. Run `fuelbook init` first.".to_string(),
        ));
    }
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;
    Ok(conn)
}
