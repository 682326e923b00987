mod cli;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    fuelbook::logging::init();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Import {
            vendor,
            file,
            user,
            json,
        } => cli::import::run(vendor, &file, user.as_deref(), json),
        Commands::Demo => cli::demo::run(),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("{} {e}", "Error:".red().bold());
        std::process::exit(1);
    }
}
