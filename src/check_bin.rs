//! Connectivity check for the configured roster store.
//!
//! Reports which configuration keys are set (never their values), opens the
//! store, reads the roster once, and prints a short summary.

use std::process::ExitCode;

use spinner_lib::config::{AppConfig, LogSettings, REPORTED_KEYS};
use spinner_lib::db::models::{header_row, PersonRecord};
use spinner_lib::db::{open_store, SharedStore};
use spinner_lib::error::AppError;
use spinner_lib::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let _guard = logging::init(&LogSettings::default());

    println!("Configuration:");
    for key in REPORTED_KEYS {
        let state = match std::env::var(key) {
            Ok(v) if !v.trim().is_empty() => "set",
            _ => "not set",
        };
        println!("  {key:<28} {state}");
    }

    match check().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\nCheck failed ({}): {}", e.kind(), e);
            ExitCode::FAILURE
        }
    }
}

async fn check() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let store: SharedStore = open_store(&config.store)?;
    println!("\nBackend: {}", store.backend_name());

    let records = store.read_all().await?;
    let removed = records.iter().filter(|r| r.is_removed()).count();
    println!("Rows: {} ({} removed)", records.len(), removed);
    println!("Header: {}", header_row().join(", "));

    match records.first() {
        Some(first) => print_record(first),
        None => println!("Roster is empty"),
    }
    Ok(())
}

fn print_record(record: &PersonRecord) {
    println!("First record:");
    for (column, value) in header_row().iter().zip(record.to_row()) {
        println!("  {column:<28} {value}");
    }
}
