//! # Checkout CLI
//!
//! Runs one checkout from a JSON payload, the same shape the HTTP layer
//! submits.
//!
//! ## Usage
//! ```bash
//! cargo run -p tally-db --bin checkout -- --payload ./cart.json
//! cargo run -p tally-db --bin checkout -- --db ./data/tally.db --payload ./cart.json
//! ```
//!
//! Prints the persisted receipt as JSON on success. On failure prints the
//! classified error to stderr and exits with 2 (invalid input) or 1
//! (checkout failed).

use std::env;
use std::fs;
use std::process::ExitCode;

use serde::Serialize;
use tally_core::{CheckoutPayload, CheckoutRequest, ErrorKind};
use tally_db::{Database, DbConfig, TallyConfig};
use tracing::error;

#[derive(Serialize)]
struct ErrorOutput {
    kind: ErrorKind,
    status: u16,
    message: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tally_db::init_tracing();

    match run().await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Checkout CLI failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = TallyConfig::load()?;
    let args: Vec<String> = env::args().collect();

    let mut db_path = config.db_path.display().to_string();
    let mut payload_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--payload" | "-p" => {
                if i + 1 < args.len() {
                    payload_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                return Ok(ExitCode::SUCCESS);
            }
            _ => {}
        }
        i += 1;
    }

    let Some(payload_path) = payload_path else {
        print_help();
        return Ok(ExitCode::from(2));
    };

    let payload: CheckoutPayload = serde_json::from_str(&fs::read_to_string(&payload_path)?)?;

    let request = match CheckoutRequest::try_from(payload) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("invalid payload: {e}");
            return Ok(ExitCode::from(2));
        }
    };

    let db = Database::new(DbConfig::new(&db_path).max_connections(config.db_max_connections)).await?;
    let outcome = db.checkout(config.checkout_timeout()).execute(&request).await;
    db.close().await;

    match outcome {
        Ok(receipt) => {
            println!("{}", serde_json::to_string_pretty(&receipt)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let output = ErrorOutput {
                kind: err.kind(),
                status: err.kind().suggested_status(),
                message: err.to_string(),
            };
            eprintln!("{}", serde_json::to_string_pretty(&output)?);
            if err.is_timeout() {
                eprintln!("nothing was committed; the same payload can be resubmitted");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_help() {
    println!("Tally POS Checkout");
    println!();
    println!("Usage: checkout --payload <FILE> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -p, --payload <FILE>  CheckoutPayload JSON file (required)");
    println!("  -d, --db <PATH>       Database file path (default: $TALLY_DB_PATH or ./tally_dev.db)");
    println!("  -h, --help            Show this help message");
}
