//! # Seed Data Generator
//!
//! Populates the database with cashiers, customer cards and stock for
//! development.
//!
//! ## Usage
//! ```bash
//! # Seed ./tally_dev.db (or TALLY_DB_PATH)
//! cargo run -p tally-db --bin seed
//!
//! # Specify database path and product count
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db --count 40
//! ```
//!
//! ## Generated Data
//! - Cashiers `EMP001`..`EMP003`
//! - Customer cards with 0%, 5% and 10% discounts
//! - Stock products `{CATEGORY}-{NAME}-{NNN}` with prices 1.99 to 9.99 and
//!   0 to 100 units on hand

use chrono::Utc;
use std::env;
use tally_core::StockProduct;
use tally_db::{migrations, Database, DbConfig, TallyConfig};

/// Product categories for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "BEV",
        &["Coca-Cola", "Sprite", "Mineral Water", "Orange Juice", "Apple Juice", "Kvass", "Iced Tea"],
    ),
    (
        "SNK",
        &["Potato Chips", "Crackers", "Salted Nuts", "Chocolate Bar", "Waffles", "Sunflower Seeds"],
    ),
    (
        "DRY",
        &["Milk", "Kefir", "Sour Cream", "Cottage Cheese", "Butter", "Hard Cheese"],
    ),
    (
        "GRO",
        &["Buckwheat", "Rice", "Pasta", "Flour", "Sugar", "Sunflower Oil", "Black Tea"],
    ),
];

const CASHIERS: &[(&str, &str)] = &[
    ("EMP001", "Olena Koval"),
    ("EMP002", "Andrii Melnyk"),
    ("EMP003", "Iryna Shevchuk"),
];

const CARDS: &[(&str, &str, i64)] = &[
    ("1000000000001", "Taras Bondar", 0),
    ("1000000000002", "Mariia Lysenko", 5),
    ("1000000000003", "Petro Hnatiuk", 10),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tally_db::init_tracing();

    let config = TallyConfig::load()?;
    let args: Vec<String> = env::args().collect();

    let mut count: usize = usize::MAX;
    let mut db_path = config.db_path.display().to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(usize::MAX);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tally POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Maximum number of stock products (default: all)");
                println!("  -d, --db <PATH>    Database file path (default: $TALLY_DB_PATH or ./tally_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tally POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path).max_connections(config.db_max_connections)).await?;

    println!("✓ Connected to database");

    let (total, applied) = migrations::migration_status(db.pool()).await?;
    println!("✓ Migrations applied ({}/{})", applied, total);

    let existing = db.stock().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} stock products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (employee_id, name) in CASHIERS {
        db.directory().insert_cashier(employee_id, name).await?;
    }
    println!("✓ {} cashiers", CASHIERS.len());

    for (card_number, holder, percent) in CARDS {
        db.directory().insert_card(card_number, holder, *percent).await?;
    }
    println!("✓ {} customer cards", CARDS.len());

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (category_idx, (category_code, names)) in CATEGORIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            if generated >= count {
                break 'outer;
            }

            let product = generate_product(category_code, name, category_idx * 100 + name_idx);

            if let Err(e) = db.stock().insert(&product).await {
                eprintln!("Failed to insert {}: {}", product.product_id, e);
                continue;
            }

            generated += 1;
        }
    }

    println!("✓ Generated {} stock products in {:?}", generated, start.elapsed());
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single stock product with deterministic data.
fn generate_product(category: &str, name: &str, seed: usize) -> StockProduct {
    let now = Utc::now();

    // {CAT}-{ABC}-{NNN}: 11 characters, inside the 12-character limit
    let short: String = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(3)
        .collect::<String>()
        .to_uppercase();
    let product_id = format!("{}-{}-{:03}", category, short, seed % 1000);

    StockProduct {
        product_id,
        product_name: name.to_string(),
        selling_price_cents: 199 + ((seed * 17) % 800) as i64,
        products_number: (seed % 101) as i64,
        created_at: now,
        updated_at: now,
    }
}
