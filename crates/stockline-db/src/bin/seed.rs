//! # Seed Data Generator
//!
//! Fills a database with a demo catalog spread over every location.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by STOCKLINE_DB_PATH (default ./stockline.db)
//! cargo run -p stockline-db --bin seed
//!
//! # Specify database path
//! cargo run -p stockline-db --bin seed -- --db ./data/stockline.db
//! ```
//!
//! ## Generated Products
//! Every catalog entry is stocked at every location. Prices vary a little by
//! location and stock levels cycle between 0 and 60, so some records start
//! empty (and stay, since records are never purged at zero).

use std::env;
use std::time::Instant;

use stockline_core::{Location, NewProduct};
use stockline_db::store::ProductStore;
use stockline_db::{Database, StocklineConfig};
use tracing_subscriber::EnvFilter;

/// (product id, name, base price in cents)
const CATALOG: &[(i64, &str, i64)] = &[
    (1, "Arabica Beans 1kg", 10_000),
    (2, "Espresso Machine", 45_900),
    (3, "Milk Frother", 4_990),
    (4, "Burr Grinder", 12_900),
    (5, "Pour-Over Kettle", 5_490),
    (6, "Paper Filters x100", 390),
    (7, "Ceramic Mug", 1_290),
    (8, "Descaler 500ml", 890),
    (9, "Tamper 58mm", 2_490),
    (10, "Cold Brew Jar", 2_990),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut config = StocklineConfig::from_env()?;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--db" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "-h" | "--help" => {
                println!("Stockline Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $STOCKLINE_DB_PATH or ./stockline.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Stockline Seed Data Generator");
    println!("=============================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::new(config.db_config()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = {
        let mut conn = db.acquire().await?;
        ProductStore::new(&mut conn).count().await?
    };
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let products = db.products();
    let start = Instant::now();
    let mut generated = 0usize;

    for (seed, (location, (product_id, name, base_price))) in Location::ALL
        .iter()
        .flat_map(|location| CATALOG.iter().map(move |entry| (*location, entry)))
        .enumerate()
    {
        let new = NewProduct {
            product_id: *product_id,
            location,
            name: name.to_string(),
            // up to +4.50 depending on location
            price_cents: base_price + ((seed * 37) % 10) as i64 * 50,
            quantity: ((seed * 13) % 61) as i64,
        };

        if let Err(e) = products.create(new).await {
            eprintln!("Failed to insert {} at {}: {}", product_id, location, e);
            continue;
        }
        generated += 1;
    }

    println!();
    println!("✓ Generated {} products in {:?}", generated, start.elapsed());
    println!(
        "  {} catalog entries × {} locations",
        CATALOG.len(),
        Location::ALL.len()
    );

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockline=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
