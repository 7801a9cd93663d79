//! # Seed Data Generator
//!
//! Fills an empty shop database with a small, realistic catalogue so the
//! API and the browser UI have something to show during development.
//!
//! ## Usage
//! ```bash
//! # Seed ./tally_dev.db
//! cargo run -p tally-db --bin seed
//!
//! # Specify database path
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db
//! ```
//!
//! ## Generated Products
//! - Unit goods (bread, eggs, soap) counted in whole pieces
//! - Weight goods (cheese, apples) with fractional kilograms on the shelf
//! - Volume goods (milk, oil) with fractional litres on the shelf
//!
//! A few products start at or below their minimum stock so the dashboard's
//! low-stock list is populated.

use std::env;
use tally_core::{NewProduct, Quantity, UnitType};
use tally_db::{Database, DbConfig};

/// (name, unit type, cost cents, selling cents, stock milli-units, min stock milli-units)
const CATALOGUE: &[(&str, UnitType, i64, i64, i64, i64)] = &[
    ("Rye Bread", UnitType::Unit, 150, 250, 24_000, 5_000),
    ("White Bread", UnitType::Unit, 120, 199, 18_000, 5_000),
    ("Eggs (10 pack)", UnitType::Unit, 210, 329, 30_000, 6_000),
    ("Butter 200g", UnitType::Unit, 180, 289, 3_000, 4_000),
    ("Hand Soap", UnitType::Unit, 95, 175, 12_000, 2_000),
    ("Matches", UnitType::Unit, 20, 45, 50_000, 10_000),
    ("Gouda Cheese", UnitType::Weight, 820, 1_190, 4_750, 1_000),
    ("Apples", UnitType::Weight, 110, 189, 35_500, 5_000),
    ("Potatoes", UnitType::Weight, 45, 79, 60_000, 10_000),
    ("Sugar", UnitType::Weight, 70, 109, 800, 2_000),
    ("Whole Milk", UnitType::Volume, 80, 129, 20_000, 5_000),
    ("Sunflower Oil", UnitType::Volume, 190, 279, 7_500, 2_000),
    ("Kefir", UnitType::Volume, 95, 149, 1_500, 2_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./tally_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
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
                println!("  -d, --db <PATH>    Database file path (default: ./tally_dev.db)");
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

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Creating products...");

    let mut created = 0;
    for &(name, unit_type, cost, price, stock, min_stock) in CATALOGUE {
        let input = NewProduct {
            name: name.to_string(),
            unit_type,
            cost_price_cents: cost,
            selling_price_cents: price,
            quantity: Quantity::from_milli(stock),
            min_stock: Quantity::from_milli(min_stock),
        };

        match db.products().create(&input).await {
            Ok(product) => {
                created += 1;
                println!(
                    "  #{:<3} {:<16} {:>7} {:<6} @ {}",
                    product.id,
                    product.name,
                    product.quantity,
                    product.unit_type,
                    product.selling_price()
                );
            }
            Err(e) => eprintln!("Failed to create {}: {}", name, e),
        }
    }

    let stats = db.reports().dashboard(&chrono::Local::now()).await?;

    println!();
    println!("✓ Created {} products", created);
    println!("  Low stock: {}", stats.low_stock_count);
    println!("  Stock value: {}", tally_core::Money::from_cents(stats.stock_value));
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
