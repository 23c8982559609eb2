// src/bin/import_electricity_prices.rs

use std::env;
use std::fs::File;

use electricity_backend::models::price_table::PriceTable;
use electricity_backend::services::electricity_db;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Usage: cargo run --bin import_electricity_prices -- prices.csv
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <prices.csv>", args[0]);
        std::process::exit(1);
    }

    let file_path = &args[1];
    let database_url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;

    let db = Database::connect(&database_url).await?;
    migration::Migrator::up(&db, None).await?;

    println!("Parsing {}...", file_path);
    let table = PriceTable::from_csv_reader(File::open(file_path)?)?;
    println!("Found {} rows", table.len());

    println!("Importing to database...");
    let inserted = electricity_db::ingest(&db, &table).await?;

    println!("\nImport complete!");
    println!("   Imported: {}", inserted);

    Ok(())
}
