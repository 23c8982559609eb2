#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use chrono::{TimeZone, Utc};
use electricity_backend::entities::{electricity_prices, prelude::ElectricityPrices};
use electricity_backend::models::price_table::PriceTable;
use electricity_backend::services::price_fetcher::PriceSource;
use electricity_backend::AppState;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, Set};
use sea_orm_migration::MigratorTrait;

/// Set up a fresh in-memory SQLite database with the schema applied.
/// A single pooled connection keeps every query on the same memory database.
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;

    Ok(db)
}

/// Price source that hands out a fixed table
pub struct StaticSource(pub Option<PriceTable>);

#[async_trait]
impl PriceSource for StaticSource {
    async fn fetch(&self) -> Option<PriceTable> {
        self.0.clone()
    }
}

pub fn table(headers: &[&str], rows: &[&[&str]]) -> PriceTable {
    PriceTable::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

/// `n` well-formed VIC rows, half an hour apart
pub fn vic_table(n: usize) -> PriceTable {
    let rows = (0..n)
        .map(|i| {
            let ts = Utc.with_ymd_and_hms(2025, 6, 24, 0, 0, 0).unwrap()
                + chrono::Duration::minutes(30 * i as i64);
            vec![
                "VIC".to_string(),
                format!("{:.2}", 50.0 + (i % 100) as f64),
                ts.to_rfc3339(),
            ]
        })
        .collect();

    PriceTable::new(
        vec!["state".to_string(), "price".to_string(), "timestamp".to_string()],
        rows,
    )
}

pub async fn seed(db: &DatabaseConnection, state: &str, prices: &[f64]) {
    let start = Utc.with_ymd_and_hms(2025, 6, 24, 0, 0, 0).unwrap();
    let models = prices.iter().enumerate().map(|(i, price)| electricity_prices::ActiveModel {
        state: Set(state.to_string()),
        price: Set(Some(*price)),
        timestamp: Set(Some(start + chrono::Duration::minutes(30 * i as i64))),
        ..Default::default()
    });

    ElectricityPrices::insert_many(models)
        .exec_without_returning(db)
        .await
        .expect("Failed to seed prices");
}

pub async fn row_count(db: &DatabaseConnection) -> u64 {
    ElectricityPrices::find()
        .count(db)
        .await
        .expect("Failed to count rows")
}

pub fn build_router(db: DatabaseConnection, source: Option<PriceTable>) -> Router {
    electricity_backend::app(AppState {
        db,
        price_source: Arc::new(StaticSource(source)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_setup_test_db() {
        let db = setup_test_db().await;
        assert!(db.is_ok(), "Test database connection should succeed");
        assert_eq!(row_count(&db.unwrap()).await, 0);
    }
}
