//! Persistence for electricity price records.
//!
//! Ingest validates the whole batch before opening a transaction, then
//! inserts in chunks so a single statement stays bounded. Either every row
//! lands or none do.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};

use crate::entities::{electricity_prices, prelude::ElectricityPrices};
use crate::models::price_table::PriceTable;

pub const REQUIRED_COLUMNS: [&str; 3] = ["state", "price", "timestamp"];
pub const INSERT_BATCH_SIZE: usize = 1_000;
pub const MAX_STATE_LEN: usize = 3;

const OFFSET_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];

const NAIVE_TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("No electricity data received.")]
    EmptyBatch,
    #[error("Column '{column}' not in required fields: {required:?}")]
    MissingColumn {
        column: &'static str,
        required: [&'static str; 3],
    },
    #[error("Row {row}: state '{value}' must be 1 to 3 characters")]
    InvalidState { row: usize, value: String },
    #[error("Row {row}: price '{value}' is not a valid number")]
    InvalidPrice { row: usize, value: String },
    #[error("Row {row}: timestamp '{value}' is not a recognised date-time")]
    InvalidTimestamp { row: usize, value: String },
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl IngestError {
    /// True when the batch itself is at fault, as opposed to storage
    pub fn is_validation(&self) -> bool {
        !matches!(self, IngestError::Database(_))
    }
}

/// A validated row ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub state: String,
    pub price: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<PriceRecord> for electricity_prices::ActiveModel {
    fn from(record: PriceRecord) -> Self {
        electricity_prices::ActiveModel {
            state: Set(record.state),
            price: Set(record.price),
            timestamp: Set(record.timestamp),
            ..Default::default()
        }
    }
}

/// Validate and persist every row of `table` in one transaction.
///
/// Returns the number of rows inserted.
pub async fn ingest(db: &DatabaseConnection, table: &PriceTable) -> Result<usize, IngestError> {
    let records = build_records(table)?;
    let total = records.len();

    let txn = db.begin().await?;

    for (batch_idx, chunk) in records.chunks(INSERT_BATCH_SIZE).enumerate() {
        let models = chunk
            .iter()
            .cloned()
            .map(electricity_prices::ActiveModel::from);

        let inserted = ElectricityPrices::insert_many(models)
            .exec_without_returning(&txn)
            .await?;

        tracing::debug!(
            "Inserted batch {} ({} rows, {}/{} prepared)",
            batch_idx + 1,
            inserted,
            batch_idx * INSERT_BATCH_SIZE + chunk.len(),
            total
        );
    }

    txn.commit().await?;

    tracing::info!("Stored {} electricity price records", total);
    Ok(total)
}

/// Delete every stored record, returning how many were removed
pub async fn delete_all(db: &DatabaseConnection) -> Result<u64, DbErr> {
    let txn = db.begin().await?;
    let result = ElectricityPrices::delete_many().exec(&txn).await?;
    txn.commit().await?;

    Ok(result.rows_affected)
}

/// Prices recorded for `state`, matched case-insensitively, in insertion
/// order. Unpriced rows are skipped; `None` when nothing matches.
pub async fn prices_for_state(
    db: &DatabaseConnection,
    state: &str,
) -> Result<Option<Vec<f64>>, DbErr> {
    let prices: Vec<f64> = ElectricityPrices::find()
        .select_only()
        .column(electricity_prices::Column::Price)
        .filter(
            Expr::expr(Func::lower(Expr::col(electricity_prices::Column::State)))
                .eq(state.to_lowercase()),
        )
        .filter(electricity_prices::Column::Price.is_not_null())
        .order_by_asc(electricity_prices::Column::Id)
        .into_tuple()
        .all(db)
        .await?;

    if prices.is_empty() {
        Ok(None)
    } else {
        Ok(Some(prices))
    }
}

/// Validate the header and convert each row. Row numbers in errors are
/// 1-based and count data rows only.
pub fn build_records(table: &PriceTable) -> Result<Vec<PriceRecord>, IngestError> {
    if table.is_empty() {
        return Err(IngestError::EmptyBatch);
    }

    let mut positions = [0usize; 3];
    for (slot, column) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = table
            .column_index(column)
            .ok_or(IngestError::MissingColumn {
                column,
                required: REQUIRED_COLUMNS,
            })?;
    }
    let [state_idx, price_idx, timestamp_idx] = positions;

    table
        .rows()
        .iter()
        .enumerate()
        .map(|(idx, row)| -> Result<PriceRecord, IngestError> {
            let row_no = idx + 1;
            let cell = |i: usize| row.get(i).map(|s| s.trim()).unwrap_or("");

            Ok(PriceRecord {
                state: parse_state(row_no, cell(state_idx))?,
                price: parse_price(row_no, cell(price_idx))?,
                timestamp: parse_timestamp(row_no, cell(timestamp_idx))?,
            })
        })
        .collect()
}

fn parse_state(row: usize, value: &str) -> Result<String, IngestError> {
    let len = value.chars().count();
    if len == 0 || len > MAX_STATE_LEN {
        return Err(IngestError::InvalidState {
            row,
            value: value.to_string(),
        });
    }
    Ok(value.to_string())
}

fn parse_price(row: usize, value: &str) -> Result<Option<f64>, IngestError> {
    if value.is_empty() {
        return Ok(None);
    }

    match value.parse::<f64>() {
        Ok(price) if price.is_finite() => Ok(Some(price)),
        _ => Err(IngestError::InvalidPrice {
            row,
            value: value.to_string(),
        }),
    }
}

fn parse_timestamp(row: usize, value: &str) -> Result<Option<DateTime<Utc>>, IngestError> {
    if value.is_empty() {
        return Ok(None);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    if let Some(ts) = OFFSET_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
    {
        return Ok(Some(ts.with_timezone(&Utc)));
    }

    // Naive values are UTC; a bare date is midnight
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| IngestError::InvalidTimestamp {
            row,
            value: value.to_string(),
        })
}
