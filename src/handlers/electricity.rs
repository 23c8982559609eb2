use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::models::electricity::{DeleteResponse, ErrorResponse, MessageResponse};
use crate::services::{electricity_db, price_utils};
use crate::AppState;

type HandlerError = (StatusCode, Json<ErrorResponse>);

/// Log the failure under a fresh reference id and hand the client only the id
fn internal_error(context: &str, err: impl std::fmt::Display) -> HandlerError {
    let reference = Uuid::new_v4();
    tracing::error!(%reference, "{}: {}", context, err);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("Internal server error (ref: {}).", reference),
        }),
    )
}

fn not_found(message: String) -> HandlerError {
    (StatusCode::NOT_FOUND, Json(ErrorResponse { error: message }))
}

pub async fn hello() -> &'static str {
    "Hello from Electricity Backend!"
}

/// Handler for GET /get_data
/// Fetches the configured CSV and stores every row
pub async fn get_data(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<MessageResponse>), HandlerError> {
    let Some(table) = state.price_source.fetch().await else {
        tracing::warn!("No electricity data available from source");
        return Err(not_found(
            "No electricity data available from source.".to_string(),
        ));
    };

    match electricity_db::ingest(&state.db, &table).await {
        Ok(inserted) => Ok((
            StatusCode::CREATED,
            Json(MessageResponse {
                response: format!("Electricity data saved. Inserted {} rows.", inserted),
            }),
        )),
        Err(e) if e.is_validation() => {
            tracing::warn!("Rejected electricity data: {}", e);
            Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
        Err(e) => Err(internal_error("Failed to store electricity data", e)),
    }
}

/// Handler for DELETE /delete_data
pub async fn delete_data(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<DeleteResponse>), HandlerError> {
    let deleted = electricity_db::delete_all(&state.db)
        .await
        .map_err(|e| internal_error("Failed to delete electricity data", e))?;

    tracing::info!("Deleted {} electricity price records", deleted);

    let body = if deleted > 0 {
        DeleteResponse::Deleted {
            error: format!("Deleted {}.", deleted),
        }
    } else {
        DeleteResponse::Nothing {
            response: "No electricity data to delete.".to_string(),
        }
    };

    Ok((StatusCode::OK, Json(body)))
}

/// Handler for GET /get_mean/{state}
pub async fn get_mean(
    State(state): State<AppState>,
    Path(state_code): Path<String>,
) -> Result<(StatusCode, Json<MessageResponse>), HandlerError> {
    let prices = electricity_db::prices_for_state(&state.db, &state_code)
        .await
        .map_err(|e| internal_error("Failed to query electricity data", e))?;

    let no_data = || not_found(format!("No electricity data found for state '{}'.", state_code));

    let prices = prices.ok_or_else(no_data)?;
    let mean = price_utils::mean_price(&prices).ok_or_else(no_data)?;

    tracing::debug!(
        "Mean price for {} over {} records: {:.2}",
        state_code,
        prices.len(),
        mean
    );

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            response: format!("State: {} | Mean price: ${:.2}.", state_code, mean),
        }),
    ))
}
