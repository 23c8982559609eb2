// src/lib.rs

use std::sync::Arc;

use axum::{
    routing::{delete, get},
    Router,
};
use sea_orm::DatabaseConnection;
use services::price_fetcher::PriceSource;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub price_source: Arc<dyn PriceSource>,
}

pub mod entities {
    pub mod prelude;
    pub mod electricity_prices;
}

pub mod services {
    pub mod electricity_db;
    pub mod price_fetcher;
    pub mod price_utils;
}

pub mod config;
pub mod models;
pub mod handlers;

/// Build the HTTP router over `state`
pub fn app(state: AppState) -> Router {
    use handlers::electricity;

    Router::new()
        .route("/", get(electricity::hello))
        .route("/get_data", get(electricity::get_data))
        .route("/delete_data", delete(electricity::delete_data))
        .route("/get_mean/{state}", get(electricity::get_mean))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
