//! # booklist-server
//!
//! HTTP endpoint persisting the booklist ledger to a JSON file.

mod error;
mod store;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use booklist_ledger::{LedgerDocument, SaveResponse};
use clap::Parser;
use error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use store::FileStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// booklist-server - serve the ordering ledger over HTTP
#[derive(Parser, Debug)]
#[command(name = "booklist-server")]
#[command(author, version, about = "JSON endpoint for the bookstore ordering ledger", long_about = None)]
struct Config {
    /// JSON file holding the ledger (created on first read)
    #[arg(long, env = "BOOKLIST_DATA_FILE", default_value = "./data/data.json")]
    data_file: PathBuf,

    /// Address to listen on
    #[arg(long, env = "BOOKLIST_ADDR", default_value = "0.0.0.0:3000")]
    addr: String,
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    store: Arc<FileStore>,
}

impl AppState {
    pub fn new(store: FileStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Health check response.
#[derive(Serialize, Deserialize)]
pub struct Health {
    /// Server status ("ok" when healthy).
    pub status: String,
    /// Server version from Cargo.toml.
    pub version: String,
}

/// Health check endpoint handler.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/data`: the whole ledger.
async fn get_data(State(state): State<AppState>) -> Result<Json<LedgerDocument>, ApiError> {
    let document = state
        .store
        .load()
        .await
        .map_err(|e| ApiError::storage("Lỗi đọc dữ liệu", e))?;
    Ok(Json(document))
}

/// `POST /api/data`: overwrite the ledger.
async fn save_data(
    State(state): State<AppState>,
    payload: Result<Json<LedgerDocument>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    let Json(document) = payload?;
    state
        .store
        .replace(document)
        .await
        .map_err(|e| ApiError::storage("Lỗi lưu dữ liệu", e))?;
    Ok(Json(SaveResponse::ok("Dữ liệu đã được lưu thành công!")))
}

/// `POST /api/data/row`: merge the posted ledger into the stored one.
async fn save_row(
    State(state): State<AppState>,
    payload: Result<Json<LedgerDocument>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    let Json(document) = payload?;
    state
        .store
        .merge_row(document)
        .await
        .map_err(|e| ApiError::storage("Lỗi lưu dòng", e))?;
    Ok(Json(SaveResponse::ok("Dòng đã được lưu thành công!")))
}

/// `POST /api/data/import`: append the posted books.
async fn import_books(
    State(state): State<AppState>,
    payload: Result<Json<LedgerDocument>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    let Json(document) = payload?;
    let count = state
        .store
        .import(document)
        .await
        .map_err(|e| ApiError::storage("Lỗi lưu dữ liệu import", e))?;
    tracing::info!(count, "books imported");
    Ok(Json(SaveResponse::ok(format!("Import thành công {count} sách!"))))
}

/// Create the application router.
///
/// This is separated from `main()` to allow testing.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/data", get(get_data).post(save_data))
        .route("/api/data/row", post(save_row))
        .route("/api/data/import", post(import_books))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store = FileStore::new(&config.data_file);
    // Create the data file up front so a bad path fails at startup.
    store.load().await?;

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    tracing::info!(
        addr = %config.addr,
        data_file = %store.path().display(),
        "booklist-server listening"
    );

    let app = create_router(AppState::new(store));
    axum::serve(listener, app).await?;

    Ok(())
}
