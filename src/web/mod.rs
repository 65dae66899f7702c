//! Browser dashboard.
//!
//! One local user, one loaded statement. Every request filters the current
//! dataset from scratch; an upload replaces the dataset wholesale.

mod handlers;
mod page;


use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::categorizer::{categorize_dataset, CategoryTable};
use crate::error::FintrackError;
use crate::loader::{load_path, resolve_source, NO_DATA_MESSAGE};
use crate::models::Dataset;
use crate::settings::Settings;

/// Maximum upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Shared application state
pub struct AppState {
    pub settings: Settings,
    pub table: CategoryTable,
    /// Currently loaded statement, `None` until a file is available.
    dataset: RwLock<Option<Dataset>>,
}

impl AppState {
    pub fn new(settings: Settings, dataset: Option<Dataset>) -> Self {
        let table = settings.category_table();
        let dataset = dataset.map(|mut ds| {
            categorize_dataset(&mut ds, &table);
            ds
        });
        Self {
            settings,
            table,
            dataset: RwLock::new(dataset),
        }
    }

    /// Load the startup dataset. A missing fallback file is not an error:
    /// the dashboard asks for an upload instead.
    pub fn load(settings: Settings, file: Option<&Path>) -> Result<Self, FintrackError> {
        let dataset = match resolve_source(file, &settings) {
            Ok(path) => Some(load_path(&path)?.0),
            Err(FintrackError::NoData(msg)) if file.is_none() => {
                warn!("{msg}");
                None
            }
            Err(e) => return Err(e),
        };
        Ok(Self::new(settings, dataset))
    }

    pub fn dataset(&self) -> RwLockReadGuard<'_, Option<Dataset>> {
        self.dataset.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn replace_dataset(&self, mut dataset: Dataset) {
        categorize_dataset(&mut dataset, &self.table);
        let mut guard = self
            .dataset
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(dataset);
    }
}

pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);
    let api_routes = Router::new()
        .route("/summary", get(handlers::api_summary))
        .route("/transactions", get(handlers::api_transactions))
        .route("/forecast", get(handlers::api_forecast));

    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/upload", post(handlers::upload))
        .route("/export.xlsx", get(handlers::export_xlsx))
        .route("/export.csv", get(handlers::export_csv))
        .route("/health", get(handlers::health))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 64 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState, host: &str, port: u16) -> Result<(), FintrackError> {
    let app = create_router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Dashboard listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// API error carrying a status code and a user-facing message.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn no_data() -> Self {
        Self::not_found(NO_DATA_MESSAGE)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }
        let body = Json(serde_json::json!({
            "error": self.message
        }));
        (self.status, body).into_response()
    }
}

impl From<FintrackError> for AppError {
    fn from(err: FintrackError) -> Self {
        if err.is_input_error() {
            return Self::bad_request(&err.to_string());
        }
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error".to_string(),
            internal: Some(err.into()),
        }
    }
}
