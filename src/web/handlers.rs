use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, Query, RawQuery, State},
    http::{header, Response, StatusCode},
    response::{Html, Redirect},
    Json,
};
use serde::Serialize;
use tracing::info;

use super::{page, AppError, AppState, MAX_UPLOAD_SIZE};
use crate::export::{to_csv, to_xlsx, DOWNLOAD_NAME, XLSX_MIME};
use crate::filter::{parse_day, Filter};
use crate::forecast::{self, Forecast};
use crate::loader::load_bytes;
use crate::models::Transaction;
use crate::reports::{self, Insights, Summary};

/// Query string pairs. Repeated `category` keys select several categories;
/// `cats=1` marks the category selection as explicit so that none checked
/// selects nothing.
pub type Pairs = Vec<(String, String)>;

pub(super) fn parse_filter(pairs: &[(String, String)]) -> Result<Filter, AppError> {
    let mut filter = Filter::default();
    let mut selected: Vec<String> = Vec::new();
    let mut explicit = false;
    for (key, value) in pairs {
        let value = value.trim();
        match key.as_str() {
            "category" => {
                explicit = true;
                selected.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string),
                );
            }
            "cats" => explicit = true,
            "from" if !value.is_empty() => {
                filter.from = Some(parse_day(value).map_err(|e| AppError::bad_request(&e.to_string()))?)
            }
            "to" if !value.is_empty() => {
                filter.to = Some(parse_day(value).map_err(|e| AppError::bad_request(&e.to_string()))?)
            }
            "q" if !value.is_empty() => filter.search = Some(value.to_string()),
            _ => {}
        }
    }
    if explicit {
        filter.categories = Some(selected);
    }
    Ok(filter)
}

/// GET / - dashboard page
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Pairs>,
    RawQuery(raw): RawQuery,
) -> Result<Html<String>, AppError> {
    let filter = parse_filter(&pairs)?;
    let guard = state.dataset();
    let html = match guard.as_ref() {
        Some(dataset) => page::render(
            &state.settings,
            dataset,
            &filter.with_default_range(dataset),
            raw.as_deref(),
        ),
        None => page::render_empty(),
    };
    Ok(Html(html))
}

/// POST /upload - replace the dataset with an uploaded CSV/XLSX file
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload.csv").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::bad_request("Failed to read file data"))?;
        if bytes.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::bad_request(&format!(
                "File too large. Maximum size is {} MB",
                MAX_UPLOAD_SIZE / 1024 / 1024
            )));
        }
        file = Some((name, bytes.to_vec()));
    }

    let (name, bytes) = file.ok_or_else(|| AppError::bad_request("Missing file field"))?;
    if bytes.is_empty() {
        return Err(AppError::bad_request("Uploaded file is empty"));
    }
    let (dataset, stats) = load_bytes(&name, &bytes)?;
    info!(
        file = %name,
        rows = stats.rows,
        bad_dates = stats.bad_dates,
        bad_amounts = stats.bad_amounts,
        "Statement uploaded"
    );
    state.replace_dataset(dataset);
    Ok(Redirect::to("/"))
}

fn filtered_export(
    state: &AppState,
    pairs: &[(String, String)],
    write: fn(&[String], &[&Transaction]) -> crate::error::Result<Vec<u8>>,
) -> Result<Vec<u8>, AppError> {
    let filter = parse_filter(pairs)?;
    let guard = state.dataset();
    let dataset = guard.as_ref().ok_or_else(AppError::no_data)?;
    let rows = filter.with_default_range(dataset).apply(dataset);
    Ok(write(&dataset.export_columns(), &rows)?)
}

fn attachment(bytes: Vec<u8>, content_type: &str, file_name: &str) -> Result<Response<Body>, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        )
        .body(Body::from(bytes))
        .map_err(|e| AppError::from(crate::error::FintrackError::Other(e.to_string())))
}

/// GET /export.xlsx - filtered view as a workbook
pub async fn export_xlsx(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Pairs>,
) -> Result<Response<Body>, AppError> {
    let bytes = filtered_export(&state, &pairs, to_xlsx)?;
    attachment(bytes, XLSX_MIME, DOWNLOAD_NAME)
}

/// GET /export.csv - filtered view as CSV
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Pairs>,
) -> Result<Response<Body>, AppError> {
    let bytes = filtered_export(&state, &pairs, to_csv)?;
    attachment(bytes, "text/csv; charset=utf-8", "filtered_data.csv")
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub source: String,
    pub summary: Summary,
    pub insights: Insights,
    pub categories: Vec<reports::CategoryTotal>,
    pub monthly: Vec<reports::MonthTotal>,
}

/// GET /api/summary
pub async fn api_summary(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Pairs>,
) -> Result<Json<SummaryResponse>, AppError> {
    let filter = parse_filter(&pairs)?;
    let guard = state.dataset();
    let dataset = guard.as_ref().ok_or_else(AppError::no_data)?;
    let rows = filter.with_default_range(dataset).apply(dataset);
    Ok(Json(SummaryResponse {
        source: dataset.source.clone(),
        summary: reports::summary(&rows),
        insights: reports::insights(&rows, state.settings.low_savings_threshold),
        categories: reports::category_breakdown(&rows),
        monthly: reports::monthly_trend(&rows),
    }))
}

/// GET /api/transactions
pub async fn api_transactions(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Pairs>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let filter = parse_filter(&pairs)?;
    let guard = state.dataset();
    let dataset = guard.as_ref().ok_or_else(AppError::no_data)?;
    let rows = filter.with_default_range(dataset).apply(dataset);
    Ok(Json(rows.into_iter().cloned().collect()))
}

/// GET /api/forecast
pub async fn api_forecast(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Pairs>,
) -> Result<Json<Forecast>, AppError> {
    let filter = parse_filter(&pairs)?;
    let guard = state.dataset();
    let dataset = guard.as_ref().ok_or_else(AppError::no_data)?;
    let rows = filter.with_default_range(dataset).apply(dataset);
    Ok(Json(forecast::forecast(&rows)))
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}
