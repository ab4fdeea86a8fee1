use std::str::FromStr;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use numfix_core::{
    classify, normalize, parse_submission, BatchRef, BatchResults, BatchSummaryDto,
    CountryProfile, NumberCheckDto,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/countries", get(list_countries))
        .route("/countries/{country}/test/{number}", get(check_number))
        .route("/countries/{country}/numbers", post(submit_numbers))
        .route("/numbers/{batch_ref}", get(batch_stats))
        .route("/numbers/{batch_ref}/download", get(download_results))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn list_countries(State(state): State<AppState>) -> Json<Vec<CountryProfile>> {
    Json(state.registry.profiles().cloned().collect())
}

/// Checks one number in place. Nothing is stored.
async fn check_number(
    State(state): State<AppState>,
    Path((country, number)): Path<(String, String)>,
) -> Result<Json<NumberCheckDto>, ApiError> {
    let record = normalize(&state.registry, &country, &number)?;
    Ok(Json(NumberCheckDto::from(&record)))
}

async fn submit_numbers(
    State(state): State<AppState>,
    Path(country): Path<String>,
    body: Bytes,
) -> Result<Json<BatchSummaryDto>, ApiError> {
    let numbers = parse_submission(body.as_ref())?;
    let batch = classify(&state.registry, &country, &numbers);
    let batch_ref = batch.batch_ref;
    let now_utc = Utc::now().timestamp();

    let stats = state
        .with_store(move |store| store.batches().save_batch(now_utc, &batch))
        .await?;
    info!(
        batch_ref = %batch_ref,
        country = %country,
        total = stats.total_numbers_processed,
        "batch stored"
    );

    Ok(Json(BatchSummaryDto {
        batch_ref,
        stats,
        href: state.server.batch_href(&batch_ref.to_string()),
    }))
}

async fn batch_stats(
    State(state): State<AppState>,
    Path(raw_ref): Path<String>,
) -> Result<Json<BatchSummaryDto>, ApiError> {
    let batch_ref = parse_batch_ref(&raw_ref)?;
    let stats = state
        .with_store(move |store| store.batches().stats_for(&batch_ref))
        .await?;

    Ok(Json(BatchSummaryDto {
        batch_ref,
        stats,
        href: state.server.batch_href(&batch_ref.to_string()),
    }))
}

async fn download_results(
    State(state): State<AppState>,
    Path(raw_ref): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let batch_ref = parse_batch_ref(&raw_ref)?;
    let results: BatchResults = state
        .with_store(move |store| store.batches().results_for(&batch_ref))
        .await?;

    let disposition = format!("attachment; filename={}.json", batch_ref);
    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(results)))
}

fn parse_batch_ref(raw: &str) -> Result<BatchRef, ApiError> {
    BatchRef::from_str(raw.trim()).map_err(|_| ApiError::InvalidBatchRef(raw.to_string()))
}
