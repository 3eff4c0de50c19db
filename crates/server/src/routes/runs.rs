use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::pagination::Paginated;
use db::models::run::{CreateRun, Run, RunError, RunQuery};
use tracing::instrument;
use utils::response::ApiResponse;

use crate::{error::ApiError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/runs", get(list_runs).post(create_run))
        .route("/runs/{run_number}", get(get_run))
}

/// GET /api/runs - Paginated run listing ordered by run number.
#[instrument(name = "runs.list", skip(state, query))]
pub async fn list_runs(
    State(state): State<AppState>,
    Query(mut query): Query<RunQuery>,
) -> Result<ResponseJson<ApiResponse<Paginated<Run>>>, ApiError> {
    if let Some(size) = query.page_size {
        query.page_size = Some(size.clamp(1, state.config.max_page_size));
    }
    let page = Run::list(state.pool(), &query).await?;
    Ok(ResponseJson(ApiResponse::success(page)))
}

/// POST /api/runs - Register a run under its externally assigned number.
#[instrument(name = "runs.create", skip(state, payload))]
pub async fn create_run(
    State(state): State<AppState>,
    Json(payload): Json<CreateRun>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Run>>), ApiError> {
    let run = Run::create(state.pool(), &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(run))))
}

/// GET /api/runs/{run_number} - Single run.
#[instrument(name = "runs.get", skip(state), fields(run_number = %run_number))]
pub async fn get_run(
    State(state): State<AppState>,
    Path(run_number): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Run>>, ApiError> {
    let run = Run::find_by_number(state.pool(), run_number)
        .await?
        .ok_or(RunError::NotFound(run_number))?;
    Ok(ResponseJson(ApiResponse::success(run)))
}
