use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::log::{CreateLog, Log, LogDetail, LogError, LogQuery};
use db::models::pagination::Paginated;
use serde::Deserialize;
use tracing::instrument;
use utils::response::ApiResponse;

use crate::{error::ApiError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/logs", get(list_logs).post(create_log))
        .route("/logs/{log_id}", get(get_log))
        .route("/logs/{log_id}/runs", post(link_run_to_log))
}

/// The body required for a run to be linked to a log.
#[derive(Debug, Deserialize)]
pub struct LinkRunToLog {
    pub run_number: i64,
}

/// GET /api/logs - Filtered, paginated listing. Owning users are populated;
/// runs are not (fetch the single log for those).
#[instrument(name = "logs.list", skip(state, query))]
pub async fn list_logs(
    State(state): State<AppState>,
    Query(mut query): Query<LogQuery>,
) -> Result<ResponseJson<ApiResponse<Paginated<Log>>>, ApiError> {
    if let Some(size) = query.page_size {
        query.page_size = Some(size.clamp(1, state.config.max_page_size));
    }
    let page = Log::list(state.pool(), &query).await?;
    Ok(ResponseJson(ApiResponse::success(page)))
}

/// POST /api/logs - Create a log entry, optionally linking a run and carrying
/// attachments.
#[instrument(name = "logs.create", skip(state, payload))]
pub async fn create_log(
    State(state): State<AppState>,
    Json(payload): Json<CreateLog>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<LogDetail>>), ApiError> {
    let log = Log::create(state.pool(), &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(log))))
}

/// GET /api/logs/{log_id} - Single log with runs, attachments, and user.
#[instrument(name = "logs.get", skip(state), fields(log_id = %log_id))]
pub async fn get_log(
    State(state): State<AppState>,
    Path(log_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<LogDetail>>, ApiError> {
    let detail = Log::find_by_id(state.pool(), log_id)
        .await?
        .ok_or(LogError::LogNotFound(log_id))?;
    Ok(ResponseJson(ApiResponse::success(detail)))
}

/// POST /api/logs/{log_id}/runs - Link a run to an existing log.
#[instrument(name = "logs.link_run", skip(state, payload), fields(log_id = %log_id))]
pub async fn link_run_to_log(
    State(state): State<AppState>,
    Path(log_id): Path<i64>,
    Json(payload): Json<LinkRunToLog>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    Log::link_run(state.pool(), log_id, payload.run_number).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}
