use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::log::{Log, LogQuery};
use db::models::pagination::Paginated;
use db::models::user::{CreateUser, User, UserError};
use tracing::instrument;
use utils::response::ApiResponse;

use crate::{error::ApiError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{user_id}", get(get_user))
        .route("/users/{user_id}/logs", get(list_user_logs))
}

/// POST /api/users - Register a user.
#[instrument(name = "users.create", skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUser>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<User>>), ApiError> {
    let user = User::create(state.pool(), &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(user))))
}

/// GET /api/users/{user_id} - Single user.
#[instrument(name = "users.get", skip(state), fields(user_id = %user_id))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let user = User::find_by_id(state.pool(), user_id)
        .await?
        .ok_or(UserError::NotFound(user_id))?;
    Ok(ResponseJson(ApiResponse::success(user)))
}

/// GET /api/users/{user_id}/logs - One user's logs. Only the sort and
/// pagination fields of the descriptor apply here.
#[instrument(name = "users.list_logs", skip(state, query), fields(user_id = %user_id))]
pub async fn list_user_logs(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(mut query): Query<LogQuery>,
) -> Result<ResponseJson<ApiResponse<Paginated<Log>>>, ApiError> {
    if let Some(size) = query.page_size {
        query.page_size = Some(size.clamp(1, state.config.max_page_size));
    }
    let page = Log::list_by_user(state.pool(), user_id, &query).await?;
    Ok(ResponseJson(ApiResponse::success(page)))
}
