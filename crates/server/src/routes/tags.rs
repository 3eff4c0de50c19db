use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::tag::{CreateTag, Tag, TagDetail, TagError};
use serde::Deserialize;
use tracing::instrument;
use utils::response::ApiResponse;

use crate::{error::ApiError, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/{tag_id}", get(get_tag))
        .route("/tags/{tag_id}/runs", post(link_run_to_tag))
}

/// The body required for a run to be linked to a tag.
#[derive(Debug, Deserialize)]
pub struct LinkRunToTag {
    pub run_number: i64,
}

/// GET /api/tags - All tags, sorted by text.
#[instrument(name = "tags.list", skip(state))]
pub async fn list_tags(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Tag>>>, ApiError> {
    let tags = Tag::list(state.pool()).await?;
    Ok(ResponseJson(ApiResponse::success(tags)))
}

/// POST /api/tags - Create a tag.
#[instrument(name = "tags.create", skip(state, payload))]
pub async fn create_tag(
    State(state): State<AppState>,
    Json(payload): Json<CreateTag>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Tag>>), ApiError> {
    let tag = Tag::create(state.pool(), &payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(tag))))
}

/// GET /api/tags/{tag_id} - Single tag with its runs populated.
#[instrument(name = "tags.get", skip(state), fields(tag_id = %tag_id))]
pub async fn get_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<TagDetail>>, ApiError> {
    let detail = Tag::find_by_id(state.pool(), tag_id)
        .await?
        .ok_or(TagError::TagNotFound(tag_id))?;
    Ok(ResponseJson(ApiResponse::success(detail)))
}

/// POST /api/tags/{tag_id}/runs - Link a run to an existing tag.
#[instrument(name = "tags.link_run", skip(state, payload), fields(tag_id = %tag_id))]
pub async fn link_run_to_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<i64>,
    Json(payload): Json<LinkRunToTag>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    Tag::link_run(state.pool(), tag_id, payload.run_number).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}
