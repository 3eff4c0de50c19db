use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
};
use db::models::{log::LogError, run::RunError, tag::TagError, user::UserError};
use thiserror::Error;
use utils::response::ApiResponse;

/// Request-scoped error. Reference lookups that name a missing entity map to
/// 404 with the offending identifier in the message; storage faults map to a
/// generic 500 and are logged server-side only.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Log(#[from] LogError),
    #[error(transparent)]
    Run(#[from] RunError),
    #[error(transparent)]
    Tag(#[from] TagError),
    #[error(transparent)]
    User(#[from] UserError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Log(LogError::LogNotFound(_) | LogError::RunNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Log(LogError::InvalidOrderBy(_)) => StatusCode::BAD_REQUEST,
            ApiError::Run(RunError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Run(RunError::AlreadyExists(_)) => StatusCode::CONFLICT,
            ApiError::Tag(TagError::TagNotFound(_) | TagError::RunNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::User(UserError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Log(LogError::Database(_))
            | ApiError::Run(RunError::Database(_))
            | ApiError::Tag(TagError::Database(_))
            | ApiError::User(UserError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, ResponseJson(ApiResponse::<()>::error(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_not_found_maps_to_404() {
        let response = ApiError::from(LogError::RunNotFound(42)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::from(LogError::LogNotFound(7)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::from(TagError::TagNotFound(3)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_order_by_maps_to_400() {
        let response = ApiError::from(LogError::InvalidOrderBy("nope".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_duplicate_run_maps_to_409() {
        let response = ApiError::from(RunError::AlreadyExists(42)).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_storage_fault_maps_to_500() {
        let response = ApiError::from(LogError::Database(sqlx::Error::RowNotFound)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
