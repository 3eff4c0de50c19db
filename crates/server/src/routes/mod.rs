use axum::{Json, Router, http::Request, routing::get};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultOnFailure, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod logs;
pub mod runs;
pub mod tags;
pub mod users;

pub fn router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
            )
        })
        .on_response(DefaultOnResponse::new().level(Level::INFO))
        .on_failure(DefaultOnFailure::new().level(Level::ERROR));

    let api = Router::<AppState>::new()
        .route("/health", get(health))
        .merge(logs::router())
        .merge(runs::router())
        .merge(tags::router())
        .merge(users::router());

    Router::<AppState>::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(trace_layer)
        .with_state(state)
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
