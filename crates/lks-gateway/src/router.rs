use axum::{
    Router, extract::DefaultBodyLimit, http::StatusCode, middleware, response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::{middleware::request_id_middleware, state::ApiState, user};

/// Bare application routes, without middleware.
pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .merge(user::routes())
        .fallback(handler_404)
}

/// Application routes with request IDs, access logging and the upload body limit.
pub fn app(state: ApiState, max_upload_bytes: usize) -> Router {
    router()
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}
