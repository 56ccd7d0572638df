//! API routes.

pub mod admin;
pub mod comments;
pub mod contact;
pub mod health;
pub mod newsletter;
mod pipeline;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Router,
};
use site_core::{limits::MAX_BODY_SIZE_BYTES, Error};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::security_headers::security_headers;
use crate::response::ApiError;
use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/comments",
            post(comments::submit_comment).fallback(method_not_allowed),
        )
        .route(
            "/api/newsletter",
            post(newsletter::submit_newsletter).fallback(method_not_allowed),
        )
        .route(
            "/api/contact",
            post(contact::submit_contact).fallback(method_not_allowed),
        )
        .route(
            "/api/admin/verify",
            post(admin::verify_admin).fallback(method_not_allowed),
        )
        .route(
            "/api/admin/revalidate",
            post(admin::revalidate).fallback(method_not_allowed),
        )
        .route(
            "/api/admin/comments/:id/approve",
            post(admin::approve_comment).fallback(method_not_allowed),
        )
        .route(
            "/api/admin/comments/:id",
            delete(admin::delete_comment).fallback(method_not_allowed),
        )
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        // Handlers see the rejection and answer with the usual envelope.
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE_BYTES))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new())
                .layer(middleware::from_fn(security_headers)),
        )
        .with_state(state)
}

async fn method_not_allowed() -> ApiError {
    Error::MethodNotAllowed.into()
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Not found")
}
