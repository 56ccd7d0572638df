//! Admin endpoints: administrator lookup, cache revalidation and comment
//! moderation.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::StatusCode,
    Json,
};
use notify::revalidate_content;
use serde::Deserialize;
use site_core::{normalize_email, Error};
use store_client::ModeratedComment;
use tracing::{info, warn};
use uuid::Uuid;

use crate::extractors::AdminContext;
use crate::response::{AdminStatusResponse, ApiError, SuccessResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
struct VerifyRequest {
    email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RevalidateRequest {
    slug: Option<String>,
}

/// Parse an optional JSON body; an empty body yields the default.
fn parse_optional<T: Default + serde::de::DeserializeOwned>(
    body: Result<Bytes, BytesRejection>,
) -> Result<T, ApiError> {
    let body = body.map_err(|rejection| {
        let message = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            "Request body too large"
        } else {
            "Invalid request body"
        };
        ApiError::from(Error::bad_request(message))
    })?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(&body).map_err(|_| Error::bad_request("Invalid request body").into())
}

/// POST /api/admin/verify - Whether an email belongs to an administrator.
pub async fn verify_admin(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<AdminStatusResponse>, ApiError> {
    let request: VerifyRequest = parse_optional(body)?;

    let email = request
        .email
        .as_deref()
        .map(normalize_email)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::from(Error::bad_request("Email is required")))?;

    let is_admin = state.store.is_admin(&email).await?;
    Ok(Json(AdminStatusResponse { is_admin }))
}

/// POST /api/admin/revalidate - Refresh the blog listing and optionally one post.
pub async fn revalidate(
    State(state): State<AppState>,
    admin: AdminContext,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let request: RevalidateRequest = parse_optional(body)?;

    let report = revalidate_content(state.page_cache.as_ref(), request.slug.as_deref()).await?;

    info!(
        user_id = %admin.user_id,
        invalidated = ?report.invalidated,
        failed = ?report.failed,
        "Revalidated pages"
    );
    Ok(Json(SuccessResponse::revalidated()))
}

/// POST /api/admin/comments/:id/approve - Publish a pending comment.
pub async fn approve_comment(
    State(state): State<AppState>,
    admin: AdminContext,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = parse_comment_id(&id)?;
    let comment = state
        .store
        .approve_comment(id)
        .await?
        .ok_or(Error::NotFound("comment"))?;

    info!(user_id = %admin.user_id, comment_id = %id, "Comment approved");
    refresh_pages(&state, &comment).await;
    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /api/admin/comments/:id - Remove a comment.
pub async fn delete_comment(
    State(state): State<AppState>,
    admin: AdminContext,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let id = parse_comment_id(&id)?;
    let comment = state
        .store
        .delete_comment(id)
        .await?
        .ok_or(Error::NotFound("comment"))?;

    info!(user_id = %admin.user_id, comment_id = %id, "Comment deleted");
    refresh_pages(&state, &comment).await;
    Ok(Json(SuccessResponse::ok()))
}

/// An id that cannot name a comment is reported like a missing one.
fn parse_comment_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::NotFound("comment").into())
}

/// The moderation change is already committed, so a stale page is only logged.
async fn refresh_pages(state: &AppState, comment: &ModeratedComment) {
    if let Err(e) = revalidate_content(state.page_cache.as_ref(), comment.post_slug.as_deref()).await {
        warn!(comment_id = %comment.id, error = %e, "Revalidation after moderation failed");
    }
}
