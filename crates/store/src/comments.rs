//! Comment writes and moderation.

use crate::client::{decode_error, StoreClient};
use crate::models::{ModeratedComment, ModeratedCommentRow, NewComment};
use reqwest::Method;
use site_core::Result;
use tracing::debug;
use uuid::Uuid;

pub const COMMENTS_TABLE: &str = "comments";

/// Columns returned by moderation calls: the comment id and its post's slug.
const MODERATED_SELECT: &str = "id,posts(slug)";

/// Insert a new (unapproved) comment.
pub async fn insert_comment(client: &StoreClient, comment: &NewComment) -> Result<()> {
    let request = client
        .rest(Method::POST, COMMENTS_TABLE)?
        .header("Prefer", "return=minimal")
        .json(comment);

    client.send(request).await?;

    debug!(post_id = %comment.post_id, "Inserted comment");
    Ok(())
}

/// Mark a comment approved. Returns `None` when no comment has this id.
pub async fn approve_comment(client: &StoreClient, id: Uuid) -> Result<Option<ModeratedComment>> {
    let request = client
        .rest(Method::PATCH, COMMENTS_TABLE)?
        .query(&[("id", format!("eq.{}", id)), ("select", MODERATED_SELECT.to_string())])
        .header("Prefer", "return=representation")
        .json(&serde_json::json!({ "is_approved": true }));

    let rows: Vec<ModeratedCommentRow> = client
        .send(request)
        .await?
        .json()
        .await
        .map_err(decode_error)?;

    debug!(comment_id = %id, found = !rows.is_empty(), "Approved comment");
    Ok(rows.into_iter().next().map(ModeratedComment::from))
}

/// Delete a comment. Returns `None` when no comment has this id.
pub async fn delete_comment(client: &StoreClient, id: Uuid) -> Result<Option<ModeratedComment>> {
    let request = client
        .rest(Method::DELETE, COMMENTS_TABLE)?
        .query(&[("id", format!("eq.{}", id)), ("select", MODERATED_SELECT.to_string())])
        .header("Prefer", "return=representation");

    let rows: Vec<ModeratedCommentRow> = client
        .send(request)
        .await?
        .json()
        .await
        .map_err(decode_error)?;

    debug!(comment_id = %id, found = !rows.is_empty(), "Deleted comment");
    Ok(rows.into_iter().next().map(ModeratedComment::from))
}
