//! Rows written to and read from the hosted store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use site_core::{ValidatedComment, ValidatedSubscription};
use uuid::Uuid;

/// Comment row to insert. New comments always await moderation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewComment {
    pub post_id: Uuid,
    pub author_name: String,
    pub author_email: String,
    pub content: String,
    pub is_approved: bool,
}

impl From<ValidatedComment> for NewComment {
    fn from(comment: ValidatedComment) -> Self {
        Self {
            post_id: comment.post_id,
            author_name: comment.name,
            author_email: comment.email,
            content: comment.content,
            is_approved: false,
        }
    }
}

/// Subscriber row to insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSubscriber {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub is_active: bool,
}

impl From<ValidatedSubscription> for NewSubscriber {
    fn from(subscription: ValidatedSubscription) -> Self {
        Self {
            email: subscription.email,
            name: subscription.name,
            is_active: true,
        }
    }
}

/// Subscriber as returned by a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: Uuid,
    pub email: String,
    pub is_active: bool,
}

/// Patch applied when an inactive subscriber signs up again.
#[derive(Debug, Clone, Serialize)]
pub struct Reactivation {
    pub is_active: bool,
    pub subscribed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Reactivation {
    pub fn now(name: Option<String>) -> Self {
        Self {
            is_active: true,
            subscribed_at: Utc::now(),
            name,
        }
    }
}

/// Comment touched by a moderation action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeratedComment {
    pub id: Uuid,
    /// Slug of the post the comment belongs to, used for revalidation.
    pub post_slug: Option<String>,
}

/// Embedded post reference in moderation responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PostRef {
    pub slug: String,
}

/// Comment row as returned with `select=id,posts(slug)`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ModeratedCommentRow {
    pub id: Uuid,
    pub posts: Option<PostRef>,
}

impl From<ModeratedCommentRow> for ModeratedComment {
    fn from(row: ModeratedCommentRow) -> Self {
        Self {
            id: row.id,
            post_slug: row.posts.map(|p| p.slug),
        }
    }
}

/// User resolved from an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: Option<String>,
}
