//! Collaborator traits used by the HTTP layer.
//!
//! `StoreClient` implements both against the hosted backend; tests swap in
//! in-memory mocks.

use async_trait::async_trait;
use site_core::{BearerToken, Result};
use uuid::Uuid;

use crate::client::StoreClient;
use crate::models::{ModeratedComment, NewComment, NewSubscriber, Subscriber, UserIdentity};
use crate::{admins, comments, health, identity, subscribers};

/// Persistence for comments, subscribers and the administrator list.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn insert_comment(&self, comment: NewComment) -> Result<()>;

    async fn approve_comment(&self, id: Uuid) -> Result<Option<ModeratedComment>>;

    async fn delete_comment(&self, id: Uuid) -> Result<Option<ModeratedComment>>;

    async fn find_subscriber(&self, email: &str) -> Result<Option<Subscriber>>;

    async fn insert_subscriber(&self, subscriber: NewSubscriber) -> Result<()>;

    async fn reactivate_subscriber(&self, id: Uuid, name: Option<String>) -> Result<()>;

    async fn is_admin(&self, email: &str) -> Result<bool>;

    async fn is_healthy(&self) -> bool;
}

/// Resolves access tokens to users.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve_user(&self, token: &BearerToken) -> Result<Option<UserIdentity>>;
}

#[async_trait]
impl ContentStore for StoreClient {
    async fn insert_comment(&self, comment: NewComment) -> Result<()> {
        comments::insert_comment(self, &comment).await
    }

    async fn approve_comment(&self, id: Uuid) -> Result<Option<ModeratedComment>> {
        comments::approve_comment(self, id).await
    }

    async fn delete_comment(&self, id: Uuid) -> Result<Option<ModeratedComment>> {
        comments::delete_comment(self, id).await
    }

    async fn find_subscriber(&self, email: &str) -> Result<Option<Subscriber>> {
        subscribers::find_subscriber(self, email).await
    }

    async fn insert_subscriber(&self, subscriber: NewSubscriber) -> Result<()> {
        subscribers::insert_subscriber(self, &subscriber).await
    }

    async fn reactivate_subscriber(&self, id: Uuid, name: Option<String>) -> Result<()> {
        subscribers::reactivate_subscriber(self, id, name).await
    }

    async fn is_admin(&self, email: &str) -> Result<bool> {
        admins::is_admin(self, email).await
    }

    async fn is_healthy(&self) -> bool {
        health::check_connection(self).await
    }
}

#[async_trait]
impl IdentityProvider for StoreClient {
    async fn resolve_user(&self, token: &BearerToken) -> Result<Option<UserIdentity>> {
        identity::resolve_user(self, token).await
    }
}
