//! Hosted data store and identity client for the site backend.

pub mod admins;
pub mod client;
pub mod comments;
pub mod config;
pub mod health;
pub mod identity;
pub mod models;
pub mod repository;
pub mod subscribers;

pub use client::*;
pub use config::*;
pub use models::*;
pub use repository::{ContentStore, IdentityProvider};
