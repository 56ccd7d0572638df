//! Core types, submission schemas, validation and sanitization for the site backend.

pub mod auth;
pub mod error;
pub mod limits;
pub mod sanitize;
pub mod submission;

pub use auth::{extract_bearer_token, normalize_email, BearerToken};
pub use error::{Error, ErrorKind, Result};
pub use sanitize::sanitize_text;
pub use submission::*;
