//! Size and rate limits for public submissions.
//!
//! Per-field bounds live in the `#[validate]` attributes in
//! [`submission`](crate::submission), which only accept literals.

// === Request Limits ===

/// Maximum submission body size in bytes (64KB).
///
/// The largest valid payload is a contact message of 5000 chars; anything
/// far beyond that is rejected before parsing.
pub const MAX_BODY_SIZE_BYTES: usize = 64 * 1024;

// === Rate Limit Defaults ===

/// Submissions allowed per identifier per window.
pub const DEFAULT_MAX_SUBMISSIONS: u32 = 5;

/// Window length in milliseconds (10 minutes).
pub const DEFAULT_WINDOW_MS: u64 = 10 * 60 * 1000;

/// Longest accepted window (one day). Larger configured values are clamped.
pub const MAX_WINDOW_MS: u64 = 24 * 60 * 60 * 1000;
