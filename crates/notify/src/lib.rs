//! Outbound hooks to the site's external collaborators:
//! contact notifications and page-cache revalidation.

pub mod notifications;
pub mod revalidate;

pub use notifications::*;
pub use revalidate::*;
