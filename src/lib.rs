//! Network service: the data-access backend of the recruiting marketplace.
//!
//! Every resource (recruiters, assignments, recruiter-candidate links,
//! reputations, proposals) is served by the same filtered/paginated list
//! accessor, optionally scoped to the caller's organizations, with
//! status-based soft deletes.

/// Logging entry point used across the crate; forwards to `tracing`.
#[macro_export]
macro_rules! app_log {
    ($level:ident, $($arg:tt)+) => {
        ::tracing::$level!($($arg)+)
    };
}

pub mod admin_cli;
pub mod auth;
pub mod core;
pub mod invitations;
pub mod repository;
pub mod utils;
pub mod web;

pub use crate::core::{ConfigManager, Database};
pub use web::{build_rocket, start_web_server};
