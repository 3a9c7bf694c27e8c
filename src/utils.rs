// src/utils.rs
use uuid::Uuid;

/// Fresh row id
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Opaque invitation token (no dashes, safe in URLs)
pub fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Normalize email for comparisons
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Case-insensitive literal pattern for the connection's REGEXP function.
/// Case folding is Unicode-aware.
pub fn search_pattern(input: &str) -> String {
    format!("(?i){}", regex::escape(input))
}

/// Trimmed, non-empty search text
pub fn non_blank(input: Option<&str>) -> Option<&str> {
    input.map(str::trim).filter(|s| !s.is_empty())
}
