// Helper functions for safe logging and timestamp formatting

use chrono::{DateTime, SecondsFormat, Utc};

use super::error::ApiError;

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 && !parts[0].is_empty() {
            let first: String = parts[0].chars().take(1).collect();
            format!("{}***@{}", first, parts[1])
        } else {
            "***@***.***".to_string()
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
pub fn safe_token_log(token: &str) -> String {
    if token.len() > 8 && token.is_ascii() {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    } else {
        "***".to_string()
    }
}

/// Parses a positive numeric path id; `label` names it in the error ("post", "comment")
pub fn parse_id(raw: &str, label: &str) -> Result<i64, ApiError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::BadRequest(format!("Invalid {} ID", label))),
    }
}

/// Current time in the storage format (RFC 3339, UTC, microseconds)
pub fn now_timestamp() -> String {
    to_storage_timestamp(Utc::now())
}

pub fn to_storage_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// "June 20, 2025"; unparseable input is returned as-is
pub fn format_post_date(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%B %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

/// "June 23, 2025 at 4:30 PM"; unparseable input is returned as-is
pub fn format_comment_timestamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%B %-d, %Y at %-I:%M %p").to_string(),
        None => raw.to_string(),
    }
}
