pub mod health;

pub mod user_login;
pub mod user_logout;
pub mod user_profile;
pub mod user_register;

pub mod captain_login;
pub mod captain_logout;
pub mod captain_profile;
pub mod captain_register;

pub mod types;

// common functions for the handlers
use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use regex::Regex;
use serde_json::json;

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

pub fn valid_password(password: &str) -> bool {
    password.len() >= 6
}

// Minimum three characters, mirrors the client-side form rules
pub fn valid_name(name: &str) -> bool {
    name.trim().chars().count() >= 3
}

// Trimmed value ready for storage, None when too short
pub fn normalize_name(name: &str) -> Option<String> {
    let name = name.trim();
    (name.chars().count() >= 3).then(|| name.to_string())
}

// Optional fields drop to None once trimmed empty
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub(crate) fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_valid_email() {
        assert!(valid_email("rider@example.com"));
        assert!(valid_email("first.last@sub.example.co"));
        assert!(!valid_email("rider@example"));
        assert!(!valid_email("rider example.com"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email(""));
    }

    #[test]
    fn test_valid_password() {
        assert!(valid_password("sekreto"));
        assert!(valid_password("123456"));
        assert!(!valid_password("12345"));
        assert!(!valid_password(""));
    }

    #[test]
    fn test_valid_name() {
        assert!(valid_name("Ana"));
        assert!(valid_name("  Ana  "));
        assert!(!valid_name("Al"));
        assert!(!valid_name("   "));
    }

    #[test]
    fn test_normalize_name_trims_stored_value() {
        assert_eq!(normalize_name("  Ana  "), Some("Ana".to_string()));
        assert_eq!(normalize_name("Ana"), Some("Ana".to_string()));
        assert_eq!(normalize_name("  Al  "), None);
        assert_eq!(normalize_name("   "), None);
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(
            normalize_optional(Some("  Kumar  ".to_string())),
            Some("Kumar".to_string())
        );
        assert_eq!(normalize_optional(Some("   ".to_string())), None);
        assert_eq!(normalize_optional(None), None);
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_missing_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("abc.def.ghi"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_bearer_token_empty() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        let headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
    }
}
