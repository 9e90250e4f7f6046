use std::fmt;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(ErrorMessage),

    #[error("Unauthorized - session expired or invalid credentials")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(ErrorMessage),

    /// Rejected by the server's own checks. The message is meant for users.
    #[error("{0}")]
    Validation(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(ErrorMessage),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Text carried by an error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorMessage {
    /// The `detail` field; written by the server for users.
    Detail(String),
    /// Raw body, truncated.
    Raw(String),
}

impl ErrorMessage {
    pub fn detail(&self) -> Option<&str> {
        match self {
            ErrorMessage::Detail(detail) => Some(detail.as_str()),
            ErrorMessage::Raw(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ErrorMessage::Detail(text) | ErrorMessage::Raw(text) => text.as_str(),
        }
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Deserialize)]
struct ErrorBody {
    detail: Detail,
}

/// `detail` is a plain string for handled errors and a list of field
/// errors for request validation failures.
#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Fields(Vec<FieldError>),
}

#[derive(Deserialize)]
struct FieldError {
    #[serde(default)]
    loc: Vec<serde_json::Value>,
    msg: String,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..end],
            body.len()
        )
    }

    /// Pull the user-facing message out of a `{"detail": ...}` body.
    fn extract_detail(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        match parsed.detail {
            Detail::Message(msg) => Some(msg),
            Detail::Fields(fields) if !fields.is_empty() => Some(
                fields
                    .iter()
                    .map(|f| match f.loc.last().and_then(|v| v.as_str()) {
                        Some(field) => format!("{}: {}", field, f.msg),
                        None => f.msg.clone(),
                    })
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            Detail::Fields(_) => None,
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = match Self::extract_detail(body) {
            Some(detail) => ErrorMessage::Detail(detail),
            None => ErrorMessage::Raw(Self::truncate_body(body)),
        };
        match status.as_u16() {
            400 | 409 | 422 => ApiError::Validation(message.as_str().to_string()),
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }

    /// The server's own explanation, when it sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Validation(detail) => Some(detail.as_str()),
            ApiError::AccessDenied(message)
            | ApiError::NotFound(message)
            | ApiError::ServerError(message) => message.detail(),
            _ => None,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Whether an `anyhow` chain bottoms out in a 401.
    pub fn is_auth_error(err: &anyhow::Error) -> bool {
        err.downcast_ref::<ApiError>()
            .map(ApiError::is_auth_failure)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_detail_string_is_validation_message() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "Already registered"}"#,
        );
        assert!(matches!(err, ApiError::Validation(ref m) if m == "Already registered"));
        assert_eq!(err.to_string(), "Already registered");
    }

    #[test]
    fn test_detail_field_list() {
        let body = r#"{"detail": [{"loc": ["body", "email"], "msg": "field required", "type": "missing"}]}"#;
        let err = ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(err.to_string(), "email: field required");
    }

    #[test]
    fn test_status_mapping() {
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, "").is_auth_failure());
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, r#"{"detail": "Admins only"}"#),
            ApiError::AccessDenied(ErrorMessage::Detail(ref m)) if m == "Admins only"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "missing"),
            ApiError::NotFound(ErrorMessage::Raw(_))
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>"),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn test_detail_only_when_parsed() {
        let denied = ApiError::from_status(
            StatusCode::FORBIDDEN,
            r#"{"detail": "Bu okul icin program olusturamazsiniz"}"#,
        );
        assert_eq!(denied.detail(), Some("Bu okul icin program olusturamazsiniz"));

        let raw = ApiError::from_status(StatusCode::NOT_FOUND, "<html>Not Found</html>");
        assert_eq!(raw.detail(), None);
        assert!(raw.to_string().contains("<html>"));
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = "ş".repeat(400);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }

    #[test]
    fn test_is_auth_error_through_anyhow() {
        let err: anyhow::Error = ApiError::Unauthorized.into();
        assert!(ApiError::is_auth_error(&err));
        let other = anyhow::anyhow!("disk full");
        assert!(!ApiError::is_auth_error(&other));
    }
}
