//! User-facing feedback.
//!
//! Failures become short-lived [`Notice`]s; empty results are a
//! [`Listing::Empty`] placeholder rather than an error.

use chrono::{DateTime, Duration, Utc};

use crate::api::ApiError;

/// How long a transient notice stays on screen.
const NOTICE_TTL_SECS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    /// Turn a failed action into a notice. A `detail` sent by the server
    /// is shown as-is; everything else gets a generic line.
    pub fn from_error(err: &anyhow::Error) -> Self {
        let api_error = err.downcast_ref::<ApiError>();
        if let Some(detail) = api_error.and_then(ApiError::detail) {
            return Self::error(detail);
        }
        let message = match api_error {
            Some(ApiError::Validation(detail)) => detail.clone(),
            Some(ApiError::Unauthorized) => "Session expired - please log in again".to_string(),
            Some(ApiError::AccessDenied(_)) => "You do not have permission to do that".to_string(),
            Some(ApiError::NotFound(_)) => "Not found - it may have been deleted".to_string(),
            Some(ApiError::RateLimited) => "Server is busy - try again shortly".to_string(),
            Some(ApiError::ServerError(_)) => "Server error - try again later".to_string(),
            Some(ApiError::Network(_)) | None => {
                "Could not reach the server - check your connection".to_string()
            }
            Some(ApiError::InvalidResponse(_)) => "Unexpected response from server".to_string(),
        };
        Self::error(message)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at >= Duration::seconds(NOTICE_TTL_SECS)
    }
}

/// Load state of a list shown on screen.
#[derive(Debug, Clone, Default)]
pub enum Listing<T> {
    #[default]
    Loading,
    Empty,
    Items(Vec<T>),
}

impl<T> Listing<T> {
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Listing::Empty
        } else {
            Listing::Items(items)
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Listing::Items(items) => items,
            _ => &[],
        }
    }

    pub fn items_mut(&mut self) -> Option<&mut Vec<T>> {
        match self {
            Listing::Items(items) => Some(items),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Listing::Loading)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items().get(index)
    }
}
