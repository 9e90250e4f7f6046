//! REST API client module for the school-management backend.
//!
//! This module provides the `ApiClient` for every endpoint the
//! application uses, and `ApiError` for the failures it can report.
//!
//! The API uses JWT bearer tokens obtained from `/auth/login` and renewed
//! through `/auth/refresh`.

pub mod client;
pub mod error;

pub use client::{ApiClient, Upload, DEFAULT_PAGE_LIMIT};
pub use error::{ApiError, ErrorMessage};
