//! Core library for kwoon, a client for Wing Tsun & Escrima school management.
//!
//! - [`api`]: HTTP client for the school-management backend
//! - [`auth`]: session persistence, keyring credentials, the signed-in user's capabilities
//! - [`cache`]: offline JSON cache
//! - [`capability`]: role to capability resolution and screen access
//! - [`progress`]: training-hour progress and exam eligibility
//! - [`registration`]: event registration and exam state machine
//! - [`notice`]: transient user-facing messages and list loading state

pub mod api;
pub mod auth;
pub mod cache;
pub mod capability;
pub mod config;
pub mod models;
pub mod notice;
pub mod progress;
pub mod registration;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthContext, CredentialStore, Session, SessionData};
pub use cache::CacheManager;
pub use config::Config;
