//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `Session`: access/refresh token pair persisted to disk
//! - `CredentialStore`: Secure OS-level credential storage via keyring
//! - `AuthContext`: the signed-in user with resolved capabilities
//!
//! Access tokens expire after 30 minutes; refresh tokens after 7 days.

pub mod context;
pub mod credentials;
pub mod session;

pub use context::AuthContext;
pub use credentials::CredentialStore;
pub use session::{Session, SessionData};
