//! Shared primitives for all Rust crates in Streamgate.

#![forbid(unsafe_code)]

/// Session primitives shared across services.
pub mod auth;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{ProviderAccount, Session};

/// Result type used across Streamgate crates.
pub type AppResult<T> = Result<T, AppError>;

/// Opaque account identifier issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Creates an account identifier from a provider-issued value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the underlying identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.0
    }
}

impl Display for AccountId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input rejected before any remote call is made.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Credentials or session were rejected by the identity provider.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Operation blocked by the admin-immutability policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Identity provider call failed; carries the provider's message.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// Role store call failed or returned an unusable response.
    #[error("role store unavailable: {0}")]
    StoreUnavailable(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
