use serde::{Deserialize, Serialize};

use crate::AccountId;

/// Account summary returned by the identity provider.
///
/// The credential itself is never read back; only the provider can set or
/// verify it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAccount {
    id: AccountId,
    email: Option<String>,
}

impl ProviderAccount {
    /// Creates an account summary from provider data.
    #[must_use]
    pub fn new(id: AccountId, email: Option<String>) -> Self {
        Self { id, email }
    }

    /// Returns the provider-issued account identifier.
    #[must_use]
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    /// Returns the email, if the provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// An authenticated session issued by the identity provider.
///
/// Sessions are explicit values returned by sign-in and passed around by
/// callers; no component holds an implicit ambient reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    access_token: String,
    account: ProviderAccount,
}

impl Session {
    /// Creates a session from provider data.
    #[must_use]
    pub fn new(access_token: impl Into<String>, account: ProviderAccount) -> Self {
        Self {
            access_token: access_token.into(),
            account,
        }
    }

    /// Returns the bearer token for authenticated calls.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }

    /// Returns the account this session belongs to.
    #[must_use]
    pub fn account(&self) -> &ProviderAccount {
        &self.account
    }
}
