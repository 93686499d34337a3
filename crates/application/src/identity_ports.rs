use async_trait::async_trait;

use streamgate_core::{AccountId, AppResult, ProviderAccount, Session};

/// Client port for the external identity provider.
///
/// The provider is the authority on credentials and account lifecycle;
/// this subsystem never implements authentication itself. Privileged
/// operations (create, delete, set password, list) require the adapter
/// to be constructed with a service-role credential.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticates credentials and returns the established session.
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session>;

    /// Terminates the current session, if any.
    async fn sign_out(&self) -> AppResult<()>;

    /// Returns the current session, if one is established.
    async fn session(&self) -> AppResult<Option<Session>>;

    /// Creates an account with the given credentials and returns its
    /// identifier.
    async fn create_account(&self, email: &str, password: &str) -> AppResult<AccountId>;

    /// Deletes an account. Profile and role-assignment rows cascade at
    /// the provider/store level, not here.
    async fn delete_account(&self, account_id: &AccountId) -> AppResult<()>;

    /// Sets a new credential for an account.
    async fn set_password(&self, account_id: &AccountId, password: &str) -> AppResult<()>;

    /// Lists accounts one page at a time; pages are 1-based.
    async fn list_accounts(&self, page: u32, page_size: u32) -> AppResult<Vec<ProviderAccount>>;
}
