//! Account and role administration service.
//!
//! Composes the identity provider and role store clients into the
//! management operations consumed by the console. Accounts holding the
//! `admin` role are immutable through this service: their roles cannot
//! be changed and the account cannot be deleted.

use std::sync::Arc;

use streamgate_core::{AccountId, AppError, AppResult};
use streamgate_domain::{Role, UserView, validate_email, validate_password};

use crate::{IdentityProvider, RoleStore};

/// Application service for account and role administration.
#[derive(Clone)]
pub struct RbacService {
    identity_provider: Arc<dyn IdentityProvider>,
    role_store: Arc<dyn RoleStore>,
}

impl RbacService {
    /// Creates a new service from the two client ports.
    #[must_use]
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        role_store: Arc<dyn RoleStore>,
    ) -> Self {
        Self {
            identity_provider,
            role_store,
        }
    }

    /// Returns all accounts with their profile and held roles.
    ///
    /// The store exposes no native join, so both tables are read in full
    /// and joined client-side. All-or-nothing: if either read fails the
    /// whole operation fails and no partial result is returned.
    pub async fn list_users(&self) -> AppResult<Vec<UserView>> {
        let profiles = self.role_store.read_profiles().await?;
        let assignments = self.role_store.read_role_assignments().await?;

        Ok(UserView::join(profiles, assignments))
    }

    /// Creates an account with the given credentials.
    ///
    /// Validates locally first; on validation failure no remote call is
    /// made. The new account starts with zero roles, and its profile row
    /// is created by the provider's account-creation trigger, not here.
    pub async fn create_user(&self, email: &str, password: &str) -> AppResult<AccountId> {
        validate_email(email)?;
        validate_password(password)?;

        self.identity_provider.create_account(email, password).await
    }

    /// Grants a role to an account and returns its recomputed view.
    ///
    /// Granting an already-held role is a no-op from the caller's
    /// perspective; the underlying insert conflict never surfaces.
    pub async fn grant_role(&self, account_id: &AccountId, role: Role) -> AppResult<UserView> {
        self.ensure_mutable(account_id).await?;

        self.role_store
            .insert_role_assignment(account_id, role)
            .await?;

        self.updated_view(account_id).await
    }

    /// Revokes a role from an account and returns its recomputed view.
    ///
    /// Revoking a role the account never held succeeds and leaves the
    /// role set unchanged, symmetric with [`Self::grant_role`].
    pub async fn revoke_role(&self, account_id: &AccountId, role: Role) -> AppResult<UserView> {
        self.ensure_mutable(account_id).await?;

        self.role_store
            .delete_role_assignment(account_id, role)
            .await?;

        self.updated_view(account_id).await
    }

    /// Deletes an account via the identity provider.
    ///
    /// Destructive and non-reversible; the presentation boundary must
    /// collect an explicit confirmation before invoking this. Profile
    /// and role rows cascade at the provider/store level.
    pub async fn delete_user(&self, account_id: &AccountId) -> AppResult<()> {
        self.ensure_mutable(account_id).await?;

        self.identity_provider.delete_account(account_id).await
    }

    /// Sets a new credential for an account.
    ///
    /// Permitted even for admin accounts: a credential reset for the
    /// sole admin must remain possible.
    pub async fn set_password(&self, account_id: &AccountId, new_password: &str) -> AppResult<()> {
        validate_password(new_password)?;

        self.identity_provider
            .set_password(account_id, new_password)
            .await
    }

    /// Rejects mutation of accounts currently holding the `admin` role.
    ///
    /// Fresh read before every mutating call; the store offers no
    /// compare-and-set, so two concurrent mutations of the same account
    /// can race. An account without a profile row is treated as
    /// non-admin, as the console only operates on profiled accounts.
    async fn ensure_mutable(&self, account_id: &AccountId) -> AppResult<()> {
        let holds_admin = self
            .find_user(account_id)
            .await?
            .is_some_and(|user| user.is_admin());

        if holds_admin {
            return Err(AppError::Forbidden(format!(
                "account '{account_id}' holds the admin role and cannot be modified"
            )));
        }

        Ok(())
    }

    async fn find_user(&self, account_id: &AccountId) -> AppResult<Option<UserView>> {
        Ok(self
            .list_users()
            .await?
            .into_iter()
            .find(|user| &user.id == account_id))
    }

    async fn updated_view(&self, account_id: &AccountId) -> AppResult<UserView> {
        self.find_user(account_id).await?.ok_or_else(|| {
            AppError::NotFound(format!("account '{account_id}' has no profile row"))
        })
    }
}
