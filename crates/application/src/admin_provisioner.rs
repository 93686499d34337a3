//! Deploy-time bootstrap guaranteeing a singleton default admin account.

use std::sync::Arc;

use streamgate_core::{AccountId, AppResult};
use streamgate_domain::Role;

use crate::{IdentityProvider, RoleStore};

/// Well-known email of the default admin account.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@admin.com";

/// Initial credential of the default admin account.
pub const DEFAULT_ADMIN_PASSWORD: &str = "123456";

/// Profile username of the default admin account.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

const ACCOUNT_LOOKUP_PAGE_SIZE: u32 = 1000;

/// Result of a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// An admin assignment already existed; nothing was touched.
    AlreadyProvisioned,
    /// The default admin account was provisioned.
    Created {
        /// Identifier of the provisioned account.
        account_id: AccountId,
    },
}

/// Idempotent one-shot procedure that ensures exactly one default admin
/// account exists.
///
/// Safe to re-run: the admin-existence probe stops duplicate runs, and
/// every subsequent step is an upsert or resolves to the same account by
/// email. Nothing is retried here; retry policy belongs to the invoking
/// deployment process.
#[derive(Clone)]
pub struct AdminProvisioner {
    identity_provider: Arc<dyn IdentityProvider>,
    role_store: Arc<dyn RoleStore>,
}

impl AdminProvisioner {
    /// Creates a provisioner from the two client ports.
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

    /// Runs the provisioning protocol to completion.
    pub async fn provision(&self) -> AppResult<ProvisionOutcome> {
        if self.role_store.has_assignment_with_role(Role::Admin).await? {
            return Ok(ProvisionOutcome::AlreadyProvisioned);
        }

        let account_id = self.resolve_admin_account().await?;

        self.role_store
            .upsert_profile(&account_id, DEFAULT_ADMIN_USERNAME)
            .await?;
        self.role_store
            .upsert_role_assignment(&account_id, Role::Admin)
            .await?;

        Ok(ProvisionOutcome::Created { account_id })
    }

    /// Creates the default account, or resolves an existing one by email.
    ///
    /// When creation fails because the account already exists, the
    /// account list is paged through and matched case-insensitively.
    /// With no match the original creation failure is re-raised.
    async fn resolve_admin_account(&self) -> AppResult<AccountId> {
        let creation_error = match self
            .identity_provider
            .create_account(DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD)
            .await
        {
            Ok(account_id) => return Ok(account_id),
            Err(error) => error,
        };

        let mut page = 1;
        loop {
            let accounts = self
                .identity_provider
                .list_accounts(page, ACCOUNT_LOOKUP_PAGE_SIZE)
                .await?;

            let matched = accounts.iter().find(|account| {
                account
                    .email()
                    .is_some_and(|email| email.eq_ignore_ascii_case(DEFAULT_ADMIN_EMAIL))
            });
            if let Some(account) = matched {
                return Ok(account.id().clone());
            }

            if accounts.len() < ACCOUNT_LOOKUP_PAGE_SIZE as usize {
                return Err(creation_error);
            }
            page += 1;
        }
    }
}
