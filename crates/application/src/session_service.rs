//! Session surface consumed by the login form and the route guard.

use std::collections::BTreeSet;
use std::sync::Arc;

use streamgate_core::{AccountId, AppResult, Session};
use streamgate_domain::Role;

use crate::{IdentityProvider, RoleStore};

/// Username shown when neither a profile row nor an email is available.
const FALLBACK_USERNAME: &str = "user";

/// The signed-in account joined with its profile and held roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// Account identifier.
    pub id: AccountId,
    /// Email, if the provider returned one.
    pub email: Option<String>,
    /// Display username; falls back to the email, then to `"user"`.
    pub username: String,
    /// Roles currently held by the account.
    pub roles: BTreeSet<Role>,
}

/// Application service for sign-in, sign-out, and session lookups.
///
/// Sessions are owned by the identity provider client; this service
/// never caches one.
#[derive(Clone)]
pub struct SessionService {
    identity_provider: Arc<dyn IdentityProvider>,
    role_store: Arc<dyn RoleStore>,
}

impl SessionService {
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

    /// Authenticates credentials and returns the established session.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        self.identity_provider.sign_in(email, password).await
    }

    /// Terminates the current session, if any.
    pub async fn sign_out(&self) -> AppResult<()> {
        self.identity_provider.sign_out().await
    }

    /// Returns true when a session is established. Consumed by the
    /// route guard to admit or redirect.
    pub async fn is_authenticated(&self) -> AppResult<bool> {
        Ok(self.identity_provider.session().await?.is_some())
    }

    /// Returns the signed-in account with its profile and roles, or
    /// `None` without a session.
    pub async fn current_user(&self) -> AppResult<Option<CurrentUser>> {
        let Some(session) = self.identity_provider.session().await? else {
            return Ok(None);
        };

        let account_id = session.account().id().clone();
        let email = session.account().email().map(str::to_owned);

        let profiles = self.role_store.read_profiles().await?;
        let assignments = self.role_store.read_role_assignments().await?;

        let username = profiles
            .into_iter()
            .find(|profile| profile.account_id == account_id)
            .map(|profile| profile.username)
            .or_else(|| email.clone())
            .unwrap_or_else(|| FALLBACK_USERNAME.to_owned());

        let roles = assignments
            .into_iter()
            .filter(|assignment| assignment.account_id == account_id)
            .map(|assignment| assignment.role)
            .collect();

        Ok(Some(CurrentUser {
            id: account_id,
            email,
            username,
            roles,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use streamgate_core::{AccountId, AppError, AppResult, ProviderAccount, Session};
    use streamgate_domain::{ProfileRecord, Role, RoleAssignmentRecord};

    use crate::{IdentityProvider, RoleStore};

    use super::SessionService;

    struct FakeIdentityProvider {
        current: Mutex<Option<Session>>,
    }

    impl FakeIdentityProvider {
        fn with_session(account_id: &str, email: Option<&str>) -> Self {
            let account =
                ProviderAccount::new(AccountId::new(account_id), email.map(str::to_owned));
            Self {
                current: Mutex::new(Some(Session::new("token", account))),
            }
        }

        fn signed_out() -> Self {
            Self {
                current: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeIdentityProvider {
        async fn sign_in(&self, email: &str, _password: &str) -> AppResult<Session> {
            if email != "operator@example.com" {
                return Err(AppError::Unauthorized("invalid login credentials".to_owned()));
            }

            let session = Session::new(
                "token",
                ProviderAccount::new(AccountId::new("op"), Some(email.to_owned())),
            );
            *self.current.lock().await = Some(session.clone());

            Ok(session)
        }

        async fn sign_out(&self) -> AppResult<()> {
            *self.current.lock().await = None;

            Ok(())
        }

        async fn session(&self) -> AppResult<Option<Session>> {
            Ok(self.current.lock().await.clone())
        }

        async fn create_account(&self, _email: &str, _password: &str) -> AppResult<AccountId> {
            Err(AppError::Provider("not supported".to_owned()))
        }

        async fn delete_account(&self, _account_id: &AccountId) -> AppResult<()> {
            Ok(())
        }

        async fn set_password(&self, _account_id: &AccountId, _password: &str) -> AppResult<()> {
            Ok(())
        }

        async fn list_accounts(
            &self,
            _page: u32,
            _page_size: u32,
        ) -> AppResult<Vec<ProviderAccount>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct FakeRoleStore {
        profiles: Vec<ProfileRecord>,
        assignments: Vec<RoleAssignmentRecord>,
    }

    #[async_trait]
    impl RoleStore for FakeRoleStore {
        async fn read_profiles(&self) -> AppResult<Vec<ProfileRecord>> {
            Ok(self.profiles.clone())
        }

        async fn read_role_assignments(&self) -> AppResult<Vec<RoleAssignmentRecord>> {
            Ok(self.assignments.clone())
        }

        async fn has_assignment_with_role(&self, role: Role) -> AppResult<bool> {
            Ok(self
                .assignments
                .iter()
                .any(|assignment| assignment.role == role))
        }

        async fn insert_role_assignment(
            &self,
            _account_id: &AccountId,
            _role: Role,
        ) -> AppResult<()> {
            Ok(())
        }

        async fn delete_role_assignment(
            &self,
            _account_id: &AccountId,
            _role: Role,
        ) -> AppResult<()> {
            Ok(())
        }

        async fn upsert_profile(&self, _account_id: &AccountId, _username: &str) -> AppResult<()> {
            Ok(())
        }

        async fn upsert_role_assignment(
            &self,
            _account_id: &AccountId,
            _role: Role,
        ) -> AppResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn current_user_is_none_without_a_session() {
        let service = SessionService::new(
            Arc::new(FakeIdentityProvider::signed_out()),
            Arc::new(FakeRoleStore::default()),
        );

        let user = service.current_user().await;

        assert_eq!(user.ok(), Some(None));
        assert_eq!(service.is_authenticated().await.ok(), Some(false));
    }

    #[tokio::test]
    async fn current_user_joins_profile_and_roles() {
        let role_store = FakeRoleStore {
            profiles: vec![ProfileRecord {
                account_id: AccountId::new("op"),
                username: "operator".to_owned(),
            }],
            assignments: vec![
                RoleAssignmentRecord {
                    account_id: AccountId::new("op"),
                    role: Role::SaveLists,
                },
                RoleAssignmentRecord {
                    account_id: AccountId::new("other"),
                    role: Role::Admin,
                },
            ],
        };
        let service = SessionService::new(
            Arc::new(FakeIdentityProvider::with_session(
                "op",
                Some("operator@example.com"),
            )),
            Arc::new(role_store),
        );

        let user = service.current_user().await.ok().flatten();

        let user = match user {
            Some(user) => user,
            None => panic!("expected a signed-in user"),
        };
        assert_eq!(user.username, "operator");
        assert_eq!(user.roles, [Role::SaveLists].into_iter().collect());
    }

    #[tokio::test]
    async fn current_user_username_falls_back_to_email_then_user() {
        let with_email = SessionService::new(
            Arc::new(FakeIdentityProvider::with_session(
                "op",
                Some("operator@example.com"),
            )),
            Arc::new(FakeRoleStore::default()),
        );
        let without_email = SessionService::new(
            Arc::new(FakeIdentityProvider::with_session("op", None)),
            Arc::new(FakeRoleStore::default()),
        );

        let named = with_email.current_user().await.ok().flatten();
        let anonymous = without_email.current_user().await.ok().flatten();

        assert_eq!(
            named.map(|user| user.username),
            Some("operator@example.com".to_owned())
        );
        assert_eq!(anonymous.map(|user| user.username), Some("user".to_owned()));
    }

    #[tokio::test]
    async fn sign_in_rejects_bad_credentials() {
        let service = SessionService::new(
            Arc::new(FakeIdentityProvider::signed_out()),
            Arc::new(FakeRoleStore::default()),
        );

        let result = service.sign_in("intruder@example.com", "123456").await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
        assert_eq!(service.is_authenticated().await.ok(), Some(false));
    }

    #[tokio::test]
    async fn sign_out_clears_the_session() {
        let service = SessionService::new(
            Arc::new(FakeIdentityProvider::with_session("op", None)),
            Arc::new(FakeRoleStore::default()),
        );

        assert_eq!(service.is_authenticated().await.ok(), Some(true));
        let result = service.sign_out().await;

        assert!(result.is_ok());
        assert_eq!(service.is_authenticated().await.ok(), Some(false));
    }
}
