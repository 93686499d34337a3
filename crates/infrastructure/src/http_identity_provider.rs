use async_trait::async_trait;

use reqwest::header;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use streamgate_application::IdentityProvider;
use streamgate_core::{AccountId, AppError, AppResult, ProviderAccount, Session};

/// HTTP client for a GoTrue-compatible identity provider.
///
/// Privileged account lifecycle calls go through the `/admin/users`
/// endpoints and are authorized with the service-role key. The adapter
/// owns the current session; nothing else holds an ambient reference.
pub struct HttpIdentityProvider {
    http_client: reqwest::Client,
    base_url: String,
    service_role_key: String,
    current_session: RwLock<Option<Session>>,
}

#[derive(Debug, Serialize)]
struct PasswordGrantRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateAccountRequest<'a> {
    email: &'a str,
    password: &'a str,
    email_confirm: bool,
}

#[derive(Debug, Serialize)]
struct SetPasswordRequest<'a> {
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    id: String,
    email: Option<String>,
}

impl AccountResponse {
    fn into_account(self) -> ProviderAccount {
        ProviderAccount::new(AccountId::new(self.id), self.email)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AccountResponse,
}

#[derive(Debug, Deserialize)]
struct AccountListResponse {
    users: Vec<AccountResponse>,
}

impl HttpIdentityProvider {
    /// Creates a client for the provider at `base_url`, authorized with
    /// the given service-role key.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        service_role_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();

        Self {
            http_client,
            base_url,
            service_role_key: service_role_key.into(),
            current_session: RwLock::new(None),
        }
    }

    fn admin_request(&self, method: reqwest::Method, endpoint: String) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, endpoint)
            .header("apikey", self.service_role_key.as_str())
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.service_role_key),
            )
    }

    /// Extracts the provider's message from an error response body.
    async fn failure_message(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_owned());
        let message = serde_json::from_str::<serde_json::Value>(body.as_str())
            .ok()
            .and_then(|value| {
                ["msg", "message", "error_description", "error"]
                    .iter()
                    .find_map(|key| {
                        value
                            .get(key)
                            .and_then(serde_json::Value::as_str)
                            .map(str::to_owned)
                    })
            })
            .unwrap_or(body);

        format!("status {}: {message}", status.as_u16())
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<Session> {
        let endpoint = format!("{}/auth/v1/token", self.base_url);
        let response = self
            .http_client
            .post(endpoint)
            .query(&[("grant_type", "password")])
            .header("apikey", self.service_role_key.as_str())
            .json(&PasswordGrantRequest { email, password })
            .send()
            .await
            .map_err(|error| {
                AppError::Provider(format!("failed to call sign-in endpoint: {error}"))
            })?;

        if !response.status().is_success() {
            return Err(AppError::Unauthorized(Self::failure_message(response).await));
        }

        let token = response.json::<TokenResponse>().await.map_err(|error| {
            AppError::Provider(format!("failed to parse sign-in response body: {error}"))
        })?;

        let session = Session::new(token.access_token, token.user.into_account());
        *self.current_session.write().await = Some(session.clone());

        Ok(session)
    }

    async fn sign_out(&self) -> AppResult<()> {
        let session = self.current_session.read().await.clone();
        let Some(session) = session else {
            tracing::debug!("sign-out without an established session");
            return Ok(());
        };

        let endpoint = format!("{}/auth/v1/logout", self.base_url);
        let response = self
            .http_client
            .post(endpoint)
            .header("apikey", self.service_role_key.as_str())
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", session.access_token()),
            )
            .send()
            .await
            .map_err(|error| {
                AppError::Provider(format!("failed to call sign-out endpoint: {error}"))
            })?;

        if !response.status().is_success() {
            return Err(AppError::Unauthorized(Self::failure_message(response).await));
        }

        *self.current_session.write().await = None;

        Ok(())
    }

    async fn session(&self) -> AppResult<Option<Session>> {
        Ok(self.current_session.read().await.clone())
    }

    async fn create_account(&self, email: &str, password: &str) -> AppResult<AccountId> {
        let endpoint = format!("{}/auth/v1/admin/users", self.base_url);
        let response = self
            .admin_request(reqwest::Method::POST, endpoint)
            .json(&CreateAccountRequest {
                email,
                password,
                email_confirm: true,
            })
            .send()
            .await
            .map_err(|error| {
                AppError::Provider(format!("failed to call account-creation endpoint: {error}"))
            })?;

        if !response.status().is_success() {
            return Err(AppError::Provider(Self::failure_message(response).await));
        }

        let account = response.json::<AccountResponse>().await.map_err(|error| {
            AppError::Provider(format!(
                "failed to parse account-creation response body: {error}"
            ))
        })?;

        Ok(AccountId::new(account.id))
    }

    async fn delete_account(&self, account_id: &AccountId) -> AppResult<()> {
        let endpoint = format!("{}/auth/v1/admin/users/{account_id}", self.base_url);
        let response = self
            .admin_request(reqwest::Method::DELETE, endpoint)
            .send()
            .await
            .map_err(|error| {
                AppError::Provider(format!("failed to call account-deletion endpoint: {error}"))
            })?;

        if !response.status().is_success() {
            return Err(AppError::Provider(Self::failure_message(response).await));
        }

        Ok(())
    }

    async fn set_password(&self, account_id: &AccountId, password: &str) -> AppResult<()> {
        let endpoint = format!("{}/auth/v1/admin/users/{account_id}", self.base_url);
        let response = self
            .admin_request(reqwest::Method::PUT, endpoint)
            .json(&SetPasswordRequest { password })
            .send()
            .await
            .map_err(|error| {
                AppError::Provider(format!("failed to call password-update endpoint: {error}"))
            })?;

        if !response.status().is_success() {
            return Err(AppError::Provider(Self::failure_message(response).await));
        }

        Ok(())
    }

    async fn list_accounts(&self, page: u32, page_size: u32) -> AppResult<Vec<ProviderAccount>> {
        let endpoint = format!("{}/auth/v1/admin/users", self.base_url);
        let response = self
            .admin_request(reqwest::Method::GET, endpoint)
            .query(&[("page", page), ("per_page", page_size)])
            .send()
            .await
            .map_err(|error| {
                AppError::Provider(format!("failed to call account-listing endpoint: {error}"))
            })?;

        if !response.status().is_success() {
            return Err(AppError::Provider(Self::failure_message(response).await));
        }

        let listing = response
            .json::<AccountListResponse>()
            .await
            .map_err(|error| {
                AppError::Provider(format!(
                    "failed to parse account-listing response body: {error}"
                ))
            })?;

        Ok(listing
            .users
            .into_iter()
            .map(AccountResponse::into_account)
            .collect())
    }
}
