use std::str::FromStr;

use async_trait::async_trait;

use reqwest::{StatusCode, header};
use serde::{Deserialize, Serialize};

use streamgate_application::RoleStore;
use streamgate_core::{AccountId, AppError, AppResult};
use streamgate_domain::{ProfileRecord, Role, RoleAssignmentRecord};

/// HTTP client for a PostgREST-compatible role store.
///
/// Reads and mutates the `profiles` and `user_roles` tables as plain
/// rows; the store performs no joins. Insert conflicts are ignored and
/// upserts merge on their natural keys, which keeps every mutation
/// individually safe to repeat.
#[derive(Clone)]
pub struct HttpRoleStore {
    http_client: reqwest::Client,
    base_url: String,
    service_role_key: String,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    account_id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct RoleAssignmentRow {
    account_id: String,
    role: String,
}

#[derive(Debug, Serialize)]
struct ProfileUpsert<'a> {
    account_id: &'a str,
    username: &'a str,
}

#[derive(Debug, Serialize)]
struct RoleAssignmentInsert<'a> {
    account_id: &'a str,
    role: &'a str,
}

impl RoleAssignmentRow {
    fn into_record(self) -> AppResult<RoleAssignmentRecord> {
        let role = Role::from_str(self.role.as_str()).map_err(|error| {
            AppError::StoreUnavailable(format!(
                "failed to decode role '{}' for account '{}': {error}",
                self.role, self.account_id
            ))
        })?;

        Ok(RoleAssignmentRecord {
            account_id: AccountId::new(self.account_id),
            role,
        })
    }
}

impl HttpRoleStore {
    /// Creates a client for the store at `base_url`, authorized with the
    /// given service-role key.
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
        }
    }

    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        let endpoint = format!("{}/rest/v1/{table}", self.base_url);
        self.http_client
            .request(method, endpoint)
            .header("apikey", self.service_role_key.as_str())
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.service_role_key),
            )
    }

    async fn failure(context: &str, response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_owned());

        AppError::StoreUnavailable(format!(
            "{context} returned status {}: {body}",
            status.as_u16()
        ))
    }

    fn transport_failure(context: &str, error: reqwest::Error) -> AppError {
        AppError::StoreUnavailable(format!("failed to call {context}: {error}"))
    }

    async fn read_assignment_rows(
        &self,
        filters: &[(&str, String)],
    ) -> AppResult<Vec<RoleAssignmentRecord>> {
        let response = self
            .request(reqwest::Method::GET, "user_roles")
            .query(&[("select", "account_id,role")])
            .query(filters)
            .send()
            .await
            .map_err(|error| Self::transport_failure("user_roles read", error))?;

        if !response.status().is_success() {
            return Err(Self::failure("user_roles read", response).await);
        }

        let rows = response
            .json::<Vec<RoleAssignmentRow>>()
            .await
            .map_err(|error| {
                AppError::StoreUnavailable(format!(
                    "failed to parse user_roles response body: {error}"
                ))
            })?;

        rows.into_iter()
            .map(RoleAssignmentRow::into_record)
            .collect()
    }
}

#[async_trait]
impl RoleStore for HttpRoleStore {
    async fn read_profiles(&self) -> AppResult<Vec<ProfileRecord>> {
        let response = self
            .request(reqwest::Method::GET, "profiles")
            .query(&[("select", "account_id,username")])
            .send()
            .await
            .map_err(|error| Self::transport_failure("profiles read", error))?;

        if !response.status().is_success() {
            return Err(Self::failure("profiles read", response).await);
        }

        let rows = response.json::<Vec<ProfileRow>>().await.map_err(|error| {
            AppError::StoreUnavailable(format!("failed to parse profiles response body: {error}"))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| ProfileRecord {
                account_id: AccountId::new(row.account_id),
                username: row.username,
            })
            .collect())
    }

    async fn read_role_assignments(&self) -> AppResult<Vec<RoleAssignmentRecord>> {
        self.read_assignment_rows(&[]).await
    }

    async fn has_assignment_with_role(&self, role: Role) -> AppResult<bool> {
        let rows = self
            .read_assignment_rows(&[
                ("role", format!("eq.{}", role.as_str())),
                ("limit", "1".to_owned()),
            ])
            .await?;

        Ok(!rows.is_empty())
    }

    async fn insert_role_assignment(&self, account_id: &AccountId, role: Role) -> AppResult<()> {
        let response = self
            .request(reqwest::Method::POST, "user_roles")
            .query(&[("on_conflict", "account_id,role")])
            .header("Prefer", "resolution=ignore-duplicates,return=minimal")
            .json(&RoleAssignmentInsert {
                account_id: account_id.as_str(),
                role: role.as_str(),
            })
            .send()
            .await
            .map_err(|error| Self::transport_failure("user_roles insert", error))?;

        // A conflicting row means the role is already held; designed no-op.
        if response.status() == StatusCode::CONFLICT {
            tracing::debug!(
                account_id = %account_id,
                role = role.as_str(),
                "duplicate role assignment ignored"
            );
            return Ok(());
        }

        if !response.status().is_success() {
            return Err(Self::failure("user_roles insert", response).await);
        }

        Ok(())
    }

    async fn delete_role_assignment(&self, account_id: &AccountId, role: Role) -> AppResult<()> {
        let response = self
            .request(reqwest::Method::DELETE, "user_roles")
            .query(&[
                ("account_id", format!("eq.{account_id}")),
                ("role", format!("eq.{}", role.as_str())),
            ])
            .send()
            .await
            .map_err(|error| Self::transport_failure("user_roles delete", error))?;

        if !response.status().is_success() {
            return Err(Self::failure("user_roles delete", response).await);
        }

        Ok(())
    }

    async fn upsert_profile(&self, account_id: &AccountId, username: &str) -> AppResult<()> {
        let response = self
            .request(reqwest::Method::POST, "profiles")
            .query(&[("on_conflict", "account_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&ProfileUpsert {
                account_id: account_id.as_str(),
                username,
            })
            .send()
            .await
            .map_err(|error| Self::transport_failure("profiles upsert", error))?;

        if !response.status().is_success() {
            return Err(Self::failure("profiles upsert", response).await);
        }

        Ok(())
    }

    async fn upsert_role_assignment(&self, account_id: &AccountId, role: Role) -> AppResult<()> {
        let response = self
            .request(reqwest::Method::POST, "user_roles")
            .query(&[("on_conflict", "account_id,role")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&RoleAssignmentInsert {
                account_id: account_id.as_str(),
                role: role.as_str(),
            })
            .send()
            .await
            .map_err(|error| Self::transport_failure("user_roles upsert", error))?;

        if !response.status().is_success() {
            return Err(Self::failure("user_roles upsert", response).await);
        }

        Ok(())
    }
}
