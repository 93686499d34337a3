use async_trait::async_trait;

use streamgate_core::{AccountId, AppResult};
use streamgate_domain::{ProfileRecord, Role, RoleAssignmentRecord};

/// Client port for the external relational role store.
///
/// The store exposes plain row reads and mutations over the `profiles`
/// and `user_roles` tables; it performs no joins. All failures surface
/// as `AppError::StoreUnavailable`.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Reads all profile rows.
    async fn read_profiles(&self) -> AppResult<Vec<ProfileRecord>>;

    /// Reads all role-assignment rows.
    async fn read_role_assignments(&self) -> AppResult<Vec<RoleAssignmentRecord>>;

    /// Returns true when at least one assignment of `role` exists.
    /// Filtered store-side and limited to a single row.
    async fn has_assignment_with_role(&self, role: Role) -> AppResult<bool>;

    /// Inserts a role-assignment row. A conflict with an existing
    /// `(account_id, role)` row is ignored, not an error.
    async fn insert_role_assignment(&self, account_id: &AccountId, role: Role) -> AppResult<()>;

    /// Deletes a role-assignment row. Deleting an absent row is a no-op.
    async fn delete_role_assignment(&self, account_id: &AccountId, role: Role) -> AppResult<()>;

    /// Inserts or updates the profile row keyed on `account_id`.
    async fn upsert_profile(&self, account_id: &AccountId, username: &str) -> AppResult<()>;

    /// Inserts or updates the assignment row keyed on `(account_id, role)`.
    async fn upsert_role_assignment(&self, account_id: &AccountId, role: Role) -> AppResult<()>;
}
