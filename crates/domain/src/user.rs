//! User-facing records, the derived user view, and local validation rules.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use streamgate_core::{AccountId, AppError, AppResult};

use crate::Role;

/// Minimum trimmed email length accepted before calling the provider.
pub const EMAIL_MIN_LENGTH: usize = 3;

/// Minimum password length accepted before calling the provider.
pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Validates an email address locally.
///
/// Intentionally shallow: the identity provider is the authority on
/// address deliverability; this only rejects obviously truncated input
/// before a remote call is made.
pub fn validate_email(email: &str) -> AppResult<()> {
    if email.trim().chars().count() < EMAIL_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "email must be at least {EMAIL_MIN_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Validates a plaintext password locally before a remote call is made.
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Profile row read from the role store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Account the profile belongs to.
    pub account_id: AccountId,
    /// Display username shown on the console.
    pub username: String,
}

/// Role assignment row read from the role store.
///
/// Rows are unique per `(account_id, role)`; the store enforces the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignmentRecord {
    /// Account holding the role.
    pub account_id: AccountId,
    /// The held role.
    pub role: Role,
}

/// Derived read-only aggregate of a profile joined with its role
/// assignments. Never persisted; recomputed on every query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    /// Account identifier.
    pub id: AccountId,
    /// Display username from the profile row.
    pub username: String,
    /// Roles currently held by the account.
    pub roles: BTreeSet<Role>,
}

impl UserView {
    /// Returns true when the account holds the privileged `admin` role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    /// Joins profile and role-assignment rows into user views.
    ///
    /// The role store exposes no native join, so assignments are grouped
    /// by account identifier client-side and attached to their profile.
    /// Assignments without a matching profile row are dropped, matching
    /// the console, which only renders profiled accounts.
    #[must_use]
    pub fn join(profiles: Vec<ProfileRecord>, assignments: Vec<RoleAssignmentRecord>) -> Vec<Self> {
        let mut roles_by_account: BTreeMap<AccountId, BTreeSet<Role>> = BTreeMap::new();
        for assignment in assignments {
            roles_by_account
                .entry(assignment.account_id)
                .or_default()
                .insert(assignment.role);
        }

        profiles
            .into_iter()
            .map(|profile| {
                let roles = roles_by_account
                    .remove(&profile.account_id)
                    .unwrap_or_default();
                Self {
                    id: profile.account_id,
                    username: profile.username,
                    roles,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use streamgate_core::AccountId;

    use super::{ProfileRecord, RoleAssignmentRecord, UserView, validate_email, validate_password};
    use crate::Role;

    fn profile(account_id: &str, username: &str) -> ProfileRecord {
        ProfileRecord {
            account_id: AccountId::new(account_id),
            username: username.to_owned(),
        }
    }

    fn assignment(account_id: &str, role: Role) -> RoleAssignmentRecord {
        RoleAssignmentRecord {
            account_id: AccountId::new(account_id),
            role,
        }
    }

    #[test]
    fn email_shorter_than_three_characters_is_rejected() {
        assert!(validate_email("ab").is_err());
        assert!(validate_email("   ab   ").is_err());
        assert!(validate_email("abc").is_ok());
    }

    #[test]
    fn password_shorter_than_six_characters_is_rejected() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn join_groups_assignments_by_account() {
        let views = UserView::join(
            vec![profile("a", "alice"), profile("b", "bob")],
            vec![
                assignment("a", Role::SaveLists),
                assignment("a", Role::LoadLists),
                assignment("b", Role::Admin),
            ],
        );

        assert_eq!(views.len(), 2);
        assert_eq!(
            views[0].roles,
            [Role::SaveLists, Role::LoadLists].into_iter().collect()
        );
        assert!(!views[0].is_admin());
        assert!(views[1].is_admin());
    }

    #[test]
    fn join_keeps_profiles_without_assignments() {
        let views = UserView::join(vec![profile("a", "alice")], Vec::new());

        assert_eq!(views.len(), 1);
        assert!(views[0].roles.is_empty());
    }

    #[test]
    fn join_drops_assignments_without_profiles() {
        let views = UserView::join(
            vec![profile("a", "alice")],
            vec![assignment("ghost", Role::Admin)],
        );

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].id, AccountId::new("a"));
    }
}
