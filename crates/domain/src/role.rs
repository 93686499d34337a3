use std::str::FromStr;

use serde::{Deserialize, Serialize};
use streamgate_core::AppError;

/// Permission roles assignable to an account.
///
/// The set is fixed; roles are flags consumed by the console, not a policy
/// language. `Admin` is the privileged sentinel: accounts holding it are
/// immutable through this subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Allows registering new streams on the console.
    AddStreams,
    /// Allows persisting stream lists.
    SaveLists,
    /// Allows loading persisted stream lists.
    LoadLists,
    /// Allows downloading stream logs.
    DownloadLogs,
    /// Allows removing streams from the console.
    DeleteStreams,
    /// Privileged sentinel; grants full administration rights.
    Admin,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddStreams => "add_streams",
            Self::SaveLists => "save_lists",
            Self::LoadLists => "load_lists",
            Self::DownloadLogs => "download_logs",
            Self::DeleteStreams => "delete_streams",
            Self::Admin => "admin",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::AddStreams,
            Role::SaveLists,
            Role::LoadLists,
            Role::DownloadLogs,
            Role::DeleteStreams,
            Role::Admin,
        ];

        ALL
    }

    /// Returns the roles offered by the management surface, i.e. all
    /// roles except the `admin` sentinel.
    #[must_use]
    pub fn assignable() -> &'static [Self] {
        const ASSIGNABLE: &[Role] = &[
            Role::AddStreams,
            Role::SaveLists,
            Role::LoadLists,
            Role::DownloadLogs,
            Role::DeleteStreams,
        ];

        ASSIGNABLE
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "add_streams" => Ok(Self::AddStreams),
            "save_lists" => Ok(Self::SaveLists),
            "load_lists" => Ok(Self::LoadLists),
            "download_logs" => Ok(Self::DownloadLogs),
            "delete_streams" => Ok(Self::DeleteStreams),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::Role;

    #[test]
    fn storage_values_round_trip() {
        for role in Role::all() {
            let parsed = Role::from_str(role.as_str());
            assert_eq!(parsed.ok(), Some(*role));
        }
    }

    #[test]
    fn unknown_value_is_rejected() {
        assert!(Role::from_str("superuser").is_err());
    }

    #[test]
    fn assignable_excludes_admin() {
        assert!(!Role::assignable().contains(&Role::Admin));
        assert_eq!(Role::assignable().len(), Role::all().len() - 1);
    }

    #[test]
    fn serde_encoding_matches_storage_value() {
        for role in Role::all() {
            let encoded = serde_json::to_string(role).ok();
            assert_eq!(encoded, Some(format!("\"{}\"", role.as_str())));
        }
    }

    proptest! {
        #[test]
        fn arbitrary_strings_never_panic(value in ".*") {
            let _ = Role::from_str(&value);
        }
    }
}
