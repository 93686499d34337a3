//! Domain types for the Streamgate RBAC management core.

#![forbid(unsafe_code)]

mod role;
mod user;

pub use role::Role;
pub use user::{
    EMAIL_MIN_LENGTH, PASSWORD_MIN_LENGTH, ProfileRecord, RoleAssignmentRecord, UserView,
    validate_email, validate_password,
};
