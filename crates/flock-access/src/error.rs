//! Error types for access-control operations
//!
//! This module defines all error types the access-control core can return:
//! validation errors, state conflicts, and not-found lookups. Expiry is
//! never an error; expired assignments simply drop out of the effective
//! set.

use thiserror::Error;
use uuid::Uuid;

use flock_rbac::{CatalogError, PermissionKey};

/// Access-control error types.
///
/// The taxonomy follows three families the admin UI renders differently:
/// validation errors (422), state conflicts (409), and not-found lookups
/// (404). Conflicts are never retried automatically; a retry would repeat
/// the same conflict.
#[derive(Debug, Error)]
pub enum AccessError {
    /// A role references a permission the catalog does not know.
    #[error("Unknown permission: {0}")]
    UnknownPermission(PermissionKey),

    /// No role with this id exists.
    #[error("Role not found: {0}")]
    RoleNotFound(Uuid),

    /// The role exists but is inactive and cannot be granted.
    #[error("Role is inactive: {0}")]
    RoleInactive(Uuid),

    /// The role still has active assignments.
    #[error("Role is referenced by {0} active assignment(s)")]
    RoleInUse(usize),

    /// System roles cannot be deleted.
    #[error("System roles cannot be deleted")]
    SystemRoleProtected,

    /// System role permission sets are fixed at creation.
    #[error("System role permissions cannot be modified")]
    ImmutableSystemRole,

    /// The user already holds an active assignment for this role.
    #[error("User {user_id} already holds an active assignment for role {role_id}")]
    DuplicateAssignment { user_id: String, role_id: Uuid },

    /// No active assignment matches the (user, role) pair.
    #[error("No active assignment found for this user and role")]
    AssignmentNotFound,

    /// The role has reached its maximum number of assignees.
    #[error("Role is at its maximum of {0} assignee(s)")]
    RoleAtCapacity(u32),

    /// The role must be granted through the request workflow.
    #[error("Role grants require approval through a role request")]
    RoleRequiresApproval,

    /// Church-specific roles need at least one church id in scope.
    #[error("Church-specific roles require at least one church id in the assignment scope")]
    ChurchScopeRequired,

    /// No role request with this id exists.
    #[error("Role request not found: {0}")]
    RequestNotFound(Uuid),

    /// The role request has already been approved or rejected.
    #[error("Role request has already been reviewed")]
    AlreadyReviewed,

    /// A catalog operation failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Result type for access-control operations.
pub type AccessResult<T> = Result<T, AccessError>;

impl AccessError {
    /// Get the error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AccessError::UnknownPermission(_) => "UNKNOWN_PERMISSION",
            AccessError::RoleNotFound(_) => "ROLE_NOT_FOUND",
            AccessError::RoleInactive(_) => "ROLE_INACTIVE",
            AccessError::RoleInUse(_) => "ROLE_IN_USE",
            AccessError::SystemRoleProtected => "SYSTEM_ROLE_PROTECTED",
            AccessError::ImmutableSystemRole => "IMMUTABLE_SYSTEM_ROLE",
            AccessError::DuplicateAssignment { .. } => "DUPLICATE_ASSIGNMENT",
            AccessError::AssignmentNotFound => "ASSIGNMENT_NOT_FOUND",
            AccessError::RoleAtCapacity(_) => "ROLE_AT_CAPACITY",
            AccessError::RoleRequiresApproval => "ROLE_REQUIRES_APPROVAL",
            AccessError::ChurchScopeRequired => "CHURCH_SCOPE_REQUIRED",
            AccessError::RequestNotFound(_) => "REQUEST_NOT_FOUND",
            AccessError::AlreadyReviewed => "ALREADY_REVIEWED",
            AccessError::Catalog(e) => e.error_code(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AccessError::UnknownPermission(_) | AccessError::ChurchScopeRequired => 422,

            AccessError::RoleInactive(_)
            | AccessError::RoleInUse(_)
            | AccessError::SystemRoleProtected
            | AccessError::ImmutableSystemRole
            | AccessError::DuplicateAssignment { .. }
            | AccessError::RoleAtCapacity(_)
            | AccessError::RoleRequiresApproval
            | AccessError::AlreadyReviewed => 409,

            AccessError::RoleNotFound(_)
            | AccessError::AssignmentNotFound
            | AccessError::RequestNotFound(_) => 404,

            AccessError::Catalog(e) => e.status_code(),
        }
    }

    /// Check whether this error is a state conflict (vs validation/not-found).
    ///
    /// Conflicts carry enough context for the collaborator to render an
    /// actionable message; they are never retried automatically.
    pub fn is_conflict(&self) -> bool {
        self.status_code() == 409
    }
}
