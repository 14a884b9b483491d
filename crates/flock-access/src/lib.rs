//! # Flock Access (Role-Based Access Control)
//!
//! This crate provides the access-control core for the Flock platform,
//! shared across the Admin, People, and Giving applications.
//!
//! ## Overview
//!
//! The flock-access crate handles:
//! - **Roles**: Named permission bundles with hierarchy levels and
//!   restrictions
//! - **Assignments**: Scoped, optionally time-limited grants of roles to
//!   subjects
//! - **Decisions**: Allow/deny answers for `(subject, resource, action,
//!   scope)` queries
//! - **Requests**: The approval workflow for restricted role grants
//! - **Audit**: An append-only trail of every decision and mutation
//!
//! ## Architecture
//!
//! ```text
//! AccessService
//!   ├── RequestQueue       pending/approved/rejected role requests
//!   ├── RoleRegistry       role definitions, validated against the catalog
//!   ├── AssignmentStore    subject -> role grants, expiry, scoping
//!   ├── PermissionCatalog  (from flock-rbac) the permission vocabulary
//!   └── AuditLog           append-only decision + mutation trail
//! ```
//!
//! Every registry is guarded by its own reader-friendly lock; the service
//! is constructed once at process start and passed to the transport layer.
//!
//! ## Usage
//!
//! ```rust
//! use flock_access::{AccessService, AssignmentScope, Role, ScopeContext};
//! use flock_rbac::{Action, PermissionKey, Resource};
//!
//! let service = AccessService::with_builtin();
//!
//! let role = service
//!     .create_role(
//!         Role::new("Greeter", "Welcomes visitors", 2)
//!             .with_permissions([PermissionKey::new(Resource::People, Action::Read)]),
//!     )
//!     .unwrap();
//!
//! service
//!     .assign_role("user-1", role.id, "admin-1", None, Some(AssignmentScope::churches(["church-1"])))
//!     .unwrap();
//!
//! assert!(service.has_permission(
//!     "user-1",
//!     Resource::People,
//!     Action::Read,
//!     &ScopeContext::for_church("church-1"),
//! ));
//! ```
//!
//! ## Error Model
//!
//! Operations return [`AccessResult`] with typed [`AccessError`] variants
//! split into validation errors, state conflicts, and not-found lookups,
//! each carrying an `error_code()` and `status_code()` for the API layer.
//! Assignment expiry is never an error: expired grants simply drop out of
//! the effective set.

pub mod assignment;
pub mod audit;
pub mod decision;
pub mod error;
pub mod request;
pub mod role;
pub mod service;

// Re-export main types for convenience
pub use assignment::{Assignment, AssignmentScope, AssignmentStore};
pub use audit::{AuditEntry, AuditFilter, AuditLog};
pub use decision::{Decision, DecisionEngine, ScopeContext};
pub use error::{AccessError, AccessResult};
pub use request::{RequestQueue, RequestStatus, ReviewDecision, RoleRequest};
pub use role::{builtin_roles, Role, RolePatch, RoleRegistry, RoleRestrictions, RoleType};
pub use service::AccessService;
