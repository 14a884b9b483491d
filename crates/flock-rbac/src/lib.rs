//! # Flock RBAC (Permission Vocabulary)
//!
//! This crate provides the permission vocabulary for the Flock platform,
//! shared across the Admin, People, and Giving applications.
//!
//! ## Overview
//!
//! The flock-rbac crate handles:
//! - **Resources**: All resource types across the church-management domain
//! - **Actions**: Operations that can be performed on resources
//! - **Permissions**: Resource + Action identities with scope and category
//! - **Catalog**: The keyed registry of grantable permissions
//!
//! ## Architecture
//!
//! ```text
//! PermissionKey = Resource + Action        (identity, unique)
//! Permission    = key + scope + category   (catalog entry)
//!
//! Examples:
//!   "people:read"     - View member records (church scope)
//!   "events:create"   - Create events (church scope)
//!   "profile:update"  - Update own profile (self scope)
//! ```
//!
//! ## Scope Classes
//!
//! Every permission carries a scope class limiting where it applies:
//! `global` (everywhere), `church` and `team` (within ids named by the
//! holder's assignment), and `self` (the subject's own records).
//!
//! ## Usage
//!
//! ```rust
//! use flock_rbac::{Action, Permission, PermissionCatalog, PermissionKey, Resource};
//!
//! // The default catalog is seeded from a static table at startup.
//! let catalog = PermissionCatalog::builtin();
//!
//! let key = PermissionKey::new(Resource::Events, Action::Create);
//! assert_eq!(key.to_string(), "events:create");
//! assert!(catalog.is_grantable(&key));
//! ```
//!
//! ## Integration with flock-access
//!
//! This crate is the leaf of the access-control stack. The `flock-access`
//! crate layers roles, assignments, the decision engine, and auditing on
//! top of the catalog defined here.

pub mod actions;
pub mod catalog;
pub mod permissions;
pub mod resources;
pub mod scope;

// Re-export main types for convenience
pub use actions::Action;
pub use catalog::{CatalogError, CatalogResult, PermissionCatalog, PermissionFilter};
pub use permissions::{Permission, PermissionKey};
pub use resources::Resource;
pub use scope::{PermissionCategory, PermissionScope};
