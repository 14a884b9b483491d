//! # Permissions
//!
//! Core permission types for the RBAC system.
//! A permission's identity is its `(resource, action)` pair; the catalog
//! entry adds a scope class, a category, and a human-readable name.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::resources::Resource;
use crate::scope::{PermissionCategory, PermissionScope};

/// The identity of a permission: a `(resource, action)` pair.
///
/// Keys display and parse as `"resource:action"`. This string form is the
/// permission id carried in audit entries and decision results.
///
/// # Example
///
/// ```
/// use flock_rbac::permissions::PermissionKey;
/// use flock_rbac::resources::Resource;
/// use flock_rbac::actions::Action;
///
/// let key = PermissionKey::new(Resource::Events, Action::Create);
/// assert_eq!(key.to_string(), "events:create");
/// assert_eq!(PermissionKey::parse("events:create"), Some(key));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PermissionKey {
    /// The resource type this permission applies to.
    pub resource: Resource,
    /// The action allowed on the resource.
    pub action: Action,
}

impl PermissionKey {
    /// Create a new permission key.
    pub fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }

    /// Parse a key from its `"resource:action"` string form.
    ///
    /// # Returns
    ///
    /// `Some(PermissionKey)` if both halves parse, `None` otherwise
    pub fn parse(s: &str) -> Option<Self> {
        let (resource, action) = s.split_once(':')?;
        Some(Self {
            resource: Resource::parse(resource)?,
            action: Action::parse(action)?,
        })
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource.as_str(), self.action.as_str())
    }
}

/// A catalog entry: a permission key plus its descriptive attributes.
///
/// The key is immutable once the entry is referenced by a role; entries are
/// deactivated rather than removed, and the decision engine filters on
/// `active`.
///
/// # Example
///
/// ```
/// use flock_rbac::permissions::Permission;
/// use flock_rbac::resources::Resource;
/// use flock_rbac::actions::Action;
/// use flock_rbac::scope::{PermissionCategory, PermissionScope};
///
/// let permission = Permission::new(
///     Resource::Events,
///     Action::Create,
///     PermissionScope::Church,
///     PermissionCategory::Core,
/// )
/// .with_name("Create events")
/// .with_description("Create services and calendar events");
///
/// assert_eq!(permission.key.to_string(), "events:create");
/// assert!(permission.active);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permission {
    /// The permission's identity.
    pub key: PermissionKey,

    /// Human-readable name shown in the role-management UI.
    pub name: String,

    /// Longer description of what the permission grants.
    pub description: String,

    /// The scope class limiting where the permission applies.
    pub scope: PermissionScope,

    /// The functional category, used for grouping in the UI.
    pub category: PermissionCategory,

    /// Whether the permission is currently grantable.
    pub active: bool,
}

impl Permission {
    /// Create a new active permission.
    ///
    /// The name defaults to the key's string form; use [`with_name`] and
    /// [`with_description`] to attach readable text.
    ///
    /// [`with_name`]: Permission::with_name
    /// [`with_description`]: Permission::with_description
    pub fn new(
        resource: Resource,
        action: Action,
        scope: PermissionScope,
        category: PermissionCategory,
    ) -> Self {
        let key = PermissionKey::new(resource, action);
        Self {
            key,
            name: key.to_string(),
            description: String::new(),
            scope,
            category,
            active: true,
        }
    }

    /// Set the human-readable name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
