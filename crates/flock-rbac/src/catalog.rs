//! # Permission Catalog
//!
//! The keyed registry of every permission the platform knows about.
//! The catalog is seeded at startup from a static table ([`PermissionCatalog::builtin`])
//! and mutated only through [`register`](PermissionCatalog::register) and
//! [`deactivate`](PermissionCatalog::deactivate). Deactivation does not
//! cascade: roles referencing a deactivated permission silently stop
//! granting it, because the decision engine filters on `active`.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::actions::Action;
use crate::permissions::{Permission, PermissionKey};
use crate::resources::Resource;
use crate::scope::{PermissionCategory, PermissionScope};

/// Catalog error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A permission with the same `(resource, action)` identity already exists.
    #[error("Permission already registered: {0}")]
    DuplicateResourceAction(PermissionKey),

    /// No permission with this identity exists.
    #[error("Permission not found: {0}")]
    NotFound(PermissionKey),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    /// Get the error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            CatalogError::DuplicateResourceAction(_) => "DUPLICATE_RESOURCE_ACTION",
            CatalogError::NotFound(_) => "PERMISSION_NOT_FOUND",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            CatalogError::DuplicateResourceAction(_) => 409,
            CatalogError::NotFound(_) => 404,
        }
    }
}

/// Filter for catalog listings.
///
/// All predicates are optional and combine with AND semantics.
///
/// # Example
///
/// ```
/// use flock_rbac::catalog::{PermissionCatalog, PermissionFilter};
/// use flock_rbac::scope::PermissionCategory;
///
/// let catalog = PermissionCatalog::builtin();
/// let filter = PermissionFilter::new().with_category(PermissionCategory::Financial);
/// assert!(!catalog.list(&filter).is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PermissionFilter {
    /// Only permissions on this resource.
    pub resource: Option<Resource>,
    /// Only permissions in this category.
    pub category: Option<PermissionCategory>,
    /// Only permissions with this scope class.
    pub scope: Option<PermissionScope>,
}

impl PermissionFilter {
    /// Create an empty filter matching every permission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one resource.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Restrict to one category.
    pub fn with_category(mut self, category: PermissionCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Restrict to one scope class.
    pub fn with_scope(mut self, scope: PermissionScope) -> Self {
        self.scope = Some(scope);
        self
    }

    fn matches(&self, permission: &Permission) -> bool {
        self.resource.map_or(true, |r| permission.key.resource == r)
            && self.category.map_or(true, |c| permission.category == c)
            && self.scope.map_or(true, |s| permission.scope == s)
    }
}

/// Static table row: `(resource, action, scope, category, name, description)`.
type BuiltinPermission = (
    Resource,
    Action,
    PermissionScope,
    PermissionCategory,
    &'static str,
    &'static str,
);

/// The default permission table, loaded at startup.
///
/// Identity is `(resource, action)`; each pair appears at most once.
const BUILTIN_PERMISSIONS: &[BuiltinPermission] = &[
    // Global / administration
    (Resource::Roles, Action::Manage, PermissionScope::Global, PermissionCategory::Admin,
     "Manage roles", "Create, edit, and delete role definitions"),
    (Resource::Roles, Action::Read, PermissionScope::Global, PermissionCategory::Admin,
     "View roles", "View role definitions and their permissions"),
    (Resource::Roles, Action::Approve, PermissionScope::Global, PermissionCategory::Admin,
     "Approve role requests", "Approve or reject pending role requests"),
    (Resource::Settings, Action::Manage, PermissionScope::Global, PermissionCategory::Admin,
     "Manage settings", "Change platform-wide settings"),
    (Resource::AuditLog, Action::Read, PermissionScope::Global, PermissionCategory::Admin,
     "View audit log", "Query the access-control audit trail"),
    (Resource::People, Action::Import, PermissionScope::Global, PermissionCategory::Admin,
     "Import people", "Bulk-import member records"),
    (Resource::People, Action::Export, PermissionScope::Global, PermissionCategory::Admin,
     "Export people", "Bulk-export member records"),
    (Resource::Reports, Action::Read, PermissionScope::Global, PermissionCategory::Core,
     "View reports", "View generated reports"),
    (Resource::Reports, Action::Export, PermissionScope::Global, PermissionCategory::Admin,
     "Export reports", "Download generated reports"),
    (Resource::Kpis, Action::Manage, PermissionScope::Global, PermissionCategory::Ministry,
     "Manage KPIs", "Define and configure key performance indicators"),
    // Church-scoped membership and events
    (Resource::People, Action::Read, PermissionScope::Church, PermissionCategory::Core,
     "View people", "View member and visitor records"),
    (Resource::People, Action::List, PermissionScope::Church, PermissionCategory::Core,
     "Browse people", "Search and browse the member directory"),
    (Resource::People, Action::Create, PermissionScope::Church, PermissionCategory::Core,
     "Add people", "Add new member and visitor records"),
    (Resource::People, Action::Update, PermissionScope::Church, PermissionCategory::Core,
     "Edit people", "Edit member and visitor records"),
    (Resource::People, Action::Delete, PermissionScope::Church, PermissionCategory::Admin,
     "Delete people", "Permanently remove member records"),
    (Resource::Households, Action::Read, PermissionScope::Church, PermissionCategory::Core,
     "View households", "View household groupings"),
    (Resource::Households, Action::Update, PermissionScope::Church, PermissionCategory::Core,
     "Edit households", "Edit household groupings"),
    (Resource::Events, Action::Read, PermissionScope::Church, PermissionCategory::Core,
     "View events", "View services and calendar events"),
    (Resource::Events, Action::Create, PermissionScope::Church, PermissionCategory::Core,
     "Create events", "Create services and calendar events"),
    (Resource::Events, Action::Update, PermissionScope::Church, PermissionCategory::Core,
     "Edit events", "Edit services and calendar events"),
    (Resource::Events, Action::Delete, PermissionScope::Church, PermissionCategory::Admin,
     "Delete events", "Remove services and calendar events"),
    (Resource::Locations, Action::Read, PermissionScope::Church, PermissionCategory::Core,
     "View locations", "View locations and rooms"),
    (Resource::Locations, Action::Manage, PermissionScope::Church, PermissionCategory::Admin,
     "Manage locations", "Add, edit, and remove locations and rooms"),
    (Resource::Churches, Action::Update, PermissionScope::Church, PermissionCategory::Admin,
     "Manage church profile", "Edit the church's profile and contact details"),
    // Church-scoped finance
    (Resource::Donations, Action::Read, PermissionScope::Church, PermissionCategory::Financial,
     "View donations", "View giving and donation records"),
    (Resource::Donations, Action::Create, PermissionScope::Church, PermissionCategory::Financial,
     "Record donations", "Record new donations"),
    (Resource::Donations, Action::Export, PermissionScope::Church, PermissionCategory::Financial,
     "Export donations", "Export giving statements and donation data"),
    // Church-scoped ministry
    (Resource::Kpis, Action::Read, PermissionScope::Church, PermissionCategory::Ministry,
     "View KPIs", "View key performance indicators"),
    (Resource::Kpis, Action::Update, PermissionScope::Church, PermissionCategory::Ministry,
     "Update KPIs", "Record KPI measurements"),
    (Resource::Evaluations, Action::Read, PermissionScope::Church, PermissionCategory::Ministry,
     "View evaluations", "View ministry evaluations"),
    (Resource::Evaluations, Action::Create, PermissionScope::Church, PermissionCategory::Ministry,
     "Create evaluations", "Create ministry evaluations"),
    (Resource::Notifications, Action::Send, PermissionScope::Church, PermissionCategory::Ministry,
     "Send notifications", "Send notifications and announcements"),
    // Team-scoped ministry
    (Resource::Teams, Action::Read, PermissionScope::Team, PermissionCategory::Ministry,
     "View teams", "View ministry team rosters"),
    (Resource::Teams, Action::Update, PermissionScope::Team, PermissionCategory::Ministry,
     "Manage team rosters", "Edit ministry team rosters"),
    (Resource::Groups, Action::Manage, PermissionScope::Team, PermissionCategory::Ministry,
     "Manage groups", "Manage small groups attached to a team"),
    (Resource::Evaluations, Action::Update, PermissionScope::Team, PermissionCategory::Ministry,
     "Edit evaluations", "Edit evaluations for the team's ministries"),
    // Self-scoped
    (Resource::Profile, Action::Read, PermissionScope::SelfOnly, PermissionCategory::Core,
     "View own profile", "View the subject's own profile"),
    (Resource::Profile, Action::Update, PermissionScope::SelfOnly, PermissionCategory::Core,
     "Update own profile", "Edit the subject's own profile"),
    (Resource::Notifications, Action::Read, PermissionScope::SelfOnly, PermissionCategory::Core,
     "View own notifications", "View notifications addressed to the subject"),
];

/// The keyed store of permission entries.
///
/// Uses a `BTreeMap` keyed by [`PermissionKey`] so listings are
/// deterministic. The catalog is read-shared by every permission check and
/// written rarely; callers are expected to guard it with a reader-friendly
/// lock.
///
/// # Example
///
/// ```
/// use flock_rbac::catalog::PermissionCatalog;
/// use flock_rbac::permissions::PermissionKey;
///
/// let catalog = PermissionCatalog::builtin();
/// let key = PermissionKey::parse("events:create").unwrap();
/// assert!(catalog.is_grantable(&key));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PermissionCatalog {
    entries: BTreeMap<PermissionKey, Permission>,
}

impl PermissionCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog seeded from the built-in permission table.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for &(resource, action, scope, category, name, description) in BUILTIN_PERMISSIONS {
            let permission = Permission::new(resource, action, scope, category)
                .with_name(name)
                .with_description(description);
            catalog
                .register(permission)
                .expect("builtin permission table must not contain duplicate keys");
        }
        catalog
    }

    /// Register a new permission.
    ///
    /// # Errors
    ///
    /// [`CatalogError::DuplicateResourceAction`] if a permission with the
    /// same `(resource, action)` identity exists, active or not.
    pub fn register(&mut self, permission: Permission) -> CatalogResult<PermissionKey> {
        let key = permission.key;
        if self.entries.contains_key(&key) {
            return Err(CatalogError::DuplicateResourceAction(key));
        }
        self.entries.insert(key, permission);
        Ok(key)
    }

    /// Get a permission by key.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotFound`] if no permission with this key exists.
    pub fn get(&self, key: &PermissionKey) -> CatalogResult<&Permission> {
        self.entries.get(key).ok_or(CatalogError::NotFound(*key))
    }

    /// Look up a permission by key, returning `None` if absent.
    pub fn find(&self, key: &PermissionKey) -> Option<&Permission> {
        self.entries.get(key)
    }

    /// Check whether a permission exists and is active.
    pub fn is_grantable(&self, key: &PermissionKey) -> bool {
        self.entries.get(key).map_or(false, |p| p.active)
    }

    /// List permissions matching a filter, in key order.
    pub fn list(&self, filter: &PermissionFilter) -> Vec<&Permission> {
        self.entries
            .values()
            .filter(|p| filter.matches(p))
            .collect()
    }

    /// Deactivate a permission.
    ///
    /// Deactivation does not cascade to roles; the decision engine filters
    /// on `active`. Deactivating an already-inactive permission is a no-op.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NotFound`] if no permission with this key exists.
    pub fn deactivate(&mut self, key: &PermissionKey) -> CatalogResult<()> {
        let permission = self
            .entries
            .get_mut(key)
            .ok_or(CatalogError::NotFound(*key))?;
        permission.active = false;
        Ok(())
    }

    /// Number of registered permissions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over every entry in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Permission {
        Permission::new(
            Resource::Events,
            Action::Create,
            PermissionScope::Church,
            PermissionCategory::Core,
        )
        .with_name("Create events")
    }

    #[test]
    fn test_register_and_get() {
        let mut catalog = PermissionCatalog::new();
        let key = catalog.register(sample()).unwrap();
        assert_eq!(key.to_string(), "events:create");

        let entry = catalog.get(&key).unwrap();
        assert_eq!(entry.name, "Create events");
    }

    #[test]
    fn test_register_duplicate() {
        let mut catalog = PermissionCatalog::new();
        catalog.register(sample()).unwrap();

        let err = catalog.register(sample()).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateResourceAction(_)));
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_register_never_resurrects() {
        let mut catalog = PermissionCatalog::new();
        let key = catalog.register(sample()).unwrap();
        catalog.deactivate(&key).unwrap();

        // A deactivated key still owns its identity.
        let err = catalog.register(sample()).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateResourceAction(_)));
    }

    #[test]
    fn test_get_not_found() {
        let catalog = PermissionCatalog::new();
        let key = PermissionKey::new(Resource::People, Action::Read);
        let err = catalog.get(&key).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_deactivate() {
        let mut catalog = PermissionCatalog::new();
        let key = catalog.register(sample()).unwrap();
        assert!(catalog.is_grantable(&key));

        catalog.deactivate(&key).unwrap();
        assert!(!catalog.is_grantable(&key));
        // Entry survives deactivation.
        assert!(catalog.find(&key).is_some());

        // Deactivating again is a no-op.
        catalog.deactivate(&key).unwrap();
        assert!(!catalog.is_grantable(&key));
    }

    #[test]
    fn test_list_filters() {
        let catalog = PermissionCatalog::builtin();

        let people = catalog.list(&PermissionFilter::new().with_resource(Resource::People));
        assert!(people.iter().all(|p| p.key.resource == Resource::People));
        assert!(!people.is_empty());

        let financial =
            catalog.list(&PermissionFilter::new().with_category(PermissionCategory::Financial));
        assert!(financial.iter().all(|p| p.category == PermissionCategory::Financial));

        let self_scoped =
            catalog.list(&PermissionFilter::new().with_scope(PermissionScope::SelfOnly));
        assert!(self_scoped.iter().all(|p| p.scope == PermissionScope::SelfOnly));

        let everything = catalog.list(&PermissionFilter::new());
        assert_eq!(everything.len(), catalog.len());
    }

    #[test]
    fn test_builtin_table_is_duplicate_free() {
        // Constructing the builtin catalog would panic on a duplicate key.
        let catalog = PermissionCatalog::builtin();
        assert_eq!(catalog.len(), BUILTIN_PERMISSIONS.len());
    }

    #[test]
    fn test_builtin_contains_church_event_creation() {
        let catalog = PermissionCatalog::builtin();
        let key = PermissionKey::new(Resource::Events, Action::Create);
        let entry = catalog.get(&key).unwrap();
        assert_eq!(entry.scope, PermissionScope::Church);
    }
}
