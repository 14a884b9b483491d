//! Role definitions and the role registry
//!
//! A role is a named bundle of permission keys with a numeric hierarchy
//! level and optional restrictions. The registry validates every permission
//! key against the catalog, protects system roles, and refuses edits or
//! deletes that would strand active assignments.
//!
//! The `level` field orders roles for display; it carries no permission
//! inheritance: a level-8 role grants exactly its own permission set.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use flock_rbac::{PermissionCatalog, PermissionKey};

use crate::error::{AccessError, AccessResult};

/// Whether a role is built into the platform or user-defined.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    /// Built-in role. Cannot be deleted; its permission set is fixed at
    /// creation (only `active` may toggle).
    System,
    /// User-defined role. Fully editable while it has no active
    /// assignments.
    Custom,
}

impl RoleType {
    /// Get the string representation of the role type.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::System => "system",
            RoleType::Custom => "custom",
        }
    }
}

/// Restrictions attached to a role.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleRestrictions {
    /// Maximum number of simultaneously active assignees, if bounded.
    pub max_assignees: Option<u32>,

    /// Whether assignments of this role must be scoped to at least one
    /// church.
    pub church_specific: bool,

    /// Whether grants of this role must go through the request workflow.
    pub requires_approval: bool,
}

impl RoleRestrictions {
    /// Create unrestricted defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the number of simultaneously active assignees.
    pub fn with_max_assignees(mut self, max: u32) -> Self {
        self.max_assignees = Some(max);
        self
    }

    /// Require assignments to name at least one church.
    pub fn church_specific(mut self) -> Self {
        self.church_specific = true;
        self
    }

    /// Require grants to go through the request workflow.
    pub fn requiring_approval(mut self) -> Self {
        self.requires_approval = true;
        self
    }
}

/// A named bundle of permissions.
///
/// # Examples
///
/// ```
/// use flock_access::Role;
/// use flock_rbac::{Action, PermissionKey, Resource};
///
/// let role = Role::new("Greeter", "Welcomes visitors", 2)
///     .with_permissions([PermissionKey::new(Resource::People, Action::Read)]);
/// assert!(role.active);
/// assert_eq!(role.permissions.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    /// Unique role ID
    pub id: Uuid,

    /// Role name shown in the UI
    pub name: String,

    /// Longer description of the role's purpose
    pub description: String,

    /// Hierarchy level, higher = more authority. Display/sort hint only.
    pub level: u8,

    /// System or custom
    pub role_type: RoleType,

    /// The permission keys this role grants (set semantics, duplicates
    /// cannot exist)
    pub permissions: BTreeSet<PermissionKey>,

    /// Restrictions on how the role may be granted
    pub restrictions: RoleRestrictions,

    /// Whether the role is currently grantable
    pub active: bool,

    /// When the role was created
    pub created_at: DateTime<Utc>,

    /// When the role was last modified
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Create a new custom role with no permissions.
    pub fn new(name: impl Into<String>, description: impl Into<String>, level: u8) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            description: description.into(),
            level,
            role_type: RoleType::Custom,
            permissions: BTreeSet::new(),
            restrictions: RoleRestrictions::default(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new system role with no permissions.
    pub fn system(name: impl Into<String>, description: impl Into<String>, level: u8) -> Self {
        Self {
            role_type: RoleType::System,
            ..Self::new(name, description, level)
        }
    }

    /// Set the permission keys this role grants.
    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = PermissionKey>) -> Self {
        self.permissions = permissions.into_iter().collect();
        self
    }

    /// Set the role's restrictions.
    pub fn with_restrictions(mut self, restrictions: RoleRestrictions) -> Self {
        self.restrictions = restrictions;
        self
    }

    /// Check whether this is a system role.
    pub fn is_system(&self) -> bool {
        self.role_type == RoleType::System
    }

    /// Check whether this role grants a permission key.
    pub fn grants(&self, key: &PermissionKey) -> bool {
        self.permissions.contains(key)
    }
}

/// A partial update to a role. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RolePatch {
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New hierarchy level
    pub level: Option<u8>,
    /// Replacement permission set
    pub permissions: Option<BTreeSet<PermissionKey>>,
    /// Replacement restrictions
    pub restrictions: Option<RoleRestrictions>,
    /// New active flag
    pub active: Option<bool>,
}

impl RolePatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename the role.
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replace the description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Change the hierarchy level.
    pub fn set_level(mut self, level: u8) -> Self {
        self.level = Some(level);
        self
    }

    /// Replace the permission set.
    pub fn set_permissions(
        mut self,
        permissions: impl IntoIterator<Item = PermissionKey>,
    ) -> Self {
        self.permissions = Some(permissions.into_iter().collect());
        self
    }

    /// Replace the restrictions.
    pub fn set_restrictions(mut self, restrictions: RoleRestrictions) -> Self {
        self.restrictions = Some(restrictions);
        self
    }

    /// Toggle the active flag.
    pub fn set_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }
}

/// The registry of role definitions.
///
/// Uses a `BTreeMap` for deterministic iteration. The registry holds no
/// assignment state; callers supply the active-assignment count for the
/// operations that depend on it.
#[derive(Debug, Clone, Default)]
pub struct RoleRegistry {
    roles: BTreeMap<Uuid, Role>,
}

impl RoleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with the built-in system roles.
    pub fn with_builtin(catalog: &PermissionCatalog) -> Self {
        let mut registry = Self::new();
        for role in builtin_roles(catalog) {
            registry
                .create(role, catalog)
                .expect("builtin roles must reference catalog permissions");
        }
        registry
    }

    /// Create a role, validating every permission key against the catalog.
    ///
    /// # Errors
    ///
    /// [`AccessError::UnknownPermission`] naming the first key the catalog
    /// does not know.
    pub fn create(&mut self, role: Role, catalog: &PermissionCatalog) -> AccessResult<Role> {
        for key in &role.permissions {
            if catalog.find(key).is_none() {
                return Err(AccessError::UnknownPermission(*key));
            }
        }
        let stored = role.clone();
        self.roles.insert(role.id, role);
        Ok(stored)
    }

    /// Apply a partial update to a role.
    ///
    /// `active_assignments` is the number of active assignments currently
    /// referencing the role, as reported by the assignment store.
    ///
    /// # Errors
    ///
    /// - [`AccessError::RoleNotFound`] if the role does not exist
    /// - [`AccessError::ImmutableSystemRole`] if the patch touches a system
    ///   role's permission set
    /// - [`AccessError::RoleInUse`] if the patch touches a custom role's
    ///   permission set while active assignments reference it
    /// - [`AccessError::UnknownPermission`] if a patched key is not in the
    ///   catalog
    pub fn update(
        &mut self,
        id: Uuid,
        patch: RolePatch,
        catalog: &PermissionCatalog,
        active_assignments: usize,
    ) -> AccessResult<Role> {
        let role = self.roles.get(&id).ok_or(AccessError::RoleNotFound(id))?;

        if let Some(permissions) = &patch.permissions {
            if role.is_system() {
                return Err(AccessError::ImmutableSystemRole);
            }
            if active_assignments > 0 {
                return Err(AccessError::RoleInUse(active_assignments));
            }
            for key in permissions {
                if catalog.find(key).is_none() {
                    return Err(AccessError::UnknownPermission(*key));
                }
            }
        }

        // All validation passed; now mutate.
        let role = self
            .roles
            .get_mut(&id)
            .ok_or(AccessError::RoleNotFound(id))?;
        if let Some(name) = patch.name {
            role.name = name;
        }
        if let Some(description) = patch.description {
            role.description = description;
        }
        if let Some(level) = patch.level {
            role.level = level;
        }
        if let Some(permissions) = patch.permissions {
            role.permissions = permissions;
        }
        if let Some(restrictions) = patch.restrictions {
            role.restrictions = restrictions;
        }
        if let Some(active) = patch.active {
            role.active = active;
        }
        role.updated_at = Utc::now();
        Ok(role.clone())
    }

    /// Delete a role.
    ///
    /// # Errors
    ///
    /// - [`AccessError::RoleNotFound`] if the role does not exist
    /// - [`AccessError::SystemRoleProtected`] for system roles, regardless
    ///   of assignment count
    /// - [`AccessError::RoleInUse`] while active assignments reference it
    pub fn delete(&mut self, id: Uuid, active_assignments: usize) -> AccessResult<Role> {
        let role = self.roles.get(&id).ok_or(AccessError::RoleNotFound(id))?;
        if role.is_system() {
            return Err(AccessError::SystemRoleProtected);
        }
        if active_assignments > 0 {
            return Err(AccessError::RoleInUse(active_assignments));
        }
        Ok(self
            .roles
            .remove(&id)
            .expect("role existence checked above"))
    }

    /// Get a role by id.
    pub fn get(&self, id: Uuid) -> AccessResult<&Role> {
        self.roles.get(&id).ok_or(AccessError::RoleNotFound(id))
    }

    /// Look up a role by id, returning `None` if absent.
    pub fn find(&self, id: Uuid) -> Option<&Role> {
        self.roles.get(&id)
    }

    /// Look up a role by name.
    pub fn find_by_name(&self, name: &str) -> Option<&Role> {
        self.roles.values().find(|r| r.name == name)
    }

    /// List roles sorted by descending level, then name.
    pub fn list(&self, include_inactive: bool) -> Vec<&Role> {
        let mut roles: Vec<&Role> = self
            .roles
            .values()
            .filter(|r| include_inactive || r.active)
            .collect();
        roles.sort_by(|a, b| b.level.cmp(&a.level).then_with(|| a.name.cmp(&b.name)));
        roles
    }

    /// Number of roles in the registry.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// The built-in system roles, seeded from the catalog.
///
/// Levels run 1 (Viewer) through 10 (Super Admin); the level orders roles
/// in listings and nothing else.
pub fn builtin_roles(catalog: &PermissionCatalog) -> Vec<Role> {
    let keys = |names: &[&str]| -> BTreeSet<PermissionKey> {
        names
            .iter()
            .filter_map(|s| PermissionKey::parse(s))
            .collect()
    };

    vec![
        Role::system("Super Admin", "Full platform control", 10)
            .with_permissions(catalog.iter().map(|p| p.key))
            .with_restrictions(RoleRestrictions::new().requiring_approval()),
        Role::system("Church Admin", "Administers a single church", 8)
            .with_permissions(keys(&[
                "people:read",
                "people:list",
                "people:create",
                "people:update",
                "people:delete",
                "households:read",
                "households:update",
                "events:read",
                "events:create",
                "events:update",
                "events:delete",
                "locations:read",
                "locations:manage",
                "churches:update",
                "donations:read",
                "donations:create",
                "donations:export",
                "kpis:read",
                "kpis:update",
                "evaluations:read",
                "evaluations:create",
                "notifications:send",
            ]))
            .with_restrictions(
                RoleRestrictions::new()
                    .church_specific()
                    .requiring_approval(),
            ),
        Role::system("Pastor", "Pastoral oversight of a church", 7)
            .with_permissions(keys(&[
                "people:read",
                "people:list",
                "people:create",
                "people:update",
                "households:read",
                "events:read",
                "events:create",
                "events:update",
                "donations:read",
                "kpis:read",
                "evaluations:read",
                "evaluations:create",
                "notifications:send",
            ]))
            .with_restrictions(RoleRestrictions::new().church_specific()),
        Role::system("Ministry Leader", "Leads a ministry area", 5)
            .with_permissions(keys(&[
                "people:read",
                "people:list",
                "events:read",
                "events:create",
                "teams:read",
                "teams:update",
                "groups:manage",
                "evaluations:read",
                "evaluations:update",
                "kpis:read",
            ])),
        Role::system("Team Leader", "Leads a single team", 4)
            .with_permissions(keys(&[
                "people:read",
                "events:read",
                "teams:read",
                "teams:update",
            ])),
        Role::system("Member", "Regular church member", 2).with_permissions(keys(&[
            "profile:read",
            "profile:update",
            "notifications:read",
            "events:read",
        ])),
        Role::system("Viewer", "Read-only visitor access", 1)
            .with_permissions(keys(&["profile:read", "events:read"])),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use flock_rbac::{Action, Resource};

    fn catalog() -> PermissionCatalog {
        PermissionCatalog::builtin()
    }

    fn people_read() -> PermissionKey {
        PermissionKey::new(Resource::People, Action::Read)
    }

    #[test]
    fn test_create_and_get_round_trip() {
        let catalog = catalog();
        let mut registry = RoleRegistry::new();

        let role = Role::new("Greeter", "Welcomes visitors", 2)
            .with_permissions([people_read()]);
        let created = registry.create(role, &catalog).unwrap();

        let fetched = registry.get(created.id).unwrap();
        assert_eq!(fetched, &created);
    }

    #[test]
    fn test_create_rejects_unknown_permission() {
        let catalog = PermissionCatalog::new(); // empty
        let mut registry = RoleRegistry::new();

        let role = Role::new("Greeter", "", 2).with_permissions([people_read()]);
        let err = registry.create(role, &catalog).unwrap_err();
        assert!(matches!(err, AccessError::UnknownPermission(_)));
    }

    #[test]
    fn test_update_patches_exactly_the_given_fields() {
        let catalog = catalog();
        let mut registry = RoleRegistry::new();
        let role = registry
            .create(
                Role::new("Greeter", "Welcomes visitors", 2).with_permissions([people_read()]),
                &catalog,
            )
            .unwrap();

        let updated = registry
            .update(role.id, RolePatch::new().rename("Usher").set_level(3), &catalog, 0)
            .unwrap();

        assert_eq!(updated.name, "Usher");
        assert_eq!(updated.level, 3);
        // Untouched fields survive.
        assert_eq!(updated.description, "Welcomes visitors");
        assert_eq!(updated.permissions, role.permissions);
        assert!(updated.updated_at >= role.updated_at);
    }

    #[test]
    fn test_update_system_role_permissions_fails() {
        let catalog = catalog();
        let mut registry = RoleRegistry::with_builtin(&catalog);
        let pastor = registry.find_by_name("Pastor").unwrap().id;

        let err = registry
            .update(
                pastor,
                RolePatch::new().set_permissions([people_read()]),
                &catalog,
                0,
            )
            .unwrap_err();
        assert!(matches!(err, AccessError::ImmutableSystemRole));
    }

    #[test]
    fn test_update_system_role_active_toggle_is_allowed() {
        let catalog = catalog();
        let mut registry = RoleRegistry::with_builtin(&catalog);
        let pastor = registry.find_by_name("Pastor").unwrap().id;

        let updated = registry
            .update(pastor, RolePatch::new().set_active(false), &catalog, 0)
            .unwrap();
        assert!(!updated.active);
    }

    #[test]
    fn test_update_custom_role_permissions_refused_while_assigned() {
        let catalog = catalog();
        let mut registry = RoleRegistry::new();
        let role = registry
            .create(Role::new("Greeter", "", 2).with_permissions([people_read()]), &catalog)
            .unwrap();

        let err = registry
            .update(
                role.id,
                RolePatch::new().set_permissions([]),
                &catalog,
                1,
            )
            .unwrap_err();
        assert!(matches!(err, AccessError::RoleInUse(1)));
    }

    #[test]
    fn test_delete_system_role_always_fails() {
        let catalog = catalog();
        let mut registry = RoleRegistry::with_builtin(&catalog);
        let viewer = registry.find_by_name("Viewer").unwrap().id;

        // Regardless of assignment count.
        assert!(matches!(
            registry.delete(viewer, 0).unwrap_err(),
            AccessError::SystemRoleProtected
        ));
        assert!(matches!(
            registry.delete(viewer, 5).unwrap_err(),
            AccessError::SystemRoleProtected
        ));
    }

    #[test]
    fn test_delete_custom_role() {
        let catalog = catalog();
        let mut registry = RoleRegistry::new();
        let role = registry
            .create(Role::new("Greeter", "", 2), &catalog)
            .unwrap();

        // In use: refused with the count.
        let err = registry.delete(role.id, 1).unwrap_err();
        assert!(matches!(err, AccessError::RoleInUse(1)));

        // Unreferenced: deleted.
        registry.delete(role.id, 0).unwrap();
        assert!(registry.find(role.id).is_none());
    }

    #[test]
    fn test_list_sorted_by_level_desc() {
        let catalog = catalog();
        let registry = RoleRegistry::with_builtin(&catalog);

        let levels: Vec<u8> = registry.list(true).iter().map(|r| r.level).collect();
        let mut sorted = levels.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(levels, sorted);
    }

    #[test]
    fn test_list_excludes_inactive_by_default() {
        let catalog = catalog();
        let mut registry = RoleRegistry::with_builtin(&catalog);
        let viewer = registry.find_by_name("Viewer").unwrap().id;
        registry
            .update(viewer, RolePatch::new().set_active(false), &catalog, 0)
            .unwrap();

        assert!(registry.list(false).iter().all(|r| r.id != viewer));
        assert!(registry.list(true).iter().any(|r| r.id == viewer));
    }

    #[test]
    fn test_builtin_roles_validate_against_builtin_catalog() {
        let catalog = catalog();
        let registry = RoleRegistry::with_builtin(&catalog);
        assert_eq!(registry.len(), 7);

        // Every referenced key resolves.
        for role in registry.list(true) {
            for key in &role.permissions {
                assert!(catalog.find(key).is_some(), "unknown key {key}");
            }
        }
    }

    #[test]
    fn test_role_serde_round_trip() {
        let role = Role::new("Greeter", "Welcomes visitors", 2)
            .with_permissions([people_read()])
            .with_restrictions(RoleRestrictions::new().with_max_assignees(4));

        let json = serde_json::to_string(&role).unwrap();
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, role);
    }
}
