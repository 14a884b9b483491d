//! The decision engine
//!
//! Answers allow/deny for a `(subject, resource, action, scope context)`
//! query by walking the subject's effective assignments and their roles'
//! permission sets. The engine owns no state: it borrows the role registry
//! and the catalog, and the caller supplies the pre-filtered effective
//! assignments.
//!
//! Decisions use union semantics: roles are walked in no particular order
//! and the first match grants, but any match is equivalent; this is OR
//! logic, not priority logic. Scope matching is per *assignment*, not per
//! role: the ids a grant applies to travel with the assignment that
//! carries it.

use serde::{Deserialize, Serialize};

use flock_rbac::{Action, PermissionCatalog, PermissionKey, PermissionScope, Resource};

use crate::assignment::Assignment;
use crate::role::RoleRegistry;

/// The context a permission check runs in: which church and/or team the
/// caller is acting within.
///
/// # Examples
///
/// ```
/// use flock_access::ScopeContext;
///
/// let ctx = ScopeContext::for_church("church-1");
/// assert_eq!(ctx.church_id.as_deref(), Some("church-1"));
/// assert!(ScopeContext::none().church_id.is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScopeContext {
    /// The church the caller is acting within, if any.
    pub church_id: Option<String>,

    /// The team the caller is acting within, if any.
    pub team_id: Option<String>,
}

impl ScopeContext {
    /// No context: only global and self-scoped permissions can match.
    pub fn none() -> Self {
        Self::default()
    }

    /// Context for acting within a church.
    pub fn for_church(church_id: impl Into<String>) -> Self {
        Self {
            church_id: Some(church_id.into()),
            team_id: None,
        }
    }

    /// Context for acting within a team.
    pub fn for_team(team_id: impl Into<String>) -> Self {
        Self {
            church_id: None,
            team_id: Some(team_id.into()),
        }
    }

    /// Add a church id to the context.
    pub fn with_church(mut self, church_id: impl Into<String>) -> Self {
        self.church_id = Some(church_id.into());
        self
    }

    /// Add a team id to the context.
    pub fn with_team(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }
}

/// The outcome of a permission check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Decision {
    /// Whether access was granted.
    pub granted: bool,

    /// The permission that matched, on a grant.
    pub permission: Option<PermissionKey>,
}

impl Decision {
    /// A grant through the given permission.
    pub fn granted(permission: PermissionKey) -> Self {
        Self {
            granted: true,
            permission: Some(permission),
        }
    }

    /// A denial.
    pub fn denied() -> Self {
        Self {
            granted: false,
            permission: None,
        }
    }
}

/// A borrowing view over the registries, answering permission checks.
pub struct DecisionEngine<'a> {
    roles: &'a RoleRegistry,
    catalog: &'a PermissionCatalog,
}

impl<'a> DecisionEngine<'a> {
    /// Create an engine over the given registries.
    pub fn new(roles: &'a RoleRegistry, catalog: &'a PermissionCatalog) -> Self {
        Self { roles, catalog }
    }

    /// Decide whether the holder of `assignments` may perform `action` on
    /// `resource` within `ctx`.
    ///
    /// `assignments` must already be filtered to the effective set (see
    /// [`AssignmentStore::active_roles_for`]). For each assignment the
    /// engine requires, in order: an active role granting the exact
    /// `(resource, action)` key, an active catalog entry for that key, and
    /// a scope match between the entry's scope class and the assignment:
    ///
    /// - `global` and `self` always match
    /// - `church` matches iff the context names a church contained in the
    ///   assignment's `church_ids`
    /// - `team` symmetric, keyed on `team_ids`
    ///
    /// The first match short-circuits; exhausting every assignment denies.
    ///
    /// [`AssignmentStore::active_roles_for`]: crate::assignment::AssignmentStore::active_roles_for
    pub fn decide(
        &self,
        assignments: &[Assignment],
        resource: Resource,
        action: Action,
        ctx: &ScopeContext,
    ) -> Decision {
        let key = PermissionKey::new(resource, action);
        for assignment in assignments {
            let Some(role) = self.roles.find(assignment.role_id) else {
                continue;
            };
            if !role.active || !role.grants(&key) {
                continue;
            }
            let Some(entry) = self.catalog.find(&key) else {
                continue;
            };
            if !entry.active {
                continue;
            }
            if scope_matches(entry.scope, assignment, ctx) {
                return Decision::granted(key);
            }
        }
        Decision::denied()
    }
}

fn scope_matches(scope: PermissionScope, assignment: &Assignment, ctx: &ScopeContext) -> bool {
    match scope {
        PermissionScope::Global | PermissionScope::SelfOnly => true,
        PermissionScope::Church => match (&ctx.church_id, &assignment.scope) {
            (Some(church_id), Some(scope)) => scope.allows_church(church_id),
            _ => false,
        },
        PermissionScope::Team => match (&ctx.team_id, &assignment.scope) {
            (Some(team_id), Some(scope)) => scope.allows_team(team_id),
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::{AssignmentScope, AssignmentStore};
    use crate::role::{Role, RolePatch};
    use chrono::Utc;
    use flock_rbac::{Permission, PermissionCategory};

    struct Fixture {
        catalog: PermissionCatalog,
        roles: RoleRegistry,
        store: AssignmentStore,
    }

    /// One role granting church-scoped event creation, plus a self-scoped
    /// profile permission on a second role.
    fn fixture() -> (Fixture, Role, Role) {
        let catalog = PermissionCatalog::builtin();
        let mut roles = RoleRegistry::new();

        let pastor = roles
            .create(
                Role::new("Pastor", "", 7).with_permissions([
                    PermissionKey::parse("events:create").unwrap(),
                    PermissionKey::parse("people:read").unwrap(),
                ]),
                &catalog,
            )
            .unwrap();
        let member = roles
            .create(
                Role::new("Member", "", 2)
                    .with_permissions([PermissionKey::parse("profile:read").unwrap()]),
                &catalog,
            )
            .unwrap();

        (
            Fixture {
                catalog,
                roles,
                store: AssignmentStore::new(),
            },
            pastor,
            member,
        )
    }

    fn decide(f: &Fixture, user: &str, resource: Resource, action: Action, ctx: &ScopeContext) -> Decision {
        let assignments = f.store.active_roles_for(user, Utc::now());
        DecisionEngine::new(&f.roles, &f.catalog).decide(&assignments, resource, action, ctx)
    }

    #[test]
    fn test_church_scope_matches_assignment_churches() {
        let (mut f, pastor, _) = fixture();
        f.store
            .assign(&pastor, "u1", "admin", None, Some(AssignmentScope::churches(["church1"])))
            .unwrap();

        let granted = decide(&f, "u1", Resource::Events, Action::Create, &ScopeContext::for_church("church1"));
        assert!(granted.granted);
        assert_eq!(granted.permission.unwrap().to_string(), "events:create");

        let denied = decide(&f, "u1", Resource::Events, Action::Create, &ScopeContext::for_church("church2"));
        assert!(!denied.granted);
        assert!(denied.permission.is_none());
    }

    #[test]
    fn test_church_scope_requires_context() {
        let (mut f, pastor, _) = fixture();
        f.store
            .assign(&pastor, "u1", "admin", None, Some(AssignmentScope::churches(["church1"])))
            .unwrap();

        // No church in context: church-scoped permissions cannot match.
        let decision = decide(&f, "u1", Resource::Events, Action::Create, &ScopeContext::none());
        assert!(!decision.granted);
    }

    #[test]
    fn test_self_scope_ignores_context() {
        let (mut f, _, member) = fixture();
        f.store.assign(&member, "u1", "admin", None, None).unwrap();

        for ctx in [
            ScopeContext::none(),
            ScopeContext::for_church("anywhere"),
            ScopeContext::for_team("any-team"),
        ] {
            assert!(decide(&f, "u1", Resource::Profile, Action::Read, &ctx).granted);
        }
    }

    #[test]
    fn test_unassigned_user_denied() {
        let (f, _, _) = fixture();
        let decision = decide(&f, "nobody", Resource::Events, Action::Create, &ScopeContext::for_church("church1"));
        assert!(!decision.granted);
    }

    #[test]
    fn test_role_without_permission_denied() {
        let (mut f, _, member) = fixture();
        f.store.assign(&member, "u1", "admin", None, None).unwrap();

        let decision = decide(&f, "u1", Resource::Events, Action::Create, &ScopeContext::for_church("church1"));
        assert!(!decision.granted);
    }

    #[test]
    fn test_inactive_role_denied() {
        let (mut f, pastor, _) = fixture();
        f.store
            .assign(&pastor, "u1", "admin", None, Some(AssignmentScope::churches(["church1"])))
            .unwrap();
        f.roles
            .update(pastor.id, RolePatch::new().set_active(false), &f.catalog, 1)
            .unwrap();

        let decision = decide(&f, "u1", Resource::Events, Action::Create, &ScopeContext::for_church("church1"));
        assert!(!decision.granted);
    }

    #[test]
    fn test_deactivated_permission_stops_granting() {
        let (mut f, pastor, _) = fixture();
        f.store
            .assign(&pastor, "u1", "admin", None, Some(AssignmentScope::churches(["church1"])))
            .unwrap();

        let key = PermissionKey::parse("events:create").unwrap();
        f.catalog.deactivate(&key).unwrap();

        // No cascade: the role still lists the key, but the decision
        // engine filters on the catalog's active flag.
        let decision = decide(&f, "u1", Resource::Events, Action::Create, &ScopeContext::for_church("church1"));
        assert!(!decision.granted);
    }

    #[test]
    fn test_key_missing_from_catalog_is_skipped() {
        // A role may reference a key the catalog has since lost (e.g.
        // registries restored from different snapshots). The engine
        // treats it as non-grantable rather than panicking.
        let catalog = PermissionCatalog::builtin();
        let mut roles = RoleRegistry::new();
        let role = roles
            .create(
                Role::new("Odd", "", 1)
                    .with_permissions([PermissionKey::parse("people:read").unwrap()]),
                &catalog,
            )
            .unwrap();

        let mut store = AssignmentStore::new();
        store.assign(&role, "u1", "admin", None, None).unwrap();

        let empty = PermissionCatalog::new();
        let assignments = store.active_roles_for("u1", Utc::now());
        let decision = DecisionEngine::new(&roles, &empty).decide(
            &assignments,
            Resource::People,
            Action::Read,
            &ScopeContext::for_church("c1"),
        );
        assert!(!decision.granted);
    }

    #[test]
    fn test_team_scope_symmetric_to_church() {
        let mut catalog = PermissionCatalog::new();
        catalog
            .register(Permission::new(
                Resource::Teams,
                Action::Update,
                PermissionScope::Team,
                PermissionCategory::Ministry,
            ))
            .unwrap();

        let mut roles = RoleRegistry::new();
        let role = roles
            .create(
                Role::new("Team Leader", "", 4)
                    .with_permissions([PermissionKey::new(Resource::Teams, Action::Update)]),
                &catalog,
            )
            .unwrap();

        let mut store = AssignmentStore::new();
        store
            .assign(&role, "u1", "admin", None, Some(AssignmentScope::teams(["worship"])))
            .unwrap();

        let assignments = store.active_roles_for("u1", Utc::now());
        let engine = DecisionEngine::new(&roles, &catalog);

        assert!(engine
            .decide(&assignments, Resource::Teams, Action::Update, &ScopeContext::for_team("worship"))
            .granted);
        assert!(!engine
            .decide(&assignments, Resource::Teams, Action::Update, &ScopeContext::for_team("youth"))
            .granted);
        assert!(!engine
            .decide(&assignments, Resource::Teams, Action::Update, &ScopeContext::for_church("worship"))
            .granted);
    }

    #[test]
    fn test_union_semantics_across_roles() {
        let (mut f, pastor, member) = fixture();
        f.store
            .assign(&pastor, "u1", "admin", None, Some(AssignmentScope::churches(["church1"])))
            .unwrap();
        f.store.assign(&member, "u1", "admin", None, None).unwrap();

        // Either role alone suffices for its own permissions; holding
        // both grants the union.
        assert!(decide(&f, "u1", Resource::Profile, Action::Read, &ScopeContext::none()).granted);
        assert!(
            decide(&f, "u1", Resource::Events, Action::Create, &ScopeContext::for_church("church1"))
                .granted
        );
    }
}
