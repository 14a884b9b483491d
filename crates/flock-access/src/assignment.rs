//! Role assignments and the assignment store
//!
//! An assignment links one subject to one role, optionally time-limited
//! and/or scoped to a set of churches, teams, or groups. The store is the
//! sole mutator of assignment lifecycle: it enforces the one-active-
//! assignment-per-(user, role) invariant atomically, interprets expiry as a
//! pure filter, and flips flags only in the explicit maintenance sweep.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AccessError, AccessResult};
use crate::role::Role;

/// The scope of an assignment: the churches, teams, and groups within
/// which the granted role applies.
///
/// An absent scope (on the [`Assignment`]) means the grant carries no
/// scoping ids; church- and team-scoped permissions then never match.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignmentScope {
    /// Church ids the grant applies to.
    #[serde(default)]
    pub church_ids: BTreeSet<String>,

    /// Team ids the grant applies to.
    #[serde(default)]
    pub team_ids: BTreeSet<String>,

    /// Group ids the grant applies to.
    #[serde(default)]
    pub group_ids: BTreeSet<String>,
}

impl AssignmentScope {
    /// Create an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope covering the given churches.
    pub fn churches<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            church_ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Create a scope covering the given teams.
    pub fn teams<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            team_ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Add group ids to the scope.
    pub fn with_groups<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Check whether the scope names at least one church.
    pub fn has_church(&self) -> bool {
        !self.church_ids.is_empty()
    }

    /// Check whether the scope covers a church id.
    pub fn allows_church(&self, church_id: &str) -> bool {
        self.church_ids.contains(church_id)
    }

    /// Check whether the scope covers a team id.
    pub fn allows_team(&self, team_id: &str) -> bool {
        self.team_ids.contains(team_id)
    }
}

/// A grant of one role to one subject.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use flock_access::{Assignment, Role};
///
/// let role = Role::new("Greeter", "", 2);
/// let assignment = Assignment::new("user-1", role.id, "admin-1");
/// assert!(assignment.is_effective(Utc::now()));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignment {
    /// Unique assignment ID
    pub id: Uuid,

    /// The subject holding the role
    pub user_id: String,

    /// The granted role
    pub role_id: Uuid,

    /// Who granted the role
    pub assigned_by: String,

    /// When the role was granted
    pub assigned_at: DateTime<Utc>,

    /// When the grant lapses, if time-limited
    pub expires_at: Option<DateTime<Utc>>,

    /// Where the grant applies, if scoped
    pub scope: Option<AssignmentScope>,

    /// Soft-revoke flag
    pub active: bool,
}

impl Assignment {
    /// Create a new active, unscoped, non-expiring assignment.
    pub fn new(user_id: impl Into<String>, role_id: Uuid, assigned_by: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: user_id.into(),
            role_id,
            assigned_by: assigned_by.into(),
            assigned_at: Utc::now(),
            expires_at: None,
            scope: None,
            active: true,
        }
    }

    /// Time-limit the grant.
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Scope the grant.
    pub fn with_scope(mut self, scope: AssignmentScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Check whether the assignment counts for decisions at `at`.
    ///
    /// Expiry is interpreted here and nowhere else: an expired assignment
    /// is ineffective even while its `active` flag is still true.
    pub fn is_effective(&self, at: DateTime<Utc>) -> bool {
        self.active && self.expires_at.map_or(true, |expires| expires > at)
    }
}

/// The store of role assignments.
///
/// The store alone mutates assignment lifecycle. Callers pass the role
/// being granted so restriction checks and the duplicate check run inside
/// one critical section with the insert.
#[derive(Debug, Clone, Default)]
pub struct AssignmentStore {
    assignments: BTreeMap<Uuid, Assignment>,
    by_user: BTreeMap<String, Vec<Uuid>>,
}

impl AssignmentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a role to a user.
    ///
    /// The duplicate check keys on the `active` flag: an expired but
    /// unswept assignment still blocks a re-grant until it is revoked or
    /// swept.
    ///
    /// # Errors
    ///
    /// - [`AccessError::RoleInactive`] if the role is not active
    /// - [`AccessError::DuplicateAssignment`] if the user already holds an
    ///   active assignment for this role
    /// - [`AccessError::ChurchScopeRequired`] if the role is
    ///   church-specific and the scope names no church
    /// - [`AccessError::RoleAtCapacity`] if the role's `max_assignees`
    ///   bound is reached
    pub fn assign(
        &mut self,
        role: &Role,
        user_id: impl Into<String>,
        assigned_by: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
        scope: Option<AssignmentScope>,
    ) -> AccessResult<Assignment> {
        let user_id = user_id.into();

        if !role.active {
            return Err(AccessError::RoleInactive(role.id));
        }
        if self.active_assignment(&user_id, role.id).is_some() {
            return Err(AccessError::DuplicateAssignment {
                user_id,
                role_id: role.id,
            });
        }
        if role.restrictions.church_specific
            && !scope.as_ref().map_or(false, AssignmentScope::has_church)
        {
            return Err(AccessError::ChurchScopeRequired);
        }
        if let Some(max) = role.restrictions.max_assignees {
            if self.active_count_for_role(role.id) >= max as usize {
                return Err(AccessError::RoleAtCapacity(max));
            }
        }

        let mut assignment = Assignment::new(user_id, role.id, assigned_by);
        assignment.expires_at = expires_at;
        assignment.scope = scope;

        self.by_user
            .entry(assignment.user_id.clone())
            .or_default()
            .push(assignment.id);
        self.assignments.insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    /// Revoke a user's active assignment for a role.
    ///
    /// Deliberately not idempotent: a second revoke of the same pair fails
    /// with [`AccessError::AssignmentNotFound`] so callers can detect
    /// no-ops.
    pub fn revoke(&mut self, user_id: &str, role_id: Uuid) -> AccessResult<Assignment> {
        let id = self
            .active_assignment(user_id, role_id)
            .map(|a| a.id)
            .ok_or(AccessError::AssignmentNotFound)?;
        let assignment = self
            .assignments
            .get_mut(&id)
            .expect("indexed assignment must exist");
        assignment.active = false;
        Ok(assignment.clone())
    }

    /// The assignments that count for decisions at `at`.
    ///
    /// This is the only place expiry is interpreted; it is a pure filter,
    /// not a mutation.
    pub fn active_roles_for(&self, user_id: &str, at: DateTime<Utc>) -> Vec<Assignment> {
        self.for_user(user_id)
            .filter(|a| a.is_effective(at))
            .cloned()
            .collect()
    }

    /// All assignments for a user, newest first.
    pub fn list_for_user(&self, user_id: &str, include_inactive: bool) -> Vec<Assignment> {
        let mut assignments: Vec<Assignment> = self
            .for_user(user_id)
            .filter(|a| include_inactive || a.active)
            .cloned()
            .collect();
        assignments.sort_by(|a, b| b.assigned_at.cmp(&a.assigned_at));
        assignments
    }

    /// Count assignments of a role whose `active` flag is set.
    pub fn active_count_for_role(&self, role_id: Uuid) -> usize {
        self.assignments
            .values()
            .filter(|a| a.role_id == role_id && a.active)
            .count()
    }

    /// The explicit maintenance pass: flip `active = false` on every
    /// assignment whose expiry has passed. Returns the swept assignments.
    ///
    /// Rows are never physically pruned; retention is an operational
    /// concern outside the core.
    pub fn expire_sweep(&mut self, now: DateTime<Utc>) -> Vec<Assignment> {
        let mut swept = Vec::new();
        for assignment in self.assignments.values_mut() {
            if assignment.active && assignment.expires_at.is_some_and(|e| e <= now) {
                assignment.active = false;
                swept.push(assignment.clone());
            }
        }
        swept
    }

    /// Get an assignment by id.
    pub fn get(&self, id: Uuid) -> Option<&Assignment> {
        self.assignments.get(&id)
    }

    /// Number of assignments, active or not.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    fn for_user<'a>(&'a self, user_id: &str) -> impl Iterator<Item = &'a Assignment> {
        self.by_user
            .get(user_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.assignments.get(id))
    }

    fn active_assignment(&self, user_id: &str, role_id: Uuid) -> Option<&Assignment> {
        self.for_user(user_id)
            .find(|a| a.role_id == role_id && a.active)
    }
}
