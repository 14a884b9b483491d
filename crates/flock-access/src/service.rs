//! The access-control service facade
//!
//! [`AccessService`] wires the catalog, role registry, assignment store,
//! request queue, and audit log behind the narrow interface the rest of
//! the platform consumes. The service is constructed once at process start
//! and handed to the transport layer; there are no global singletons.
//!
//! # Locking
//!
//! Each registry sits behind its own `RwLock`; the audit log carries its
//! own internal lock. When a method needs more than one lock it acquires
//! them in declaration order (requests, roles, assignments, catalog),
//! and the audit lock is always taken last and alone. No method acquires
//! against that order, which rules out deadlock. The duplicate-assignment
//! check and its insert run under a single `assignments` write guard, so
//! two concurrent grants of the same (user, role) can never both succeed.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use flock_rbac::{
    Action, Permission, PermissionCatalog, PermissionFilter, PermissionKey, Resource,
};

use crate::assignment::{Assignment, AssignmentScope, AssignmentStore};
use crate::audit::{AuditEntry, AuditFilter, AuditLog};
use crate::decision::{Decision, DecisionEngine, ScopeContext};
use crate::error::{AccessError, AccessResult};
use crate::request::{RequestQueue, RequestStatus, ReviewDecision, RoleRequest};
use crate::role::{Role, RolePatch, RoleRegistry};

/// Subject recorded for mutations with no acting user in their contract.
const SYSTEM_ACTOR: &str = "system";

/// The access-control core behind one façade.
///
/// # Examples
///
/// ```
/// use flock_access::{AccessService, ScopeContext};
/// use flock_rbac::{Action, Resource};
///
/// let service = AccessService::with_builtin();
/// let granted = service.has_permission(
///     "visitor",
///     Resource::Events,
///     Action::Create,
///     &ScopeContext::for_church("church-1"),
/// );
/// assert!(!granted); // no assignments yet
/// ```
pub struct AccessService {
    // Field order is lock order; see the module docs.
    requests: RwLock<RequestQueue>,
    roles: RwLock<RoleRegistry>,
    assignments: RwLock<AssignmentStore>,
    catalog: RwLock<PermissionCatalog>,
    audit: AuditLog,
}

impl AccessService {
    /// Create a service over the given catalog, with no roles defined.
    pub fn new(catalog: PermissionCatalog) -> Self {
        Self {
            requests: RwLock::new(RequestQueue::new()),
            roles: RwLock::new(RoleRegistry::new()),
            assignments: RwLock::new(AssignmentStore::new()),
            catalog: RwLock::new(catalog),
            audit: AuditLog::new(),
        }
    }

    /// Create a service seeded with the built-in catalog and system roles.
    pub fn with_builtin() -> Self {
        let catalog = PermissionCatalog::builtin();
        let roles = RoleRegistry::with_builtin(&catalog);
        let service = Self::new(catalog);
        *service.roles_write() = roles;
        service
    }

    // ---- decisions ----------------------------------------------------

    /// Answer a permission check, recording one audit entry per call.
    pub fn check_permission(
        &self,
        user_id: &str,
        resource: Resource,
        action: Action,
        ctx: &ScopeContext,
    ) -> Decision {
        let assignments = self
            .assignments_read()
            .active_roles_for(user_id, Utc::now());
        let decision = {
            let roles = self.roles_read();
            let catalog = self.catalog_read();
            DecisionEngine::new(&roles, &catalog).decide(&assignments, resource, action, ctx)
        };
        debug!(
            user = user_id,
            resource = resource.as_str(),
            action = action.as_str(),
            granted = decision.granted,
            "permission check"
        );
        self.audit
            .record(AuditEntry::decision(user_id, resource, action, decision.permission));
        decision
    }

    /// Convenience boolean form of [`check_permission`](Self::check_permission).
    pub fn has_permission(
        &self,
        user_id: &str,
        resource: Resource,
        action: Action,
        ctx: &ScopeContext,
    ) -> bool {
        self.check_permission(user_id, resource, action, ctx).granted
    }

    // ---- assignments --------------------------------------------------

    /// Grant a role directly.
    ///
    /// Roles marked requires-approval are refused here; they are granted
    /// only through [`review_role_request`](Self::review_role_request).
    /// Every attempt, success or failure, records one audit entry.
    pub fn assign_role(
        &self,
        user_id: &str,
        role_id: Uuid,
        assigned_by: &str,
        expires_at: Option<DateTime<Utc>>,
        scope: Option<AssignmentScope>,
    ) -> AccessResult<Assignment> {
        let result = self.grant(user_id, role_id, assigned_by, expires_at, scope, true);
        match &result {
            Ok(assignment) => {
                info!(user = user_id, role = %role_id, "role assigned");
                self.audit.record(AuditEntry::mutation(
                    assigned_by,
                    "role.assign",
                    "assignments",
                    Some(assignment.id.to_string()),
                    true,
                    Some(format!("granted role {role_id} to {user_id}")),
                ));
            }
            Err(e) => {
                self.audit.record(AuditEntry::mutation(
                    assigned_by,
                    "role.assign",
                    "assignments",
                    None,
                    false,
                    Some(e.to_string()),
                ));
            }
        }
        result
    }

    /// Revoke a user's active assignment for a role.
    ///
    /// A second revoke of the same pair fails with
    /// [`AccessError::AssignmentNotFound`].
    pub fn revoke_role(&self, user_id: &str, role_id: Uuid) -> AccessResult<Assignment> {
        let result = self.assignments_write().revoke(user_id, role_id);
        match &result {
            Ok(assignment) => {
                info!(user = user_id, role = %role_id, "role revoked");
                self.audit.record(AuditEntry::mutation(
                    user_id,
                    "role.revoke",
                    "assignments",
                    Some(assignment.id.to_string()),
                    true,
                    None,
                ));
            }
            Err(e) => {
                self.audit.record(AuditEntry::mutation(
                    user_id,
                    "role.revoke",
                    "assignments",
                    None,
                    false,
                    Some(e.to_string()),
                ));
            }
        }
        result
    }

    /// The user's effective assignments right now.
    pub fn roles_for_user(&self, user_id: &str) -> Vec<Assignment> {
        self.assignments_read().active_roles_for(user_id, Utc::now())
    }

    /// All assignments for a user, newest first.
    pub fn assignments_for_user(&self, user_id: &str, include_inactive: bool) -> Vec<Assignment> {
        self.assignments_read().list_for_user(user_id, include_inactive)
    }

    /// The explicit expiry maintenance pass. Returns how many assignments
    /// were swept.
    pub fn expire_assignments(&self, now: DateTime<Utc>) -> usize {
        let swept = self.assignments_write().expire_sweep(now);
        for assignment in &swept {
            self.audit.record(AuditEntry::mutation(
                SYSTEM_ACTOR,
                "assignment.expire",
                "assignments",
                Some(assignment.id.to_string()),
                true,
                Some(format!(
                    "expired grant of role {} for {}",
                    assignment.role_id, assignment.user_id
                )),
            ));
        }
        if !swept.is_empty() {
            info!(count = swept.len(), "swept expired assignments");
        }
        swept.len()
    }

    // ---- roles --------------------------------------------------------

    /// Create a role, validating its permissions against the catalog.
    pub fn create_role(&self, role: Role) -> AccessResult<Role> {
        let result = {
            let mut roles = self.roles_write();
            let catalog = self.catalog_read();
            roles.create(role, &catalog)
        };
        if let Ok(role) = &result {
            info!(role = %role.name, level = role.level, "role created");
            self.audit.record(AuditEntry::mutation(
                SYSTEM_ACTOR,
                "role.create",
                "roles",
                Some(role.id.to_string()),
                true,
                None,
            ));
        }
        result
    }

    /// Apply a partial update to a role.
    pub fn update_role(&self, role_id: Uuid, patch: RolePatch) -> AccessResult<Role> {
        let result = {
            let mut roles = self.roles_write();
            let active = self.assignments_read().active_count_for_role(role_id);
            let catalog = self.catalog_read();
            roles.update(role_id, patch, &catalog, active)
        };
        if let Ok(role) = &result {
            info!(role = %role.name, "role updated");
            self.audit.record(AuditEntry::mutation(
                SYSTEM_ACTOR,
                "role.update",
                "roles",
                Some(role.id.to_string()),
                true,
                None,
            ));
        }
        result
    }

    /// Delete a role. Refused for system roles and for roles with active
    /// assignments.
    pub fn delete_role(&self, role_id: Uuid) -> AccessResult<Role> {
        let result = {
            let mut roles = self.roles_write();
            let active = self.assignments_read().active_count_for_role(role_id);
            roles.delete(role_id, active)
        };
        if let Ok(role) = &result {
            info!(role = %role.name, "role deleted");
            self.audit.record(AuditEntry::mutation(
                SYSTEM_ACTOR,
                "role.delete",
                "roles",
                Some(role.id.to_string()),
                true,
                None,
            ));
        }
        result
    }

    /// Get a role by id.
    pub fn get_role(&self, role_id: Uuid) -> AccessResult<Role> {
        self.roles_read().get(role_id).cloned()
    }

    /// Look up a role by name.
    pub fn find_role(&self, name: &str) -> Option<Role> {
        self.roles_read().find_by_name(name).cloned()
    }

    /// List roles sorted by descending level.
    pub fn list_roles(&self, include_inactive: bool) -> Vec<Role> {
        self.roles_read()
            .list(include_inactive)
            .into_iter()
            .cloned()
            .collect()
    }

    // ---- permissions --------------------------------------------------

    /// Register a permission in the catalog.
    pub fn register_permission(&self, permission: Permission) -> AccessResult<PermissionKey> {
        let result = self.catalog_write().register(permission);
        if let Ok(key) = &result {
            info!(permission = %key, "permission registered");
            self.audit.record(AuditEntry::mutation(
                SYSTEM_ACTOR,
                "permission.register",
                "permissions",
                Some(key.to_string()),
                true,
                None,
            ));
        }
        Ok(result?)
    }

    /// Deactivate a permission. Roles referencing it silently stop
    /// granting it.
    pub fn deactivate_permission(&self, key: &PermissionKey) -> AccessResult<()> {
        self.catalog_write().deactivate(key)?;
        info!(permission = %key, "permission deactivated");
        self.audit.record(AuditEntry::mutation(
            SYSTEM_ACTOR,
            "permission.deactivate",
            "permissions",
            Some(key.to_string()),
            true,
            None,
        ));
        Ok(())
    }

    /// Get a catalog entry by key.
    pub fn get_permission(&self, key: &PermissionKey) -> AccessResult<Permission> {
        Ok(self.catalog_read().get(key).cloned()?)
    }

    /// List catalog entries matching a filter.
    pub fn list_permissions(&self, filter: &PermissionFilter) -> Vec<Permission> {
        self.catalog_read()
            .list(filter)
            .into_iter()
            .cloned()
            .collect()
    }

    // ---- role requests ------------------------------------------------

    /// File a role request. The role must exist; whether it is grantable
    /// is judged at review time.
    pub fn create_role_request(
        &self,
        user_id: &str,
        role_id: Uuid,
        requested_by: &str,
        reason: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> AccessResult<RoleRequest> {
        if self.roles_read().find(role_id).is_none() {
            return Err(AccessError::RoleNotFound(role_id));
        }

        let mut request = RoleRequest::new(user_id, role_id, requested_by, reason);
        request.expires_at = expires_at;
        let stored = self.requests_write().create(request);

        info!(user = user_id, role = %role_id, request = %stored.id, "role request filed");
        self.audit.record(AuditEntry::mutation(
            requested_by,
            "request.create",
            "role_requests",
            Some(stored.id.to_string()),
            true,
            None,
        ));
        Ok(stored)
    }

    /// Review a pending request.
    ///
    /// Approval is transactional with the grant: when the grant fails for
    /// any reason the request is force-rejected with notes prefixed
    /// `"Auto-rejected: "` plus the underlying error, so an approval is
    /// never left dangling without a corresponding assignment.
    pub fn review_role_request(
        &self,
        request_id: Uuid,
        reviewer_id: &str,
        decision: ReviewDecision,
        notes: Option<String>,
    ) -> AccessResult<RoleRequest> {
        let mut requests = self.requests_write();
        let request = requests.get(request_id)?.clone();
        if !request.is_pending() {
            return Err(AccessError::AlreadyReviewed);
        }

        let resolved = match decision {
            ReviewDecision::Reject => {
                requests.resolve(request_id, RequestStatus::Rejected, reviewer_id, notes)?
            }
            ReviewDecision::Approve => {
                // Grant first; the request resolves according to the outcome.
                let grant = self.grant(
                    &request.user_id,
                    request.role_id,
                    reviewer_id,
                    request.expires_at,
                    None,
                    false,
                );
                match grant {
                    Ok(assignment) => {
                        info!(user = %request.user_id, role = %request.role_id, "role request approved");
                        self.audit.record(AuditEntry::mutation(
                            reviewer_id,
                            "role.assign",
                            "assignments",
                            Some(assignment.id.to_string()),
                            true,
                            Some(format!(
                                "granted role {} to {} via request {request_id}",
                                request.role_id, request.user_id
                            )),
                        ));
                        requests.resolve(request_id, RequestStatus::Approved, reviewer_id, notes)?
                    }
                    Err(e) => {
                        warn!(
                            request = %request_id,
                            error = %e,
                            "approval grant failed; auto-rejecting request"
                        );
                        self.audit.record(AuditEntry::mutation(
                            reviewer_id,
                            "role.assign",
                            "assignments",
                            None,
                            false,
                            Some(e.to_string()),
                        ));
                        requests.resolve(
                            request_id,
                            RequestStatus::Rejected,
                            reviewer_id,
                            Some(format!("Auto-rejected: {e}")),
                        )?
                    }
                }
            }
        };

        self.audit.record(AuditEntry::mutation(
            reviewer_id,
            "request.review",
            "role_requests",
            Some(request_id.to_string()),
            true,
            Some(resolved.status.as_str().to_string()),
        ));
        Ok(resolved)
    }

    /// Get a role request by id.
    pub fn get_role_request(&self, request_id: Uuid) -> AccessResult<RoleRequest> {
        self.requests_read().get(request_id).cloned()
    }

    /// List role requests, optionally filtered by status, newest first.
    pub fn list_role_requests(&self, status: Option<RequestStatus>) -> Vec<RoleRequest> {
        self.requests_read().list(status)
    }

    // ---- audit --------------------------------------------------------

    /// Query the audit log, newest first.
    pub fn query_audit_log(&self, filter: &AuditFilter) -> Vec<AuditEntry> {
        self.audit.query(filter)
    }

    // ---- internals ----------------------------------------------------

    /// Shared grant path for direct assigns and approval grants.
    ///
    /// `enforce_approval` is false only on the approval path: the request
    /// workflow is the one caller permitted to grant requires-approval
    /// roles.
    fn grant(
        &self,
        user_id: &str,
        role_id: Uuid,
        assigned_by: &str,
        expires_at: Option<DateTime<Utc>>,
        scope: Option<AssignmentScope>,
        enforce_approval: bool,
    ) -> AccessResult<Assignment> {
        let role = self
            .roles_read()
            .find(role_id)
            .cloned()
            .ok_or(AccessError::RoleNotFound(role_id))?;
        if enforce_approval && role.restrictions.requires_approval {
            return Err(AccessError::RoleRequiresApproval);
        }
        self.assignments_write()
            .assign(&role, user_id, assigned_by, expires_at, scope)
    }

    fn requests_read(&self) -> RwLockReadGuard<'_, RequestQueue> {
        self.requests.read().expect("request queue lock poisoned")
    }

    fn requests_write(&self) -> RwLockWriteGuard<'_, RequestQueue> {
        self.requests.write().expect("request queue lock poisoned")
    }

    fn roles_read(&self) -> RwLockReadGuard<'_, RoleRegistry> {
        self.roles.read().expect("role registry lock poisoned")
    }

    fn roles_write(&self) -> RwLockWriteGuard<'_, RoleRegistry> {
        self.roles.write().expect("role registry lock poisoned")
    }

    fn assignments_read(&self) -> RwLockReadGuard<'_, AssignmentStore> {
        self.assignments.read().expect("assignment store lock poisoned")
    }

    fn assignments_write(&self) -> RwLockWriteGuard<'_, AssignmentStore> {
        self.assignments.write().expect("assignment store lock poisoned")
    }

    fn catalog_read(&self) -> RwLockReadGuard<'_, PermissionCatalog> {
        self.catalog.read().expect("permission catalog lock poisoned")
    }

    fn catalog_write(&self) -> RwLockWriteGuard<'_, PermissionCatalog> {
        self.catalog.write().expect("permission catalog lock poisoned")
    }
}
