//! The audit log
//!
//! Append-only record of every access decision and every administrative
//! mutation. Entries are never mutated or deleted through normal
//! operation; retention and rotation are operational concerns outside the
//! core.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use flock_rbac::{Action, PermissionKey, Resource};

/// One audit record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditEntry {
    /// Unique entry ID
    pub id: Uuid,

    /// The subject of the entry: the checked user for decisions, the
    /// acting user for mutations
    pub user_id: String,

    /// The attempted action (`"create"`) or mutation kind (`"role.assign"`)
    pub action: String,

    /// The resource or registry acted on
    pub resource: String,

    /// A specific entity id, when one applies
    pub resource_id: Option<String>,

    /// The matched permission key, on granted decisions
    pub permission: Option<String>,

    /// Whether the decision or mutation succeeded
    pub granted: bool,

    /// Denial or failure explanation
    pub reason: Option<String>,

    /// When the entry was recorded
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    /// Record an access decision.
    pub fn decision(
        user_id: impl Into<String>,
        resource: Resource,
        action: Action,
        matched: Option<PermissionKey>,
    ) -> Self {
        let granted = matched.is_some();
        Self {
            id: Uuid::now_v7(),
            user_id: user_id.into(),
            action: action.as_str().to_string(),
            resource: resource.as_str().to_string(),
            resource_id: None,
            permission: matched.map(|key| key.to_string()),
            granted,
            reason: (!granted).then(|| "insufficient permissions".to_string()),
            timestamp: Utc::now(),
        }
    }

    /// Record an administrative mutation.
    pub fn mutation(
        user_id: impl Into<String>,
        action: impl Into<String>,
        resource: impl Into<String>,
        resource_id: Option<String>,
        granted: bool,
        reason: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: user_id.into(),
            action: action.into(),
            resource: resource.into(),
            resource_id,
            permission: None,
            granted,
            reason,
            timestamp: Utc::now(),
        }
    }
}

/// Filter for audit queries. Predicates combine with AND semantics.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Only entries for this subject.
    pub user_id: Option<String>,
    /// Only entries touching this resource.
    pub resource: Option<String>,
    /// Only granted (or only denied) entries.
    pub granted: Option<bool>,
    /// Only entries at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Only entries at or before this instant.
    pub to: Option<DateTime<Utc>>,
}

impl AuditFilter {
    /// Create an empty filter matching every entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one subject.
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Restrict to one resource.
    pub fn for_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Restrict to granted or denied entries.
    pub fn with_granted(mut self, granted: bool) -> Self {
        self.granted = Some(granted);
        self
    }

    /// Restrict to a time range (inclusive on both ends).
    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    fn matches(&self, entry: &AuditEntry) -> bool {
        self.user_id.as_deref().map_or(true, |u| entry.user_id == u)
            && self.resource.as_deref().map_or(true, |r| entry.resource == r)
            && self.granted.map_or(true, |g| entry.granted == g)
            && self.from.map_or(true, |f| entry.timestamp >= f)
            && self.to.map_or(true, |t| entry.timestamp <= t)
    }
}

/// The append-only audit log.
///
/// Interior mutability lets every component record entries through a
/// shared reference; the internal lock is always taken last and alone.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl AuditLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn record(&self, entry: AuditEntry) {
        self.entries
            .lock()
            .expect("audit log lock poisoned")
            .push(entry);
    }

    /// Query entries matching a filter, newest first.
    pub fn query(&self, filter: &AuditFilter) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .expect("audit log lock poisoned")
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect()
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("audit log lock poisoned").len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn granted_entry(user: &str) -> AuditEntry {
        AuditEntry::decision(
            user,
            Resource::Events,
            Action::Create,
            Some(PermissionKey::new(Resource::Events, Action::Create)),
        )
    }

    fn denied_entry(user: &str) -> AuditEntry {
        AuditEntry::decision(user, Resource::Events, Action::Create, None)
    }

    #[test]
    fn test_decision_entry_shape() {
        let granted = granted_entry("u1");
        assert!(granted.granted);
        assert_eq!(granted.permission.as_deref(), Some("events:create"));
        assert!(granted.reason.is_none());

        let denied = denied_entry("u1");
        assert!(!denied.granted);
        assert!(denied.permission.is_none());
        assert_eq!(denied.reason.as_deref(), Some("insufficient permissions"));
    }

    #[test]
    fn test_query_newest_first() {
        let log = AuditLog::new();
        log.record(granted_entry("u1"));
        log.record(denied_entry("u1"));

        let entries = log.query(&AuditFilter::new());
        assert_eq!(entries.len(), 2);
        assert!(entries[0].timestamp >= entries[1].timestamp);
        assert!(!entries[0].granted); // the later entry comes first
    }

    #[test]
    fn test_query_filters() {
        let log = AuditLog::new();
        log.record(granted_entry("u1"));
        log.record(denied_entry("u2"));
        log.record(AuditEntry::mutation(
            "admin",
            "role.assign",
            "assignments",
            None,
            true,
            None,
        ));

        assert_eq!(log.query(&AuditFilter::new().for_user("u1")).len(), 1);
        assert_eq!(log.query(&AuditFilter::new().with_granted(false)).len(), 1);
        assert_eq!(
            log.query(&AuditFilter::new().for_resource("assignments")).len(),
            1
        );
        assert_eq!(
            log.query(&AuditFilter::new().for_user("u2").with_granted(true)).len(),
            0
        );
    }

    #[test]
    fn test_query_time_range() {
        let t0 = Utc::now();
        let mut early = granted_entry("u1");
        early.timestamp = t0;
        let mut late = denied_entry("u1");
        late.timestamp = t0 + chrono::Duration::hours(2);

        let log = AuditLog::new();
        log.record(early);
        log.record(late);

        let window = chrono::Duration::hours(1);
        let hits = log.query(&AuditFilter::new().between(t0 - window, t0 + window));
        assert_eq!(hits.len(), 1);
        assert!(hits[0].granted);
    }
}
