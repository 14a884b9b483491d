//! Role requests and the approval queue
//!
//! A role request is a pending ask for a role grant subject to human
//! approval. Requests move `pending -> approved` or `pending -> rejected`,
//! exactly once, never back. The queue records lifecycle only; the
//! transactional approve-and-grant lives in the service facade, which is
//! the one caller permitted to materialize an assignment from an approval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AccessError, AccessResult};

/// The lifecycle state of a role request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Awaiting review.
    Pending,
    /// Approved; a matching assignment exists.
    Approved,
    /// Rejected, by a reviewer or by a failed grant.
    Rejected,
}

impl RequestStatus {
    /// Get the string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// A reviewer's verdict on a pending request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    /// Grant the requested role.
    Approve,
    /// Decline the request.
    Reject,
}

/// A pending or resolved ask for a role grant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleRequest {
    /// Unique request ID
    pub id: Uuid,

    /// The subject the role is requested for
    pub user_id: String,

    /// The requested role
    pub role_id: Uuid,

    /// Who filed the request (often, but not necessarily, the subject)
    pub requested_by: String,

    /// Why the role is needed
    pub reason: String,

    /// Lifecycle state
    pub status: RequestStatus,

    /// Pre-seeded expiry for the resulting assignment
    pub expires_at: Option<DateTime<Utc>>,

    /// When the request was filed
    pub created_at: DateTime<Utc>,

    /// Who reviewed the request, once resolved
    pub reviewed_by: Option<String>,

    /// When the request was reviewed
    pub reviewed_at: Option<DateTime<Utc>>,

    /// Reviewer notes, or the auto-rejection explanation
    pub notes: Option<String>,
}

impl RoleRequest {
    /// Create a new pending request.
    pub fn new(
        user_id: impl Into<String>,
        role_id: Uuid,
        requested_by: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: user_id.into(),
            role_id,
            requested_by: requested_by.into(),
            reason: reason.into(),
            status: RequestStatus::Pending,
            expires_at: None,
            created_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            notes: None,
        }
    }

    /// Pre-seed an expiry for the resulting assignment.
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Check whether the request is still awaiting review.
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// The queue of role requests.
#[derive(Debug, Clone, Default)]
pub struct RequestQueue {
    requests: std::collections::BTreeMap<Uuid, RoleRequest>,
}

impl RequestQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// File a request.
    pub fn create(&mut self, request: RoleRequest) -> RoleRequest {
        let stored = request.clone();
        self.requests.insert(request.id, request);
        stored
    }

    /// Get a request by id.
    pub fn get(&self, id: Uuid) -> AccessResult<&RoleRequest> {
        self.requests.get(&id).ok_or(AccessError::RequestNotFound(id))
    }

    /// List requests, optionally filtered by status, newest first.
    pub fn list(&self, status: Option<RequestStatus>) -> Vec<RoleRequest> {
        let mut requests: Vec<RoleRequest> = self
            .requests
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
    }

    /// Resolve a pending request to a terminal status.
    ///
    /// # Errors
    ///
    /// - [`AccessError::RequestNotFound`] if the request does not exist
    /// - [`AccessError::AlreadyReviewed`] if the request is not pending;
    ///   resolution happens exactly once and is never reversible
    pub fn resolve(
        &mut self,
        id: Uuid,
        status: RequestStatus,
        reviewed_by: &str,
        notes: Option<String>,
    ) -> AccessResult<RoleRequest> {
        debug_assert_ne!(status, RequestStatus::Pending, "resolution must be terminal");
        let request = self
            .requests
            .get_mut(&id)
            .ok_or(AccessError::RequestNotFound(id))?;
        if !request.is_pending() {
            return Err(AccessError::AlreadyReviewed);
        }
        request.status = status;
        request.reviewed_by = Some(reviewed_by.to_string());
        request.reviewed_at = Some(Utc::now());
        request.notes = notes;
        Ok(request.clone())
    }

    /// Number of requests in the queue.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
