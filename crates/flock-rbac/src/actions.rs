//! # Actions
//!
//! Defines all actions that can be performed on resources.
//! Actions represent the operations users can perform on resources.

use serde::{Deserialize, Serialize};

/// Actions that can be performed on resources.
///
/// Actions represent different levels of access and operations:
/// - **Read**: View/access resource data
/// - **Create**: Create new resource instances
/// - **Update**: Modify existing resource data
/// - **Delete**: Remove resource instances
/// - **List**: Query/browse multiple resources
/// - **Export**: Download/export resource data
/// - **Import**: Upload/import data
/// - **Send**: Dispatch notifications or messages
/// - **Approve**: Approve pending actions/changes
/// - **Manage**: Administer resource settings
///
/// Permission checks match on the exact `(resource, action)` pair; there is
/// no implication between actions (holding `Manage` does not grant `Read`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read/view resource.
    Read,

    /// Create new resource.
    Create,

    /// Update existing resource.
    Update,

    /// Delete resource.
    Delete,

    /// List/query resources.
    List,

    /// Export resource data.
    Export,

    /// Import data into resource.
    Import,

    /// Send notifications or messages.
    Send,

    /// Approve pending actions.
    Approve,

    /// Manage resource settings.
    Manage,
}

impl Action {
    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::List => "list",
            Action::Export => "export",
            Action::Import => "import",
            Action::Send => "send",
            Action::Approve => "approve",
            Action::Manage => "manage",
        }
    }

    /// Parse an action from its string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, supports aliases)
    ///
    /// # Example
    ///
    /// ```
    /// use flock_rbac::actions::Action;
    ///
    /// assert_eq!(Action::parse("read"), Some(Action::Read));
    /// assert_eq!(Action::parse("view"), Some(Action::Read)); // Alias
    /// assert_eq!(Action::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "read" | "view" | "get" => Some(Action::Read),
            "create" | "add" | "new" => Some(Action::Create),
            "update" | "edit" | "write" | "modify" => Some(Action::Update),
            "delete" | "remove" | "destroy" => Some(Action::Delete),
            "list" | "query" | "browse" | "search" => Some(Action::List),
            "export" | "download" => Some(Action::Export),
            "import" | "upload" => Some(Action::Import),
            "send" | "notify" | "dispatch" => Some(Action::Send),
            "approve" | "accept" => Some(Action::Approve),
            "manage" | "admin" | "administer" => Some(Action::Manage),
            _ => None,
        }
    }

    /// Get all actions.
    pub fn all() -> Vec<Self> {
        vec![
            Action::Read,
            Action::Create,
            Action::Update,
            Action::Delete,
            Action::List,
            Action::Export,
            Action::Import,
            Action::Send,
            Action::Approve,
            Action::Manage,
        ]
    }

    /// Check if this is a read-only action.
    ///
    /// Read-only actions don't modify resources.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Action::Read | Action::List | Action::Export)
    }

    /// Check if this is a write action.
    ///
    /// Write actions modify or create resources.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Action::Create | Action::Update | Action::Delete | Action::Import
        )
    }
}
