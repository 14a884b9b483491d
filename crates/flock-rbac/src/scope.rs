//! # Permission Scopes
//!
//! Defines the scope classes that limit where a granted permission applies.
//! A permission's scope is the blast-radius qualifier: a church-scoped
//! permission only applies within churches named by the holder's assignment,
//! while a global permission applies everywhere.

use serde::{Deserialize, Serialize};

/// The scope class of a permission.
///
/// Scopes limit where a granted permission applies:
/// - **Global**: applies everywhere, no context required
/// - **Church**: applies only within churches named by the assignment
/// - **Team**: applies only within teams named by the assignment
/// - **Self**: applies only to the subject's own records
///
/// Self-scoped permissions are inherently self-limiting and require no
/// scope context at decision time.
///
/// # Examples
///
/// ```
/// use flock_rbac::scope::PermissionScope;
///
/// assert!(PermissionScope::Church.requires_context());
/// assert!(!PermissionScope::Global.requires_context());
/// assert_eq!(PermissionScope::SelfOnly.as_str(), "self");
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PermissionScope {
    /// Applies everywhere, independent of context.
    Global,
    /// Applies within churches named by the holder's assignment.
    Church,
    /// Applies within teams named by the holder's assignment.
    Team,
    /// Applies only to the subject's own records.
    #[serde(rename = "self")]
    SelfOnly,
}

impl PermissionScope {
    /// Get the string representation of the scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionScope::Global => "global",
            PermissionScope::Church => "church",
            PermissionScope::Team => "team",
            PermissionScope::SelfOnly => "self",
        }
    }

    /// Parse a scope from its string representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use flock_rbac::scope::PermissionScope;
    ///
    /// assert_eq!(PermissionScope::parse("church"), Some(PermissionScope::Church));
    /// assert_eq!(PermissionScope::parse("SELF"), Some(PermissionScope::SelfOnly));
    /// assert_eq!(PermissionScope::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "global" => Some(PermissionScope::Global),
            "church" => Some(PermissionScope::Church),
            "team" => Some(PermissionScope::Team),
            "self" | "own" => Some(PermissionScope::SelfOnly),
            _ => None,
        }
    }

    /// Get all scope classes.
    pub fn all() -> Vec<Self> {
        vec![
            PermissionScope::Global,
            PermissionScope::Church,
            PermissionScope::Team,
            PermissionScope::SelfOnly,
        ]
    }

    /// Check whether decisions for this scope depend on a scope context.
    ///
    /// Global and self scopes always match; church and team scopes match
    /// only against the ids carried by the holder's assignment.
    pub fn requires_context(&self) -> bool {
        matches!(self, PermissionScope::Church | PermissionScope::Team)
    }
}

/// The functional category of a permission.
///
/// Categories group permissions for the role-management UI; they carry no
/// decision semantics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    /// Day-to-day membership and event operations.
    Core,
    /// Platform administration.
    Admin,
    /// Ministry leadership operations.
    Ministry,
    /// Giving and finance operations.
    Financial,
}

impl PermissionCategory {
    /// Get the string representation of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionCategory::Core => "core",
            PermissionCategory::Admin => "admin",
            PermissionCategory::Ministry => "ministry",
            PermissionCategory::Financial => "financial",
        }
    }

    /// Parse a category from its string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "core" => Some(PermissionCategory::Core),
            "admin" => Some(PermissionCategory::Admin),
            "ministry" => Some(PermissionCategory::Ministry),
            "financial" | "finance" => Some(PermissionCategory::Financial),
            _ => None,
        }
    }

    /// Get all categories.
    pub fn all() -> Vec<Self> {
        vec![
            PermissionCategory::Core,
            PermissionCategory::Admin,
            PermissionCategory::Ministry,
            PermissionCategory::Financial,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_as_str() {
        assert_eq!(PermissionScope::Global.as_str(), "global");
        assert_eq!(PermissionScope::SelfOnly.as_str(), "self");
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!(PermissionScope::parse("global"), Some(PermissionScope::Global));
        assert_eq!(PermissionScope::parse("self"), Some(PermissionScope::SelfOnly));
        assert_eq!(PermissionScope::parse("own"), Some(PermissionScope::SelfOnly));
        assert_eq!(PermissionScope::parse("invalid"), None);
    }

    #[test]
    fn test_scope_round_trip() {
        for scope in PermissionScope::all() {
            assert_eq!(PermissionScope::parse(scope.as_str()), Some(scope));
        }
    }

    #[test]
    fn test_requires_context() {
        assert!(PermissionScope::Church.requires_context());
        assert!(PermissionScope::Team.requires_context());
        assert!(!PermissionScope::Global.requires_context());
        assert!(!PermissionScope::SelfOnly.requires_context());
    }

    #[test]
    fn test_scope_serde_self_rename() {
        let json = serde_json::to_string(&PermissionScope::SelfOnly).unwrap();
        assert_eq!(json, "\"self\"");
        let parsed: PermissionScope = serde_json::from_str("\"self\"").unwrap();
        assert_eq!(parsed, PermissionScope::SelfOnly);
    }

    #[test]
    fn test_category_round_trip() {
        for category in PermissionCategory::all() {
            assert_eq!(PermissionCategory::parse(category.as_str()), Some(category));
        }
    }
}
