//! # Resource Types
//!
//! Defines all resource types across the Flock platform (Admin, People, Giving).
//! Resources are the nouns that permissions attach to.

use serde::{Deserialize, Serialize};

/// Resource types that can have permissions assigned.
///
/// Resources cover the whole church-management domain:
/// - **Membership**: People, Households, Profile
/// - **Organization**: Churches, Teams, Groups
/// - **Ministry**: Events, Kpis, Evaluations, Locations, Notifications
/// - **Finance**: Donations
/// - **Administration**: Reports, Roles, Settings, AuditLog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Member and visitor records.
    People,
    /// Household groupings of people.
    Households,
    /// A user's own profile data.
    Profile,
    /// Church (campus/congregation) records.
    Churches,
    /// Ministry teams.
    Teams,
    /// Small groups.
    Groups,
    /// Services and calendar events.
    Events,
    /// Giving and donation records.
    Donations,
    /// Key performance indicators.
    Kpis,
    /// Ministry evaluations.
    Evaluations,
    /// Physical locations and rooms.
    Locations,
    /// Notifications and announcements.
    Notifications,
    /// Generated reports.
    Reports,
    /// Role definitions.
    Roles,
    /// Platform settings.
    Settings,
    /// The access-control audit trail.
    AuditLog,
}

impl Resource {
    /// Get the string representation of the resource.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::People => "people",
            Resource::Households => "households",
            Resource::Profile => "profile",
            Resource::Churches => "churches",
            Resource::Teams => "teams",
            Resource::Groups => "groups",
            Resource::Events => "events",
            Resource::Donations => "donations",
            Resource::Kpis => "kpis",
            Resource::Evaluations => "evaluations",
            Resource::Locations => "locations",
            Resource::Notifications => "notifications",
            Resource::Reports => "reports",
            Resource::Roles => "roles",
            Resource::Settings => "settings",
            Resource::AuditLog => "audit_log",
        }
    }

    /// Parse a resource from its string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive, supports aliases)
    ///
    /// # Example
    ///
    /// ```
    /// use flock_rbac::resources::Resource;
    ///
    /// assert_eq!(Resource::parse("people"), Some(Resource::People));
    /// assert_eq!(Resource::parse("members"), Some(Resource::People)); // Alias
    /// assert_eq!(Resource::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "people" | "person" | "members" => Some(Resource::People),
            "households" | "household" | "families" => Some(Resource::Households),
            "profile" => Some(Resource::Profile),
            "churches" | "church" | "campuses" => Some(Resource::Churches),
            "teams" | "team" => Some(Resource::Teams),
            "groups" | "group" => Some(Resource::Groups),
            "events" | "event" | "services" => Some(Resource::Events),
            "donations" | "donation" | "giving" => Some(Resource::Donations),
            "kpis" | "kpi" | "metrics" => Some(Resource::Kpis),
            "evaluations" | "evaluation" => Some(Resource::Evaluations),
            "locations" | "location" | "rooms" => Some(Resource::Locations),
            "notifications" | "notification" => Some(Resource::Notifications),
            "reports" | "report" => Some(Resource::Reports),
            "roles" | "role" => Some(Resource::Roles),
            "settings" => Some(Resource::Settings),
            "audit_log" | "audit" => Some(Resource::AuditLog),
            _ => None,
        }
    }

    /// Get all resource types.
    pub fn all() -> Vec<Self> {
        vec![
            Resource::People,
            Resource::Households,
            Resource::Profile,
            Resource::Churches,
            Resource::Teams,
            Resource::Groups,
            Resource::Events,
            Resource::Donations,
            Resource::Kpis,
            Resource::Evaluations,
            Resource::Locations,
            Resource::Notifications,
            Resource::Reports,
            Resource::Roles,
            Resource::Settings,
            Resource::AuditLog,
        ]
    }
}
