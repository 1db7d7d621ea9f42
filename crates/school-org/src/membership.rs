//! Membership domain models
//!
//! This module provides the membership entity that links a user to an org
//! unit with a role label scoped to that unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::SchoolRole;

/// Membership linking a user to an org unit.
///
/// Users are external entities; only their opaque ID is stored. The role is
/// a free-form label, with well-known labels recognised by [`SchoolRole`].
///
/// # Examples
///
/// ```
/// use school_org::Membership;
///
/// let membership = Membership::new("u1", "o1", "teacher");
/// assert_eq!(membership.user_id, "u1");
/// assert!(membership.matches("u1", "o1"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    /// Unique membership ID
    pub id: String,

    /// User ID
    pub user_id: String,

    /// Org unit ID
    pub org_unit_id: String,

    /// Role label within the org unit
    pub role: String,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

impl Membership {
    /// Creates a new membership.
    ///
    /// The membership is created with:
    /// - A newly generated UUID v7 ID
    /// - Current timestamp for created_at
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user ID
    /// * `org_unit_id` - The org unit ID
    /// * `role` - The role label within the org unit
    pub fn new(
        user_id: impl Into<String>,
        org_unit_id: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            user_id: user_id.into(),
            org_unit_id: org_unit_id.into(),
            role: role.into(),
            created_at: Utc::now(),
        }
    }

    /// Check if this membership is for the given (user, org unit) pair.
    pub fn matches(&self, user_id: &str, org_unit_id: &str) -> bool {
        self.user_id == user_id && self.org_unit_id == org_unit_id
    }

    /// The well-known role this label maps to, if any.
    pub fn school_role(&self) -> Option<SchoolRole> {
        SchoolRole::parse(&self.role)
    }
}

/// Filter for membership lookups.
///
/// Unset fields match everything, so the default filter matches all
/// memberships.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MembershipFilter {
    /// Restrict to this user
    pub user_id: Option<String>,

    /// Restrict to this org unit
    pub org_unit_id: Option<String>,
}

impl MembershipFilter {
    /// Filter on a single user.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            org_unit_id: None,
        }
    }

    /// Filter on a single (user, org unit) pair.
    pub fn for_pair(user_id: impl Into<String>, org_unit_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            org_unit_id: Some(org_unit_id.into()),
        }
    }

    /// Restrict the filter to an org unit.
    pub fn with_org_unit(mut self, org_unit_id: impl Into<String>) -> Self {
        self.org_unit_id = Some(org_unit_id.into());
        self
    }

    /// Check if a membership passes this filter.
    pub fn accepts(&self, membership: &Membership) -> bool {
        self.user_id
            .as_deref()
            .map_or(true, |u| membership.user_id == u)
            && self
                .org_unit_id
                .as_deref()
                .map_or(true, |o| membership.org_unit_id == o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_creation() {
        let membership = Membership::new("u1", "o1", "teacher");

        assert_eq!(membership.user_id, "u1");
        assert_eq!(membership.org_unit_id, "o1");
        assert_eq!(membership.role, "teacher");
        assert_eq!(membership.school_role(), Some(SchoolRole::Teacher));
        assert!(!membership.id.is_empty());
    }

    #[test]
    fn test_custom_role_label() {
        let membership = Membership::new("u1", "o1", "chess-club-captain");
        assert_eq!(membership.school_role(), None);
    }

    #[test]
    fn test_filter() {
        let m = Membership::new("u1", "o1", "teacher");

        assert!(MembershipFilter::default().accepts(&m));
        assert!(MembershipFilter::for_user("u1").accepts(&m));
        assert!(MembershipFilter::for_pair("u1", "o1").accepts(&m));
        assert!(!MembershipFilter::for_pair("u1", "o2").accepts(&m));
        assert!(!MembershipFilter::for_user("u2").accepts(&m));
        assert!(MembershipFilter::default().with_org_unit("o1").accepts(&m));
    }

    #[test]
    fn test_json_shape() {
        let m = Membership::new("u1", "o1", "teacher");
        let json = serde_json::to_value(&m).unwrap();

        assert_eq!(json["userId"], "u1");
        assert_eq!(json["orgUnitId"], "o1");
        assert_eq!(json["role"], "teacher");
    }
}
