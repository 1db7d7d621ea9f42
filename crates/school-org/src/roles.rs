//! Well-known school roles
//!
//! Membership roles are free-form labels. This module recognises the labels
//! the access policy understands and orders them by privilege.

use serde::{Deserialize, Serialize};

/// Well-known role held within an org unit.
///
/// Roles are hierarchical, with each role inheriting the capabilities of
/// lower roles. The hierarchy is:
/// Student < Parent < Teacher < Head < Principal < Admin
///
/// # Capability Model
///
/// - **Student**, **Parent**, **Teacher**: view the unit and its subtree
/// - **Head**: also manage memberships in the subtree
/// - **Principal**, **Admin**: also create org units in the subtree
///
/// # Examples
///
/// ```
/// use school_org::SchoolRole;
///
/// let role = SchoolRole::Head;
/// assert!(role.can_manage_members());
/// assert!(!role.can_manage_units());
///
/// assert!(SchoolRole::Principal.can_manage_units());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SchoolRole {
    /// Enrolled student
    Student = 0,

    /// Parent or guardian of a student
    Parent = 1,

    /// Teaching staff
    Teacher = 2,

    /// Head of a department, committee or year group
    Head = 3,

    /// Principal of a school
    Principal = 4,

    /// Administrative staff with full control
    Admin = 5,
}

impl SchoolRole {
    /// Check if this role may view the unit and its subtree.
    pub fn can_view(&self) -> bool {
        true
    }

    /// Check if this role can add and remove memberships.
    ///
    /// # Returns
    ///
    /// `true` for Head, Principal and Admin roles
    pub fn can_manage_members(&self) -> bool {
        *self >= SchoolRole::Head
    }

    /// Check if this role can create org units below its unit.
    ///
    /// # Returns
    ///
    /// `true` for Principal and Admin roles
    pub fn can_manage_units(&self) -> bool {
        *self >= SchoolRole::Principal
    }

    /// Parse role from a membership label.
    ///
    /// # Arguments
    ///
    /// * `s` - Label to parse (case-insensitive, surrounding whitespace ignored)
    ///
    /// # Returns
    ///
    /// `Some(SchoolRole)` for a well-known label, `None` otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use school_org::SchoolRole;
    ///
    /// assert_eq!(SchoolRole::parse("teacher"), Some(SchoolRole::Teacher));
    /// assert_eq!(SchoolRole::parse("GUARDIAN"), Some(SchoolRole::Parent));
    /// assert_eq!(SchoolRole::parse("librarian"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "student" | "pupil" => Some(Self::Student),
            "parent" | "guardian" => Some(Self::Parent),
            "teacher" => Some(Self::Teacher),
            "head" => Some(Self::Head),
            "principal" => Some(Self::Principal),
            "admin" | "administrator" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Get string representation of the role.
    ///
    /// # Examples
    ///
    /// ```
    /// use school_org::SchoolRole;
    ///
    /// assert_eq!(SchoolRole::Head.as_str(), "head");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Parent => "parent",
            Self::Teacher => "teacher",
            Self::Head => "head",
            Self::Principal => "principal",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for SchoolRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
