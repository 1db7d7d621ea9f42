//! Org unit domain models
//!
//! This module provides the OrgUnit entity, a node in the school's
//! organizational tree. Each node carries its materialized ancestor path so
//! that subtree queries are a single membership filter over `ancestors`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A node in the organizational tree (school, department, committee, class).
///
/// The ancestor path is written once at creation and never rewritten:
/// for a node with parent `P`, `ancestors == P.ancestors + [P.id]`.
///
/// # Architecture
///
/// ```text
/// School            ancestors = []
///   └─ Science      ancestors = [school]
///        └─ Physics ancestors = [school, science]
/// ```
///
/// # Examples
///
/// ```
/// use school_org::OrgUnit;
///
/// let school = OrgUnit::root("School");
/// let science = OrgUnit::child_of(&school, "Science");
/// assert!(school.is_root());
/// assert_eq!(science.ancestors, vec![school.id.clone()]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnit {
    /// Unique identifier for the org unit
    pub id: String,

    /// Display name
    pub name: String,

    /// Parent org unit ID, `None` for a root
    pub parent_id: Option<String>,

    /// Ancestor IDs ordered from the root down to the immediate parent
    #[serde(default)]
    pub ancestors: Vec<String>,

    /// When the org unit was created
    pub created_at: DateTime<Utc>,
}

impl OrgUnit {
    /// Creates a new root org unit.
    ///
    /// The org unit is created with:
    /// - A newly generated UUID v7 ID
    /// - No parent and an empty ancestor path
    /// - Current timestamp for created_at
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            name: name.into(),
            parent_id: None,
            ancestors: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Creates a new org unit directly below `parent`.
    ///
    /// # Arguments
    ///
    /// * `parent` - The resolved parent node
    /// * `name` - The display name of the new node
    ///
    /// # Examples
    ///
    /// ```
    /// use school_org::OrgUnit;
    ///
    /// let a = OrgUnit::root("School");
    /// let b = OrgUnit::child_of(&a, "Science");
    /// let c = OrgUnit::child_of(&b, "Physics");
    /// assert_eq!(c.ancestors, vec![a.id.clone(), b.id.clone()]);
    /// assert_eq!(c.parent_id.as_deref(), Some(b.id.as_str()));
    /// ```
    pub fn child_of(parent: &OrgUnit, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            name: name.into(),
            parent_id: Some(parent.id.clone()),
            ancestors: parent.lineage(),
            created_at: Utc::now(),
        }
    }

    /// Check if this org unit is a root (has no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Number of ancestors between this node and its root.
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    /// Check if `org_unit_id` appears in this node's ancestor path.
    pub fn is_descendant_of(&self, org_unit_id: &str) -> bool {
        self.ancestors.iter().any(|a| a == org_unit_id)
    }

    /// Check if this node is `org_unit_id` itself or one of its descendants.
    ///
    /// This is the filter behind subtree queries.
    pub fn is_within(&self, org_unit_id: &str) -> bool {
        self.id == org_unit_id || self.is_descendant_of(org_unit_id)
    }

    /// Ancestor path followed by this node's own ID.
    ///
    /// This is exactly the ancestor path a child of this node receives.
    pub fn lineage(&self) -> Vec<String> {
        let mut path = Vec::with_capacity(self.ancestors.len() + 1);
        path.extend(self.ancestors.iter().cloned());
        path.push(self.id.clone());
        path
    }

    /// Check the ancestor invariant against a claimed parent.
    ///
    /// # Returns
    ///
    /// `true` if `parent` is this node's parent and the ancestor path equals
    /// the parent's path with the parent's ID appended
    pub fn is_consistent_with(&self, parent: &OrgUnit) -> bool {
        self.parent_id.as_deref() == Some(parent.id.as_str()) && self.ancestors == parent.lineage()
    }
}
