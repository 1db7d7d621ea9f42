//! Org unit hierarchy management
//!
//! Creates org units with their materialized ancestor path and answers
//! subtree queries. The ancestor path is paid for once at creation
//! (O(depth) copy from the parent); subtree lookups are then a single
//! filter on `ancestors`, independent of subtree size or depth.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{require_field, OrgError, OrgResult};
use crate::org_unit::OrgUnit;
use crate::store::OrgStore;

/// What to do when `create_node` names a parent that does not exist.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParentPolicy {
    /// Fail with [`OrgError::OrgUnitNotFound`]
    #[default]
    Strict,

    /// Create the node as a root instead
    #[serde(rename = "root")]
    FallbackToRoot,
}

impl ParentPolicy {
    /// Parse a policy name.
    ///
    /// # Examples
    ///
    /// ```
    /// use school_org::ParentPolicy;
    ///
    /// assert_eq!(ParentPolicy::parse("strict"), Some(ParentPolicy::Strict));
    /// assert_eq!(ParentPolicy::parse("root"), Some(ParentPolicy::FallbackToRoot));
    /// assert_eq!(ParentPolicy::parse("lenient"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "root" | "fallback_to_root" | "fallback" => Some(Self::FallbackToRoot),
            _ => None,
        }
    }

    /// Get string representation of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::FallbackToRoot => "root",
        }
    }
}

/// Hierarchy manager over a shared store.
#[derive(Clone)]
pub struct HierarchyManager {
    store: Arc<dyn OrgStore>,
    parent_policy: ParentPolicy,
}

impl std::fmt::Debug for HierarchyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchyManager")
            .field("parent_policy", &self.parent_policy)
            .finish()
    }
}

impl HierarchyManager {
    /// Create a manager with the strict parent policy.
    pub fn new(store: Arc<dyn OrgStore>) -> Self {
        Self::with_parent_policy(store, ParentPolicy::Strict)
    }

    /// Create a manager with an explicit parent policy.
    pub fn with_parent_policy(store: Arc<dyn OrgStore>, parent_policy: ParentPolicy) -> Self {
        Self {
            store,
            parent_policy,
        }
    }

    /// The configured parent policy.
    pub fn parent_policy(&self) -> ParentPolicy {
        self.parent_policy
    }

    /// Create an org unit, optionally below an existing parent.
    ///
    /// A blank `parent_id` is treated as absent. When the parent cannot be
    /// resolved the configured [`ParentPolicy`] decides between failing and
    /// creating a root. Exactly one record is written.
    ///
    /// # Errors
    ///
    /// - [`OrgError::Validation`] if `name` is blank
    /// - [`OrgError::OrgUnitNotFound`] if the parent is unknown under the strict policy
    pub async fn create_node(&self, name: &str, parent_id: Option<&str>) -> OrgResult<OrgUnit> {
        let name = require_field(name, "name")?;
        let parent_id = parent_id.map(str::trim).filter(|p| !p.is_empty());

        let unit = match parent_id {
            None => OrgUnit::root(name),
            Some(parent_id) => match self.store.get_org_unit(parent_id).await? {
                Some(parent) => OrgUnit::child_of(&parent, name),
                None => match self.parent_policy {
                    ParentPolicy::Strict => {
                        return Err(OrgError::OrgUnitNotFound(parent_id.to_string()))
                    }
                    ParentPolicy::FallbackToRoot => {
                        warn!(parent_id, "Parent org unit not found, creating root instead");
                        OrgUnit::root(name)
                    }
                },
            },
        };

        let unit = self.store.insert_org_unit(unit).await?;
        info!(
            org_unit_id = %unit.id,
            parent_id = ?unit.parent_id,
            depth = unit.depth(),
            "Org unit created"
        );
        Ok(unit)
    }

    /// All org units without a parent, in store order.
    pub async fn list_roots(&self) -> OrgResult<Vec<OrgUnit>> {
        self.store.list_roots().await
    }

    /// The org unit itself plus every org unit below it.
    ///
    /// An unknown ID yields an empty list rather than an error; this is a
    /// filter, not a lookup.
    pub async fn find_descendants(&self, org_unit_id: &str) -> OrgResult<Vec<OrgUnit>> {
        let units = self.store.find_subtree(org_unit_id).await?;
        debug!(org_unit_id, count = units.len(), "Subtree query");
        Ok(units)
    }

    /// Look up an org unit by ID.
    ///
    /// # Errors
    ///
    /// [`OrgError::OrgUnitNotFound`] if no such org unit exists
    pub async fn get_node(&self, org_unit_id: &str) -> OrgResult<OrgUnit> {
        self.store
            .get_org_unit(org_unit_id)
            .await?
            .ok_or_else(|| OrgError::OrgUnitNotFound(org_unit_id.to_string()))
    }

    /// Direct children of an existing org unit.
    pub async fn list_children(&self, org_unit_id: &str) -> OrgResult<Vec<OrgUnit>> {
        let parent = self.get_node(org_unit_id).await?;
        self.store.find_children(&parent.id).await
    }

    /// The chain of org units from the root down to `org_unit_id` inclusive.
    ///
    /// Ancestors that can no longer be resolved are skipped.
    pub async fn lineage(&self, org_unit_id: &str) -> OrgResult<Vec<OrgUnit>> {
        let unit = self.get_node(org_unit_id).await?;
        let mut chain = Vec::with_capacity(unit.depth() + 1);
        for ancestor_id in &unit.ancestors {
            match self.store.get_org_unit(ancestor_id).await? {
                Some(ancestor) => chain.push(ancestor),
                None => warn!(org_unit_id, ancestor_id = %ancestor_id, "Dangling ancestor"),
            }
        }
        chain.push(unit);
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn manager(policy: ParentPolicy) -> HierarchyManager {
        HierarchyManager::with_parent_policy(Arc::new(MemoryStore::new()), policy)
    }

    #[test]
    fn test_policy_names_agree() {
        for policy in [ParentPolicy::Strict, ParentPolicy::FallbackToRoot] {
            let json = serde_json::to_value(policy).unwrap();
            assert_eq!(json, serde_json::json!(policy.as_str()));
            assert_eq!(ParentPolicy::parse(policy.as_str()), Some(policy));
            assert_eq!(serde_json::from_value::<ParentPolicy>(json).unwrap(), policy);
        }
    }

    #[tokio::test]
    async fn test_create_root_and_child() {
        let hierarchy = manager(ParentPolicy::Strict);
        let a = hierarchy.create_node("School", None).await.unwrap();
        let b = hierarchy.create_node("Science", Some(a.id.as_str())).await.unwrap();

        assert!(a.is_root());
        assert_eq!(b.parent_id.as_deref(), Some(a.id.as_str()));
        assert_eq!(b.ancestors, vec![a.id]);
    }

    #[tokio::test]
    async fn test_name_is_required() {
        let hierarchy = manager(ParentPolicy::Strict);
        let err = hierarchy.create_node("   ", None).await.unwrap_err();
        assert!(matches!(err, OrgError::Validation(_)));
    }

    #[tokio::test]
    async fn test_name_is_trimmed() {
        let hierarchy = manager(ParentPolicy::Strict);
        let unit = hierarchy.create_node("  School  ", None).await.unwrap();
        assert_eq!(unit.name, "School");
    }

    #[tokio::test]
    async fn test_blank_parent_creates_root() {
        let hierarchy = manager(ParentPolicy::Strict);
        let unit = hierarchy.create_node("School", Some("  ")).await.unwrap();
        assert!(unit.is_root());
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_unknown_parent() {
        let hierarchy = manager(ParentPolicy::Strict);
        let err = hierarchy
            .create_node("Science", Some("missing"))
            .await
            .unwrap_err();

        assert!(matches!(err, OrgError::OrgUnitNotFound(id) if id == "missing"));
        assert!(hierarchy.list_roots().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_policy_creates_root() {
        let hierarchy = manager(ParentPolicy::FallbackToRoot);
        let unit = hierarchy
            .create_node("Science", Some("missing"))
            .await
            .unwrap();

        assert!(unit.is_root());
        assert!(unit.ancestors.is_empty());
    }

    #[tokio::test]
    async fn test_children_and_lineage() {
        let hierarchy = manager(ParentPolicy::Strict);
        let a = hierarchy.create_node("School", None).await.unwrap();
        let b = hierarchy.create_node("Science", Some(a.id.as_str())).await.unwrap();
        let c = hierarchy.create_node("Physics", Some(b.id.as_str())).await.unwrap();

        let children = hierarchy.list_children(&a.id).await.unwrap();
        assert_eq!(children, vec![b.clone()]);

        let lineage = hierarchy.lineage(&c.id).await.unwrap();
        assert_eq!(lineage, vec![a, b, c]);

        assert!(matches!(
            hierarchy.list_children("missing").await,
            Err(OrgError::OrgUnitNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_find_descendants_of_unknown_is_empty() {
        let hierarchy = manager(ParentPolicy::Strict);
        hierarchy.create_node("School", None).await.unwrap();
        assert!(hierarchy.find_descendants("missing").await.unwrap().is_empty());
    }

    #[test]
    fn test_parent_policy_parse() {
        assert_eq!(ParentPolicy::parse("STRICT"), Some(ParentPolicy::Strict));
        assert_eq!(
            ParentPolicy::parse("fallback_to_root"),
            Some(ParentPolicy::FallbackToRoot)
        );
        assert_eq!(ParentPolicy::default(), ParentPolicy::Strict);
    }
}
