//! Store abstraction and in-memory implementation
//!
//! The hierarchy and membership managers reach persistence only through the
//! [`OrgStore`] trait. Each call is atomic on its own; callers that read and
//! then write (such as resolving a parent before inserting a child) get no
//! transaction spanning both calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{OrgError, OrgResult};
use crate::membership::{Membership, MembershipFilter};
use crate::org_unit::OrgUnit;

/// Record counts reported by a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of org units
    pub org_units: usize,
    /// Number of membership records
    pub memberships: usize,
}

/// Persistence operations for org units and memberships.
#[async_trait]
pub trait OrgStore: Send + Sync {
    /// Persist a new org unit.
    async fn insert_org_unit(&self, unit: OrgUnit) -> OrgResult<OrgUnit>;

    /// Look up an org unit by ID.
    async fn get_org_unit(&self, id: &str) -> OrgResult<Option<OrgUnit>>;

    /// All org units without a parent.
    async fn list_roots(&self) -> OrgResult<Vec<OrgUnit>>;

    /// All org units whose parent is `parent_id`.
    async fn find_children(&self, parent_id: &str) -> OrgResult<Vec<OrgUnit>>;

    /// The org unit `id` plus every org unit with `id` in its ancestor path.
    async fn find_subtree(&self, id: &str) -> OrgResult<Vec<OrgUnit>>;

    /// Persist a new membership.
    ///
    /// Stores that enforce one record per (user, org unit) pair fail with
    /// [`OrgError::DuplicateMembership`].
    async fn insert_membership(&self, membership: Membership) -> OrgResult<Membership>;

    /// All memberships accepted by `filter`.
    async fn find_memberships(&self, filter: &MembershipFilter) -> OrgResult<Vec<Membership>>;

    /// Remove the oldest membership for the pair, returning it if one existed.
    async fn delete_first_membership(
        &self,
        user_id: &str,
        org_unit_id: &str,
    ) -> OrgResult<Option<Membership>>;

    /// Current record counts.
    async fn stats(&self) -> OrgResult<StoreStats>;
}

#[derive(Default)]
struct UnitTable {
    rows: Vec<OrgUnit>,
    by_id: HashMap<String, usize>,
}

/// In-memory store implementation.
///
/// Records are kept in insertion order. This is suitable for single-process
/// deployments and testing.
pub struct MemoryStore {
    /// Org units with an ID index
    units: Arc<RwLock<UnitTable>>,
    /// Membership records
    memberships: Arc<RwLock<Vec<Membership>>>,
    /// Enforce at most one membership per (user, org unit) pair
    unique_memberships: bool,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("unique_memberships", &self.unique_memberships)
            .finish()
    }
}

impl MemoryStore {
    /// Create an empty store enforcing one membership per pair.
    pub fn new() -> Self {
        Self {
            units: Arc::new(RwLock::new(UnitTable::default())),
            memberships: Arc::new(RwLock::new(Vec::new())),
            unique_memberships: true,
        }
    }

    /// Create an empty store that keeps several memberships per pair.
    pub fn allowing_duplicate_memberships() -> Self {
        Self {
            unique_memberships: false,
            ..Self::new()
        }
    }

    /// Whether the membership uniqueness constraint is enforced.
    pub fn enforces_unique_memberships(&self) -> bool {
        self.unique_memberships
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrgStore for MemoryStore {
    async fn insert_org_unit(&self, unit: OrgUnit) -> OrgResult<OrgUnit> {
        let mut table = self.units.write().await;
        if table.by_id.contains_key(&unit.id) {
            return Err(OrgError::Store(format!("duplicate org unit id {}", unit.id)));
        }
        let index = table.rows.len();
        table.by_id.insert(unit.id.clone(), index);
        table.rows.push(unit.clone());
        Ok(unit)
    }

    async fn get_org_unit(&self, id: &str) -> OrgResult<Option<OrgUnit>> {
        let table = self.units.read().await;
        Ok(table.by_id.get(id).map(|&i| table.rows[i].clone()))
    }

    async fn list_roots(&self) -> OrgResult<Vec<OrgUnit>> {
        let table = self.units.read().await;
        Ok(table.rows.iter().filter(|u| u.is_root()).cloned().collect())
    }

    async fn find_children(&self, parent_id: &str) -> OrgResult<Vec<OrgUnit>> {
        let table = self.units.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|u| u.parent_id.as_deref() == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn find_subtree(&self, id: &str) -> OrgResult<Vec<OrgUnit>> {
        let table = self.units.read().await;
        Ok(table.rows.iter().filter(|u| u.is_within(id)).cloned().collect())
    }

    async fn insert_membership(&self, membership: Membership) -> OrgResult<Membership> {
        let mut memberships = self.memberships.write().await;
        if self.unique_memberships
            && memberships
                .iter()
                .any(|m| m.matches(&membership.user_id, &membership.org_unit_id))
        {
            return Err(OrgError::DuplicateMembership {
                user_id: membership.user_id,
                org_unit_id: membership.org_unit_id,
            });
        }
        memberships.push(membership.clone());
        Ok(membership)
    }

    async fn find_memberships(&self, filter: &MembershipFilter) -> OrgResult<Vec<Membership>> {
        let memberships = self.memberships.read().await;
        Ok(memberships
            .iter()
            .filter(|m| filter.accepts(m))
            .cloned()
            .collect())
    }

    async fn delete_first_membership(
        &self,
        user_id: &str,
        org_unit_id: &str,
    ) -> OrgResult<Option<Membership>> {
        let mut memberships = self.memberships.write().await;
        let position = memberships
            .iter()
            .position(|m| m.matches(user_id, org_unit_id));
        Ok(position.map(|i| memberships.remove(i)))
    }

    async fn stats(&self) -> OrgResult<StoreStats> {
        let org_units = self.units.read().await.rows.len();
        let memberships = self.memberships.read().await.len();
        Ok(StoreStats {
            org_units,
            memberships,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get_org_unit() {
        let store = MemoryStore::new();
        let root = store.insert_org_unit(OrgUnit::root("School")).await.unwrap();

        let found = store.get_org_unit(&root.id).await.unwrap();
        assert_eq!(found, Some(root));
        assert_eq!(store.get_org_unit("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_org_unit_id_rejected() {
        let store = MemoryStore::new();
        let root = OrgUnit::root("School");
        store.insert_org_unit(root.clone()).await.unwrap();

        let err = store.insert_org_unit(root).await.unwrap_err();
        assert!(matches!(err, OrgError::Store(_)));
    }

    #[tokio::test]
    async fn test_subtree_and_children() {
        let store = MemoryStore::new();
        let a = store.insert_org_unit(OrgUnit::root("School")).await.unwrap();
        let b = store
            .insert_org_unit(OrgUnit::child_of(&a, "Science"))
            .await
            .unwrap();
        let c = store
            .insert_org_unit(OrgUnit::child_of(&b, "Physics"))
            .await
            .unwrap();
        store.insert_org_unit(OrgUnit::root("Annex")).await.unwrap();

        let subtree = store.find_subtree(&b.id).await.unwrap();
        assert_eq!(subtree, vec![b.clone(), c.clone()]);

        let children = store.find_children(&a.id).await.unwrap();
        assert_eq!(children, vec![b]);

        assert_eq!(store.list_roots().await.unwrap().len(), 2);
        assert!(store.find_subtree("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unique_membership_constraint() {
        let store = MemoryStore::new();
        store
            .insert_membership(Membership::new("u1", "o1", "teacher"))
            .await
            .unwrap();

        let err = store
            .insert_membership(Membership::new("u1", "o1", "head"))
            .await
            .unwrap_err();
        assert!(matches!(err, OrgError::DuplicateMembership { .. }));

        // A different org unit for the same user is fine
        store
            .insert_membership(Membership::new("u1", "o2", "teacher"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_removes_oldest_match() {
        let store = MemoryStore::allowing_duplicate_memberships();
        let first = store
            .insert_membership(Membership::new("u1", "o1", "teacher"))
            .await
            .unwrap();
        store
            .insert_membership(Membership::new("u1", "o1", "head"))
            .await
            .unwrap();

        let removed = store.delete_first_membership("u1", "o1").await.unwrap();
        assert_eq!(removed, Some(first));

        let left = store
            .find_memberships(&MembershipFilter::for_pair("u1", "o1"))
            .await
            .unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].role, "head");
    }

    #[tokio::test]
    async fn test_stats() {
        let store = MemoryStore::new();
        store.insert_org_unit(OrgUnit::root("School")).await.unwrap();
        store
            .insert_membership(Membership::new("u1", "o1", "teacher"))
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(
            stats,
            StoreStats {
                org_units: 1,
                memberships: 1
            }
        );
    }
}
