//! Tree-consistency and membership tests against the in-memory store.
//!
//! These tests exercise the managers through the public API the way the
//! HTTP service does:
//! 1. Ancestor paths stay consistent over arbitrary creation sequences
//! 2. Subtree queries return exactly the node plus its descendants
//! 3. Root listing ignores descendants
//! 4. Membership deletion is idempotent

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use school_org::{
    HierarchyManager, MemoryStore, MembershipFilter, MembershipManager, OrgStore, OrgUnit,
};

/// Test fixture sharing one store between both managers.
struct TestFixture {
    hierarchy: HierarchyManager,
    members: MembershipManager,
}

impl TestFixture {
    fn new() -> Self {
        let store: Arc<dyn OrgStore> = Arc::new(MemoryStore::new());
        Self {
            hierarchy: HierarchyManager::new(store.clone()),
            members: MembershipManager::new(store),
        }
    }

    /// Build a tree of depth four with several branches:
    ///
    /// ```text
    /// School
    ///   ├─ Science
    ///   │    ├─ Physics
    ///   │    │    └─ Lab Committee
    ///   │    └─ Biology
    ///   └─ Arts
    /// Annex
    ///   └─ Library
    /// ```
    async fn build_tree(&self) -> HashMap<&'static str, OrgUnit> {
        let mut units: HashMap<&'static str, OrgUnit> = HashMap::new();
        let plan: [(&'static str, Option<&'static str>); 8] = [
            ("School", None),
            ("Science", Some("School")),
            ("Physics", Some("Science")),
            ("Lab Committee", Some("Physics")),
            ("Biology", Some("Science")),
            ("Arts", Some("School")),
            ("Annex", None),
            ("Library", Some("Annex")),
        ];
        for (name, parent) in plan {
            let parent_id = parent.map(|p: &str| units[p].id.clone());
            let unit = self
                .hierarchy
                .create_node(name, parent_id.as_deref())
                .await
                .unwrap();
            units.insert(name, unit);
        }
        units
    }
}

fn ids(units: &[OrgUnit]) -> HashSet<String> {
    units.iter().map(|u| u.id.clone()).collect()
}

#[tokio::test]
async fn ancestors_extend_parent_path_for_every_node() {
    let fixture = TestFixture::new();
    let units = fixture.build_tree().await;
    let by_id: HashMap<&str, &OrgUnit> = units.values().map(|u| (u.id.as_str(), u)).collect();

    for unit in units.values() {
        match unit.parent_id.as_deref() {
            None => assert!(unit.ancestors.is_empty(), "{} should be a root", unit.name),
            Some(parent_id) => {
                let parent = by_id[parent_id];
                assert!(
                    unit.is_consistent_with(parent),
                    "{} is inconsistent with {}",
                    unit.name,
                    parent.name
                );
            }
        }
    }
}

#[tokio::test]
async fn three_level_scenario() {
    let fixture = TestFixture::new();
    let a = fixture.hierarchy.create_node("School", None).await.unwrap();
    let b = fixture
        .hierarchy
        .create_node("Science", Some(a.id.as_str()))
        .await
        .unwrap();
    let c = fixture
        .hierarchy
        .create_node("Physics", Some(b.id.as_str()))
        .await
        .unwrap();

    assert_eq!(c.ancestors, vec![a.id.clone(), b.id.clone()]);

    let subtree = fixture.hierarchy.find_descendants(&a.id).await.unwrap();
    assert_eq!(
        ids(&subtree),
        HashSet::from([a.id.clone(), b.id.clone(), c.id.clone()])
    );
}

#[tokio::test]
async fn find_descendants_matches_ancestor_membership() {
    let fixture = TestFixture::new();
    let units = fixture.build_tree().await;

    for target in units.values() {
        let expected: HashSet<String> = units
            .values()
            .filter(|u| u.id == target.id || u.ancestors.contains(&target.id))
            .map(|u| u.id.clone())
            .collect();
        let actual = fixture.hierarchy.find_descendants(&target.id).await.unwrap();

        assert_eq!(actual.len(), expected.len(), "duplicates under {}", target.name);
        assert_eq!(ids(&actual), expected, "subtree of {}", target.name);
    }

    let science = fixture
        .hierarchy
        .find_descendants(&units["Science"].id)
        .await
        .unwrap();
    let names: HashSet<&str> = science.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(
        names,
        HashSet::from(["Science", "Physics", "Lab Committee", "Biology"])
    );
}

#[tokio::test]
async fn list_roots_returns_only_parentless_nodes() {
    let fixture = TestFixture::new();
    let units = fixture.build_tree().await;

    let roots = fixture.hierarchy.list_roots().await.unwrap();
    assert_eq!(
        ids(&roots),
        HashSet::from([units["School"].id.clone(), units["Annex"].id.clone()])
    );
    assert!(roots.iter().all(OrgUnit::is_root));
}

#[tokio::test]
async fn delete_membership_twice_leaves_no_records() {
    let fixture = TestFixture::new();
    let units = fixture.build_tree().await;
    let o1 = &units["Physics"].id;

    fixture
        .members
        .create_membership("u1", o1, "teacher")
        .await
        .unwrap();

    let first = fixture.members.delete_membership("u1", o1).await.unwrap();
    assert!(first.is_some());
    let second = fixture.members.delete_membership("u1", o1).await.unwrap();
    assert!(second.is_none());

    let left = fixture
        .members
        .find_memberships(&MembershipFilter::for_pair("u1", o1.as_str()))
        .await
        .unwrap();
    assert!(left.is_empty());
}

#[tokio::test]
async fn memberships_survive_unrelated_deletes() {
    let fixture = TestFixture::new();
    let units = fixture.build_tree().await;

    for (user, unit, role) in [
        ("u1", "Science", "head"),
        ("u1", "Arts", "teacher"),
        ("u2", "Science", "teacher"),
    ] {
        fixture
            .members
            .create_membership(user, &units[unit].id, role)
            .await
            .unwrap();
    }

    fixture
        .members
        .delete_membership("u1", &units["Science"].id)
        .await
        .unwrap();

    let u1 = fixture
        .members
        .find_memberships(&MembershipFilter::for_user("u1"))
        .await
        .unwrap();
    assert_eq!(u1.len(), 1);
    assert_eq!(u1[0].org_unit_id, units["Arts"].id);

    let science = fixture
        .members
        .find_memberships(&MembershipFilter::default().with_org_unit(units["Science"].id.as_str()))
        .await
        .unwrap();
    assert_eq!(science.len(), 1);
    assert_eq!(science[0].user_id, "u2");
}
