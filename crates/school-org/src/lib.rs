//! # School Org
//!
//! This crate provides the organizational-unit hierarchy and membership
//! management behind school administration services.
//!
//! ## Overview
//!
//! The school-org crate handles:
//! - **Org units**: Nodes of the school's organizational tree, each carrying
//!   its materialized ancestor path
//! - **Hierarchy**: Node creation and subtree queries
//! - **Memberships**: (user, org unit, role) assignments
//! - **Roles**: Well-known school roles ordered by privilege
//! - **Access**: Injected capability checks for callers
//! - **Store**: Persistence seam with an in-memory implementation
//!
//! ## Architecture
//!
//! ```text
//! OrgStore (Arc<dyn OrgStore>)
//!   ├─ HierarchyManager   create_node / list_roots / find_descendants
//!   ├─ MembershipManager  create_membership / delete_membership
//!   └─ MembershipAccess   capability checks from memberships
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use school_org::{HierarchyManager, MemoryStore, MembershipManager, OrgStore};
//!
//! # async fn run() -> school_org::OrgResult<()> {
//! let store: Arc<dyn OrgStore> = Arc::new(MemoryStore::new());
//! let hierarchy = HierarchyManager::new(store.clone());
//! let members = MembershipManager::new(store);
//!
//! let school = hierarchy.create_node("School", None).await?;
//! let science = hierarchy.create_node("Science", Some(school.id.as_str())).await?;
//! members.create_membership("u1", &science.id, "teacher").await?;
//!
//! let subtree = hierarchy.find_descendants(&school.id).await?;
//! assert_eq!(subtree.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod error;
pub mod hierarchy;
pub mod members;
pub mod membership;
pub mod org_unit;
pub mod roles;
pub mod store;

// Re-export main types for convenience
pub use access::{AccessPolicy, AllowAll, Caller, Capability, MembershipAccess};
pub use error::{OrgError, OrgResult};
pub use hierarchy::{HierarchyManager, ParentPolicy};
pub use members::MembershipManager;
pub use membership::{Membership, MembershipFilter};
pub use org_unit::OrgUnit;
pub use roles::SchoolRole;
pub use store::{MemoryStore, OrgStore, StoreStats};
