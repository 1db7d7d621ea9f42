//! Process-wide registry shared by all handlers.
//!
//! Built once at start from [`ServerConfig`] and handed to the router as
//! `Arc<Registry>` state. Handlers reach the store only through it.

use std::sync::Arc;

use school_org::{
    AccessPolicy, AllowAll, HierarchyManager, MemoryStore, MembershipAccess, MembershipManager,
    OrgStore,
};

use crate::config::ServerConfig;

/// Store, managers and access policy for one running service.
pub struct Registry {
    pub store: Arc<dyn OrgStore>,
    pub hierarchy: HierarchyManager,
    pub members: MembershipManager,
    pub access: Arc<dyn AccessPolicy>,
    /// Whether requests must carry a caller identity
    pub require_caller: bool,
}

impl Registry {
    /// Build a registry backed by a fresh in-memory store.
    pub fn from_config(config: &ServerConfig) -> Self {
        let store: Arc<dyn OrgStore> = if config.unique_memberships {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(MemoryStore::allowing_duplicate_memberships())
        };
        Self::with_store(store, config)
    }

    /// Build a registry over an existing store.
    pub fn with_store(store: Arc<dyn OrgStore>, config: &ServerConfig) -> Self {
        let access: Arc<dyn AccessPolicy> = if config.enforce_access {
            Arc::new(
                MembershipAccess::new(store.clone()).with_superusers(config.superusers.clone()),
            )
        } else {
            Arc::new(AllowAll)
        };

        tracing::info!(
            parent_policy = config.parent_policy.as_str(),
            validate_membership_unit = config.validate_membership_unit,
            unique_memberships = config.unique_memberships,
            enforce_access = config.enforce_access,
            "Registry initialized"
        );

        Self {
            hierarchy: HierarchyManager::with_parent_policy(store.clone(), config.parent_policy),
            members: MembershipManager::new(store.clone())
                .with_org_unit_validation(config.validate_membership_unit),
            store,
            access,
            require_caller: config.enforce_access,
        }
    }
}
