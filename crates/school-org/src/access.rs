//! # Access policy
//!
//! Capability checks answering "may this caller do X within org unit Y".
//! Token and session validation happen outside this crate; callers arrive
//! here already resolved to an opaque user ID (or anonymous).
//!
//! ```text
//! Caller + Capability + target org unit
//!   └─ AccessPolicy::authorize
//!        ├─ AllowAll          grants everything
//!        └─ MembershipAccess  superusers, or a membership on the target
//!                             or any ancestor whose role grants the capability
//!
//! Caller + role label + target org unit
//!   └─ AccessPolicy::authorize_role_grant
//!        └─ MembershipAccess  well-known roles may not outrank the caller's
//!                             highest role over the target
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

use crate::error::{OrgError, OrgResult};
use crate::membership::MembershipFilter;
use crate::roles::SchoolRole;
use crate::store::OrgStore;

/// Identity of the requesting user as resolved by the outer auth layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    user_id: Option<String>,
}

impl Caller {
    /// An identified caller.
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    /// A caller with no identity.
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    /// The caller's user ID, if identified.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Check if the caller carries no identity.
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }
}

/// Operations guarded by the access policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Read org units and memberships
    View,

    /// Create org units
    ManageUnits,

    /// Create and delete memberships
    ManageMembers,
}

impl Capability {
    /// Get the string representation of the capability.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::View => "view",
            Capability::ManageUnits => "manage_units",
            Capability::ManageMembers => "manage_members",
        }
    }

    /// Check if holding `role` grants this capability.
    pub fn granted_by(&self, role: SchoolRole) -> bool {
        match self {
            Capability::View => role.can_view(),
            Capability::ManageUnits => role.can_manage_units(),
            Capability::ManageMembers => role.can_manage_members(),
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability check injected into request handling.
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    /// Authorize `caller` for `capability` on `target`.
    ///
    /// `target` is `None` for tree-wide operations such as listing or
    /// creating roots.
    ///
    /// # Errors
    ///
    /// - [`OrgError::Unauthenticated`] if the policy needs an identity
    /// - [`OrgError::Forbidden`] if the capability is not granted
    async fn authorize(
        &self,
        caller: &Caller,
        capability: Capability,
        target: Option<&str>,
    ) -> OrgResult<()>;

    /// Authorize `caller` to grant or revoke the role labelled `role` on
    /// `target`.
    ///
    /// Called in addition to [`Capability::ManageMembers`] on `target`.
    ///
    /// # Errors
    ///
    /// - [`OrgError::Unauthenticated`] if the policy needs an identity
    /// - [`OrgError::Forbidden`] if `role` outranks the caller
    async fn authorize_role_grant(
        &self,
        caller: &Caller,
        target: &str,
        role: &str,
    ) -> OrgResult<()>;
}

/// Policy granting every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl AccessPolicy for AllowAll {
    async fn authorize(&self, _: &Caller, _: Capability, _: Option<&str>) -> OrgResult<()> {
        Ok(())
    }

    async fn authorize_role_grant(&self, _: &Caller, _: &str, _: &str) -> OrgResult<()> {
        Ok(())
    }
}

/// Policy deriving capabilities from the caller's memberships.
///
/// A membership on an org unit applies to that unit and its whole subtree.
/// Superusers bypass membership checks; they are the only callers allowed
/// to create roots. Other callers may only grant or revoke well-known roles
/// up to their own highest role over the target. Free-form labels carry no
/// capabilities and are not ranked.
pub struct MembershipAccess {
    store: Arc<dyn OrgStore>,
    superusers: HashSet<String>,
}

impl std::fmt::Debug for MembershipAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipAccess")
            .field("superusers", &self.superusers.len())
            .finish()
    }
}

impl MembershipAccess {
    /// Create a policy over the given store with no superusers.
    pub fn new(store: Arc<dyn OrgStore>) -> Self {
        Self {
            store,
            superusers: HashSet::new(),
        }
    }

    /// Grant unrestricted access to the given user IDs.
    pub fn with_superusers<I, S>(mut self, superusers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.superusers.extend(superusers.into_iter().map(Into::into));
        self
    }

    /// Check if `user_id` is a superuser.
    pub fn is_superuser(&self, user_id: &str) -> bool {
        self.superusers.contains(user_id)
    }

    /// Org unit IDs whose memberships apply to `target`: its ancestors and itself.
    async fn scope_of(&self, target: &str) -> OrgResult<Vec<String>> {
        Ok(match self.store.get_org_unit(target).await? {
            Some(unit) => unit.lineage(),
            None => vec![target.to_string()],
        })
    }

    /// Highest well-known role `user_id` holds on `target` or any ancestor.
    async fn effective_role(&self, user_id: &str, target: &str) -> OrgResult<Option<SchoolRole>> {
        let scope = self.scope_of(target).await?;
        let memberships = self
            .store
            .find_memberships(&MembershipFilter::for_user(user_id))
            .await?;
        Ok(memberships
            .iter()
            .filter(|m| scope.contains(&m.org_unit_id))
            .filter_map(|m| m.school_role())
            .max())
    }
}

#[async_trait]
impl AccessPolicy for MembershipAccess {
    async fn authorize(
        &self,
        caller: &Caller,
        capability: Capability,
        target: Option<&str>,
    ) -> OrgResult<()> {
        let user_id = caller.user_id().ok_or(OrgError::Unauthenticated)?;
        if self.is_superuser(user_id) {
            return Ok(());
        }

        // Capabilities are monotonic in role, so the highest role decides.
        let granted = match target {
            None => capability == Capability::View,
            Some(target) => self
                .effective_role(user_id, target)
                .await?
                .is_some_and(|role| capability.granted_by(role)),
        };

        if granted {
            Ok(())
        } else {
            warn!(user_id, capability = %capability, target = ?target, "Access denied");
            Err(OrgError::Forbidden(format!(
                "{} not granted on {}",
                capability,
                target.unwrap_or("the org tree")
            )))
        }
    }

    async fn authorize_role_grant(
        &self,
        caller: &Caller,
        target: &str,
        role: &str,
    ) -> OrgResult<()> {
        let user_id = caller.user_id().ok_or(OrgError::Unauthenticated)?;
        if self.is_superuser(user_id) {
            return Ok(());
        }
        let Some(granted) = SchoolRole::parse(role) else {
            return Ok(());
        };

        match self.effective_role(user_id, target).await? {
            Some(held) if granted <= held => Ok(()),
            held => {
                warn!(user_id, role = %granted, held = ?held, target, "Role grant denied");
                Err(OrgError::Forbidden(format!(
                    "cannot grant or revoke {granted} on {target}"
                )))
            }
        }
    }
}
