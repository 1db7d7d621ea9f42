//! Membership management
//!
//! Creates and removes (user, org unit, role) assignments. Deletion is
//! set-based: removing a pair that has no membership succeeds as a no-op.

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{require_field, OrgError, OrgResult};
use crate::membership::{Membership, MembershipFilter};
use crate::store::OrgStore;

/// Membership manager over a shared store.
#[derive(Clone)]
pub struct MembershipManager {
    store: Arc<dyn OrgStore>,
    validate_org_unit: bool,
}

impl std::fmt::Debug for MembershipManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipManager")
            .field("validate_org_unit", &self.validate_org_unit)
            .finish()
    }
}

impl MembershipManager {
    /// Create a manager that checks the org unit exists before inserting.
    pub fn new(store: Arc<dyn OrgStore>) -> Self {
        Self {
            store,
            validate_org_unit: true,
        }
    }

    /// Enable or disable the org unit existence check.
    pub fn with_org_unit_validation(mut self, enabled: bool) -> Self {
        self.validate_org_unit = enabled;
        self
    }

    /// Whether memberships are checked against existing org units.
    pub fn validates_org_unit(&self) -> bool {
        self.validate_org_unit
    }

    /// Assign `role` to `user_id` within `org_unit_id`.
    ///
    /// # Errors
    ///
    /// - [`OrgError::Validation`] if any field is blank
    /// - [`OrgError::OrgUnitNotFound`] if validation is on and the org unit is unknown
    /// - [`OrgError::DuplicateMembership`] if the store enforces one record per pair
    pub async fn create_membership(
        &self,
        user_id: &str,
        org_unit_id: &str,
        role: &str,
    ) -> OrgResult<Membership> {
        let user_id = require_field(user_id, "userId")?;
        let org_unit_id = require_field(org_unit_id, "orgUnitId")?;
        let role = require_field(role, "role")?;

        if self.validate_org_unit && self.store.get_org_unit(&org_unit_id).await?.is_none() {
            return Err(OrgError::OrgUnitNotFound(org_unit_id));
        }

        let membership = self
            .store
            .insert_membership(Membership::new(user_id, org_unit_id, role))
            .await?;
        info!(
            membership_id = %membership.id,
            user_id = %membership.user_id,
            org_unit_id = %membership.org_unit_id,
            role = %membership.role,
            "Membership created"
        );
        Ok(membership)
    }

    /// Remove the membership for the pair, if any, regardless of role.
    ///
    /// # Returns
    ///
    /// The removed record, or `None` when there was nothing to remove
    pub async fn delete_membership(
        &self,
        user_id: &str,
        org_unit_id: &str,
    ) -> OrgResult<Option<Membership>> {
        let user_id = require_field(user_id, "userId")?;
        let org_unit_id = require_field(org_unit_id, "orgUnitId")?;

        let removed = self
            .store
            .delete_first_membership(&user_id, &org_unit_id)
            .await?;
        match &removed {
            Some(m) => info!(
                membership_id = %m.id,
                user_id = %user_id,
                org_unit_id = %org_unit_id,
                "Membership deleted"
            ),
            None => debug!(
                user_id = %user_id,
                org_unit_id = %org_unit_id,
                "No membership to delete"
            ),
        }
        Ok(removed)
    }

    /// Memberships matching `filter`, in creation order.
    pub async fn find_memberships(&self, filter: &MembershipFilter) -> OrgResult<Vec<Membership>> {
        self.store.find_memberships(filter).await
    }
}
