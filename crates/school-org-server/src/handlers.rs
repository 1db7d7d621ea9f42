//! JSON handlers for org units and memberships.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use school_org::{Caller, Capability, Membership, MembershipFilter, OrgError, OrgUnit};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;
use crate::state::Registry;

/// Body of `POST /org-units`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrgUnitRequest {
    pub name: Option<String>,
    pub parent_id: Option<String>,
}

/// Body of `POST /org-units/descendants`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescendantsRequest {
    pub org_unit_id: Option<String>,
}

/// Body of `POST /memberships`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMembershipRequest {
    pub user_id: Option<String>,
    pub org_unit_id: Option<String>,
    pub role: Option<String>,
}

/// Body of `DELETE /memberships`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMembershipRequest {
    pub user_id: Option<String>,
    pub org_unit_id: Option<String>,
}

/// Query of `GET /memberships`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipQuery {
    pub user_id: Option<String>,
    pub org_unit_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub org_units: usize,
    pub memberships: usize,
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(OrgError::required(field).into()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// GET /org-units
pub async fn list_roots(
    State(registry): State<Arc<Registry>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<OrgUnit>>> {
    registry
        .access
        .authorize(&caller, Capability::View, None)
        .await?;
    Ok(Json(registry.hierarchy.list_roots().await?))
}

/// POST /org-units
pub async fn create_org_unit(
    State(registry): State<Arc<Registry>>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateOrgUnitRequest>,
) -> Result<(StatusCode, Json<OrgUnit>)> {
    let name = required(req.name, "name")?;
    let parent_id = req
        .parent_id
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());

    registry
        .access
        .authorize(&caller, Capability::ManageUnits, parent_id)
        .await?;
    let unit = registry.hierarchy.create_node(&name, parent_id).await?;
    Ok((StatusCode::CREATED, Json(unit)))
}

/// POST /org-units/descendants
pub async fn list_descendants(
    State(registry): State<Arc<Registry>>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<DescendantsRequest>,
) -> Result<Json<Vec<OrgUnit>>> {
    let org_unit_id = required(req.org_unit_id, "orgUnitId")?;

    registry
        .access
        .authorize(&caller, Capability::View, Some(org_unit_id.as_str()))
        .await?;
    Ok(Json(registry.hierarchy.find_descendants(&org_unit_id).await?))
}

/// GET /org-units/:id
pub async fn get_org_unit(
    State(registry): State<Arc<Registry>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<OrgUnit>> {
    registry
        .access
        .authorize(&caller, Capability::View, Some(id.as_str()))
        .await?;
    Ok(Json(registry.hierarchy.get_node(&id).await?))
}

/// GET /org-units/:id/children
pub async fn list_children(
    State(registry): State<Arc<Registry>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<Vec<OrgUnit>>> {
    registry
        .access
        .authorize(&caller, Capability::View, Some(id.as_str()))
        .await?;
    Ok(Json(registry.hierarchy.list_children(&id).await?))
}

/// GET /org-units/:id/lineage
pub async fn lineage(
    State(registry): State<Arc<Registry>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<Vec<OrgUnit>>> {
    registry
        .access
        .authorize(&caller, Capability::View, Some(id.as_str()))
        .await?;
    Ok(Json(registry.hierarchy.lineage(&id).await?))
}

/// POST /memberships
pub async fn create_membership(
    State(registry): State<Arc<Registry>>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<CreateMembershipRequest>,
) -> Result<(StatusCode, Json<Membership>)> {
    let user_id = required(req.user_id, "userId")?;
    let org_unit_id = required(req.org_unit_id, "orgUnitId")?;
    let role = required(req.role, "role")?;

    let target = org_unit_id.trim();
    registry
        .access
        .authorize(&caller, Capability::ManageMembers, Some(target))
        .await?;
    registry
        .access
        .authorize_role_grant(&caller, target, role.trim())
        .await?;
    let membership = registry
        .members
        .create_membership(&user_id, &org_unit_id, &role)
        .await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

/// DELETE /memberships
///
/// Revoking needs the same rights as granting the role being removed.
pub async fn delete_membership(
    State(registry): State<Arc<Registry>>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<DeleteMembershipRequest>,
) -> Result<Json<Value>> {
    let user_id = required(req.user_id, "userId")?;
    let org_unit_id = required(req.org_unit_id, "orgUnitId")?;

    let target = org_unit_id.trim();
    registry
        .access
        .authorize(&caller, Capability::ManageMembers, Some(target))
        .await?;
    let existing = registry
        .members
        .find_memberships(&MembershipFilter::for_pair(user_id.trim(), target))
        .await?;
    if let Some(removed) = existing.first() {
        registry
            .access
            .authorize_role_grant(&caller, target, &removed.role)
            .await?;
    }
    registry
        .members
        .delete_membership(&user_id, &org_unit_id)
        .await?;
    Ok(Json(json!({ "ok": true })))
}

/// GET /memberships?userId=&orgUnitId=
///
/// Callers may always list their own memberships. Listing by org unit needs
/// view access to it; listing across the whole tree needs member management
/// rights on the tree.
pub async fn list_memberships(
    State(registry): State<Arc<Registry>>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<MembershipQuery>,
) -> Result<Json<Vec<Membership>>> {
    let filter = MembershipFilter {
        user_id: non_blank(query.user_id),
        org_unit_id: non_blank(query.org_unit_id),
    };

    let own = filter.user_id.is_some() && filter.user_id.as_deref() == caller.user_id();
    if !own {
        let capability = match filter.org_unit_id {
            Some(_) => Capability::View,
            None => Capability::ManageMembers,
        };
        registry
            .access
            .authorize(&caller, capability, filter.org_unit_id.as_deref())
            .await?;
    }

    Ok(Json(registry.members.find_memberships(&filter).await?))
}

/// GET /health
pub async fn health(State(registry): State<Arc<Registry>>) -> Result<Json<HealthResponse>> {
    let stats = registry.store.stats().await?;
    Ok(Json(HealthResponse {
        status: "ok",
        org_units: stats.org_units,
        memberships: stats.memberships,
    }))
}
