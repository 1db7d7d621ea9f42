//! Caller resolution middleware.
//!
//! Token validation is done by the auth layer in front of this service,
//! which forwards the authenticated user ID in the `x-user-id` header. This
//! middleware turns that header into a [`Caller`] request extension.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use school_org::{Caller, OrgError};

use crate::error::ApiError;
use crate::state::Registry;

/// Header carrying the authenticated user ID.
pub const CALLER_HEADER: &str = "x-user-id";

/// Attach the request's [`Caller`], rejecting anonymous requests when the
/// registry requires an identity.
pub async fn resolve_caller(
    State(registry): State<Arc<Registry>>,
    mut request: Request,
    next: Next,
) -> Response {
    let caller = request
        .headers()
        .get(CALLER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(Caller::user)
        .unwrap_or_else(Caller::anonymous);

    if caller.is_anonymous() && registry.require_caller {
        return ApiError(OrgError::Unauthenticated).into_response();
    }

    request.extensions_mut().insert(caller);
    next.run(request).await
}
