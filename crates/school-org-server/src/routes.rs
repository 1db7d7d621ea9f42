use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::caller::resolve_caller;
use crate::handlers;
use crate::state::Registry;

/// Build the service router.
///
/// Every route except `/health` passes through caller resolution.
pub fn router(registry: Arc<Registry>) -> Router {
    Router::new()
        // Org unit hierarchy
        .route(
            "/org-units",
            get(handlers::list_roots).post(handlers::create_org_unit),
        )
        .route("/org-units/descendants", post(handlers::list_descendants))
        .route("/org-units/:id", get(handlers::get_org_unit))
        .route("/org-units/:id/children", get(handlers::list_children))
        .route("/org-units/:id/lineage", get(handlers::lineage))
        // Memberships
        .route(
            "/memberships",
            get(handlers::list_memberships)
                .post(handlers::create_membership)
                .delete(handlers::delete_membership),
        )
        .route_layer(middleware::from_fn_with_state(
            registry.clone(),
            resolve_caller,
        ))
        // Health check
        .route("/health", get(handlers::health))
        .with_state(registry)
        .layer(TraceLayer::new_for_http())
}
