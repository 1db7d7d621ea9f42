//! # School Org Server
//!
//! JSON HTTP service over the `school-org` hierarchy and membership
//! managers.
//!
//! ## Endpoints
//!
//! | Verb | Path | Body |
//! |---|---|---|
//! | GET | `/org-units` | |
//! | POST | `/org-units` | `{name, parentId?}` |
//! | POST | `/org-units/descendants` | `{orgUnitId}` |
//! | GET | `/org-units/:id` | |
//! | GET | `/org-units/:id/children` | |
//! | GET | `/org-units/:id/lineage` | |
//! | GET | `/memberships?userId=&orgUnitId=` | |
//! | POST | `/memberships` | `{userId, orgUnitId, role}` |
//! | DELETE | `/memberships` | `{userId, orgUnitId}` |
//! | GET | `/health` | |
//!
//! The caller's identity is read from the `x-user-id` header set by the
//! auth layer in front of the service.

pub mod caller;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use routes::router;
pub use state::Registry;
