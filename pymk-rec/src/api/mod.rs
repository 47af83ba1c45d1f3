//! HTTP API handlers for pymk-rec

pub mod auth;
pub mod buildinfo;
pub mod health;
pub mod recommendations;

pub use auth::{require_session, Requester};
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use recommendations::get_recommendations;
