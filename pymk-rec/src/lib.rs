//! pymk-rec library - "people you may know" recommendation service
//!
//! Exposes the recommendation engine and its HTTP surface for the binary and
//! for integration testing.

use std::sync::Arc;

use axum::Router;
use pymk_common::config::ServiceConfig;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod engine;
pub mod error;

pub use crate::engine::RecommendationEngine;

/// Name reported by `/health` and the startup banner
pub const SERVICE_NAME: &str = "pymk-rec";
pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (sessions and social graph)
    pub db: SqlitePool,
    /// Stateless recommendation engine over the same pool
    pub engine: Arc<RecommendationEngine>,
    /// Result-count defaults and limits
    pub config: ServiceConfig,
}

impl AppState {
    /// Create new application state with the standard strategies
    pub fn new(db: SqlitePool, config: ServiceConfig) -> Self {
        let engine = Arc::new(RecommendationEngine::new(db.clone()));
        Self { db, engine, config }
    }

    /// Create application state around a prebuilt engine
    pub fn with_engine(
        db: SqlitePool,
        engine: RecommendationEngine,
        config: ServiceConfig,
    ) -> Self {
        Self {
            db,
            engine: Arc::new(engine),
            config,
        }
    }
}

/// Build application router
///
/// `/health` and `/api/buildinfo` are public; recommendations need a session.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::get;

    // Protected routes (require a session)
    let protected = Router::new()
        .route("/api/recommendations", get(api::get_recommendations))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_session,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
