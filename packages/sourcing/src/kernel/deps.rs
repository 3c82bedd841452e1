//! Server dependencies for activities (using traits for testability)
//!
//! This module provides the central dependency container used by all domain
//! activities. Every external collaborator sits behind a `Base*` trait so
//! tests can swap in the in-memory mocks from `test_dependencies`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use crate::common::RequirementId;
use crate::config::Config;
use crate::domains::intake::models::{NewRequirement, Requirement};
use crate::domains::matching::ProductMatch;
use crate::domains::products::models::{Product, RobotCategory};
use crate::domains::recommendations::engine::RecommendationEngine;
use crate::domains::recommendations::models::SignalSnapshot;
use crate::kernel::{BaseCandidateSource, BaseMatchStore, BaseSignalSource};

// =============================================================================
// PgStore Adapter (implements the Base* traits over Postgres)
// =============================================================================

/// Postgres-backed collaborator. Delegates to the sqlx model functions.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseCandidateSource for PgStore {
    async fn eligible_candidates(&self, category: Option<RobotCategory>) -> Result<Vec<Product>> {
        Product::find_eligible(category, &self.pool).await
    }
}

#[async_trait]
impl BaseMatchStore for PgStore {
    async fn create_requirement(&self, new: NewRequirement) -> Result<Requirement> {
        Requirement::create(new, &self.pool).await
    }

    async fn find_requirement(&self, id: RequirementId) -> Result<Option<Requirement>> {
        Requirement::find_by_id(id, &self.pool).await
    }

    async fn record_matches(
        &self,
        requirement_id: RequirementId,
        matches: &[ProductMatch],
    ) -> Result<usize> {
        ProductMatch::record_run(requirement_id, matches, &self.pool).await
    }

    async fn matches_for_requirement(&self, id: RequirementId) -> Result<Vec<ProductMatch>> {
        ProductMatch::find_by_requirement(id, &self.pool).await
    }
}

#[async_trait]
impl BaseSignalSource for PgStore {
    async fn load_snapshot(&self, window_days: i64) -> Result<SignalSnapshot> {
        SignalSnapshot::load(window_days, &self.pool).await
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Dependencies accessible to activities (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub candidates: Arc<dyn BaseCandidateSource>,
    pub match_store: Arc<dyn BaseMatchStore>,
    pub signals: Arc<dyn BaseSignalSource>,
    pub recommendation_engine: RecommendationEngine,
    /// Trailing days of interaction history a recommendation call sees.
    pub signal_window_days: i64,
    /// Result count used when a recommendation request gives none.
    pub default_recommendation_limit: i64,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        candidates: Arc<dyn BaseCandidateSource>,
        match_store: Arc<dyn BaseMatchStore>,
        signals: Arc<dyn BaseSignalSource>,
        config: &Config,
    ) -> Self {
        Self {
            candidates,
            match_store,
            signals,
            recommendation_engine: RecommendationEngine::default(),
            signal_window_days: config.signal_window_days,
            default_recommendation_limit: config.recommendation_default_limit,
        }
    }

    /// Connect to Postgres, apply migrations and wire the Pg collaborators.
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await
            .context("Failed to connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        info!("Database connected and migrations applied");

        let store = Arc::new(PgStore::new(pool));
        Ok(Self::new(store.clone(), store.clone(), store, config))
    }
}
