//! Recommendation engine: signal strategies plus fusion
//!
//! Four independent strategies each score candidates from one angle of the
//! social store. The fusion stage folds their signals into one ranked list.
//! The engine keeps no state between calls; every request reads the current
//! store snapshot.

pub mod fusion;
pub mod graph_proximity;
pub mod interest_overlap;
pub mod popularity;
pub mod recency;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use pymk_common::time::from_millis;
use pymk_common::Result;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

pub use fusion::{fuse, SignalBatch};
pub use graph_proximity::GraphProximity;
pub use interest_overlap::InterestOverlap;
pub use popularity::Popularity;
pub use recency::Recency;

/// A user eligible to be recommended to the requester
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub follower_count: i64,
    pub post_count: i64,
}

impl Candidate {
    /// Build from a strategy row
    ///
    /// Every strategy query selects `id, username, display_name, avatar_url,
    /// bio, created_at, followers_count, posts_count`.
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            display_name: row.try_get("display_name")?,
            avatar_url: row.try_get("avatar_url")?,
            bio: row.try_get("bio")?,
            created_at: from_millis(row.try_get("created_at")?)?,
            follower_count: row.try_get("followers_count")?,
            post_count: row.try_get("posts_count")?,
        })
    }
}

/// One strategy's scored opinion about one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub candidate: Candidate,
    /// Raw (unweighted) score, never negative
    pub score: f64,
    pub reason: String,
}

/// Fused result for one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRecommendation {
    pub candidate: Candidate,
    pub score: f64,
    /// Reasons in strategy order
    pub reasons: Vec<String>,
}

impl AggregateRecommendation {
    /// Reasons joined for display, e.g. "3 mutual connections, Similar interests"
    pub fn reason(&self) -> String {
        self.reasons.join(", ")
    }
}

/// How a strategy's signals are folded into existing aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Primary signal: its reason is always appended
    Accumulate,
    /// Corroborating signal: its reason only shows when it introduces the candidate
    Corroborate,
}

/// Inputs shared by every strategy for one request
#[derive(Debug, Clone)]
pub struct SignalQuery {
    pub requester: String,
    pub limit: usize,
    /// Evaluation instant (end of any time window)
    pub as_of: DateTime<Utc>,
}

impl SignalQuery {
    pub fn new(requester: impl Into<String>, limit: usize, as_of: DateTime<Utc>) -> Self {
        Self {
            requester: requester.into(),
            limit,
            as_of,
        }
    }

    /// Limit as bound into SQL
    pub(crate) fn sql_limit(&self) -> i64 {
        i64::try_from(self.limit).unwrap_or(i64::MAX)
    }
}

/// Signal strategy trait - each source of recommendations implements this
///
/// Implementations must never return the requester or a user the requester
/// already follows, and must propagate store errors instead of returning an
/// empty list.
#[async_trait]
pub trait SignalStrategy: Send + Sync {
    /// Strategy identifier (e.g. "graph_proximity")
    fn source_id(&self) -> &'static str;

    /// Multiplier applied to raw scores during fusion
    fn weight(&self) -> f64 {
        1.0
    }

    /// Merge behaviour during fusion
    fn merge_policy(&self) -> MergePolicy {
        MergePolicy::Accumulate
    }

    /// Produce at most `query.limit` signals
    async fn collect(&self, query: &SignalQuery) -> Result<Vec<Signal>>;
}

/// Fusion stage over an ordered set of strategies
pub struct RecommendationEngine {
    strategies: Vec<Box<dyn SignalStrategy>>,
}

impl RecommendationEngine {
    /// Engine with the standard strategies in declared order:
    /// graph proximity, interest overlap, popularity, recency.
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_strategies(vec![
            Box::new(GraphProximity::new(pool.clone())),
            Box::new(InterestOverlap::new(pool.clone())),
            Box::new(Popularity::new(pool.clone())),
            Box::new(Recency::new(pool)),
        ])
    }

    /// Engine over a custom strategy list; list order is fusion order
    pub fn with_strategies(strategies: Vec<Box<dyn SignalStrategy>>) -> Self {
        Self { strategies }
    }

    /// Strategy ids in fusion order
    pub fn source_ids(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.source_id()).collect()
    }

    /// Ranked recommendations for `requester`, evaluated now
    pub async fn get_recommendations(
        &self,
        requester: &str,
        limit: usize,
    ) -> Result<Vec<AggregateRecommendation>> {
        self.get_recommendations_at(requester, limit, pymk_common::time::now())
            .await
    }

    /// Ranked recommendations for `requester`, evaluated at `as_of`
    ///
    /// Strategies run concurrently; the first failure fails the call.
    pub async fn get_recommendations_at(
        &self,
        requester: &str,
        limit: usize,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<AggregateRecommendation>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query = SignalQuery::new(requester, limit, as_of);

        // try_join_all yields results in input order, whatever order they complete in
        let batches = try_join_all(self.strategies.iter().map(|strategy| {
            let query = &query;
            async move {
                let signals = strategy.collect(query).await?;
                debug!(
                    "Strategy {} produced {} signals for {}",
                    strategy.source_id(),
                    signals.len(),
                    query.requester
                );
                Ok::<_, pymk_common::Error>(SignalBatch {
                    source: strategy.source_id(),
                    policy: strategy.merge_policy(),
                    weight: strategy.weight(),
                    signals,
                })
            }
        }))
        .await?;

        let recommendations = fuse(batches, limit);
        info!(
            "Computed {} recommendations for {} (limit {})",
            recommendations.len(),
            requester,
            limit
        );

        Ok(recommendations)
    }
}
