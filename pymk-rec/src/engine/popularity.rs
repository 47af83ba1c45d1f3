//! Popularity strategy (follower counts)
//!
//! Takes the top `limit` non-followed users by follower count and only then
//! drops those at or below the follower threshold, so it can return fewer
//! than `limit` signals even when more users clear the threshold overall.

use async_trait::async_trait;
use pymk_common::Result;
use sqlx::SqlitePool;

use super::{Candidate, MergePolicy, Signal, SignalQuery, SignalStrategy};

/// Users need strictly more followers than this to be suggested
pub const MIN_FOLLOWERS: i64 = 10;

/// Fusion weight for popularity signals
pub const POPULARITY_WEIGHT: f64 = 0.3;

pub const POPULAR_USER_REASON: &str = "Popular user";

const POPULAR_USERS_SQL: &str = r#"
    SELECT
        u.id,
        u.username,
        u.display_name,
        u.avatar_url,
        u.bio,
        u.created_at,
        COALESCE(fc.followers_count, 0) AS followers_count,
        COALESCE(pc.posts_count, 0) AS posts_count
    FROM users u
    LEFT JOIN (
        SELECT following_id, COUNT(*) AS followers_count
        FROM follows
        GROUP BY following_id
    ) fc ON fc.following_id = u.id
    LEFT JOIN (
        SELECT user_id, COUNT(*) AS posts_count
        FROM posts
        GROUP BY user_id
    ) pc ON pc.user_id = u.id
    WHERE u.id != ?1
      AND NOT EXISTS (
          SELECT 1 FROM follows f
          WHERE f.follower_id = ?1 AND f.following_id = u.id
      )
    ORDER BY followers_count DESC, u.id ASC
    LIMIT ?2
"#;

/// Follower-count strategy
pub struct Popularity {
    db: SqlitePool,
}

impl Popularity {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Most-followed candidates, filtered after truncation
    pub async fn find_popular_users(&self, query: &SignalQuery) -> Result<Vec<Signal>> {
        let rows = sqlx::query(POPULAR_USERS_SQL)
            .bind(&query.requester)
            .bind(query.sql_limit())
            .fetch_all(&self.db)
            .await?;

        let candidates = rows
            .iter()
            .map(Candidate::from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(candidates
            .into_iter()
            .filter(|c| c.follower_count > MIN_FOLLOWERS)
            .map(|candidate| Signal {
                score: popularity_score(candidate.follower_count),
                candidate,
                reason: POPULAR_USER_REASON.to_string(),
            })
            .collect())
    }
}

/// Logarithmic score: `ln(followers + 1)`
pub fn popularity_score(follower_count: i64) -> f64 {
    ((follower_count + 1) as f64).ln()
}

#[async_trait]
impl SignalStrategy for Popularity {
    fn source_id(&self) -> &'static str {
        "popularity"
    }

    fn weight(&self) -> f64 {
        POPULARITY_WEIGHT
    }

    fn merge_policy(&self) -> MergePolicy {
        MergePolicy::Corroborate
    }

    async fn collect(&self, query: &SignalQuery) -> Result<Vec<Signal>> {
        self.find_popular_users(query).await
    }
}
