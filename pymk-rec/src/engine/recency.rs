//! Recency strategy (recent authorship)
//!
//! Candidates who posted within the trailing window ending at the evaluation
//! instant, most recent poster first. A candidate introduced here carries
//! its in-window post count as its profile post count.

use async_trait::async_trait;
use pymk_common::time::{to_millis, window_start};
use pymk_common::Result;
use sqlx::{Row, SqlitePool};

use super::{Candidate, MergePolicy, Signal, SignalQuery, SignalStrategy};

/// Length of the activity window in days
pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Fusion weight for recency signals
pub const RECENCY_WEIGHT: f64 = 0.2;

pub const RECENTLY_ACTIVE_REASON: &str = "Recently active";

const RECENTLY_ACTIVE_SQL: &str = r#"
    SELECT
        u.id,
        u.username,
        u.display_name,
        u.avatar_url,
        u.bio,
        u.created_at,
        MAX(p.created_at) AS last_post,
        COUNT(p.id) AS recent_posts,
        COALESCE(fc.followers_count, 0) AS followers_count,
        COUNT(p.id) AS posts_count
    FROM users u
    JOIN posts p ON p.user_id = u.id
    LEFT JOIN (
        SELECT following_id, COUNT(*) AS followers_count
        FROM follows
        GROUP BY following_id
    ) fc ON fc.following_id = u.id
    WHERE u.id != ?1
      AND p.created_at > ?2
      AND p.created_at <= ?3
      AND NOT EXISTS (
          SELECT 1 FROM follows f
          WHERE f.follower_id = ?1 AND f.following_id = u.id
      )
    GROUP BY u.id
    ORDER BY last_post DESC, recent_posts DESC, u.id ASC
    LIMIT ?4
"#;

/// Recent-activity strategy
pub struct Recency {
    db: SqlitePool,
}

impl Recency {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Candidates with posts in the trailing window, scored by post count
    pub async fn find_recently_active(&self, query: &SignalQuery) -> Result<Vec<Signal>> {
        let since = window_start(query.as_of, RECENT_WINDOW_DAYS);

        let rows = sqlx::query(RECENTLY_ACTIVE_SQL)
            .bind(&query.requester)
            .bind(to_millis(since))
            .bind(to_millis(query.as_of))
            .bind(query.sql_limit())
            .fetch_all(&self.db)
            .await?;

        rows.iter()
            .map(|row| -> Result<Signal> {
                let recent_posts: i64 = row.try_get("recent_posts")?;
                Ok(Signal {
                    candidate: Candidate::from_row(row)?,
                    score: recent_posts as f64,
                    reason: RECENTLY_ACTIVE_REASON.to_string(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl SignalStrategy for Recency {
    fn source_id(&self) -> &'static str {
        "recency"
    }

    fn weight(&self) -> f64 {
        RECENCY_WEIGHT
    }

    fn merge_policy(&self) -> MergePolicy {
        MergePolicy::Corroborate
    }

    async fn collect(&self, query: &SignalQuery) -> Result<Vec<Signal>> {
        self.find_recently_active(query).await
    }
}
