//! Interest-overlap strategy (shared likes and comments)
//!
//! Likes and comments are unioned into a single interaction relation first.
//! A candidate's strength is the number of distinct posts both the requester
//! and the candidate interacted with, in any combination of like and comment.

use async_trait::async_trait;
use pymk_common::Result;
use sqlx::{Row, SqlitePool};

use super::{Candidate, Signal, SignalQuery, SignalStrategy};

/// Points per shared post
pub const SHARED_POST_SCORE: f64 = 1.5;

pub const SIMILAR_INTERESTS_REASON: &str = "Similar interests";

const SIMILAR_INTERESTS_SQL: &str = r#"
    WITH interactions AS (
        SELECT user_id, post_id FROM likes
        UNION
        SELECT user_id, post_id FROM comments
    ),
    requester_posts AS (
        SELECT post_id FROM interactions WHERE user_id = ?1
    )
    SELECT
        u.id,
        u.username,
        u.display_name,
        u.avatar_url,
        u.bio,
        u.created_at,
        COUNT(DISTINCT i.post_id) AS shared_posts,
        COALESCE(fc.followers_count, 0) AS followers_count,
        COALESCE(pc.posts_count, 0) AS posts_count
    FROM interactions i
    JOIN requester_posts rp ON rp.post_id = i.post_id
    JOIN users u ON u.id = i.user_id
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
    GROUP BY u.id
    ORDER BY shared_posts DESC, u.id ASC
    LIMIT ?2
"#;

/// Shared-engagement strategy
pub struct InterestOverlap {
    db: SqlitePool,
}

impl InterestOverlap {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Candidates ranked by number of shared posts
    pub async fn find_similar_interests(&self, query: &SignalQuery) -> Result<Vec<Signal>> {
        let rows = sqlx::query(SIMILAR_INTERESTS_SQL)
            .bind(&query.requester)
            .bind(query.sql_limit())
            .fetch_all(&self.db)
            .await?;

        rows.iter()
            .map(|row| -> Result<Signal> {
                let shared: i64 = row.try_get("shared_posts")?;
                Ok(Signal {
                    candidate: Candidate::from_row(row)?,
                    score: shared as f64 * SHARED_POST_SCORE,
                    reason: SIMILAR_INTERESTS_REASON.to_string(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl SignalStrategy for InterestOverlap {
    fn source_id(&self) -> &'static str {
        "interest_overlap"
    }

    async fn collect(&self, query: &SignalQuery) -> Result<Vec<Signal>> {
        self.find_similar_interests(query).await
    }
}
