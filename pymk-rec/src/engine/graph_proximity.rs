//! Graph-proximity strategy (friends of friends)
//!
//! A candidate's strength is the number of mutual connections: users the
//! requester follows who in turn follow the candidate.

use async_trait::async_trait;
use pymk_common::Result;
use sqlx::{Row, SqlitePool};

use super::{Candidate, Signal, SignalQuery, SignalStrategy};

/// Points per mutual connection
pub const MUTUAL_CONNECTION_SCORE: f64 = 2.0;

const FRIENDS_OF_FRIENDS_SQL: &str = r#"
    SELECT
        u.id,
        u.username,
        u.display_name,
        u.avatar_url,
        u.bio,
        u.created_at,
        COUNT(DISTINCT f2.follower_id) AS mutual_count,
        COALESCE(fc.followers_count, 0) AS followers_count,
        COALESCE(pc.posts_count, 0) AS posts_count
    FROM users u
    JOIN follows f2 ON f2.following_id = u.id
    JOIN follows f1 ON f1.following_id = f2.follower_id AND f1.follower_id = ?1
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
          SELECT 1 FROM follows f3
          WHERE f3.follower_id = ?1 AND f3.following_id = u.id
      )
    GROUP BY u.id
    ORDER BY mutual_count DESC, followers_count DESC, u.id ASC
    LIMIT ?2
"#;

/// Friends-of-friends strategy
pub struct GraphProximity {
    db: SqlitePool,
}

impl GraphProximity {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Candidates ranked by mutual connections, then follower count
    pub async fn find_friends_of_friends(&self, query: &SignalQuery) -> Result<Vec<Signal>> {
        let rows = sqlx::query(FRIENDS_OF_FRIENDS_SQL)
            .bind(&query.requester)
            .bind(query.sql_limit())
            .fetch_all(&self.db)
            .await?;

        rows.iter()
            .map(|row| -> Result<Signal> {
                let mutual: i64 = row.try_get("mutual_count")?;
                Ok(Signal {
                    candidate: Candidate::from_row(row)?,
                    score: mutual as f64 * MUTUAL_CONNECTION_SCORE,
                    reason: format!("{} mutual connections", mutual),
                })
            })
            .collect()
    }
}

#[async_trait]
impl SignalStrategy for GraphProximity {
    fn source_id(&self) -> &'static str {
        "graph_proximity"
    }

    async fn collect(&self, query: &SignalQuery) -> Result<Vec<Signal>> {
        self.find_friends_of_friends(query).await
    }
}
