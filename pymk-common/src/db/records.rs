//! Row helpers for the social store
//!
//! Inserts for users, the follow graph and engagement, plus single-row
//! lookups. The recommendation strategies read the store with their own
//! aggregate queries.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::db::models::{Comment, Post, User};
use crate::time::{from_millis, to_millis};
use crate::Result;

/// Save a user
pub async fn insert_user(pool: &SqlitePool, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, username, display_name, avatar_url, bio, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.display_name)
    .bind(&user.avatar_url)
    .bind(&user.bio)
    .bind(to_millis(user.created_at))
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a user by id
pub async fn load_user(pool: &SqlitePool, id: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, username, display_name, avatar_url, bio, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            display_name: row.try_get("display_name")?,
            avatar_url: row.try_get("avatar_url")?,
            bio: row.try_get("bio")?,
            created_at: from_millis(row.try_get("created_at")?)?,
        })),
        None => Ok(None),
    }
}

/// Record that `follower_id` follows `following_id` (no-op if already present)
pub async fn insert_follow(
    pool: &SqlitePool,
    follower_id: &str,
    following_id: &str,
    created_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO follows (follower_id, following_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(follower_id)
    .bind(following_id)
    .bind(to_millis(created_at))
    .execute(pool)
    .await?;

    Ok(())
}

/// Does the directed edge `follower_id → following_id` exist?
pub async fn follow_exists(
    pool: &SqlitePool,
    follower_id: &str,
    following_id: &str,
) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ? AND following_id = ?)",
    )
    .bind(follower_id)
    .bind(following_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Save a post
pub async fn insert_post(pool: &SqlitePool, post: &Post) -> Result<()> {
    sqlx::query("INSERT INTO posts (id, user_id, content, created_at) VALUES (?, ?, ?, ?)")
        .bind(&post.id)
        .bind(&post.user_id)
        .bind(&post.content)
        .bind(to_millis(post.created_at))
        .execute(pool)
        .await?;

    Ok(())
}

/// Record a like (no-op if the user already liked the post)
pub async fn insert_like(
    pool: &SqlitePool,
    user_id: &str,
    post_id: &str,
    created_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO likes (user_id, post_id, created_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(post_id)
        .bind(to_millis(created_at))
        .execute(pool)
        .await?;

    Ok(())
}

/// Save a comment
pub async fn insert_comment(pool: &SqlitePool, comment: &Comment) -> Result<()> {
    sqlx::query(
        "INSERT INTO comments (id, user_id, post_id, content, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&comment.id)
    .bind(&comment.user_id)
    .bind(&comment.post_id)
    .bind(&comment.content)
    .bind(to_millis(comment.created_at))
    .execute(pool)
    .await?;

    Ok(())
}
