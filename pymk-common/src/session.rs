//! Login session tokens
//!
//! Tokens are random 32-byte values rendered as hex. Only the SHA-256 digest
//! of a token is stored, so a leaked database does not leak usable sessions.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::debug;

use crate::db::init::{get_setting_i64, DEFAULT_SESSION_TIMEOUT_SECONDS};
use crate::time::to_millis;
use crate::Result;

/// Generate a new random session token (64 hex chars)
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// SHA-256 digest of a token as lowercase hex
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{:x}", digest)
}

/// Store a session for `user_id` that expires at `expires_at`
pub async fn insert_session(
    pool: &SqlitePool,
    token: &str,
    user_id: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query("INSERT INTO sessions (token_hash, user_id, expires_at) VALUES (?, ?, ?)")
        .bind(hash_token(token))
        .bind(user_id)
        .bind(to_millis(expires_at))
        .execute(pool)
        .await?;

    Ok(())
}

/// Create a session using the configured timeout and return its token
pub async fn create_session(
    pool: &SqlitePool,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<String> {
    let timeout_seconds = get_setting_i64(pool, "session_timeout_seconds")
        .await?
        .filter(|s| *s > 0)
        .unwrap_or(DEFAULT_SESSION_TIMEOUT_SECONDS);

    let token = generate_token();
    insert_session(pool, &token, user_id, now + Duration::seconds(timeout_seconds)).await?;

    debug!("Created session for user {} ({}s)", user_id, timeout_seconds);
    Ok(token)
}

/// Resolve a token to the owning user id
///
/// Returns `None` for unknown or expired tokens.
pub async fn resolve_session(
    pool: &SqlitePool,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<String>> {
    let user_id: Option<String> = sqlx::query_scalar(
        "SELECT user_id FROM sessions WHERE token_hash = ? AND expires_at > ?",
    )
    .bind(hash_token(token))
    .bind(to_millis(now))
    .fetch_optional(pool)
    .await?;

    Ok(user_id)
}
