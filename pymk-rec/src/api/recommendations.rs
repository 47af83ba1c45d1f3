//! Recommendations endpoint
//!
//! GET /api/recommendations?limit=N returns "people you may know" for the
//! session's user. The limit is clamped before the engine sees it.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::auth::Requester;
use crate::engine::AggregateRecommendation;
use crate::error::ApiResult;
use crate::AppState;

/// Query parameters
///
/// `limit` is kept as text so an unparsable value falls back to the default
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    pub limit: Option<String>,
}

/// Response body
#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<RecommendationItem>,
}

/// One recommended user
#[derive(Debug, Serialize)]
pub struct RecommendationItem {
    pub user: UserSummary,
    pub score: f64,
    pub reason: String,
}

/// Candidate profile as rendered to clients
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "_count")]
    pub count: UserCounts,
}

#[derive(Debug, Serialize)]
pub struct UserCounts {
    pub followers: i64,
    pub posts: i64,
}

impl From<AggregateRecommendation> for RecommendationItem {
    fn from(rec: AggregateRecommendation) -> Self {
        let reason = rec.reason();
        let candidate = rec.candidate;
        Self {
            user: UserSummary {
                id: candidate.id,
                username: candidate.username,
                display_name: candidate.display_name,
                avatar_url: candidate.avatar_url,
                bio: candidate.bio,
                created_at: candidate.created_at,
                count: UserCounts {
                    followers: candidate.follower_count,
                    posts: candidate.post_count,
                },
            },
            score: rec.score,
            reason,
        }
    }
}

/// Resolve the requested limit: default when absent or without a leading
/// integer, then clamped to `1..=max_limit`
pub fn clamp_limit(requested: Option<&str>, default_limit: usize, max_limit: usize) -> usize {
    let requested = requested
        .and_then(leading_integer)
        .unwrap_or(default_limit as i64);
    let max_limit = max_limit.max(1);
    requested.clamp(1, max_limit as i64) as usize
}

/// Integer prefix of `s` after leading whitespace ("5abc" is 5, "10.5" is 10)
///
/// Saturates instead of overflowing; `None` when no digit follows the sign.
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        seen_digit = true;
        value = value.saturating_mul(10).saturating_add(i64::from(byte - b'0'));
    }

    if !seen_digit {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// GET /api/recommendations
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(Requester(requester)): Extension<Requester>,
    Query(query): Query<RecommendationQuery>,
) -> ApiResult<Json<RecommendationsResponse>> {
    let limit = clamp_limit(
        query.limit.as_deref(),
        state.config.default_limit,
        state.config.max_limit,
    );

    let recommendations = state.engine.get_recommendations(&requester, limit).await?;
    info!(
        "Serving {} recommendations to {} (limit {})",
        recommendations.len(),
        requester,
        limit
    );

    Ok(Json(RecommendationsResponse {
        recommendations: recommendations.into_iter().map(Into::into).collect(),
    }))
}
