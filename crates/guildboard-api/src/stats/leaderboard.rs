use axum::{
    Extension, Json,
    extract::{Query, State},
};

use guildboard_types::api::{LeaderboardEntry, LeaderboardHistoryRow};
use guildboard_types::session::Claims;

use crate::error::ApiError;
use crate::guard::require_guild_access;
use crate::state::AppState;

use super::{WindowedQuery, run_query};

/// `GET /api/stats/leaderboard` — current ranking for the window.
pub async fn leaderboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WindowedQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let guild_id = require_guild_access(&claims, query.guild_id.as_deref())?;
    let window = query.window();
    let limit = query.limit_or(50);

    let rows = run_query(&state, move |db| db.leaderboard(&guild_id, &window, limit))
        .await
        .map_err(ApiError::upstream)?;

    Ok(Json(rows))
}

/// `GET /api/stats/leaderboard/history` — per-day snapshots for the
/// current top-N users.
///
/// Two ordered steps, deliberately sequential: the history query's user
/// set is the first query's result, so running them concurrently could
/// fetch history for a stale top-N.
pub async fn leaderboard_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WindowedQuery>,
) -> Result<Json<Vec<LeaderboardHistoryRow>>, ApiError> {
    let guild_id = require_guild_access(&claims, query.guild_id.as_deref())?;
    let window = query.window();
    let limit = query.limit_or(10);

    let top = run_query(&state, {
        let guild_id = guild_id.clone();
        move |db| db.leaderboard(&guild_id, &window, limit)
    })
    .await
    .map_err(ApiError::upstream)?;

    let user_ids: Vec<String> = top.into_iter().map(|entry| entry.user_id).collect();

    let rows = run_query(&state, move |db| {
        db.leaderboard_history(&guild_id, &window, &user_ids)
    })
    .await
    .map_err(ApiError::upstream)?;

    Ok(Json(rows))
}
