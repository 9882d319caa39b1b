use axum::{
    Extension, Json,
    extract::{Query, State},
};

use guildboard_types::api::{ChannelStats, DailyActivity, UserStats};
use guildboard_types::session::Claims;

use crate::error::ApiError;
use crate::guard::require_guild_access;
use crate::state::AppState;

use super::{WindowedQuery, run_query};

/// `GET /api/stats/users` — top users by message volume.
pub async fn top_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WindowedQuery>,
) -> Result<Json<Vec<UserStats>>, ApiError> {
    let guild_id = require_guild_access(&claims, query.guild_id.as_deref())?;
    let window = query.window();
    let limit = query.limit_or(10);

    let rows = run_query(&state, move |db| db.top_users(&guild_id, &window, limit))
        .await
        .map_err(ApiError::upstream)?;

    Ok(Json(rows))
}

/// `GET /api/stats/channels` — top channels by message volume.
pub async fn top_channels(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WindowedQuery>,
) -> Result<Json<Vec<ChannelStats>>, ApiError> {
    let guild_id = require_guild_access(&claims, query.guild_id.as_deref())?;
    let window = query.window();
    let limit = query.limit_or(10);

    let rows = run_query(&state, move |db| db.top_channels(&guild_id, &window, limit))
        .await
        .map_err(ApiError::upstream)?;

    Ok(Json(rows))
}

/// `GET /api/stats/activity` — per-day message volume for the chart.
pub async fn daily_activity(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WindowedQuery>,
) -> Result<Json<Vec<DailyActivity>>, ApiError> {
    let guild_id = require_guild_access(&claims, query.guild_id.as_deref())?;
    let window = query.window();

    let rows = run_query(&state, move |db| db.daily_activity(&guild_id, &window))
        .await
        .map_err(ApiError::upstream)?;

    Ok(Json(rows))
}
