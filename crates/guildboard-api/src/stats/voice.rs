use axum::{
    Extension, Json,
    extract::{Query, State},
};

use guildboard_types::api::{DailyVoiceActivity, VoiceChannelStats, VoiceUserStats};
use guildboard_types::session::Claims;

use crate::error::ApiError;
use crate::guard::require_guild_access;
use crate::state::AppState;

use super::{WindowedQuery, run_query};

/// `GET /api/stats/voice` — per-day voice minutes for the chart.
pub async fn voice_activity(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WindowedQuery>,
) -> Result<Json<Vec<DailyVoiceActivity>>, ApiError> {
    let guild_id = require_guild_access(&claims, query.guild_id.as_deref())?;
    let window = query.window();

    let rows = run_query(&state, move |db| db.daily_voice_activity(&guild_id, &window))
        .await
        .map_err(ApiError::upstream)?;

    Ok(Json(rows))
}

/// `GET /api/stats/voice/users` — top users by voice minutes.
pub async fn top_voice_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WindowedQuery>,
) -> Result<Json<Vec<VoiceUserStats>>, ApiError> {
    let guild_id = require_guild_access(&claims, query.guild_id.as_deref())?;
    let window = query.window();
    let limit = query.limit_or(10);

    let rows = run_query(&state, move |db| {
        db.top_voice_users(&guild_id, &window, limit)
    })
    .await
    .map_err(ApiError::upstream)?;

    Ok(Json(rows))
}

/// `GET /api/stats/voice/channels` — top voice channels by minutes.
pub async fn top_voice_channels(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WindowedQuery>,
) -> Result<Json<Vec<VoiceChannelStats>>, ApiError> {
    let guild_id = require_guild_access(&claims, query.guild_id.as_deref())?;
    let window = query.window();
    let limit = query.limit_or(10);

    let rows = run_query(&state, move |db| {
        db.top_voice_channels(&guild_id, &window, limit)
    })
    .await
    .map_err(ApiError::upstream)?;

    Ok(Json(rows))
}
