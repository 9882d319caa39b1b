use axum::{
    Extension, Json,
    extract::{Query, State},
};

use guildboard_types::api::DailyMemberStats;
use guildboard_types::session::Claims;

use crate::error::ApiError;
use crate::guard::require_guild_access;
use crate::state::AppState;

use super::{WindowedQuery, run_query};

/// `GET /api/stats/members` — per-day joins, leaves and running total.
pub async fn member_growth(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WindowedQuery>,
) -> Result<Json<Vec<DailyMemberStats>>, ApiError> {
    let guild_id = require_guild_access(&claims, query.guild_id.as_deref())?;
    let window = query.window();

    let rows = run_query(&state, move |db| db.member_growth(&guild_id, &window))
        .await
        .map_err(ApiError::upstream)?;

    Ok(Json(rows))
}
