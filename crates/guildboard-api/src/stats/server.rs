use axum::{
    Extension, Json,
    extract::{Query, State},
};

use guildboard_types::api::ServerStats;
use guildboard_types::session::Claims;

use crate::error::ApiError;
use crate::guard::require_guild_access;
use crate::state::AppState;

use super::{WindowedQuery, run_query};

/// `GET /api/stats/server` — message/member/channel totals for the window.
pub async fn server_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WindowedQuery>,
) -> Result<Json<ServerStats>, ApiError> {
    let guild_id = require_guild_access(&claims, query.guild_id.as_deref())?;
    let window = query.window();

    let stats = run_query(&state, move |db| db.server_stats(&guild_id, &window))
        .await
        .map_err(ApiError::upstream)?;

    Ok(Json(stats))
}
