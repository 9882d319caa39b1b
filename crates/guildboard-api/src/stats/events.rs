use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use guildboard_types::api::EventStats;
use guildboard_types::session::Claims;

use crate::error::ApiError;
use crate::guard::require_guild_access;
use crate::state::AppState;

use super::run_query;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    pub guild_id: Option<String>,
    /// Optional lower bound only; "upcoming" is forward-looking so this
    /// family has no trailing-day window.
    pub start_date: Option<String>,
}

/// `GET /api/stats/events` — event totals and upcoming count.
pub async fn event_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventStats>, ApiError> {
    let guild_id = require_guild_access(&claims, query.guild_id.as_deref())?;

    let start_date: Option<NaiveDate> = match query.start_date.as_deref() {
        Some(raw) => match raw.parse() {
            Ok(date) => Some(date),
            Err(_) => {
                warn!(start_date = raw, "malformed start date, ignoring bound");
                None
            }
        },
        None => None,
    };

    let stats = run_query(&state, move |db| db.event_stats(&guild_id, start_date))
        .await
        .map_err(ApiError::upstream)?;

    Ok(Json(stats))
}
