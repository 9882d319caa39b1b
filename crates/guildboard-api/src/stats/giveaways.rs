use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;

use guildboard_types::api::GiveawayOverview;
use guildboard_types::session::Claims;
use guildboard_types::window::TimeWindow;

use crate::error::ApiError;
use crate::guard::require_guild_access;
use crate::state::AppState;

use super::{or_default, run_query};

/// Top participants inside the composite use a fixed compact-widget limit;
/// `limit` bounds the giveaway list itself.
const TOP_PARTICIPANTS_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiveawaysQuery {
    pub guild_id: Option<String>,
    pub days: Option<u32>,
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u32>,
    /// When true, the list contains only giveaways still running.
    pub active: Option<bool>,
}

/// `GET /api/stats/giveaways` — four independent aggregates fetched
/// concurrently, degrading per field on sub-query failure.
pub async fn giveaway_overview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<GiveawaysQuery>,
) -> Result<Json<GiveawayOverview>, ApiError> {
    let guild_id = require_guild_access(&claims, query.guild_id.as_deref())?;
    let window = TimeWindow::from_params(
        query.days,
        query.period.as_deref(),
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    );
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let active_only = query.active.unwrap_or(false);

    let (stats, giveaways, top_participants, daily_participation) = tokio::join!(
        run_query(&state, {
            let guild_id = guild_id.clone();
            move |db| db.giveaway_stats(&guild_id, &window)
        }),
        run_query(&state, {
            let guild_id = guild_id.clone();
            move |db| db.giveaway_list(&guild_id, limit, active_only)
        }),
        run_query(&state, {
            let guild_id = guild_id.clone();
            move |db| db.top_giveaway_participants(&guild_id, &window, TOP_PARTICIPANTS_LIMIT)
        }),
        run_query(&state, {
            let guild_id = guild_id.clone();
            move |db| db.daily_giveaway_participation(&guild_id, &window)
        }),
    );

    Ok(Json(GiveawayOverview {
        stats: or_default(stats, "giveaways", "stats", &guild_id, &window),
        giveaways: or_default(giveaways, "giveaways", "giveaways", &guild_id, &window),
        top_participants: or_default(
            top_participants,
            "giveaways",
            "topParticipants",
            &guild_id,
            &window,
        ),
        daily_participation: or_default(
            daily_participation,
            "giveaways",
            "dailyParticipation",
            &guild_id,
            &window,
        ),
    }))
}
