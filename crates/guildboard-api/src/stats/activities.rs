use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;

use guildboard_types::api::ActivityOverview;
use guildboard_types::session::Claims;
use guildboard_types::window::TimeWindow;

use crate::error::ApiError;
use crate::guard::require_guild_access;
use crate::state::AppState;

use super::{or_default, run_query};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitiesQuery {
    pub guild_id: Option<String>,
    pub days: Option<u32>,
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u32>,
    /// Optional activity-name filter for the top-users aggregate.
    pub activity: Option<String>,
}

/// `GET /api/stats/activities` — five independent aggregates fetched
/// concurrently. A failed sub-query degrades to its empty default; the
/// composite still answers 200.
pub async fn activity_overview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ActivitiesQuery>,
) -> Result<Json<ActivityOverview>, ApiError> {
    let guild_id = require_guild_access(&claims, query.guild_id.as_deref())?;
    let window = TimeWindow::from_params(
        query.days,
        query.period.as_deref(),
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    );
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let activity = query.activity.clone();

    let (top_activities, daily_stats, top_users, type_distribution, total_unique_users) = tokio::join!(
        run_query(&state, {
            let guild_id = guild_id.clone();
            move |db| db.top_activities(&guild_id, &window, limit)
        }),
        run_query(&state, {
            let guild_id = guild_id.clone();
            move |db| db.daily_activity_stats(&guild_id, &window)
        }),
        run_query(&state, {
            let guild_id = guild_id.clone();
            move |db| db.top_users_by_activity(&guild_id, activity.as_deref(), &window, limit)
        }),
        run_query(&state, {
            let guild_id = guild_id.clone();
            move |db| db.activity_type_distribution(&guild_id, &window)
        }),
        run_query(&state, {
            let guild_id = guild_id.clone();
            move |db| db.total_unique_active_users(&guild_id, &window)
        }),
    );

    Ok(Json(ActivityOverview {
        top_activities: or_default(top_activities, "activities", "topActivities", &guild_id, &window),
        daily_stats: or_default(daily_stats, "activities", "dailyStats", &guild_id, &window),
        top_users: or_default(top_users, "activities", "topUsers", &guild_id, &window),
        type_distribution: or_default(
            type_distribution,
            "activities",
            "typeDistribution",
            &guild_id,
            &window,
        ),
        total_unique_users: or_default(
            total_unique_users,
            "activities",
            "totalUniqueUsers",
            &guild_id,
            &window,
        ),
    }))
}
