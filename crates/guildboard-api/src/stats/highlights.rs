use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;

use guildboard_types::api::Highlights;
use guildboard_types::session::Claims;
use guildboard_types::window::TimeWindow;

use crate::error::ApiError;
use crate::guard::require_guild_access;
use crate::state::AppState;

use super::{or_default, run_query};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightsQuery {
    pub guild_id: Option<String>,
    pub limit: Option<u32>,
}

/// `GET /api/stats/highlights` — the recap superlatives. The most
/// fan-out-heavy family: eight independent aggregates, each limited and
/// each degrading to an empty list on failure.
pub async fn highlights(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<HighlightsQuery>,
) -> Result<Json<Highlights>, ApiError> {
    let guild_id = require_guild_access(&claims, query.guild_id.as_deref())?;
    let limit = query.limit.unwrap_or(5).clamp(1, 100);
    // Only used for degrade logging; this family is not windowed.
    let window = TimeWindow::default();

    macro_rules! category {
        ($method:ident) => {
            run_query(&state, {
                let guild_id = guild_id.clone();
                move |db| db.$method(&guild_id, limit)
            })
        };
    }

    let (
        top_scores,
        most_messages,
        most_voice_minutes,
        most_flagged,
        most_activity_hours,
        longest_stream,
        most_event_participations,
        most_distinct_games,
    ) = tokio::join!(
        category!(highlight_top_scores),
        category!(highlight_most_messages),
        category!(highlight_most_voice_minutes),
        category!(highlight_most_flagged),
        category!(highlight_most_activity_hours),
        category!(highlight_longest_stream),
        category!(highlight_most_event_participations),
        category!(highlight_most_distinct_games),
    );

    Ok(Json(Highlights {
        top_scores: or_default(top_scores, "highlights", "top_scores", &guild_id, &window),
        most_messages: or_default(
            most_messages,
            "highlights",
            "most_messages",
            &guild_id,
            &window,
        ),
        most_voice_minutes: or_default(
            most_voice_minutes,
            "highlights",
            "most_voice_minutes",
            &guild_id,
            &window,
        ),
        most_flagged: or_default(most_flagged, "highlights", "most_flagged", &guild_id, &window),
        most_activity_hours: or_default(
            most_activity_hours,
            "highlights",
            "most_activity_hours",
            &guild_id,
            &window,
        ),
        longest_stream: or_default(
            longest_stream,
            "highlights",
            "longest_stream",
            &guild_id,
            &window,
        ),
        most_event_participations: or_default(
            most_event_participations,
            "highlights",
            "most_event_participations",
            &guild_id,
            &window,
        ),
        most_distinct_games: or_default(
            most_distinct_games,
            "highlights",
            "most_distinct_games",
            &guild_id,
            &window,
        ),
    }))
}
