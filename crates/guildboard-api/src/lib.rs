//! HTTP surface for the guild analytics dashboard.
//!
//! One public route (`/auth/login`) exchanges a provider OAuth token for a
//! signed session; everything under `/api` requires that session and runs
//! the per-guild access gate before touching the store.

pub mod auth;
pub mod embeds;
pub mod error;
pub mod guard;
pub mod middleware;
pub mod state;
pub mod stats;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the full application router.
///
/// The `/api` subtree is wrapped in the bearer-session middleware; route
/// handlers can therefore assume a `Claims` extension is present.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/stats/server", get(stats::server::server_stats))
        .route("/stats/users", get(stats::messages::top_users))
        .route("/stats/channels", get(stats::messages::top_channels))
        .route("/stats/activity", get(stats::messages::daily_activity))
        .route("/stats/voice", get(stats::voice::voice_activity))
        .route("/stats/voice/users", get(stats::voice::top_voice_users))
        .route(
            "/stats/voice/channels",
            get(stats::voice::top_voice_channels),
        )
        .route("/stats/members", get(stats::members::member_growth))
        .route("/stats/activities", get(stats::activities::activity_overview))
        .route("/stats/giveaways", get(stats::giveaways::giveaway_overview))
        .route("/stats/leaderboard", get(stats::leaderboard::leaderboard))
        .route(
            "/stats/leaderboard/history",
            get(stats::leaderboard::leaderboard_history),
        )
        .route("/stats/moderation", get(stats::moderation::moderation_stats))
        .route("/stats/events", get(stats::events::event_stats))
        .route("/stats/highlights", get(stats::highlights::highlights))
        .route("/embed", post(embeds::dispatch_embed))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .route("/auth/login", post(auth::login))
        .nest("/api", protected)
        .with_state(state)
}
