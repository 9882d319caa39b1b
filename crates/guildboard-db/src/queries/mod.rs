//! The aggregate query set, one module per metric family.
//!
//! Every operation has the shape `(guild_id, window, limit, ...) -> rows`
//! and never crosses guild boundaries. Result order comes straight from the
//! SQL; this layer does not re-rank.

mod activities;
mod embeds;
mod events;
mod giveaways;
mod highlights;
mod leaderboard;
mod members;
mod messages;
mod moderation;
mod server;
mod voice;

use chrono::Utc;
use guildboard_types::window::TimeWindow;

/// Inclusive lower day bound (`YYYY-MM-DD`) for day-bucketed tables.
pub(crate) fn since_day(window: &TimeWindow) -> String {
    window
        .since(Utc::now().naive_utc())
        .format("%Y-%m-%d")
        .to_string()
}

/// Inclusive lower timestamp bound (`YYYY-MM-DD HH:MM:SS`) for
/// timestamped tables.
pub(crate) fn since_ts(window: &TimeWindow) -> String {
    window
        .since(Utc::now().naive_utc())
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
