//! Request orchestrators, one module per metric family.
//!
//! Every handler follows the same sequence: parse params with explicit
//! defaults, run the guild-access gate, resolve the time window, then call
//! the aggregate queries — concurrently where a family fans out — and
//! serialize a fixed-shape response.

pub mod activities;
pub mod events;
pub mod giveaways;
pub mod highlights;
pub mod leaderboard;
pub mod members;
pub mod messages;
pub mod moderation;
pub mod server;
pub mod voice;

use anyhow::anyhow;
use serde::Deserialize;
use tracing::warn;

use guildboard_db::Database;
use guildboard_types::window::TimeWindow;

use crate::state::AppState;

/// Query parameters shared by the windowed families. Wire names are
/// camelCase; absent values get the family's documented default in the
/// handler, never implicitly.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowedQuery {
    pub guild_id: Option<String>,
    pub days: Option<u32>,
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u32>,
}

impl WindowedQuery {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::from_params(
            self.days,
            self.period.as_deref(),
            self.start_date.as_deref(),
            self.end_date.as_deref(),
        )
    }

    /// Bound the result cardinality: the family default when absent, and a
    /// hard ceiling either way.
    pub fn limit_or(&self, default: u32) -> u32 {
        self.limit.unwrap_or(default).clamp(1, 100)
    }
}

/// Run one blocking store call off the async runtime.
pub(crate) async fn run_query<T, F>(state: &AppState, f: F) -> anyhow::Result<T>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| anyhow!("blocking join error: {e}"))?
}

/// Degrade one failed sub-query of a fan-out family to its default value.
/// The field stays present (empty, not omitted) so the UI can render an
/// explicit no-data state.
pub(crate) fn or_default<T: Default>(
    result: anyhow::Result<T>,
    endpoint: &str,
    field: &str,
    guild_id: &str,
    window: &TimeWindow,
) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(
                endpoint,
                field,
                guild_id,
                days = window.days,
                error = %err,
                "sub-query failed, serving empty field"
            );
            T::default()
        }
    }
}
