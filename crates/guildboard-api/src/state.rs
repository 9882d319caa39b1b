use std::sync::Arc;

use guildboard_db::Database;

pub type AppState = Arc<AppStateInner>;

/// Shared per-process state, constructed once at startup and injected into
/// every handler. The database handle is read-mostly; nothing here mutates
/// after construction.
pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Identity-provider REST base, e.g. `https://discord.com/api/v10`.
    pub provider_api_base: String,
    pub http: reqwest::Client,
    /// Session token lifetime; bounds how stale the cached admin-guild
    /// list can get before a re-login refreshes it.
    pub session_ttl_days: i64,
}
