use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Schema for the precomputed aggregate tables the bot process maintains.
/// Snowflake identifier columns are TEXT throughout; day columns are
/// `YYYY-MM-DD`, timestamps `YYYY-MM-DD HH:MM:SS`.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            user_id        TEXT PRIMARY KEY,
            username       TEXT NOT NULL,
            discriminator  TEXT NOT NULL DEFAULT '0000',
            last_seen      TEXT
        );

        CREATE TABLE IF NOT EXISTS channels (
            channel_id  TEXT PRIMARY KEY,
            guild_id    TEXT NOT NULL,
            name        TEXT NOT NULL,
            kind        TEXT NOT NULL DEFAULT 'text'
        );

        CREATE INDEX IF NOT EXISTS idx_channels_guild ON channels(guild_id);

        CREATE TABLE IF NOT EXISTS messages_daily (
            guild_id         TEXT NOT NULL,
            channel_id       TEXT NOT NULL,
            user_id          TEXT NOT NULL,
            day              TEXT NOT NULL,
            message_count    INTEGER NOT NULL DEFAULT 0,
            last_message_at  TEXT NOT NULL,
            PRIMARY KEY (guild_id, channel_id, user_id, day)
        );

        CREATE INDEX IF NOT EXISTS idx_messages_daily_window
            ON messages_daily(guild_id, day);

        CREATE TABLE IF NOT EXISTS voice_daily (
            guild_id        TEXT NOT NULL,
            channel_id      TEXT NOT NULL,
            user_id         TEXT NOT NULL,
            day             TEXT NOT NULL,
            minutes         REAL NOT NULL DEFAULT 0,
            last_joined_at  TEXT NOT NULL,
            PRIMARY KEY (guild_id, channel_id, user_id, day)
        );

        CREATE INDEX IF NOT EXISTS idx_voice_daily_window
            ON voice_daily(guild_id, day);

        CREATE TABLE IF NOT EXISTS member_daily (
            guild_id       TEXT NOT NULL,
            day            TEXT NOT NULL,
            joins          INTEGER NOT NULL DEFAULT 0,
            leaves         INTEGER NOT NULL DEFAULT 0,
            total_members  INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (guild_id, day)
        );

        CREATE TABLE IF NOT EXISTS activity_sessions (
            id                INTEGER PRIMARY KEY,
            guild_id          TEXT NOT NULL,
            user_id           TEXT NOT NULL,
            activity_name     TEXT NOT NULL,
            started_at        TEXT NOT NULL,
            duration_seconds  INTEGER NOT NULL DEFAULT 0,
            streaming         INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_activity_sessions_window
            ON activity_sessions(guild_id, started_at);

        CREATE TABLE IF NOT EXISTS activity_catalog (
            activity_name  TEXT PRIMARY KEY,
            activity_type  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS giveaways (
            giveaway_id   INTEGER PRIMARY KEY,
            guild_id      TEXT NOT NULL,
            prize         TEXT,
            winner_count  INTEGER NOT NULL DEFAULT 1,
            host_user_id  TEXT NOT NULL,
            created_at    TEXT NOT NULL,
            ends_at       TEXT NOT NULL,
            ended         INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_giveaways_guild
            ON giveaways(guild_id, created_at);

        CREATE TABLE IF NOT EXISTS giveaway_entries (
            giveaway_id  INTEGER NOT NULL REFERENCES giveaways(giveaway_id),
            guild_id     TEXT NOT NULL,
            user_id      TEXT NOT NULL,
            entered_at   TEXT NOT NULL,
            won          INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (giveaway_id, user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_giveaway_entries_window
            ON giveaway_entries(guild_id, entered_at);

        CREATE TABLE IF NOT EXISTS moderation_actions (
            id              INTEGER PRIMARY KEY,
            guild_id        TEXT NOT NULL,
            target_user_id  TEXT NOT NULL,
            kind            TEXT NOT NULL,
            created_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_moderation_actions_window
            ON moderation_actions(guild_id, created_at);

        CREATE TABLE IF NOT EXISTS events (
            event_id    INTEGER PRIMARY KEY,
            guild_id    TEXT NOT NULL,
            name        TEXT NOT NULL,
            starts_at   TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS event_participants (
            event_id  INTEGER NOT NULL REFERENCES events(event_id),
            guild_id  TEXT NOT NULL,
            user_id   TEXT NOT NULL,
            PRIMARY KEY (event_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS points_daily (
            guild_id      TEXT NOT NULL,
            user_id       TEXT NOT NULL,
            day           TEXT NOT NULL,
            total_points  INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (guild_id, user_id, day)
        );

        CREATE INDEX IF NOT EXISTS idx_points_daily_window
            ON points_daily(guild_id, day);

        CREATE TABLE IF NOT EXISTS embed_requests (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            guild_id    TEXT NOT NULL,
            channel_id  TEXT NOT NULL,
            payload     TEXT NOT NULL,
            status      TEXT NOT NULL DEFAULT 'pending',
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
