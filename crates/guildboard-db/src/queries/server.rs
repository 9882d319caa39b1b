use anyhow::Result;
use chrono::Utc;
use rusqlite::OptionalExtension;

use guildboard_types::api::ServerStats;
use guildboard_types::normalize::safe_count;
use guildboard_types::window::TimeWindow;

use super::since_day;
use crate::Database;

impl Database {
    /// Server totals for one guild and window.
    pub fn server_stats(&self, guild_id: &str, window: &TimeWindow) -> Result<ServerStats> {
        let since = since_day(window);
        self.with_conn(|conn| {
            let (total_messages, active_members): (i64, i64) = conn.query_row(
                "SELECT COALESCE(SUM(message_count), 0), COUNT(DISTINCT user_id)
                 FROM messages_daily
                 WHERE guild_id = ?1 AND day >= ?2",
                rusqlite::params![guild_id, since],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            // Running total from the most recent member-growth bucket.
            let total_members: i64 = conn
                .query_row(
                    "SELECT total_members FROM member_daily
                     WHERE guild_id = ?1
                     ORDER BY day DESC
                     LIMIT 1",
                    [guild_id],
                    |row| row.get(0),
                )
                .optional()?
                .unwrap_or(0);

            let total_channels: i64 = conn.query_row(
                "SELECT COUNT(*) FROM channels WHERE guild_id = ?1",
                [guild_id],
                |row| row.get(0),
            )?;

            Ok(ServerStats {
                guild_id: guild_id.to_string(),
                total_messages: safe_count(total_messages),
                total_members: safe_count(total_members),
                active_members: safe_count(active_members),
                total_channels: safe_count(total_channels),
                period_days: window.days,
                last_updated: Utc::now(),
            })
        })
    }
}
