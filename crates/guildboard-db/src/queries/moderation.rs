use anyhow::Result;

use guildboard_types::api::ModerationStats;
use guildboard_types::normalize::safe_count;
use guildboard_types::window::TimeWindow;

use super::since_ts;
use crate::Database;

impl Database {
    /// Moderation action totals: the window count plus a trailing-24h count.
    pub fn moderation_stats(&self, guild_id: &str, window: &TimeWindow) -> Result<ModerationStats> {
        let since = since_ts(window);
        self.with_conn(|conn| {
            let (total, last_24h): (i64, i64) = conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(created_at >= datetime('now', '-1 day')), 0)
                 FROM moderation_actions
                 WHERE guild_id = ?1 AND created_at >= ?2",
                rusqlite::params![guild_id, since],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            Ok(ModerationStats {
                total_moderated: safe_count(total),
                last_24h: safe_count(last_24h),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{GUILD, db, exec, ts};
    use guildboard_types::window::TimeWindow;

    #[test]
    fn window_total_and_trailing_day_split() {
        let db = db();
        exec(
            &db,
            &format!(
                "INSERT INTO moderation_actions (guild_id, target_user_id, kind, created_at) VALUES
                    ('{g}', '21', 'timeout', '{now}'),
                    ('{g}', '22', 'message_flagged', '{recent}'),
                    ('{g}', '21', 'ban', '{old}'),
                    ('777', '21', 'ban', '{now}');",
                g = GUILD,
                now = ts(0),
                recent = ts(3),
                old = ts(90),
            ),
        );

        let stats = db
            .moderation_stats(GUILD, &TimeWindow::default())
            .expect("moderation stats");
        assert_eq!(stats.total_moderated, 2);
        assert_eq!(stats.last_24h, 1);
    }
}
