use anyhow::Result;

use guildboard_types::api::{ChannelStats, DailyActivity, UserStats};
use guildboard_types::normalize::{UNKNOWN_CHANNEL, UNKNOWN_USER, safe_count};
use guildboard_types::window::TimeWindow;

use super::since_day;
use crate::Database;

impl Database {
    /// Top users by message volume, store order authoritative.
    pub fn top_users(
        &self,
        guild_id: &str,
        window: &TimeWindow,
        limit: u32,
    ) -> Result<Vec<UserStats>> {
        let since = since_day(window);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.user_id,
                        COALESCE(u.username, ?4),
                        COALESCE(u.discriminator, '0000'),
                        SUM(m.message_count) AS messages,
                        MAX(m.last_message_at)
                 FROM messages_daily m
                 LEFT JOIN users u ON u.user_id = m.user_id
                 WHERE m.guild_id = ?1 AND m.day >= ?2
                 GROUP BY m.user_id
                 ORDER BY messages DESC, m.user_id
                 LIMIT ?3",
            )?;

            let rows = stmt
                .query_map(
                    rusqlite::params![guild_id, since, limit, UNKNOWN_USER],
                    |row| {
                        Ok(UserStats {
                            user_id: row.get(0)?,
                            username: row.get(1)?,
                            discriminator: row.get(2)?,
                            message_count: safe_count(row.get(3)?),
                            last_message_at: row.get(4)?,
                        })
                    },
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Top channels by message volume.
    pub fn top_channels(
        &self,
        guild_id: &str,
        window: &TimeWindow,
        limit: u32,
    ) -> Result<Vec<ChannelStats>> {
        let since = since_day(window);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.channel_id,
                        COALESCE(c.name, ?4),
                        SUM(m.message_count) AS messages,
                        MAX(m.last_message_at)
                 FROM messages_daily m
                 LEFT JOIN channels c ON c.channel_id = m.channel_id
                 WHERE m.guild_id = ?1 AND m.day >= ?2
                 GROUP BY m.channel_id
                 ORDER BY messages DESC, m.channel_id
                 LIMIT ?3",
            )?;

            let rows = stmt
                .query_map(
                    rusqlite::params![guild_id, since, limit, UNKNOWN_CHANNEL],
                    |row| {
                        Ok(ChannelStats {
                            channel_id: row.get(0)?,
                            name: row.get(1)?,
                            message_count: safe_count(row.get(2)?),
                            last_message_at: row.get(3)?,
                        })
                    },
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Per-day message volume and active-user count.
    pub fn daily_activity(&self, guild_id: &str, window: &TimeWindow) -> Result<Vec<DailyActivity>> {
        let since = since_day(window);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT day, SUM(message_count), COUNT(DISTINCT user_id)
                 FROM messages_daily
                 WHERE guild_id = ?1 AND day >= ?2
                 GROUP BY day
                 ORDER BY day",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![guild_id, since], |row| {
                    Ok(DailyActivity {
                        date: row.get(0)?,
                        message_count: safe_count(row.get(1)?),
                        active_users: safe_count(row.get(2)?),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{GUILD, day, db, exec, ts};
    use guildboard_types::normalize::UNKNOWN_USER;
    use guildboard_types::window::TimeWindow;

    #[test]
    fn top_users_orders_by_volume_and_respects_limit() {
        let db = db();
        exec(
            &db,
            &format!(
                "
                INSERT INTO users (user_id, username) VALUES
                    ('11', 'alena'), ('12', 'bruno');
                INSERT INTO messages_daily (guild_id, channel_id, user_id, day, message_count, last_message_at) VALUES
                    ('{g}', '1', '11', '{d0}', 10, '{t0}'),
                    ('{g}', '1', '11', '{d1}', 5, '{t1}'),
                    ('{g}', '1', '12', '{d0}', 40, '{t0}'),
                    ('{g}', '1', '13', '{d0}', 1, '{t0}');
                ",
                g = GUILD,
                d0 = day(1),
                d1 = day(2),
                t0 = ts(1),
                t1 = ts(2),
            ),
        );

        let rows = db
            .top_users(GUILD, &TimeWindow::default(), 2)
            .expect("top users");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user_id, "12");
        assert_eq!(rows[0].message_count, 40);
        assert_eq!(rows[1].user_id, "11");
        assert_eq!(rows[1].message_count, 15);
    }

    #[test]
    fn missing_profile_gets_the_unknown_sentinel() {
        let db = db();
        exec(
            &db,
            &format!(
                "INSERT INTO messages_daily (guild_id, channel_id, user_id, day, message_count, last_message_at)
                 VALUES ('{g}', '1', '77', '{d}', 3, '{t}');",
                g = GUILD,
                d = day(1),
                t = ts(1),
            ),
        );

        let rows = db
            .top_users(GUILD, &TimeWindow::default(), 10)
            .expect("top users");
        assert_eq!(rows[0].username, UNKNOWN_USER);
        assert_eq!(rows[0].discriminator, "0000");
    }

    #[test]
    fn daily_activity_buckets_ascend_by_date() {
        let db = db();
        exec(
            &db,
            &format!(
                "INSERT INTO messages_daily (guild_id, channel_id, user_id, day, message_count, last_message_at) VALUES
                    ('{g}', '1', '11', '{d1}', 4, '{t}'),
                    ('{g}', '1', '12', '{d1}', 6, '{t}'),
                    ('{g}', '2', '11', '{d0}', 2, '{t}');",
                g = GUILD,
                d0 = day(1),
                d1 = day(3),
                t = ts(1),
            ),
        );

        let rows = db
            .daily_activity(GUILD, &TimeWindow::default())
            .expect("daily activity");
        assert_eq!(rows.len(), 2);
        assert!(rows[0].date < rows[1].date);
        assert_eq!(rows[0].message_count, 10);
        assert_eq!(rows[0].active_users, 2);
    }
}
