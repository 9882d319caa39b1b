use anyhow::Result;

use guildboard_types::api::{DailyVoiceActivity, VoiceChannelStats, VoiceUserStats};
use guildboard_types::normalize::{UNKNOWN_CHANNEL, UNKNOWN_USER, round2, safe_count};
use guildboard_types::window::TimeWindow;

use super::since_day;
use crate::Database;

impl Database {
    /// Top users by voice minutes.
    pub fn top_voice_users(
        &self,
        guild_id: &str,
        window: &TimeWindow,
        limit: u32,
    ) -> Result<Vec<VoiceUserStats>> {
        let since = since_day(window);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT v.user_id,
                        COALESCE(u.username, ?4),
                        SUM(v.minutes) AS minutes,
                        MAX(v.last_joined_at)
                 FROM voice_daily v
                 LEFT JOIN users u ON u.user_id = v.user_id
                 WHERE v.guild_id = ?1 AND v.day >= ?2
                 GROUP BY v.user_id
                 ORDER BY minutes DESC, v.user_id
                 LIMIT ?3",
            )?;

            let rows = stmt
                .query_map(
                    rusqlite::params![guild_id, since, limit, UNKNOWN_USER],
                    |row| {
                        Ok(VoiceUserStats {
                            user_id: row.get(0)?,
                            username: row.get(1)?,
                            voice_minutes: round2(row.get(2)?),
                            last_activity: row.get(3)?,
                        })
                    },
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Top channels by voice minutes. A channel with no recorded voice time
    /// is not "top" anything, so zero-minute rows are excluded.
    pub fn top_voice_channels(
        &self,
        guild_id: &str,
        window: &TimeWindow,
        limit: u32,
    ) -> Result<Vec<VoiceChannelStats>> {
        let since = since_day(window);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT v.channel_id,
                        COALESCE(c.name, ?4),
                        SUM(v.minutes) AS minutes,
                        MAX(v.last_joined_at)
                 FROM voice_daily v
                 LEFT JOIN channels c ON c.channel_id = v.channel_id
                 WHERE v.guild_id = ?1 AND v.day >= ?2
                 GROUP BY v.channel_id
                 HAVING SUM(v.minutes) > 0
                 ORDER BY minutes DESC, v.channel_id
                 LIMIT ?3",
            )?;

            let rows = stmt
                .query_map(
                    rusqlite::params![guild_id, since, limit, UNKNOWN_CHANNEL],
                    |row| {
                        Ok(VoiceChannelStats {
                            channel_id: row.get(0)?,
                            name: row.get(1)?,
                            voice_minutes: round2(row.get(2)?),
                            last_activity: row.get(3)?,
                        })
                    },
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Per-day voice minutes and distinct participants.
    pub fn daily_voice_activity(
        &self,
        guild_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<DailyVoiceActivity>> {
        let since = since_day(window);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT day, SUM(minutes), COUNT(DISTINCT user_id)
                 FROM voice_daily
                 WHERE guild_id = ?1 AND day >= ?2
                 GROUP BY day
                 ORDER BY day",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![guild_id, since], |row| {
                    Ok(DailyVoiceActivity {
                        date: row.get(0)?,
                        total_minutes: round2(row.get(1)?),
                        active_users: safe_count(row.get(2)?),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}
