use anyhow::Result;

use guildboard_types::api::{
    ActivityTypeDistribution, DailyActivityStats, TopActivity, TopUserByActivity,
};
use guildboard_types::normalize::{UNKNOWN_LABEL, UNKNOWN_USER, round2, safe_count};
use guildboard_types::window::TimeWindow;

use super::since_ts;
use crate::Database;

impl Database {
    /// Top activities by total time played.
    pub fn top_activities(
        &self,
        guild_id: &str,
        window: &TimeWindow,
        limit: u32,
    ) -> Result<Vec<TopActivity>> {
        let since = since_ts(window);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT activity_name,
                        COUNT(DISTINCT user_id),
                        COUNT(*),
                        SUM(duration_seconds) AS seconds,
                        AVG(duration_seconds)
                 FROM activity_sessions
                 WHERE guild_id = ?1 AND started_at >= ?2
                 GROUP BY activity_name
                 ORDER BY seconds DESC, activity_name
                 LIMIT ?3",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![guild_id, since, limit], |row| {
                    let total_seconds: i64 = row.get(3)?;
                    Ok(TopActivity {
                        activity_name: row.get(0)?,
                        unique_users: safe_count(row.get(1)?),
                        session_count: safe_count(row.get(2)?),
                        total_seconds: safe_count(total_seconds),
                        avg_seconds: round2(row.get(4)?),
                        total_hours: round2(total_seconds as f64 / 3600.0),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Per-day session/hour/unique-user rollup.
    pub fn daily_activity_stats(
        &self,
        guild_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<DailyActivityStats>> {
        let since = since_ts(window);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT date(started_at) AS day,
                        COUNT(*),
                        COUNT(DISTINCT user_id),
                        SUM(duration_seconds),
                        AVG(duration_seconds)
                 FROM activity_sessions
                 WHERE guild_id = ?1 AND started_at >= ?2
                 GROUP BY day
                 ORDER BY day",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![guild_id, since], |row| {
                    let total_seconds: i64 = row.get(3)?;
                    let avg_seconds: f64 = row.get(4)?;
                    Ok(DailyActivityStats {
                        date: row.get(0)?,
                        total_sessions: safe_count(row.get(1)?),
                        unique_users: safe_count(row.get(2)?),
                        total_hours: round2(total_seconds as f64 / 3600.0),
                        avg_session_minutes: round2(avg_seconds / 60.0),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Top users by time played, optionally restricted to one activity.
    pub fn top_users_by_activity(
        &self,
        guild_id: &str,
        activity_name: Option<&str>,
        window: &TimeWindow,
        limit: u32,
    ) -> Result<Vec<TopUserByActivity>> {
        let since = since_ts(window);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT s.user_id,
                        COALESCE(u.username, ?5),
                        COUNT(*),
                        SUM(s.duration_seconds) AS seconds,
                        AVG(s.duration_seconds)
                 FROM activity_sessions s
                 LEFT JOIN users u ON u.user_id = s.user_id
                 WHERE s.guild_id = ?1 AND s.started_at >= ?2
                   AND (?4 IS NULL OR s.activity_name = ?4)
                 GROUP BY s.user_id
                 ORDER BY seconds DESC, s.user_id
                 LIMIT ?3",
            )?;

            let rows = stmt
                .query_map(
                    rusqlite::params![guild_id, since, limit, activity_name, UNKNOWN_USER],
                    |row| {
                        let total_seconds: i64 = row.get(3)?;
                        let avg_seconds: f64 = row.get(4)?;
                        Ok(TopUserByActivity {
                            user_id: row.get(0)?,
                            username: row.get(1)?,
                            session_count: safe_count(row.get(2)?),
                            total_seconds: safe_count(total_seconds),
                            total_hours: round2(total_seconds as f64 / 3600.0),
                            avg_session_minutes: round2(avg_seconds / 60.0),
                        })
                    },
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Session distribution across activity types (playing, streaming, ...).
    pub fn activity_type_distribution(
        &self,
        guild_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<ActivityTypeDistribution>> {
        let since = since_ts(window);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT COALESCE(c.activity_type, ?3),
                        COUNT(*),
                        COUNT(DISTINCT s.user_id),
                        SUM(s.duration_seconds) AS seconds
                 FROM activity_sessions s
                 LEFT JOIN activity_catalog c ON c.activity_name = s.activity_name
                 WHERE s.guild_id = ?1 AND s.started_at >= ?2
                 GROUP BY COALESCE(c.activity_type, ?3)
                 ORDER BY seconds DESC",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![guild_id, since, UNKNOWN_LABEL], |row| {
                    let total_seconds: i64 = row.get(3)?;
                    Ok(ActivityTypeDistribution {
                        activity_type: row.get(0)?,
                        session_count: safe_count(row.get(1)?),
                        unique_users: safe_count(row.get(2)?),
                        total_hours: round2(total_seconds as f64 / 3600.0),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Count of distinct users with any tracked activity in the window.
    pub fn total_unique_active_users(&self, guild_id: &str, window: &TimeWindow) -> Result<i64> {
        let since = since_ts(window);
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(DISTINCT user_id)
                 FROM activity_sessions
                 WHERE guild_id = ?1 AND started_at >= ?2",
                rusqlite::params![guild_id, since],
                |row| row.get(0),
            )?;
            Ok(safe_count(count))
        })
    }
}
