use anyhow::Result;

use guildboard_types::api::{LeaderboardEntry, LeaderboardHistoryRow};
use guildboard_types::normalize::{UNKNOWN_USER, safe_count};
use guildboard_types::window::TimeWindow;

use super::since_day;
use crate::Database;

impl Database {
    /// Current ranking from each user's most recent point snapshot inside
    /// the window. Rank comes from the SQL window function; this layer does
    /// not re-rank.
    pub fn leaderboard(
        &self,
        guild_id: &str,
        window: &TimeWindow,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>> {
        let since = since_day(window);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.user_id,
                        COALESCE(u.username, ?4),
                        p.total_points,
                        ROW_NUMBER() OVER (ORDER BY p.total_points DESC, p.user_id) AS rank
                 FROM points_daily p
                 JOIN (SELECT user_id, MAX(day) AS day
                         FROM points_daily
                        WHERE guild_id = ?1 AND day >= ?2
                        GROUP BY user_id) latest
                   ON latest.user_id = p.user_id AND latest.day = p.day
                 LEFT JOIN users u ON u.user_id = p.user_id
                 WHERE p.guild_id = ?1
                 ORDER BY rank
                 LIMIT ?3",
            )?;

            let rows = stmt
                .query_map(
                    rusqlite::params![guild_id, since, limit, UNKNOWN_USER],
                    |row| {
                        Ok(LeaderboardEntry {
                            user_id: row.get(0)?,
                            username: row.get(1)?,
                            total_points: safe_count(row.get(2)?),
                            rank: row.get(3)?,
                        })
                    },
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Per-day point snapshots restricted to an exact user set — the
    /// current top-N from a preceding `leaderboard` call. Daily rank is
    /// computed against the whole guild before the set is applied, so a
    /// row's rank reflects the full standings that day.
    pub fn leaderboard_history(
        &self,
        guild_id: &str,
        window: &TimeWindow,
        user_ids: &[String],
    ) -> Result<Vec<LeaderboardHistoryRow>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let since = since_day(window);
        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (0..user_ids.len()).map(|i| format!("?{}", i + 3)).collect();
            let sql = format!(
                "SELECT day, user_id, total_points, rank FROM (
                     SELECT day, user_id, total_points,
                            ROW_NUMBER() OVER (
                                PARTITION BY day
                                ORDER BY total_points DESC, user_id) AS rank
                     FROM points_daily
                     WHERE guild_id = ?1 AND day >= ?2
                 )
                 WHERE user_id IN ({})
                 ORDER BY day, rank",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let mut params: Vec<&dyn rusqlite::types::ToSql> = vec![&guild_id, &since];
            params.extend(user_ids.iter().map(|id| id as &dyn rusqlite::types::ToSql));

            let rows = stmt
                .query_map(params.as_slice(), |row| {
                    Ok(LeaderboardHistoryRow {
                        date: row.get(0)?,
                        user_id: row.get(1)?,
                        rank: row.get(3)?,
                        total_points: safe_count(row.get(2)?),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}
