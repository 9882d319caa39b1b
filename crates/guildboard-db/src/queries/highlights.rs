//! Superlative queries for the yearly recap view. Each category is an
//! independent aggregate; the api layer fans them out concurrently and
//! degrades failed categories to empty lists.

use anyhow::Result;

use guildboard_types::api::HighlightEntry;
use guildboard_types::normalize::{UNKNOWN_USER, round2};

use crate::Database;

/// Shared shape: `(user_id, username, measure)` ordered by the SQL.
fn collect_entries(
    conn: &rusqlite::Connection,
    sql: &str,
    guild_id: &str,
    limit: u32,
) -> Result<Vec<HighlightEntry>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(rusqlite::params![guild_id, limit, UNKNOWN_USER], |row| {
            Ok(HighlightEntry {
                user_id: row.get(0)?,
                username: row.get(1)?,
                value: round2(row.get(2)?),
                detail: None,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

impl Database {
    /// Highest leaderboard scores (latest snapshot per user).
    pub fn highlight_top_scores(&self, guild_id: &str, limit: u32) -> Result<Vec<HighlightEntry>> {
        self.with_conn(|conn| {
            collect_entries(
                conn,
                "SELECT p.user_id, COALESCE(u.username, ?3), CAST(p.total_points AS REAL) AS score
                 FROM points_daily p
                 JOIN (SELECT user_id, MAX(day) AS day FROM points_daily
                        WHERE guild_id = ?1 GROUP BY user_id) latest
                   ON latest.user_id = p.user_id AND latest.day = p.day
                 LEFT JOIN users u ON u.user_id = p.user_id
                 WHERE p.guild_id = ?1
                 ORDER BY score DESC, p.user_id
                 LIMIT ?2",
                guild_id,
                limit,
            )
        })
    }

    /// Most messages sent, all time.
    pub fn highlight_most_messages(
        &self,
        guild_id: &str,
        limit: u32,
    ) -> Result<Vec<HighlightEntry>> {
        self.with_conn(|conn| {
            collect_entries(
                conn,
                "SELECT m.user_id, COALESCE(u.username, ?3),
                        CAST(SUM(m.message_count) AS REAL) AS messages
                 FROM messages_daily m
                 LEFT JOIN users u ON u.user_id = m.user_id
                 WHERE m.guild_id = ?1
                 GROUP BY m.user_id
                 ORDER BY messages DESC, m.user_id
                 LIMIT ?2",
                guild_id,
                limit,
            )
        })
    }

    /// Most voice minutes accumulated.
    pub fn highlight_most_voice_minutes(
        &self,
        guild_id: &str,
        limit: u32,
    ) -> Result<Vec<HighlightEntry>> {
        self.with_conn(|conn| {
            collect_entries(
                conn,
                "SELECT v.user_id, COALESCE(u.username, ?3), SUM(v.minutes) AS minutes
                 FROM voice_daily v
                 LEFT JOIN users u ON u.user_id = v.user_id
                 WHERE v.guild_id = ?1
                 GROUP BY v.user_id
                 ORDER BY minutes DESC, v.user_id
                 LIMIT ?2",
                guild_id,
                limit,
            )
        })
    }

    /// Most flagged/offensive messages attributed.
    pub fn highlight_most_flagged(
        &self,
        guild_id: &str,
        limit: u32,
    ) -> Result<Vec<HighlightEntry>> {
        self.with_conn(|conn| {
            collect_entries(
                conn,
                "SELECT a.target_user_id, COALESCE(u.username, ?3),
                        CAST(COUNT(*) AS REAL) AS flags
                 FROM moderation_actions a
                 LEFT JOIN users u ON u.user_id = a.target_user_id
                 WHERE a.guild_id = ?1 AND a.kind = 'message_flagged'
                 GROUP BY a.target_user_id
                 ORDER BY flags DESC, a.target_user_id
                 LIMIT ?2",
                guild_id,
                limit,
            )
        })
    }

    /// Most hours of tracked activity.
    pub fn highlight_most_activity_hours(
        &self,
        guild_id: &str,
        limit: u32,
    ) -> Result<Vec<HighlightEntry>> {
        self.with_conn(|conn| {
            collect_entries(
                conn,
                "SELECT s.user_id, COALESCE(u.username, ?3),
                        SUM(s.duration_seconds) / 3600.0 AS hours
                 FROM activity_sessions s
                 LEFT JOIN users u ON u.user_id = s.user_id
                 WHERE s.guild_id = ?1
                 GROUP BY s.user_id
                 ORDER BY hours DESC, s.user_id
                 LIMIT ?2",
                guild_id,
                limit,
            )
        })
    }

    /// Longest single streaming session, with the streamed activity's name.
    pub fn highlight_longest_stream(
        &self,
        guild_id: &str,
        limit: u32,
    ) -> Result<Vec<HighlightEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT s.user_id, COALESCE(u.username, ?3),
                        s.duration_seconds / 3600.0 AS hours,
                        s.activity_name
                 FROM activity_sessions s
                 LEFT JOIN users u ON u.user_id = s.user_id
                 WHERE s.guild_id = ?1 AND s.streaming = 1
                 ORDER BY s.duration_seconds DESC, s.user_id
                 LIMIT ?2",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![guild_id, limit, UNKNOWN_USER], |row| {
                    Ok(HighlightEntry {
                        user_id: row.get(0)?,
                        username: row.get(1)?,
                        value: round2(row.get(2)?),
                        detail: Some(row.get(3)?),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Most event participations.
    pub fn highlight_most_event_participations(
        &self,
        guild_id: &str,
        limit: u32,
    ) -> Result<Vec<HighlightEntry>> {
        self.with_conn(|conn| {
            collect_entries(
                conn,
                "SELECT p.user_id, COALESCE(u.username, ?3),
                        CAST(COUNT(*) AS REAL) AS events
                 FROM event_participants p
                 LEFT JOIN users u ON u.user_id = p.user_id
                 WHERE p.guild_id = ?1
                 GROUP BY p.user_id
                 ORDER BY events DESC, p.user_id
                 LIMIT ?2",
                guild_id,
                limit,
            )
        })
    }

    /// Most distinct games/activities played.
    pub fn highlight_most_distinct_games(
        &self,
        guild_id: &str,
        limit: u32,
    ) -> Result<Vec<HighlightEntry>> {
        self.with_conn(|conn| {
            collect_entries(
                conn,
                "SELECT s.user_id, COALESCE(u.username, ?3),
                        CAST(COUNT(DISTINCT s.activity_name) AS REAL) AS games
                 FROM activity_sessions s
                 LEFT JOIN users u ON u.user_id = s.user_id
                 WHERE s.guild_id = ?1
                 GROUP BY s.user_id
                 ORDER BY games DESC, s.user_id
                 LIMIT ?2",
                guild_id,
                limit,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{GUILD, db, exec, ts};

    #[test]
    fn longest_stream_carries_the_activity_name() {
        let db = db();
        exec(
            &db,
            &format!(
                "
                INSERT INTO users (user_id, username) VALUES ('11', 'alena');
                INSERT INTO activity_sessions (guild_id, user_id, activity_name, started_at, duration_seconds, streaming) VALUES
                    ('{g}', '11', 'factorio', '{t}', 7200, 1),
                    ('{g}', '12', 'chess', '{t}', 9000, 0),
                    ('{g}', '11', 'art stream', '{t}', 10800, 1);
                ",
                g = GUILD,
                t = ts(5),
            ),
        );

        let rows = db
            .highlight_longest_stream(GUILD, 5)
            .expect("longest stream");
        assert_eq!(rows.len(), 2); // non-streaming session excluded
        assert_eq!(rows[0].value, 3.0);
        assert_eq!(rows[0].detail.as_deref(), Some("art stream"));
    }

    #[test]
    fn distinct_games_count_unique_names() {
        let db = db();
        exec(
            &db,
            &format!(
                "INSERT INTO activity_sessions (guild_id, user_id, activity_name, started_at, duration_seconds, streaming) VALUES
                    ('{g}', '11', 'factorio', '{t}', 100, 0),
                    ('{g}', '11', 'factorio', '{t}', 100, 0),
                    ('{g}', '11', 'chess', '{t}', 100, 0),
                    ('{g}', '12', 'chess', '{t}', 100, 0);",
                g = GUILD,
                t = ts(5),
            ),
        );

        let rows = db
            .highlight_most_distinct_games(GUILD, 5)
            .expect("distinct games");
        assert_eq!(rows[0].user_id, "11");
        assert_eq!(rows[0].value, 2.0);
    }
}
