use std::collections::BTreeMap;

use anyhow::Result;

use guildboard_types::api::{DailyParticipation, GiveawayItem, GiveawayStats, TopParticipant};
use guildboard_types::normalize::{UNKNOWN_LABEL, UNKNOWN_USER, round2, safe_count};
use guildboard_types::window::TimeWindow;

use super::since_ts;
use crate::Database;

impl Database {
    /// Summary counts for giveaways created inside the window.
    pub fn giveaway_stats(&self, guild_id: &str, window: &TimeWindow) -> Result<GiveawayStats> {
        let since = since_ts(window);
        self.with_conn(|conn| {
            let (total, active, ended): (i64, i64, i64) = conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(ended = 0), 0),
                        COALESCE(SUM(ended = 1), 0)
                 FROM giveaways
                 WHERE guild_id = ?1 AND created_at >= ?2",
                rusqlite::params![guild_id, since],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;

            let participants: i64 = conn.query_row(
                "SELECT COUNT(*)
                 FROM giveaway_entries e
                 JOIN giveaways g ON g.giveaway_id = e.giveaway_id
                 WHERE g.guild_id = ?1 AND g.created_at >= ?2",
                rusqlite::params![guild_id, since],
                |row| row.get(0),
            )?;

            let avg = if total > 0 {
                round2(participants as f64 / total as f64)
            } else {
                0.0
            };

            Ok(GiveawayStats {
                total_giveaways: safe_count(total),
                active_giveaways: safe_count(active),
                ended_giveaways: safe_count(ended),
                total_participants: safe_count(participants),
                avg_participants_per_giveaway: avg,
            })
        })
    }

    /// Recent giveaways, newest first, optionally active-only.
    pub fn giveaway_list(
        &self,
        guild_id: &str,
        limit: u32,
        active_only: bool,
    ) -> Result<Vec<GiveawayItem>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT g.giveaway_id,
                        COALESCE(g.prize, ?4),
                        g.winner_count,
                        g.host_user_id,
                        g.ends_at,
                        g.ended,
                        g.created_at,
                        (SELECT COUNT(*) FROM giveaway_entries e
                          WHERE e.giveaway_id = g.giveaway_id)
                 FROM giveaways g
                 WHERE g.guild_id = ?1 AND (?3 = 0 OR g.ended = 0)
                 ORDER BY g.created_at DESC, g.giveaway_id DESC
                 LIMIT ?2",
            )?;

            let rows = stmt
                .query_map(
                    rusqlite::params![guild_id, limit, active_only, UNKNOWN_LABEL],
                    |row| {
                        Ok(GiveawayItem {
                            giveaway_id: row.get(0)?,
                            prize: row.get(1)?,
                            winner_count: safe_count(row.get(2)?),
                            host_user_id: row.get(3)?,
                            ends_at: row.get(4)?,
                            ended: row.get(5)?,
                            created_at: row.get(6)?,
                            participant_count: safe_count(row.get(7)?),
                        })
                    },
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Heaviest giveaway participants by entry count.
    pub fn top_giveaway_participants(
        &self,
        guild_id: &str,
        window: &TimeWindow,
        limit: u32,
    ) -> Result<Vec<TopParticipant>> {
        let since = since_ts(window);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT e.user_id,
                        COALESCE(u.username, ?4),
                        COUNT(*) AS entries,
                        COALESCE(SUM(e.won), 0)
                 FROM giveaway_entries e
                 LEFT JOIN users u ON u.user_id = e.user_id
                 WHERE e.guild_id = ?1 AND e.entered_at >= ?2
                 GROUP BY e.user_id
                 ORDER BY entries DESC, e.user_id
                 LIMIT ?3",
            )?;

            let rows = stmt
                .query_map(
                    rusqlite::params![guild_id, since, limit, UNKNOWN_USER],
                    |row| {
                        Ok(TopParticipant {
                            user_id: row.get(0)?,
                            username: row.get(1)?,
                            entry_count: safe_count(row.get(2)?),
                            wins_count: safe_count(row.get(3)?),
                        })
                    },
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Per-day giveaway creations and entry volume. Entries and creations
    /// come from separate tables, merged on the day key in memory; the
    /// BTreeMap keeps the output deterministically date-ordered.
    pub fn daily_giveaway_participation(
        &self,
        guild_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<DailyParticipation>> {
        let since = since_ts(window);
        self.with_conn(|conn| {
            let mut days: BTreeMap<String, DailyParticipation> = BTreeMap::new();

            let mut stmt = conn.prepare(
                "SELECT date(entered_at) AS day, COUNT(*), COUNT(DISTINCT user_id)
                 FROM giveaway_entries
                 WHERE guild_id = ?1 AND entered_at >= ?2
                 GROUP BY day",
            )?;
            let entries = stmt.query_map(rusqlite::params![guild_id, since], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?;
            for entry in entries {
                let (day, total, unique) = entry?;
                days.insert(
                    day.clone(),
                    DailyParticipation {
                        date: day,
                        new_giveaways: 0,
                        total_entries: safe_count(total),
                        unique_participants: safe_count(unique),
                    },
                );
            }

            let mut stmt = conn.prepare(
                "SELECT date(created_at) AS day, COUNT(*)
                 FROM giveaways
                 WHERE guild_id = ?1 AND created_at >= ?2
                 GROUP BY day",
            )?;
            let created = stmt.query_map(rusqlite::params![guild_id, since], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in created {
                let (day, new_giveaways) = row?;
                days.entry(day.clone())
                    .or_insert_with(|| DailyParticipation {
                        date: day,
                        new_giveaways: 0,
                        total_entries: 0,
                        unique_participants: 0,
                    })
                    .new_giveaways = safe_count(new_giveaways);
            }

            Ok(days.into_values().collect())
        })
    }
}
