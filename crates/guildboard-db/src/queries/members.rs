use anyhow::Result;

use guildboard_types::api::DailyMemberStats;
use guildboard_types::normalize::safe_count;
use guildboard_types::window::TimeWindow;

use super::since_day;
use crate::Database;

impl Database {
    /// Per-day joins, leaves and running member total.
    pub fn member_growth(
        &self,
        guild_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<DailyMemberStats>> {
        let since = since_day(window);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT day, joins, leaves, total_members
                 FROM member_daily
                 WHERE guild_id = ?1 AND day >= ?2
                 ORDER BY day",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![guild_id, since], |row| {
                    Ok(DailyMemberStats {
                        date: row.get(0)?,
                        joins: safe_count(row.get(1)?),
                        leaves: safe_count(row.get(2)?),
                        total_members: safe_count(row.get(3)?),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}
