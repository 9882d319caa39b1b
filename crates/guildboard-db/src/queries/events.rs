use anyhow::Result;
use chrono::NaiveDate;

use guildboard_types::api::EventStats;
use guildboard_types::normalize::safe_count;

use crate::Database;

impl Database {
    /// Event totals. Not windowed by a trailing day count — "upcoming" is
    /// forward-looking — only by an optional lower bound on the start date.
    pub fn event_stats(&self, guild_id: &str, start_date: Option<NaiveDate>) -> Result<EventStats> {
        let bound = start_date.map(|d| format!("{} 00:00:00", d.format("%Y-%m-%d")));
        self.with_conn(|conn| {
            let (total, upcoming): (i64, i64) = conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(starts_at > datetime('now')), 0)
                 FROM events
                 WHERE guild_id = ?1 AND (?2 IS NULL OR starts_at >= ?2)",
                rusqlite::params![guild_id, bound],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            let participants: i64 = conn.query_row(
                "SELECT COUNT(*)
                 FROM event_participants p
                 JOIN events e ON e.event_id = p.event_id
                 WHERE e.guild_id = ?1 AND (?2 IS NULL OR e.starts_at >= ?2)",
                rusqlite::params![guild_id, bound],
                |row| row.get(0),
            )?;

            Ok(EventStats {
                total_events: safe_count(total),
                upcoming_events: safe_count(upcoming),
                total_participants: safe_count(participants),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{GUILD, day, db, exec, ts};
    use chrono::NaiveDate;

    fn seed(db: &crate::Database) {
        exec(
            db,
            &format!(
                "
                INSERT INTO events (event_id, guild_id, name, starts_at, created_at) VALUES
                    (1, '{g}', 'movie night', '{past}', '{past}'),
                    (2, '{g}', 'tournament', '{future}', '{past}');
                INSERT INTO event_participants (event_id, guild_id, user_id) VALUES
                    (1, '{g}', '21'),
                    (1, '{g}', '22'),
                    (2, '{g}', '21');
                ",
                g = GUILD,
                past = ts(10),
                future = ts(-5),
            ),
        );
    }

    #[test]
    fn counts_upcoming_separately() {
        let db = db();
        seed(&db);

        let stats = db.event_stats(GUILD, None).expect("event stats");
        assert_eq!(stats.total_events, 2);
        assert_eq!(stats.upcoming_events, 1);
        assert_eq!(stats.total_participants, 3);
    }

    #[test]
    fn start_date_bound_excludes_older_events() {
        let db = db();
        seed(&db);

        let bound: NaiveDate = day(2).parse().unwrap();
        let stats = db.event_stats(GUILD, Some(bound)).expect("event stats");
        assert_eq!(stats.total_events, 1);
        assert_eq!(stats.total_participants, 1);
    }
}
