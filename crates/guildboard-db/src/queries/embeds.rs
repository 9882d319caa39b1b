use anyhow::Result;

use crate::Database;

impl Database {
    /// Queue an outbound embed for the worker process. Returns the new
    /// row's id; the worker owns the row (and its `pending -> sent|failed`
    /// transitions) from here on.
    pub fn insert_embed_request(
        &self,
        guild_id: &str,
        channel_id: &str,
        payload: &serde_json::Value,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO embed_requests (guild_id, channel_id, payload, status)
                 VALUES (?1, ?2, ?3, 'pending')",
                rusqlite::params![guild_id, channel_id, payload.to_string()],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{GUILD, db};

    #[test]
    fn insert_returns_id_and_row_is_pending() {
        let db = db();
        let payload = serde_json::json!({"title": "announcement", "color": 0x5865F2});

        let id = db
            .insert_embed_request(GUILD, "42", &payload)
            .expect("insert embed request");
        assert!(id > 0);

        let (status, stored): (String, String) = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT status, payload FROM embed_requests WHERE id = ?1",
                    [id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?)
            })
            .expect("read back");
        assert_eq!(status, "pending");
        let parsed: serde_json::Value = serde_json::from_str(&stored).unwrap();
        assert_eq!(parsed["title"], "announcement");
    }
}
