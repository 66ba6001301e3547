use super::{SqliteStore, StoreError};
use rusqlite::{Transaction, params};

#[derive(Clone, Debug)]
pub struct EventRow {
    pub seq: i64,
    pub ts_ms: i64,
    pub actor_id: Option<i64>,
    pub entity: Option<String>,
    pub event_type: String,
    pub payload_json: String,
}

impl SqliteStore {
    /// Most recent audit events first.
    pub fn list_events(&self, limit: usize) -> Result<Vec<EventRow>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn().prepare(
            "SELECT seq, ts_ms, actor_id, entity, type, payload_json \
             FROM events ORDER BY seq DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(EventRow {
                seq: row.get(0)?,
                ts_ms: row.get(1)?,
                actor_id: row.get(2)?,
                entity: row.get(3)?,
                event_type: row.get(4)?,
                payload_json: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

/// Appended inside the caller's transaction so the audit record commits or
/// rolls back together with the mutation it describes.
pub(crate) fn insert_event_tx(
    tx: &Transaction<'_>,
    ts_ms: i64,
    actor_id: Option<i64>,
    entity: Option<String>,
    event_type: &str,
    payload: serde_json::Value,
) -> Result<(), StoreError> {
    tx.execute(
        "INSERT INTO events(ts_ms, actor_id, entity, type, payload_json) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![ts_ms, actor_id, entity, event_type, payload.to_string()],
    )?;
    Ok(())
}
