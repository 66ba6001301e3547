use super::events::insert_event_tx;
use super::{GrantOutcome, RevokeOutcome, SqliteStore, StoreError, now_ms};
use rusqlite::{OptionalExtension, Transaction, params};
use serde_json::json;

/// One delegated-access row, joined with the holder for display.
#[derive(Clone, Debug)]
pub struct GrantRow {
    pub project_id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at_ms: i64,
}

impl SqliteStore {
    /// Granting to the owner is rejected; granting twice reports
    /// `AlreadyGranted` without touching the existing row.
    pub fn grant_access(
        &mut self,
        project_id: i64,
        user_id: i64,
        actor_id: i64,
    ) -> Result<GrantOutcome, StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        let owner_id: Option<i64> = tx
            .query_row(
                "SELECT owner_id FROM projects WHERE id = ?1",
                params![project_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(owner_id) = owner_id else {
            return Err(StoreError::UnknownProject);
        };

        let user_exists = tx
            .query_row("SELECT 1 FROM users WHERE id = ?1", params![user_id], |_| {
                Ok(())
            })
            .optional()?
            .is_some();
        if !user_exists {
            return Err(StoreError::UnknownUser);
        }

        if user_id == owner_id {
            return Err(StoreError::OwnerCannotBeGranted);
        }

        let already = tx
            .query_row(
                "SELECT 1 FROM grants WHERE project_id = ?1 AND user_id = ?2",
                params![project_id, user_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if already {
            return Ok(GrantOutcome::AlreadyGranted);
        }

        tx.execute(
            "INSERT INTO grants(project_id, user_id, created_at_ms) VALUES (?1, ?2, ?3)",
            params![project_id, user_id, now_ms],
        )?;

        insert_event_tx(
            &tx,
            now_ms,
            Some(actor_id),
            Some(format!("project:{project_id}")),
            "access_granted",
            json!({ "user_id": user_id }),
        )?;
        tx.commit()?;
        Ok(GrantOutcome::Granted)
    }

    /// Idempotent; revoking an absent grant is a no-op outcome, not an error.
    pub fn revoke_access(
        &mut self,
        project_id: i64,
        user_id: i64,
        actor_id: i64,
    ) -> Result<RevokeOutcome, StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        let deleted = tx.execute(
            "DELETE FROM grants WHERE project_id = ?1 AND user_id = ?2",
            params![project_id, user_id],
        )?;
        if deleted == 0 {
            return Ok(RevokeOutcome::NothingToRevoke);
        }

        insert_event_tx(
            &tx,
            now_ms,
            Some(actor_id),
            Some(format!("project:{project_id}")),
            "access_revoked",
            json!({ "user_id": user_id }),
        )?;
        tx.commit()?;
        Ok(RevokeOutcome::Revoked)
    }

    pub fn has_grant(&self, project_id: i64, user_id: i64) -> Result<bool, StoreError> {
        Ok(self
            .conn()
            .query_row(
                "SELECT 1 FROM grants WHERE project_id = ?1 AND user_id = ?2",
                params![project_id, user_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some())
    }

    /// Grant creation order.
    pub fn list_grants_for_project(&self, project_id: i64) -> Result<Vec<GrantRow>, StoreError> {
        let mut stmt = self.conn().prepare(
            "SELECT g.project_id, g.user_id, u.first_name, u.last_name, u.email, g.created_at_ms \
             FROM grants g JOIN users u ON u.id = g.user_id \
             WHERE g.project_id = ?1 ORDER BY g.created_at_ms ASC, g.user_id ASC",
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(GrantRow {
                project_id: row.get(0)?,
                user_id: row.get(1)?,
                first_name: row.get(2)?,
                last_name: row.get(3)?,
                email: row.get(4)?,
                created_at_ms: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

pub(crate) fn revoke_all_for_user_tx(
    tx: &Transaction<'_>,
    user_id: i64,
) -> Result<usize, StoreError> {
    Ok(tx.execute("DELETE FROM grants WHERE user_id = ?1", params![user_id])?)
}

pub(crate) fn revoke_all_for_project_tx(
    tx: &Transaction<'_>,
    project_id: i64,
) -> Result<usize, StoreError> {
    Ok(tx.execute(
        "DELETE FROM grants WHERE project_id = ?1",
        params![project_id],
    )?)
}
