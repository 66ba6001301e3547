use super::events::insert_event_tx;
use super::{CreateUserRequest, SqliteStore, StoreError, map_insert_conflict, now_ms};
use rusqlite::{OptionalExtension, params};
use sb_core::model::{Role, User};
use sb_core::names::canonical;
use serde_json::json;

/// Opaque salted digest pair; only the authentication path reads it.
#[derive(Clone, Debug)]
pub struct Credential {
    pub digest: String,
    pub salt: String,
}

impl SqliteStore {
    pub fn create_user(&mut self, request: CreateUserRequest) -> Result<User, StoreError> {
        if request.first_name.trim().is_empty() {
            return Err(StoreError::InvalidInput("first name must not be empty"));
        }

        let now_ms = now_ms();
        let tx = self.transaction()?;

        let insert = tx.execute(
            "INSERT INTO users(first_name, last_name, email, email_canon, password_digest, password_salt, role_id, created_at_ms, updated_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                request.first_name.trim(),
                request.last_name.trim(),
                request.email.as_str(),
                request.email.canonical(),
                request.password_digest,
                request.password_salt,
                request.role.id(),
                now_ms,
            ],
        );

        if let Err(err) = insert {
            return Err(map_insert_conflict(err, StoreError::DuplicateEmail));
        }

        let id = tx.last_insert_rowid();
        insert_event_tx(
            &tx,
            now_ms,
            request.actor_id,
            Some(format!("user:{id}")),
            "user_created",
            json!({ "email": request.email.canonical(), "role": request.role.as_str() }),
        )?;
        tx.commit()?;

        Ok(User {
            id,
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            email: request.email.as_str().to_string(),
            role: request.role,
        })
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let row = self
            .conn()
            .query_row(
                "SELECT id, first_name, last_name, email, role_id FROM users WHERE id = ?1",
                params![id],
                user_tuple,
            )
            .optional()?;
        row.map(user_from_tuple).transpose()
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = self
            .conn()
            .query_row(
                "SELECT id, first_name, last_name, email, role_id FROM users WHERE email_canon = ?1",
                params![canonical(email)],
                user_tuple,
            )
            .optional()?;
        row.map(user_from_tuple).transpose()
    }

    pub fn credential_for_email(
        &self,
        email: &str,
    ) -> Result<Option<(User, Credential)>, StoreError> {
        let row = self
            .conn()
            .query_row(
                "SELECT id, first_name, last_name, email, role_id, password_digest, password_salt \
                 FROM users WHERE email_canon = ?1",
                params![canonical(email)],
                |row| {
                    Ok((
                        user_tuple(row)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .optional()?;
        match row {
            Some((tuple, digest, salt)) => {
                Ok(Some((user_from_tuple(tuple)?, Credential { digest, salt })))
            }
            None => Ok(None),
        }
    }

    pub fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut stmt = self.conn().prepare(
            "SELECT id, first_name, last_name, email, role_id FROM users ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], user_tuple)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(user_from_tuple(row?)?);
        }
        Ok(out)
    }

    pub fn set_user_role(
        &mut self,
        user_id: i64,
        role: Role,
        actor_id: i64,
    ) -> Result<User, StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        let changed = tx.execute(
            "UPDATE users SET role_id = ?2, updated_at_ms = ?3 WHERE id = ?1",
            params![user_id, role.id(), now_ms],
        )?;
        if changed == 0 {
            return Err(StoreError::UnknownUser);
        }

        insert_event_tx(
            &tx,
            now_ms,
            Some(actor_id),
            Some(format!("user:{user_id}")),
            "user_role_changed",
            json!({ "role": role.as_str() }),
        )?;
        tx.commit()?;

        match self.get_user(user_id)? {
            Some(user) => Ok(user),
            None => Err(StoreError::UnknownUser),
        }
    }

    pub fn set_user_password(
        &mut self,
        user_id: i64,
        credential: Credential,
        actor_id: Option<i64>,
    ) -> Result<(), StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        let changed = tx.execute(
            "UPDATE users SET password_digest = ?2, password_salt = ?3, updated_at_ms = ?4 WHERE id = ?1",
            params![user_id, credential.digest, credential.salt, now_ms],
        )?;
        if changed == 0 {
            return Err(StoreError::UnknownUser);
        }

        insert_event_tx(
            &tx,
            now_ms,
            actor_id,
            Some(format!("user:{user_id}")),
            "user_password_changed",
            json!({}),
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Removal revokes every grant held by the user in the same transaction.
    /// A user who still owns projects cannot be removed; ownership must be
    /// handed off or the projects deleted first.
    pub fn remove_user(&mut self, user_id: i64, actor_id: i64) -> Result<(), StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        let exists = tx
            .query_row("SELECT 1 FROM users WHERE id = ?1", params![user_id], |_| {
                Ok(())
            })
            .optional()?
            .is_some();
        if !exists {
            return Err(StoreError::UnknownUser);
        }

        let owned: i64 = tx.query_row(
            "SELECT COUNT(1) FROM projects WHERE owner_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        if owned > 0 {
            return Err(StoreError::UserOwnsProjects);
        }

        super::grants::revoke_all_for_user_tx(&tx, user_id)?;
        tx.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;

        insert_event_tx(
            &tx,
            now_ms,
            Some(actor_id),
            Some(format!("user:{user_id}")),
            "user_removed",
            json!({}),
        )?;
        tx.commit()?;
        Ok(())
    }
}

type UserTuple = (i64, String, String, String, i64);

fn user_tuple(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserTuple> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn user_from_tuple(tuple: UserTuple) -> Result<User, StoreError> {
    let (id, first_name, last_name, email, role_id) = tuple;
    let Some(role) = Role::from_id(role_id) else {
        return Err(StoreError::InvalidInput("invalid user row"));
    };
    Ok(User {
        id,
        first_name,
        last_name,
        email,
        role,
    })
}
