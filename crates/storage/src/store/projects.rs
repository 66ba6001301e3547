use super::events::insert_event_tx;
use super::{
    CreateProjectRequest, SqliteStore, StoreError, UpdateProjectRequest, map_insert_conflict,
    now_ms,
};
use rusqlite::{OptionalExtension, params};
use sb_core::model::{Project, ProjectStatus, Role};
use serde_json::json;

impl SqliteStore {
    pub fn create_project(&mut self, request: CreateProjectRequest) -> Result<Project, StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        let owner_role: Option<i64> = tx
            .query_row(
                "SELECT role_id FROM users WHERE id = ?1",
                params![request.owner_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(owner_role) = owner_role else {
            return Err(StoreError::UnknownUser);
        };
        let eligible = Role::from_id(owner_role).is_some_and(Role::can_own_projects);
        if !eligible {
            return Err(StoreError::OwnerNotEligible);
        }

        let insert = tx.execute(
            "INSERT INTO projects(short_name, short_name_canon, name, description, status, owner_id, created_at_ms, updated_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                request.short_name.as_str(),
                request.short_name.canonical(),
                request.name,
                request.description,
                request.status.as_str(),
                request.owner_id,
                now_ms,
            ],
        );

        if let Err(err) = insert {
            return Err(map_insert_conflict(err, StoreError::DuplicateShortName));
        }

        let id = tx.last_insert_rowid();
        insert_event_tx(
            &tx,
            now_ms,
            Some(request.actor_id),
            Some(format!("project:{id}")),
            "project_created",
            json!({ "short_name": request.short_name.canonical() }),
        )?;
        tx.commit()?;

        Ok(Project {
            id,
            short_name: request.short_name.as_str().to_string(),
            name: request.name,
            description: request.description,
            status: request.status,
            owner_id: request.owner_id,
        })
    }

    /// Changing the short name re-checks global uniqueness; the record's own
    /// row never conflicts with itself under the UNIQUE constraint.
    pub fn update_project(&mut self, request: UpdateProjectRequest) -> Result<Project, StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        let owner_id: Option<i64> = tx
            .query_row(
                "SELECT owner_id FROM projects WHERE id = ?1",
                params![request.id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(owner_id) = owner_id else {
            return Err(StoreError::UnknownProject);
        };

        let update = tx.execute(
            "UPDATE projects SET short_name = ?2, short_name_canon = ?3, name = ?4, description = ?5, status = ?6, updated_at_ms = ?7 \
             WHERE id = ?1",
            params![
                request.id,
                request.short_name.as_str(),
                request.short_name.canonical(),
                request.name,
                request.description,
                request.status.as_str(),
                now_ms,
            ],
        );

        if let Err(err) = update {
            return Err(map_insert_conflict(err, StoreError::DuplicateShortName));
        }

        insert_event_tx(
            &tx,
            now_ms,
            Some(request.actor_id),
            Some(format!("project:{}", request.id)),
            "project_updated",
            json!({ "short_name": request.short_name.canonical() }),
        )?;
        tx.commit()?;

        Ok(Project {
            id: request.id,
            short_name: request.short_name.as_str().to_string(),
            name: request.name,
            description: request.description,
            status: request.status,
            owner_id,
        })
    }

    /// Removes the project, every descendant category and feature, and every
    /// grant referencing it, in one transaction. Readers never observe a
    /// partially deleted tree.
    pub fn delete_project(&mut self, project_id: i64, actor_id: i64) -> Result<(), StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM projects WHERE id = ?1",
                params![project_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Err(StoreError::UnknownProject);
        }

        tx.execute(
            "DELETE FROM features WHERE category_id IN (SELECT id FROM categories WHERE project_id = ?1)",
            params![project_id],
        )?;
        tx.execute(
            "DELETE FROM categories WHERE project_id = ?1",
            params![project_id],
        )?;
        super::grants::revoke_all_for_project_tx(&tx, project_id)?;
        tx.execute("DELETE FROM projects WHERE id = ?1", params![project_id])?;

        insert_event_tx(
            &tx,
            now_ms,
            Some(actor_id),
            Some(format!("project:{project_id}")),
            "project_deleted",
            json!({}),
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn get_project(&self, id: i64) -> Result<Option<Project>, StoreError> {
        let row = self
            .conn()
            .query_row(
                "SELECT id, short_name, name, description, status, owner_id FROM projects WHERE id = ?1",
                params![id],
                project_tuple,
            )
            .optional()?;
        row.map(project_from_tuple).transpose()
    }

    pub fn list_projects_owned_by(&self, user_id: i64) -> Result<Vec<Project>, StoreError> {
        let mut stmt = self.conn().prepare(
            "SELECT id, short_name, name, description, status, owner_id \
             FROM projects WHERE owner_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![user_id], project_tuple)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(project_from_tuple(row?)?);
        }
        Ok(out)
    }

    pub fn list_projects_granted_to(&self, user_id: i64) -> Result<Vec<Project>, StoreError> {
        let mut stmt = self.conn().prepare(
            "SELECT p.id, p.short_name, p.name, p.description, p.status, p.owner_id \
             FROM projects p JOIN grants g ON g.project_id = p.id \
             WHERE g.user_id = ?1 ORDER BY p.id ASC",
        )?;
        let rows = stmt.query_map(params![user_id], project_tuple)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(project_from_tuple(row?)?);
        }
        Ok(out)
    }
}

type ProjectTuple = (i64, String, String, String, String, i64);

fn project_tuple(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProjectTuple> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn project_from_tuple(tuple: ProjectTuple) -> Result<Project, StoreError> {
    let (id, short_name, name, description, status, owner_id) = tuple;
    let Some(status) = ProjectStatus::parse(&status) else {
        return Err(StoreError::InvalidInput("invalid project row"));
    };
    Ok(Project {
        id,
        short_name,
        name,
        description,
        status,
        owner_id,
    })
}
