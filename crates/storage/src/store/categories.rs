use super::events::insert_event_tx;
use super::{
    CreateCategoryRequest, SqliteStore, StoreError, UpdateCategoryRequest, map_insert_conflict,
    now_ms,
};
use rusqlite::{OptionalExtension, params};
use sb_core::model::Category;
use sb_core::names::canonical;
use serde_json::json;

impl SqliteStore {
    pub fn create_category(
        &mut self,
        request: CreateCategoryRequest,
    ) -> Result<Category, StoreError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(StoreError::InvalidInput("category name must not be empty"));
        }

        let now_ms = now_ms();
        let tx = self.transaction()?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM projects WHERE id = ?1",
                params![request.project_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Err(StoreError::UnknownProject);
        }

        let insert = tx.execute(
            "INSERT INTO categories(project_id, name, name_canon, created_at_ms, updated_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![request.project_id, name, canonical(&name), now_ms],
        );

        if let Err(err) = insert {
            return Err(map_insert_conflict(err, StoreError::DuplicateName));
        }

        let id = tx.last_insert_rowid();
        insert_event_tx(
            &tx,
            now_ms,
            Some(request.actor_id),
            Some(format!("category:{id}")),
            "category_created",
            json!({ "project_id": request.project_id, "name": canonical(&name) }),
        )?;
        tx.commit()?;

        Ok(Category {
            id,
            project_id: request.project_id,
            name,
        })
    }

    pub fn update_category(
        &mut self,
        request: UpdateCategoryRequest,
    ) -> Result<Category, StoreError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(StoreError::InvalidInput("category name must not be empty"));
        }

        let now_ms = now_ms();
        let tx = self.transaction()?;

        let project_id: Option<i64> = tx
            .query_row(
                "SELECT project_id FROM categories WHERE id = ?1",
                params![request.id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(project_id) = project_id else {
            return Err(StoreError::UnknownCategory);
        };

        let update = tx.execute(
            "UPDATE categories SET name = ?2, name_canon = ?3, updated_at_ms = ?4 WHERE id = ?1",
            params![request.id, name, canonical(&name), now_ms],
        );

        if let Err(err) = update {
            return Err(map_insert_conflict(err, StoreError::DuplicateName));
        }

        insert_event_tx(
            &tx,
            now_ms,
            Some(request.actor_id),
            Some(format!("category:{}", request.id)),
            "category_updated",
            json!({ "name": canonical(&name) }),
        )?;
        tx.commit()?;

        Ok(Category {
            id: request.id,
            project_id,
            name,
        })
    }

    /// Deletes the category and its features together.
    pub fn delete_category(&mut self, category_id: i64, actor_id: i64) -> Result<(), StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM categories WHERE id = ?1",
                params![category_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Err(StoreError::UnknownCategory);
        }

        tx.execute(
            "DELETE FROM features WHERE category_id = ?1",
            params![category_id],
        )?;
        tx.execute("DELETE FROM categories WHERE id = ?1", params![category_id])?;

        insert_event_tx(
            &tx,
            now_ms,
            Some(actor_id),
            Some(format!("category:{category_id}")),
            "category_deleted",
            json!({}),
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn get_category(&self, id: i64) -> Result<Option<Category>, StoreError> {
        let row = self
            .conn()
            .query_row(
                "SELECT id, project_id, name FROM categories WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        project_id: row.get(1)?,
                        name: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Insertion order, so manual prioritization by creation time survives
    /// into the dashboard.
    pub fn list_categories(&self, project_id: i64) -> Result<Vec<Category>, StoreError> {
        let mut stmt = self.conn().prepare(
            "SELECT id, project_id, name FROM categories WHERE project_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(Category {
                id: row.get(0)?,
                project_id: row.get(1)?,
                name: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
