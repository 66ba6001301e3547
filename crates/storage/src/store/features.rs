use super::events::insert_event_tx;
use super::{
    CreateFeatureRequest, SqliteStore, StoreError, UpdateFeatureRequest, map_insert_conflict,
    now_ms,
};
use rusqlite::{OptionalExtension, params};
use sb_core::model::{Feature, FeatureStatus, PercentDone};
use serde_json::json;

impl SqliteStore {
    pub fn create_feature(&mut self, request: CreateFeatureRequest) -> Result<Feature, StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM categories WHERE id = ?1",
                params![request.category_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Err(StoreError::UnknownCategory);
        }

        let insert = tx.execute(
            "INSERT INTO features(category_id, short_name, short_name_canon, name, percent_done, status, estimated_end_date, created_at_ms, updated_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                request.category_id,
                request.short_name.as_str(),
                request.short_name.canonical(),
                request.name,
                i64::from(request.percent_done.value()),
                request.status.as_str(),
                request.estimated_end_date,
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
            Some(format!("feature:{id}")),
            "feature_created",
            json!({
                "category_id": request.category_id,
                "short_name": request.short_name.canonical(),
            }),
        )?;
        tx.commit()?;

        Ok(Feature {
            id,
            category_id: request.category_id,
            short_name: request.short_name.as_str().to_string(),
            name: request.name,
            percent_done: request.percent_done,
            status: request.status,
            estimated_end_date: request.estimated_end_date,
        })
    }

    pub fn update_feature(&mut self, request: UpdateFeatureRequest) -> Result<Feature, StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        let category_id: Option<i64> = tx
            .query_row(
                "SELECT category_id FROM features WHERE id = ?1",
                params![request.id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(category_id) = category_id else {
            return Err(StoreError::UnknownFeature);
        };

        let update = tx.execute(
            "UPDATE features SET short_name = ?2, short_name_canon = ?3, name = ?4, percent_done = ?5, status = ?6, estimated_end_date = ?7, updated_at_ms = ?8 \
             WHERE id = ?1",
            params![
                request.id,
                request.short_name.as_str(),
                request.short_name.canonical(),
                request.name,
                i64::from(request.percent_done.value()),
                request.status.as_str(),
                request.estimated_end_date,
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
            Some(format!("feature:{}", request.id)),
            "feature_updated",
            json!({ "short_name": request.short_name.canonical() }),
        )?;
        tx.commit()?;

        Ok(Feature {
            id: request.id,
            category_id,
            short_name: request.short_name.as_str().to_string(),
            name: request.name,
            percent_done: request.percent_done,
            status: request.status,
            estimated_end_date: request.estimated_end_date,
        })
    }

    pub fn delete_feature(&mut self, feature_id: i64, actor_id: i64) -> Result<(), StoreError> {
        let now_ms = now_ms();
        let tx = self.transaction()?;

        let deleted = tx.execute("DELETE FROM features WHERE id = ?1", params![feature_id])?;
        if deleted == 0 {
            return Err(StoreError::UnknownFeature);
        }

        insert_event_tx(
            &tx,
            now_ms,
            Some(actor_id),
            Some(format!("feature:{feature_id}")),
            "feature_deleted",
            json!({}),
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn get_feature(&self, id: i64) -> Result<Option<Feature>, StoreError> {
        let row = self
            .conn()
            .query_row(
                "SELECT id, category_id, short_name, name, percent_done, status, estimated_end_date \
                 FROM features WHERE id = ?1",
                params![id],
                feature_tuple,
            )
            .optional()?;
        row.map(feature_from_tuple).transpose()
    }

    /// Insertion order within the parent category.
    pub fn list_features(&self, category_id: i64) -> Result<Vec<Feature>, StoreError> {
        let mut stmt = self.conn().prepare(
            "SELECT id, category_id, short_name, name, percent_done, status, estimated_end_date \
             FROM features WHERE category_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![category_id], feature_tuple)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(feature_from_tuple(row?)?);
        }
        Ok(out)
    }
}

type FeatureTuple = (i64, i64, String, String, i64, String, Option<String>);

fn feature_tuple(row: &rusqlite::Row<'_>) -> rusqlite::Result<FeatureTuple> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn feature_from_tuple(tuple: FeatureTuple) -> Result<Feature, StoreError> {
    let (id, category_id, short_name, name, percent, status, estimated_end_date) = tuple;
    let Ok(percent_done) = PercentDone::try_new(percent) else {
        return Err(StoreError::InvalidInput("invalid feature row"));
    };
    let Some(status) = FeatureStatus::parse(&status) else {
        return Err(StoreError::InvalidInput("invalid feature row"));
    };
    Ok(Feature {
        id,
        category_id,
        short_name,
        name,
        percent_done,
        status,
        estimated_end_date,
    })
}
