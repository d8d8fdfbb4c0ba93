use rusqlite::{Connection, OptionalExtension, params};

use super::Database;
use super::database::{new_id, now_rfc3339};
use crate::types::{
    Field, FieldUpdate, Livestock, LivestockStatus, LivestockUpdate, NewField, NewLivestock,
    ParseWithDefault, Result, log_filter_warn,
};

// =============================================================================
// Fields
// =============================================================================

const FIELD_COLUMNS: &str = "id, user_id, name, latitude, longitude, area, crop_type, created_at";

pub struct FieldStore<'a> {
    db: &'a Database,
}

impl<'a> FieldStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<Field>> {
        let conn = self.db.connection()?;
        let sql = format!(
            "SELECT {} FROM fields WHERE user_id = ?1 ORDER BY created_at",
            FIELD_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let fields = stmt
            .query_map(params![user_id], Self::row_to_field)?
            .filter_map(|r| log_filter_warn(r, "reading field"))
            .collect();
        Ok(fields)
    }

    pub fn get(&self, id: &str) -> Result<Option<Field>> {
        let conn = self.db.connection()?;
        Self::get_with(&conn, id)
    }

    pub fn create(&self, user_id: &str, new: &NewField) -> Result<Field> {
        let field = Field {
            id: new_id(),
            user_id: user_id.to_string(),
            name: new.name.trim().to_string(),
            latitude: new.latitude,
            longitude: new.longitude,
            area: new.area,
            crop_type: new.crop_type.trim().to_string(),
            created_at: now_rfc3339(),
        };

        self.db.execute(
            "INSERT INTO fields (id, user_id, name, latitude, longitude, area, crop_type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            &[
                &field.id,
                &field.user_id,
                &field.name,
                &field.latitude,
                &field.longitude,
                &field.area,
                &field.crop_type,
                &field.created_at,
            ],
        )?;

        Ok(field)
    }

    pub fn update(&self, id: &str, update: &FieldUpdate) -> Result<Option<Field>> {
        let conn = self.db.connection()?;
        let changed = conn.execute(
            "UPDATE fields SET
                name = COALESCE(?2, name),
                latitude = COALESCE(?3, latitude),
                longitude = COALESCE(?4, longitude),
                area = COALESCE(?5, area),
                crop_type = COALESCE(?6, crop_type)
             WHERE id = ?1",
            params![
                id,
                update.name.as_deref().map(str::trim),
                update.latitude,
                update.longitude,
                update.area,
                update.crop_type.as_deref().map(str::trim),
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get_with(&conn, id)
    }

    /// Delete a field and, by cascade, its fertilizer inventory.
    pub fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.db.execute("DELETE FROM fields WHERE id = ?1", &[&id])? > 0)
    }

    fn get_with(conn: &Connection, id: &str) -> Result<Option<Field>> {
        let sql = format!("SELECT {} FROM fields WHERE id = ?1", FIELD_COLUMNS);
        Ok(conn
            .query_row(&sql, params![id], Self::row_to_field)
            .optional()?)
    }

    fn row_to_field(row: &rusqlite::Row<'_>) -> rusqlite::Result<Field> {
        Ok(Field {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            latitude: row.get(3)?,
            longitude: row.get(4)?,
            area: row.get(5)?,
            crop_type: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

// =============================================================================
// Livestock
// =============================================================================

const LIVESTOCK_COLUMNS: &str = "id, user_id, type, count, status, created_at";

pub struct LivestockStore<'a> {
    db: &'a Database,
}

impl<'a> LivestockStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<Livestock>> {
        let conn = self.db.connection()?;
        let sql = format!(
            "SELECT {} FROM livestock WHERE user_id = ?1 ORDER BY created_at",
            LIVESTOCK_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let herds = stmt
            .query_map(params![user_id], Self::row_to_livestock)?
            .filter_map(|r| log_filter_warn(r, "reading livestock"))
            .collect();
        Ok(herds)
    }

    pub fn get(&self, id: &str) -> Result<Option<Livestock>> {
        let conn = self.db.connection()?;
        Self::get_with(&conn, id)
    }

    pub fn create(&self, user_id: &str, new: &NewLivestock) -> Result<Livestock> {
        let livestock = Livestock {
            id: new_id(),
            user_id: user_id.to_string(),
            kind: new.kind.trim().to_string(),
            count: new.count,
            status: new.status,
            created_at: now_rfc3339(),
        };

        self.db.execute(
            "INSERT INTO livestock (id, user_id, type, count, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            &[
                &livestock.id,
                &livestock.user_id,
                &livestock.kind,
                &livestock.count,
                &livestock.status.as_str(),
                &livestock.created_at,
            ],
        )?;

        Ok(livestock)
    }

    pub fn update(&self, id: &str, update: &LivestockUpdate) -> Result<Option<Livestock>> {
        let conn = self.db.connection()?;
        let changed = conn.execute(
            "UPDATE livestock SET
                type = COALESCE(?2, type),
                count = COALESCE(?3, count),
                status = COALESCE(?4, status)
             WHERE id = ?1",
            params![
                id,
                update.kind.as_deref().map(str::trim),
                update.count,
                update.status.map(|s| s.as_str()),
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get_with(&conn, id)
    }

    /// Overwrite the head-count only.
    pub fn set_count(&self, id: &str, count: i64) -> Result<()> {
        self.db.execute(
            "UPDATE livestock SET count = ?2 WHERE id = ?1",
            &[&id, &count],
        )?;
        Ok(())
    }

    /// Delete a livestock group and, by cascade, its feed inventory.
    pub fn delete(&self, id: &str) -> Result<bool> {
        Ok(self
            .db
            .execute("DELETE FROM livestock WHERE id = ?1", &[&id])?
            > 0)
    }

    fn get_with(conn: &Connection, id: &str) -> Result<Option<Livestock>> {
        let sql = format!("SELECT {} FROM livestock WHERE id = ?1", LIVESTOCK_COLUMNS);
        Ok(conn
            .query_row(&sql, params![id], Self::row_to_livestock)
            .optional()?)
    }

    fn row_to_livestock(row: &rusqlite::Row<'_>) -> rusqlite::Result<Livestock> {
        let status: String = row.get(4)?;
        Ok(Livestock {
            id: row.get(0)?,
            user_id: row.get(1)?,
            kind: row.get(2)?,
            count: row.get(3)?,
            status: LivestockStatus::parse_or_default(&status),
            created_at: row.get(5)?,
        })
    }
}
