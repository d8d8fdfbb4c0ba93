//! Feed and fertilizer inventories.
//!
//! Quantities and prices are stored as decimal text and returned verbatim;
//! normalization of bad values is the rebalancer's job, not the store's.

use rusqlite::{Connection, OptionalExtension, params};

use super::Database;
use super::database::{new_id, now_rfc3339};
use crate::constants::inventory::DEFAULT_UNIT;
use crate::types::{
    FeedItem, FertilizerItem, InventoryUpdate, NewInventoryItem, Result, log_filter_warn,
};

fn unit_or_default(unit: Option<&str>) -> String {
    unit.map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or(DEFAULT_UNIT)
        .to_string()
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

// =============================================================================
// Feeds
// =============================================================================

const FEED_COLUMNS: &str = "id, livestock_id, name, quantity, unit, price_per_unit, created_at";

pub struct FeedStore<'a> {
    db: &'a Database,
}

impl<'a> FeedStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn list_for_livestock(&self, livestock_id: &str) -> Result<Vec<FeedItem>> {
        let conn = self.db.connection()?;
        let sql = format!(
            "SELECT {} FROM feed_inventory WHERE livestock_id = ?1 ORDER BY created_at",
            FEED_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let feeds = stmt
            .query_map(params![livestock_id], Self::row_to_feed)?
            .filter_map(|r| log_filter_warn(r, "reading feed"))
            .collect();
        Ok(feeds)
    }

    pub fn get(&self, id: &str) -> Result<Option<FeedItem>> {
        let conn = self.db.connection()?;
        Self::get_with(&conn, id)
    }

    /// Owner of the livestock group the feed belongs to.
    pub fn owner_of(&self, id: &str) -> Result<Option<String>> {
        let conn = self.db.connection()?;
        Ok(conn
            .query_row(
                "SELECT l.user_id FROM feed_inventory f
                 JOIN livestock l ON l.id = f.livestock_id
                 WHERE f.id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn create(&self, livestock_id: &str, new: &NewInventoryItem) -> Result<FeedItem> {
        let feed = FeedItem {
            id: new_id(),
            livestock_id: livestock_id.to_string(),
            name: new.name.trim().to_string(),
            quantity: new.quantity.trim().to_string(),
            unit: unit_or_default(new.unit.as_deref()),
            price_per_unit: trimmed(new.price_per_unit.as_deref()),
            created_at: now_rfc3339(),
        };

        self.db.execute(
            "INSERT INTO feed_inventory (id, livestock_id, name, quantity, unit, price_per_unit, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            &[
                &feed.id,
                &feed.livestock_id,
                &feed.name,
                &feed.quantity,
                &feed.unit,
                &feed.price_per_unit,
                &feed.created_at,
            ],
        )?;

        Ok(feed)
    }

    pub fn update(&self, id: &str, update: &InventoryUpdate) -> Result<Option<FeedItem>> {
        let conn = self.db.connection()?;
        let changed = conn.execute(
            "UPDATE feed_inventory SET
                name = COALESCE(?2, name),
                quantity = COALESCE(?3, quantity),
                unit = COALESCE(?4, unit),
                price_per_unit = COALESCE(?5, price_per_unit)
             WHERE id = ?1",
            params![
                id,
                trimmed(update.name.as_deref()),
                trimmed(update.quantity.as_deref()),
                trimmed(update.unit.as_deref()).filter(|u| !u.is_empty()),
                trimmed(update.price_per_unit.as_deref()),
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get_with(&conn, id)
    }

    /// Overwrite the stored quantity text.
    pub fn set_quantity(&self, id: &str, quantity: &str) -> Result<()> {
        self.db.execute(
            "UPDATE feed_inventory SET quantity = ?2 WHERE id = ?1",
            &[&id, &quantity],
        )?;
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<bool> {
        Ok(self
            .db
            .execute("DELETE FROM feed_inventory WHERE id = ?1", &[&id])?
            > 0)
    }

    fn get_with(conn: &Connection, id: &str) -> Result<Option<FeedItem>> {
        let sql = format!("SELECT {} FROM feed_inventory WHERE id = ?1", FEED_COLUMNS);
        Ok(conn
            .query_row(&sql, params![id], Self::row_to_feed)
            .optional()?)
    }

    fn row_to_feed(row: &rusqlite::Row<'_>) -> rusqlite::Result<FeedItem> {
        Ok(FeedItem {
            id: row.get(0)?,
            livestock_id: row.get(1)?,
            name: row.get(2)?,
            quantity: row.get(3)?,
            unit: row.get(4)?,
            price_per_unit: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

// =============================================================================
// Fertilizers
// =============================================================================

const FERTILIZER_COLUMNS: &str =
    "id, field_id, name, quantity, unit, price_per_unit, application_date, created_at";

pub struct FertilizerStore<'a> {
    db: &'a Database,
}

impl<'a> FertilizerStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn list_for_field(&self, field_id: &str) -> Result<Vec<FertilizerItem>> {
        let conn = self.db.connection()?;
        let sql = format!(
            "SELECT {} FROM fertilizer_inventory WHERE field_id = ?1 ORDER BY created_at",
            FERTILIZER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params![field_id], Self::row_to_fertilizer)?
            .filter_map(|r| log_filter_warn(r, "reading fertilizer"))
            .collect();
        Ok(items)
    }

    pub fn get(&self, id: &str) -> Result<Option<FertilizerItem>> {
        let conn = self.db.connection()?;
        Self::get_with(&conn, id)
    }

    /// Owner of the field the fertilizer is planned for.
    pub fn owner_of(&self, id: &str) -> Result<Option<String>> {
        let conn = self.db.connection()?;
        Ok(conn
            .query_row(
                "SELECT fl.user_id FROM fertilizer_inventory f
                 JOIN fields fl ON fl.id = f.field_id
                 WHERE f.id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn create(&self, field_id: &str, new: &NewInventoryItem) -> Result<FertilizerItem> {
        let item = FertilizerItem {
            id: new_id(),
            field_id: field_id.to_string(),
            name: new.name.trim().to_string(),
            quantity: new.quantity.trim().to_string(),
            unit: unit_or_default(new.unit.as_deref()),
            price_per_unit: trimmed(new.price_per_unit.as_deref()),
            application_date: trimmed(new.application_date.as_deref()),
            created_at: now_rfc3339(),
        };

        self.db.execute(
            "INSERT INTO fertilizer_inventory
                (id, field_id, name, quantity, unit, price_per_unit, application_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            &[
                &item.id,
                &item.field_id,
                &item.name,
                &item.quantity,
                &item.unit,
                &item.price_per_unit,
                &item.application_date,
                &item.created_at,
            ],
        )?;

        Ok(item)
    }

    pub fn update(&self, id: &str, update: &InventoryUpdate) -> Result<Option<FertilizerItem>> {
        let conn = self.db.connection()?;
        let changed = conn.execute(
            "UPDATE fertilizer_inventory SET
                name = COALESCE(?2, name),
                quantity = COALESCE(?3, quantity),
                unit = COALESCE(?4, unit),
                price_per_unit = COALESCE(?5, price_per_unit),
                application_date = COALESCE(?6, application_date)
             WHERE id = ?1",
            params![
                id,
                trimmed(update.name.as_deref()),
                trimmed(update.quantity.as_deref()),
                trimmed(update.unit.as_deref()).filter(|u| !u.is_empty()),
                trimmed(update.price_per_unit.as_deref()),
                trimmed(update.application_date.as_deref()),
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get_with(&conn, id)
    }

    pub fn delete(&self, id: &str) -> Result<bool> {
        Ok(self
            .db
            .execute("DELETE FROM fertilizer_inventory WHERE id = ?1", &[&id])?
            > 0)
    }

    fn get_with(conn: &Connection, id: &str) -> Result<Option<FertilizerItem>> {
        let sql = format!(
            "SELECT {} FROM fertilizer_inventory WHERE id = ?1",
            FERTILIZER_COLUMNS
        );
        Ok(conn
            .query_row(&sql, params![id], Self::row_to_fertilizer)
            .optional()?)
    }

    fn row_to_fertilizer(row: &rusqlite::Row<'_>) -> rusqlite::Result<FertilizerItem> {
        Ok(FertilizerItem {
            id: row.get(0)?,
            field_id: row.get(1)?,
            name: row.get(2)?,
            quantity: row.get(3)?,
            unit: row.get(4)?,
            price_per_unit: row.get(5)?,
            application_date: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FieldStore, LivestockStore, UserStore};
    use crate::types::{LivestockStatus, NewField, NewLivestock};

    struct Fixture {
        db: Database,
        user_id: String,
        livestock_id: String,
        field_id: String,
    }

    fn setup() -> Fixture {
        let db = Database::open_in_memory().expect("Failed to open database");
        db.initialize().expect("Failed to initialize");
        let user = UserStore::new(&db).create("farmer", "hash", None).unwrap();
        let herd = LivestockStore::new(&db)
            .create(
                &user.id,
                &NewLivestock {
                    kind: "Овцы".into(),
                    count: 40,
                    status: LivestockStatus::Healthy,
                },
            )
            .unwrap();
        let field = FieldStore::new(&db)
            .create(
                &user.id,
                &NewField {
                    name: "Южное".into(),
                    latitude: 43.2,
                    longitude: 76.9,
                    area: 50.0,
                    crop_type: "Ячмень".into(),
                },
            )
            .unwrap();
        Fixture {
            db,
            user_id: user.id,
            livestock_id: herd.id,
            field_id: field.id,
        }
    }

    fn item(name: &str, quantity: &str) -> NewInventoryItem {
        NewInventoryItem {
            name: name.into(),
            quantity: quantity.into(),
            unit: None,
            price_per_unit: Some("120".into()),
            application_date: None,
        }
    }

    #[test]
    fn test_feed_defaults_and_owner() {
        let fx = setup();
        let store = FeedStore::new(&fx.db);

        let feed = store.create(&fx.livestock_id, &item("Сено", "500")).unwrap();
        assert_eq!(feed.unit, "кг");
        assert_eq!(
            store.owner_of(&feed.id).unwrap().as_deref(),
            Some(fx.user_id.as_str())
        );
        assert!(store.owner_of("missing").unwrap().is_none());
    }

    #[test]
    fn test_feed_update_and_quantity() {
        let fx = setup();
        let store = FeedStore::new(&fx.db);
        let feed = store.create(&fx.livestock_id, &item("Сено", "500")).unwrap();

        let updated = store
            .update(
                &feed.id,
                &InventoryUpdate {
                    unit: Some("т".into()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.unit, "т");
        assert_eq!(updated.quantity, "500");

        store.set_quantity(&feed.id, "250.00").unwrap();
        assert_eq!(store.get(&feed.id).unwrap().unwrap().quantity, "250.00");
    }

    #[test]
    fn test_cascade_delete() {
        let fx = setup();
        let feeds = FeedStore::new(&fx.db);
        let fertilizers = FertilizerStore::new(&fx.db);
        feeds.create(&fx.livestock_id, &item("Сено", "500")).unwrap();
        fertilizers
            .create(&fx.field_id, &item("Аммиачная селитра", "200"))
            .unwrap();

        LivestockStore::new(&fx.db).delete(&fx.livestock_id).unwrap();
        FieldStore::new(&fx.db).delete(&fx.field_id).unwrap();

        assert!(feeds.list_for_livestock(&fx.livestock_id).unwrap().is_empty());
        assert!(fertilizers.list_for_field(&fx.field_id).unwrap().is_empty());
    }

    #[test]
    fn test_fertilizer_crud() {
        let fx = setup();
        let store = FertilizerStore::new(&fx.db);

        let mut new = item("Аммиачная селитра", "200");
        new.application_date = Some("2025-04-10".into());
        let created = store.create(&fx.field_id, &new).unwrap();
        assert_eq!(created.application_date.as_deref(), Some("2025-04-10"));
        assert_eq!(
            store.owner_of(&created.id).unwrap().as_deref(),
            Some(fx.user_id.as_str())
        );

        let listed = store.list_for_field(&fx.field_id).unwrap();
        assert_eq!(listed.len(), 1);

        assert!(store.delete(&created.id).unwrap());
        assert!(store.get(&created.id).unwrap().is_none());
    }
}
