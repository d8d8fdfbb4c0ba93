use rusqlite::{Connection, OptionalExtension, params};

use super::Database;
use super::database::{new_id, now_rfc3339};
use crate::types::{AgriError, ProfileUpdate, Result, User};

const USER_COLUMNS: &str =
    "id, username, role, full_name, email, phone, location, company, avatar_url, created_at";

pub struct UserStore<'a> {
    db: &'a Database,
}

impl<'a> UserStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a new account. A taken username is a `Conflict`.
    pub fn create(
        &self,
        username: &str,
        password_hash: &str,
        full_name: Option<&str>,
    ) -> Result<User> {
        let user = User {
            id: new_id(),
            username: username.trim().to_string(),
            role: "farmer".to_string(),
            full_name: full_name.map(str::to_string),
            email: None,
            phone: None,
            location: None,
            company: None,
            avatar_url: None,
            created_at: now_rfc3339(),
        };

        let result = self.db.execute(
            "INSERT INTO users (id, username, password_hash, role, full_name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            &[
                &user.id,
                &user.username,
                &password_hash,
                &user.role,
                &user.full_name,
                &user.created_at,
            ],
        );

        match result {
            Ok(_) => Ok(user),
            Err(AgriError::Storage(msg)) if msg.contains("UNIQUE") => Err(AgriError::Conflict(
                "Пользователь с таким именем уже существует".to_string(),
            )),
            Err(e) => Err(e),
        }
    }

    pub fn get(&self, id: &str) -> Result<Option<User>> {
        let conn = self.db.connection()?;
        Self::get_with(&conn, id)
    }

    /// Account plus stored bcrypt hash, for login.
    pub fn find_credentials(&self, username: &str) -> Result<Option<(User, String)>> {
        let conn = self.db.connection()?;
        let sql = format!(
            "SELECT {}, password_hash FROM users WHERE username = ?1",
            USER_COLUMNS
        );
        let found = conn
            .query_row(&sql, params![username.trim()], |row| {
                Ok((Self::row_to_user(row)?, row.get::<_, String>(10)?))
            })
            .optional()?;
        Ok(found)
    }

    /// Apply the provided profile fields; absent fields are left unchanged.
    pub fn update_profile(&self, id: &str, update: &ProfileUpdate) -> Result<Option<User>> {
        let conn = self.db.connection()?;
        let changed = conn.execute(
            "UPDATE users SET
                full_name = COALESCE(?2, full_name),
                email = COALESCE(?3, email),
                phone = COALESCE(?4, phone),
                location = COALESCE(?5, location),
                company = COALESCE(?6, company),
                avatar_url = COALESCE(?7, avatar_url)
             WHERE id = ?1",
            params![
                id,
                update.full_name,
                update.email,
                update.phone,
                update.location,
                update.company,
                update.avatar_url,
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get_with(&conn, id)
    }

    fn get_with(conn: &Connection, id: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
        Ok(conn
            .query_row(&sql, params![id], Self::row_to_user)
            .optional()?)
    }

    fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            role: row.get(2)?,
            full_name: row.get(3)?,
            email: row.get(4)?,
            phone: row.get(5)?,
            location: row.get(6)?,
            company: row.get(7)?,
            avatar_url: row.get(8)?,
            created_at: row.get(9)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Database {
        let db = Database::open_in_memory().expect("Failed to open database");
        db.initialize().expect("Failed to initialize");
        db
    }

    #[test]
    fn test_create_and_find() {
        let db = setup();
        let store = UserStore::new(&db);

        let user = store.create("farmer", "hash", Some("Айдар")).unwrap();
        assert_eq!(user.role, "farmer");

        let (found, hash) = store.find_credentials("farmer").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.full_name.as_deref(), Some("Айдар"));
        assert_eq!(hash, "hash");

        assert!(store.find_credentials("nobody").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username_conflict() {
        let db = setup();
        let store = UserStore::new(&db);
        store.create("farmer", "hash", None).unwrap();

        let err = store.create("farmer", "other", None).unwrap_err();
        assert!(matches!(err, AgriError::Conflict(_)));
    }

    #[test]
    fn test_update_profile_partial() {
        let db = setup();
        let store = UserStore::new(&db);
        let user = store.create("farmer", "hash", Some("Айдар")).unwrap();

        let updated = store
            .update_profile(
                &user.id,
                &ProfileUpdate {
                    email: Some("aidar@farm.kz".into()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.email.as_deref(), Some("aidar@farm.kz"));
        assert_eq!(updated.full_name.as_deref(), Some("Айдар"));

        assert!(
            store
                .update_profile("missing", &ProfileUpdate::default())
                .unwrap()
                .is_none()
        );
    }
}
