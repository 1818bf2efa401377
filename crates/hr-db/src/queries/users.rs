//! User operations.

use chrono::Utc;
use hr_core::{Error, Result, UserId};
use rusqlite::Connection;

use crate::models::{format_timestamp, User};

const COLS: &str = "id, name, created_at";

/// Create a new user and return it.
pub fn create_user(conn: &Connection, name: &str) -> Result<User> {
    let id = UserId::new();
    let created_at = format_timestamp(Utc::now());

    conn.execute(
        "INSERT INTO users (id, name, created_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![id.to_string(), name, created_at],
    )
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            Error::Validation(format!("User '{name}' already exists"))
        } else {
            Error::database(e.to_string())
        }
    })?;

    Ok(User {
        id,
        name: name.to_string(),
        created_at,
    })
}

/// Get a user by primary key.
pub fn get_user_by_id(conn: &Connection, id: UserId) -> Result<Option<User>> {
    let q = format!("SELECT {COLS} FROM users WHERE id = ?1");
    match conn.query_row(&q, [id.to_string()], User::from_row) {
        Ok(u) => Ok(Some(u)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Get a user by name.
pub fn get_user_by_name(conn: &Connection, name: &str) -> Result<Option<User>> {
    let q = format!("SELECT {COLS} FROM users WHERE name = ?1");
    match conn.query_row(&q, [name], User::from_row) {
        Ok(u) => Ok(Some(u)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all users ordered by name.
pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    let q = format!("SELECT {COLS} FROM users ORDER BY name ASC");
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], User::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    #[test]
    fn create_and_get() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let user = create_user(&conn, "alice").unwrap();

        let by_id = get_user_by_id(&conn, user.id).unwrap().unwrap();
        assert_eq!(by_id.name, "alice");
        let by_name = get_user_by_name(&conn, "alice").unwrap().unwrap();
        assert_eq!(by_name.id, user.id);

        assert!(get_user_by_id(&conn, UserId::new()).unwrap().is_none());
        assert!(get_user_by_name(&conn, "bob").unwrap().is_none());
    }

    #[test]
    fn duplicate_name_rejected() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        create_user(&conn, "alice").unwrap();
        let err = create_user(&conn, "alice").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn list_sorted() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        create_user(&conn, "zed").unwrap();
        create_user(&conn, "amy").unwrap();
        let names: Vec<String> = list_users(&conn).unwrap().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["amy", "zed"]);
    }
}
