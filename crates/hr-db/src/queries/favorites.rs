//! Favorite operations.

use chrono::{DateTime, Utc};
use hr_core::{Error, ItemId, Result, UserId};
use rusqlite::Connection;

use crate::models::{format_timestamp, Favorite};

const COLS: &str = "user_id, item_id, created_at";

/// Add an item to a user's favorites. No-op if already favorited.
pub fn add_favorite(conn: &Connection, user_id: UserId, item_id: ItemId) -> Result<Favorite> {
    add_favorite_at(conn, user_id, item_id, Utc::now())
}

/// Add a favorite with an explicit timestamp. Importers and fixtures use
/// this to preserve the order in which items were favorited.
pub fn add_favorite_at(
    conn: &Connection,
    user_id: UserId,
    item_id: ItemId,
    at: DateTime<Utc>,
) -> Result<Favorite> {
    conn.execute(
        "INSERT OR IGNORE INTO favorites (user_id, item_id, created_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![user_id.to_string(), item_id.to_string(), format_timestamp(at)],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    get_favorite(conn, user_id, item_id)?
        .ok_or_else(|| Error::Internal(format!("favorite {item_id} missing after insert")))
}

/// Remove an item from a user's favorites. Returns true if removed.
pub fn remove_favorite(conn: &Connection, user_id: UserId, item_id: ItemId) -> Result<bool> {
    let n = conn
        .execute(
            "DELETE FROM favorites WHERE user_id = ?1 AND item_id = ?2",
            rusqlite::params![user_id.to_string(), item_id.to_string()],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Check if an item is in a user's favorites.
pub fn get_favorite(
    conn: &Connection,
    user_id: UserId,
    item_id: ItemId,
) -> Result<Option<Favorite>> {
    let q = format!("SELECT {COLS} FROM favorites WHERE user_id = ?1 AND item_id = ?2");
    let result = conn.query_row(
        &q,
        rusqlite::params![user_id.to_string(), item_id.to_string()],
        Favorite::from_row,
    );
    match result {
        Ok(f) => Ok(Some(f)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}
