//! Playback state operations.

use chrono::Utc;
use hr_core::{Error, ItemId, Result, UserId};
use rusqlite::Connection;

use crate::models::{format_timestamp, Playback};

const COLS: &str = "user_id, item_id, completed, play_count, last_played_at";

/// Mark an item as played through, bumping its play count.
pub fn mark_played(conn: &Connection, user_id: UserId, item_id: ItemId) -> Result<Playback> {
    let now = format_timestamp(Utc::now());
    conn.execute(
        "INSERT INTO playback (user_id, item_id, completed, play_count, last_played_at)
         VALUES (?1, ?2, 1, 1, ?3)
         ON CONFLICT(user_id, item_id) DO UPDATE SET
            completed = 1,
            play_count = play_count + 1,
            last_played_at = excluded.last_played_at",
        rusqlite::params![user_id.to_string(), item_id.to_string(), &now],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    get_playback(conn, user_id, item_id)?
        .ok_or_else(|| Error::Internal(format!("playback for {item_id} missing after upsert")))
}

/// Clear the played flag. Returns true if a playback row existed.
pub fn mark_unplayed(conn: &Connection, user_id: UserId, item_id: ItemId) -> Result<bool> {
    let n = conn
        .execute(
            "UPDATE playback SET completed = 0 WHERE user_id = ?1 AND item_id = ?2",
            rusqlite::params![user_id.to_string(), item_id.to_string()],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Get playback state for a (user, item) pair.
pub fn get_playback(
    conn: &Connection,
    user_id: UserId,
    item_id: ItemId,
) -> Result<Option<Playback>> {
    let q = format!("SELECT {COLS} FROM playback WHERE user_id = ?1 AND item_id = ?2");
    let result = conn.query_row(
        &q,
        rusqlite::params![user_id.to_string(), item_id.to_string()],
        Playback::from_row,
    );
    match result {
        Ok(p) => Ok(Some(p)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}
