//! Rust structs mapping to database tables.
//!
//! Each model implements `from_row` for constructing itself from a
//! `rusqlite::Row`.

use chrono::{DateTime, SecondsFormat, Utc};
use hr_core::{ItemId, UserId};
use rusqlite::types::Type;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

/// Separator used when genres are aggregated into a single column.
pub(crate) const GENRE_SEPARATOR: char = '\u{1f}';

/// Fixed-width UTC timestamp, so text comparison in SQL matches time order.
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

/// Parse a UUID-based ID from a text column.
fn parse_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    let uuid = Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e))?;
    Ok(T::from(uuid))
}

fn parse_timestamp(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn parse_opt_timestamp(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(_) => parse_timestamp(row, idx).map(Some),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub created_at: String,
}

impl User {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            name: row.get(1)?,
            created_at: row.get(2)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// A library item as seen by one user.
///
/// `favorited_at` and `played` come from that user's favorites and playback
/// rows and are `None` / `false` when the item is read without a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub item_kind: String,
    pub name: String,
    pub year: Option<i32>,
    pub date_added: DateTime<Utc>,
    pub genres: Vec<String>,
    pub favorited_at: Option<DateTime<Utc>>,
    pub played: bool,
}

impl Item {
    /// Build from a row selected as:
    /// id, item_kind, name, year, date_added, genres (aggregated),
    /// favorited_at, played
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        let genres: Option<String> = row.get(5)?;
        let mut genres: Vec<String> = genres
            .map(|g| g.split(GENRE_SEPARATOR).map(String::from).collect())
            .unwrap_or_default();
        genres.sort_by_key(|g| g.to_lowercase());

        Ok(Self {
            id: parse_id(row, 0)?,
            item_kind: row.get(1)?,
            name: row.get(2)?,
            year: row.get(3)?,
            date_added: parse_timestamp(row, 4)?,
            genres,
            favorited_at: parse_opt_timestamp(row, 6)?,
            played: row.get::<_, i32>(7)? != 0,
        })
    }

    pub fn is_favorite(&self) -> bool {
        self.favorited_at.is_some()
    }
}

// ---------------------------------------------------------------------------
// Favorite
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Favorite {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub created_at: String,
}

impl Favorite {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: parse_id(row, 0)?,
            item_id: parse_id(row, 1)?,
            created_at: row.get(2)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Playback
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Playback {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub completed: bool,
    pub play_count: i32,
    pub last_played_at: Option<String>,
}

impl Playback {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: parse_id(row, 0)?,
            item_id: parse_id(row, 1)?,
            completed: row.get::<_, i32>(2)? != 0,
            play_count: row.get(3)?,
            last_played_at: row.get(4)?,
        })
    }
}
