//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants and executed in order. A
//! `schema_migrations` table tracks which versions have been applied.

use hr_core::{Error, Result};
use rusqlite::Connection;

/// V1: users, items and per-item genre tags.
const V1_LIBRARY: &str = r#"
CREATE TABLE users (
    id         TEXT PRIMARY KEY,
    name       TEXT UNIQUE NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE items (
    id         TEXT PRIMARY KEY,
    item_kind  TEXT NOT NULL,
    name       TEXT NOT NULL,
    year       INTEGER,
    date_added TEXT NOT NULL
);

CREATE TABLE item_genres (
    item_id TEXT NOT NULL REFERENCES items(id) ON DELETE CASCADE,
    genre   TEXT NOT NULL COLLATE NOCASE,
    PRIMARY KEY (item_id, genre)
);

CREATE INDEX idx_items_date_added ON items(date_added);
CREATE INDEX idx_items_kind ON items(item_kind);
CREATE INDEX idx_item_genres_genre ON item_genres(genre);
"#;

/// V2: per-user favorites and playback state.
const V2_USER_DATA: &str = r#"
CREATE TABLE favorites (
    user_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    item_id    TEXT NOT NULL REFERENCES items(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, item_id)
);

CREATE TABLE playback (
    user_id        TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    item_id        TEXT NOT NULL REFERENCES items(id) ON DELETE CASCADE,
    completed      INTEGER NOT NULL DEFAULT 0,
    play_count     INTEGER NOT NULL DEFAULT 0,
    last_played_at TEXT,
    PRIMARY KEY (user_id, item_id)
);

CREATE INDEX idx_favorites_user_created ON favorites(user_id, created_at);
"#;

const MIGRATIONS: &[(i64, &str)] = &[(1, V1_LIBRARY), (2, V2_USER_DATA)];

/// Run all pending migrations on `conn`.
///
/// Creates the `schema_migrations` tracking table if it does not exist,
/// then applies each outstanding migration inside a transaction.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| Error::database(format!("Failed to create schema_migrations: {e}")))?;

    for &(version, sql) in MIGRATIONS {
        let already: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(e.to_string()))?;

        if already {
            continue;
        }

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        tx.execute_batch(sql)
            .map_err(|e| Error::database(format!("Migration V{version} failed: {e}")))?;

        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| Error::database(e.to_string()))?;

        tx.commit().map_err(|e| Error::database(e.to_string()))?;
        tracing::debug!("Applied migration V{version}");
    }

    Ok(())
}
