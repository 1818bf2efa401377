//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB and a full
//! [`AppContext`], plus helpers for seeding users, items, favorites and
//! playback. The `with_server*` constructors start Axum on a random port for
//! HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::{Duration, Utc};
use hr_core::config::{Config, RowsConfig};
use hr_core::{ItemId, UserId};
use hr_db::queries::{favorites, items, playback, users};
use hr_db::{init_memory_pool, DbPool, PooledConnection};
use hr_server::context::AppContext;
use hr_server::router::build_router;

/// Items seeded without an explicit age are this many days old, outside
/// the default "recently added" window.
pub const OLD_ITEM_DAYS: i64 = 120;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
}

impl TestHarness {
    /// Create a new harness with default configuration and in-memory DB.
    pub fn new() -> Self {
        Self::build(Config::default(), None)
    }

    /// Create a harness whose rows config is `rows`.
    pub fn with_rows(rows: RowsConfig) -> Self {
        Self::build(
            Config {
                rows,
                ..Config::default()
            },
            None,
        )
    }

    /// Create a harness with a custom config and optional backing file.
    pub fn build(config: Config, config_path: Option<PathBuf>) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let ctx = AppContext::new(db.clone(), &config, config_path);
        Self { ctx, db }
    }

    /// Start an Axum server with default config on a random port.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::new().serve().await
    }

    /// Start an Axum server with the given rows config on a random port.
    pub async fn with_server_rows(rows: RowsConfig) -> (Self, SocketAddr) {
        Self::with_rows(rows).serve().await
    }

    /// Start serving this harness on a random port.
    pub async fn serve(self) -> (Self, SocketAddr) {
        let app = build_router(self.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (self, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> PooledConnection {
        hr_db::get_conn(&self.db).expect("failed to get db connection")
    }

    pub fn add_user(&self, name: &str) -> UserId {
        users::create_user(&self.conn(), name)
            .expect("failed to create user")
            .id
    }

    /// Add a movie added [`OLD_ITEM_DAYS`] ago.
    pub fn add_movie(&self, name: &str, genres: &[&str]) -> ItemId {
        self.add_item("movie", name, OLD_ITEM_DAYS, genres)
    }

    pub fn add_item(&self, kind: &str, name: &str, days_ago: i64, genres: &[&str]) -> ItemId {
        let added = Utc::now() - Duration::days(days_ago);
        items::create_item(&self.conn(), kind, name, Some(2000), added, genres)
            .expect("failed to create item")
            .id
    }

    /// Add `count` movies tagged `genre`, named `"<genre> NN"`.
    pub fn add_genre_movies(&self, genre: &str, count: usize) -> Vec<ItemId> {
        (0..count)
            .map(|i| self.add_movie(&format!("{genre} {i:02}"), &[genre]))
            .collect()
    }

    /// Favorite `item` for `user`, `minutes_ago` minutes in the past.
    pub fn favorite(&self, user: UserId, item: ItemId, minutes_ago: i64) {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        favorites::add_favorite_at(&self.conn(), user, item, at).expect("failed to favorite");
    }

    pub fn mark_played(&self, user: UserId, item: ItemId) {
        playback::mark_played(&self.conn(), user, item).expect("failed to mark played");
    }
}

/// Rows config with only the listed kinds switched on and no genres.
pub fn rows_only(
    my_list: bool,
    recently_added: bool,
    random_picks: bool,
    long_not_watched: bool,
    genres: &[&str],
) -> RowsConfig {
    RowsConfig {
        enable_my_list: my_list,
        enable_recently_added: recently_added,
        enable_random_picks: random_picks,
        enable_long_not_watched: long_not_watched,
        enable_genres: !genres.is_empty(),
        enabled_genres: genres.iter().map(|g| g.to_string()).collect(),
        ..RowsConfig::default()
    }
}

pub async fn get_json(url: &str) -> serde_json::Value {
    let resp = reqwest::get(url).await.expect("request failed");
    assert_eq!(resp.status(), 200, "GET {url}");
    resp.json().await.expect("invalid JSON body")
}

/// `Name` of every item in a JSON array of item DTOs.
pub fn item_names(items: &serde_json::Value) -> Vec<String> {
    items
        .as_array()
        .expect("items should be an array")
        .iter()
        .map(|i| i["Name"].as_str().unwrap_or_default().to_string())
        .collect()
}
