//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! server settings plus the [`RowsConfig`] that drives the row engine. Every
//! section defaults sensibly so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::rows::genre_row_id;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub rows: RowsConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Read and parse a config file, failing on any I/O or parse error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        warnings.extend(self.rows.validate());
        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8096,
            db_path: PathBuf::from("/data/library.db"),
        }
    }
}

/// Settings that decide which rows exist and how many items they carry.
///
/// Read once at the start of each request and never mutated while that
/// request is being served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowsConfig {
    /// Cap on the number of rows returned from the summary call.
    pub max_rows: usize,
    pub min_items_per_row: usize,
    pub max_items_per_row: usize,

    pub enable_my_list: bool,
    pub enable_recently_added: bool,
    pub enable_random_picks: bool,
    pub enable_long_not_watched: bool,
    pub enable_genres: bool,

    /// Genres that get a row, in display order.
    pub enabled_genres: Vec<String>,
    /// Genres that never get a row. Compared case-insensitively.
    pub blacklisted_genres: BTreeSet<String>,
    /// Optional display names keyed by genre.
    pub genre_titles: BTreeMap<String, String>,

    pub recently_added_days: u32,
    pub long_not_watched_months: u32,
    /// A genre row is suppressed unless at least this many items match.
    pub min_genre_items: usize,
    /// Hard cap on My List pagination.
    pub my_list_limit: usize,
    /// Shuffle the row order before capping to `max_rows`.
    pub random_row_order: bool,
    /// Number of items sampled per row on the summary call.
    pub preview_size: usize,
}

impl Default for RowsConfig {
    fn default() -> Self {
        Self {
            max_rows: 10,
            min_items_per_row: 1,
            max_items_per_row: 50,
            enable_my_list: true,
            enable_recently_added: true,
            enable_random_picks: true,
            enable_long_not_watched: true,
            enable_genres: true,
            enabled_genres: ["Action", "Comedy", "Drama", "Science Fiction", "Animation"]
                .into_iter()
                .map(String::from)
                .collect(),
            blacklisted_genres: BTreeSet::new(),
            genre_titles: BTreeMap::new(),
            recently_added_days: 30,
            long_not_watched_months: 6,
            min_genre_items: 5,
            my_list_limit: 100,
            random_row_order: false,
            preview_size: 6,
        }
    }
}

impl RowsConfig {
    /// Whether `genre` is on the blacklist, ignoring case.
    pub fn is_blacklisted(&self, genre: &str) -> bool {
        let genre = genre.trim();
        self.blacklisted_genres
            .iter()
            .any(|b| b.trim().eq_ignore_ascii_case(genre))
    }

    /// Display title for a genre row.
    pub fn genre_title(&self, genre: &str) -> String {
        self.genre_titles
            .get(genre)
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| genre.to_string())
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.max_rows == 0 {
            warnings.push("rows.max_rows is 0; the home page will always be empty".into());
        }
        if self.max_items_per_row == 0 {
            warnings.push("rows.max_items_per_row is 0; rows will have no items".into());
        }
        if self.min_items_per_row > self.max_items_per_row {
            warnings.push(format!(
                "rows.min_items_per_row ({}) exceeds rows.max_items_per_row ({}); the maximum wins",
                self.min_items_per_row, self.max_items_per_row
            ));
        }
        if self.enable_my_list && self.my_list_limit == 0 {
            warnings.push("rows.my_list_limit is 0 but My List is enabled".into());
        }

        let mut seen: HashMap<String, &str> = HashMap::new();
        for genre in &self.enabled_genres {
            let name = genre.trim();
            if name.is_empty() {
                warnings.push("rows.enabled_genres contains an empty name".into());
                continue;
            }
            let id = genre_row_id(name);
            match seen.get(id.as_str()).copied() {
                Some(first) if first == name => {
                    warnings.push(format!("rows.enabled_genres lists '{name}' more than once"));
                }
                Some(first) => {
                    warnings.push(format!(
                        "genre '{name}' shares row id '{id}' with '{first}'; only '{first}' will be shown"
                    ));
                }
                None => {
                    seen.insert(id, name);
                }
            }
            if self.is_blacklisted(genre) {
                warnings.push(format!(
                    "genre '{genre}' is both enabled and blacklisted; it will not be shown"
                ));
            }
        }

        let any_enabled = self.enable_my_list
            || self.enable_recently_added
            || self.enable_random_picks
            || self.enable_long_not_watched
            || (self.enable_genres && !self.enabled_genres.is_empty());
        if !any_enabled {
            warnings.push("every row kind is disabled".into());
        }

        warnings
    }
}
