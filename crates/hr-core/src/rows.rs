//! Row and item-kind domain types.
//!
//! Enums serialize in lowercase and implement `Display` manually so the
//! string forms used in URLs, SQL and JSON stay identical.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// RowKind
// ---------------------------------------------------------------------------

/// The kinds of home-page rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    MyList,
    RecentlyAdded,
    RandomPicks,
    LongNotWatched,
    Genre,
}

impl RowKind {
    /// Order in which row builders run on the summary call.
    pub const DECLARATION_ORDER: [RowKind; 5] = [
        RowKind::MyList,
        RowKind::RecentlyAdded,
        RowKind::RandomPicks,
        RowKind::Genre,
        RowKind::LongNotWatched,
    ];

    /// Parse a row kind leniently: case-insensitive, ignoring `-`, `_` and
    /// spaces, so `"mylist"`, `"MyList"` and `"my-list"` are all accepted.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "mylist" => Some(Self::MyList),
            "recentlyadded" => Some(Self::RecentlyAdded),
            "randompicks" => Some(Self::RandomPicks),
            "longnotwatched" => Some(Self::LongNotWatched),
            "genre" => Some(Self::Genre),
            _ => None,
        }
    }

    /// Stable row id for the non-genre kinds.
    ///
    /// Genre rows derive their id from the genre name via [`genre_row_id`].
    pub fn slug(&self) -> &'static str {
        match self {
            Self::MyList => "mylist",
            Self::RecentlyAdded => "recentlyadded",
            Self::RandomPicks => "randompicks",
            Self::LongNotWatched => "longnotwatched",
            Self::Genre => "genre",
        }
    }

    /// Default display title.
    pub fn default_title(&self) -> &'static str {
        match self {
            Self::MyList => "My List",
            Self::RecentlyAdded => "Recently Added",
            Self::RandomPicks => "Random Picks",
            Self::LongNotWatched => "Haven't Watched in a While",
            Self::Genre => "Genre",
        }
    }

    /// Whether this kind is presented in a shuffled order.
    pub fn is_random(&self) -> bool {
        matches!(self, Self::RandomPicks | Self::Genre)
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

// ---------------------------------------------------------------------------
// ItemKind
// ---------------------------------------------------------------------------

/// Library item kinds understood by the query layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Movie,
    Series,
    Season,
    Episode,
}

impl ItemKind {
    /// Parse the lowercase storage form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(Self::Movie),
            "series" => Some(Self::Series),
            "season" => Some(Self::Season),
            "episode" => Some(Self::Episode),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
            Self::Season => "season",
            Self::Episode => "episode",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Row / RowPage
// ---------------------------------------------------------------------------

/// One horizontal shelf on the home page, recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Row<I> {
    /// Stable slug, unique within one response (`"mylist"`, `"genre-action"`).
    pub id: String,
    pub title: String,
    pub kind: RowKind,
    /// Set only for [`RowKind::Genre`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// Total matches reported by the query, not the preview length.
    pub total_item_count: usize,
    pub preview_items: Vec<I>,
    /// Seed of the shuffled order, for random rows. Passing it back to the
    /// page call continues the same order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shuffle_seed: Option<u64>,
}

/// One page of a single row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowPage<I> {
    pub items: Vec<I>,
    pub total_count: usize,
}

impl<I> RowPage<I> {
    /// A page with no items and a total of zero.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }
}

/// Row id for a genre: `"genre-"` followed by a lowercase slug of the name.
///
/// Runs of non-alphanumeric characters collapse into a single `-`.
pub fn genre_row_id(genre: &str) -> String {
    let mut slug = String::with_capacity(genre.len());
    for c in genre.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    format!("genre-{slug}")
}
