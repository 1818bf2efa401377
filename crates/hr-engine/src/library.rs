//! Collaborator interfaces the row engine calls as black boxes.
//!
//! The host supplies a [`LibraryQuery`] (filtered, sorted, paginated access
//! to its catalog), a [`UserDirectory`] and an [`ItemPresenter`]. The value
//! types here describe a query in host-neutral terms.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hr_core::{ItemKind, Result, UserId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;

/// A user resolved by the [`UserDirectory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

/// Predicates applied by the library query layer. All set fields must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    /// Only items the user has favorited.
    pub favorites_only: bool,
    /// Only items added at or after this instant.
    pub added_after: Option<DateTime<Utc>>,
    /// Only items added at or before this instant.
    pub added_before: Option<DateTime<Utc>>,
    /// Only items tagged with this genre (case-insensitive).
    pub genre: Option<String>,
    /// Only these item kinds. Empty means any kind.
    pub item_kinds: Vec<ItemKind>,
    /// Only items the user has not played.
    pub unplayed_only: bool,
}

/// Result ordering requested from the library query layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSort {
    /// Most recently favorited first.
    FavoritedDesc,
    /// Newest additions first.
    DateAddedDesc,
    /// Oldest additions first.
    DateAddedAsc,
    /// A shuffle that is stable for a given seed, so consecutive pages of the
    /// same query never repeat or skip items.
    Random { seed: u64 },
}

/// One bounded query against the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    pub filter: ItemFilter,
    pub sort: ItemSort,
    pub offset: usize,
    pub limit: usize,
}

/// A page of query results plus the total number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage<R> {
    pub items: Vec<R>,
    pub total_count: usize,
}

/// Filtered, sorted, paginated access to the media catalog.
#[async_trait]
pub trait LibraryQuery: Send + Sync {
    /// The host's internal item record.
    type Record: Send + Sync;

    /// Run `query` in the context of `user`.
    ///
    /// Implementations should stop early and return
    /// [`hr_core::Error::Cancelled`] once `cancel` fires.
    async fn query(
        &self,
        user: &User,
        query: &ItemQuery,
        cancel: &CancellationToken,
    ) -> Result<QueryPage<Self::Record>>;
}

/// Resolves opaque user identifiers.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Return `Ok(None)` for identifiers that do not name a user.
    async fn resolve(&self, user_id: &str) -> Result<Option<User>>;
}

/// Converts internal records into the client-facing item representation.
pub trait ItemPresenter: Send + Sync {
    type Record;
    type Item: Send;

    fn present(&self, record: &Self::Record, user: &User) -> Result<Self::Item>;
}

/// Shuffle `items` in place with an order determined entirely by `seed`.
///
/// Query implementations use this for [`ItemSort::Random`] after loading the
/// filtered set in a deterministic base order.
pub fn shuffle_seeded<T>(items: &mut [T], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);
}
