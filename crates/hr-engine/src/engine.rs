//! The row-selection and pagination engine.
//!
//! [`RowEngine`] decides which rows exist for a user, in what order and with
//! which preview items, and serves paginated items for a single row. Both
//! operations are best effort: an unknown user, a failing query or an item
//! that cannot be presented shrinks the result instead of failing it.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use hr_core::config::RowsConfig;
use hr_core::{genre_row_id, ItemKind, Row, RowKind, RowPage};
use rand::seq::SliceRandom;
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;

use crate::library::{
    ItemFilter, ItemPresenter, ItemQuery, ItemSort, LibraryQuery, User, UserDirectory,
};

/// Parameters of a single-row page request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowItemsRequest {
    pub user_id: String,
    /// Row kind name, matched case-insensitively.
    pub row_kind: String,
    /// Required when `row_kind` is a genre row.
    pub genre: Option<String>,
    pub start_index: usize,
    pub limit: usize,
    /// Shuffle seed for random rows. When absent a seed derived from the
    /// user, the row and the current UTC date is used.
    pub seed: Option<u64>,
}

/// Largest shuffle seed handed to clients. Seeds stay within the integer
/// range a JavaScript number holds exactly, so they survive a round trip
/// through the web client unchanged.
pub const MAX_SHUFFLE_SEED: u64 = (1 << 53) - 1;

/// Builds home-page rows from the host's library.
pub struct RowEngine<L, U, P> {
    library: L,
    users: U,
    presenter: P,
}

impl<L, U, P> RowEngine<L, U, P>
where
    L: LibraryQuery,
    U: UserDirectory,
    P: ItemPresenter<Record = L::Record>,
{
    pub fn new(library: L, users: U, presenter: P) -> Self {
        Self {
            library,
            users,
            presenter,
        }
    }

    /// The library this engine queries.
    pub fn library(&self) -> &L {
        &self.library
    }

    /// List the rows for the landing page, in display order, capped at
    /// `config.max_rows`.
    ///
    /// Unknown users get an empty list. Rows whose query fails or matches
    /// nothing are left out.
    pub async fn list_rows(
        &self,
        user_id: &str,
        config: &RowsConfig,
        cancel: &CancellationToken,
    ) -> Vec<Row<P::Item>> {
        let Some(user) = self.resolve_user(user_id).await else {
            return Vec::new();
        };

        let now = Utc::now();
        let mut rows = Vec::new();

        for kind in RowKind::DECLARATION_ORDER {
            // Later rows cannot make the cut unless the order is shuffled.
            if !config.random_row_order && rows.len() >= config.max_rows {
                break;
            }
            if cancel.is_cancelled() {
                tracing::debug!(user = %user.id, "row listing cancelled");
                break;
            }

            match kind {
                RowKind::Genre => {
                    if config.enable_genres {
                        let genre_rows = self.genre_rows(&user, config, now, cancel).await;
                        rows.extend(genre_rows);
                    }
                }
                _ if is_enabled(kind, config) => {
                    if let Some(row) = self.build_row(&user, config, kind, None, now, cancel).await {
                        rows.push(row);
                    }
                }
                _ => {}
            }
        }

        if config.random_row_order {
            rows.shuffle(&mut rand::thread_rng());
        }
        rows.truncate(config.max_rows);

        tracing::debug!(user = %user.id, rows = rows.len(), "listed home rows");
        rows
    }

    /// Fetch one page of a single row.
    ///
    /// Unknown users, unknown row kinds and genre requests without a genre
    /// all yield an empty page with a total of zero.
    pub async fn get_row_items(
        &self,
        request: &RowItemsRequest,
        config: &RowsConfig,
        cancel: &CancellationToken,
    ) -> RowPage<P::Item> {
        let Some(user) = self.resolve_user(&request.user_id).await else {
            return RowPage::empty();
        };

        let Some(kind) = RowKind::parse(&request.row_kind) else {
            tracing::debug!(row_kind = %request.row_kind, "unknown row kind requested");
            return RowPage::empty();
        };

        let genre = if kind == RowKind::Genre {
            let Some(genre) = request
                .genre
                .as_deref()
                .map(str::trim)
                .filter(|g| !g.is_empty())
            else {
                tracing::debug!("genre row requested without a genre");
                return RowPage::empty();
            };
            if config.is_blacklisted(genre) {
                tracing::debug!(genre, "blacklisted genre requested");
                return RowPage::empty();
            }
            Some(genre)
        } else {
            None
        };

        let now = Utc::now();
        let seed = request
            .seed
            .unwrap_or_else(|| daily_seed(&user, &row_id(kind, genre), now.date_naive()));

        let cap = kind_cap(kind, config);
        let mut limit = request.limit.min(cap);
        if kind == RowKind::MyList {
            limit = limit.min(cap.saturating_sub(request.start_index));
        }

        let (filter, sort) = row_query(kind, genre, config, now, seed);
        let query = ItemQuery {
            filter,
            sort,
            offset: request.start_index,
            limit,
        };

        match self.library.query(&user, &query, cancel).await {
            Ok(page) => RowPage {
                items: self.present_all(&page.items, &user),
                total_count: capped_total(kind, page.total_count, config),
            },
            Err(e) => {
                tracing::warn!(kind = %kind, error = %e, "row page query failed");
                RowPage::empty()
            }
        }
    }

    async fn resolve_user(&self, user_id: &str) -> Option<User> {
        match self.users.resolve(user_id).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                tracing::debug!(user_id, "unknown user; no rows");
                None
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "user lookup failed; no rows");
                None
            }
        }
    }

    async fn genre_rows(
        &self,
        user: &User,
        config: &RowsConfig,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Vec<Row<P::Item>> {
        let mut seen = HashSet::new();
        let mut rows = Vec::new();

        for genre in &config.enabled_genres {
            let genre = genre.trim();
            if genre.is_empty() {
                continue;
            }
            let id = genre_row_id(genre);
            if !seen.insert(id.clone()) {
                tracing::debug!(genre, row_id = %id, "skipping genre whose row id is already taken");
                continue;
            }
            if config.is_blacklisted(genre) {
                tracing::debug!(genre, "skipping blacklisted genre");
                continue;
            }
            if cancel.is_cancelled() {
                break;
            }
            if let Some(row) = self
                .build_row(user, config, RowKind::Genre, Some(genre), now, cancel)
                .await
            {
                rows.push(row);
            }
        }

        rows
    }

    /// Run the preview query for one row and turn it into a [`Row`].
    ///
    /// Returns `None` when the row should not be shown.
    async fn build_row(
        &self,
        user: &User,
        config: &RowsConfig,
        kind: RowKind,
        genre: Option<&str>,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Option<Row<P::Item>> {
        let seed = kind
            .is_random()
            .then(|| rand::random::<u64>() & MAX_SHUFFLE_SEED);
        let (filter, sort) = row_query(kind, genre, config, now, seed.unwrap_or_default());
        let query = ItemQuery {
            filter,
            sort,
            offset: 0,
            limit: config.preview_size.min(kind_cap(kind, config)),
        };

        let page = match self.library.query(user, &query, cancel).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(kind = %kind, genre, error = %e, "row query failed; omitting row");
                return None;
            }
        };

        let total = capped_total(kind, page.total_count, config);
        if total == 0 {
            tracing::debug!(kind = %kind, genre, "row has no items");
            return None;
        }
        if kind == RowKind::Genre && total < config.min_genre_items {
            tracing::debug!(
                genre,
                total,
                min = config.min_genre_items,
                "genre below minimum item count"
            );
            return None;
        }

        let title = match genre {
            Some(g) => config.genre_title(g),
            None => kind.default_title().to_string(),
        };

        Some(Row {
            id: row_id(kind, genre),
            title,
            kind,
            genre: genre.map(String::from),
            total_item_count: total,
            preview_items: self.present_all(&page.items, user),
            shuffle_seed: seed,
        })
    }

    /// Present every record, dropping the ones the presenter rejects.
    fn present_all(&self, records: &[L::Record], user: &User) -> Vec<P::Item> {
        records
            .iter()
            .filter_map(|record| match self.presenter.present(record, user) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::debug!(error = %e, "dropping item that failed to present");
                    None
                }
            })
            .collect()
    }
}

fn is_enabled(kind: RowKind, config: &RowsConfig) -> bool {
    match kind {
        RowKind::MyList => config.enable_my_list,
        RowKind::RecentlyAdded => config.enable_recently_added,
        RowKind::RandomPicks => config.enable_random_picks,
        RowKind::LongNotWatched => config.enable_long_not_watched,
        RowKind::Genre => config.enable_genres,
    }
}

fn row_id(kind: RowKind, genre: Option<&str>) -> String {
    match genre {
        Some(g) if kind == RowKind::Genre => genre_row_id(g),
        _ => kind.slug().to_string(),
    }
}

/// Largest page the library is ever asked for, per row kind.
fn kind_cap(kind: RowKind, config: &RowsConfig) -> usize {
    match kind {
        RowKind::MyList => config.my_list_limit,
        _ => config.max_items_per_row,
    }
}

fn capped_total(kind: RowKind, total: usize, config: &RowsConfig) -> usize {
    match kind {
        RowKind::MyList => total.min(config.my_list_limit),
        _ => total,
    }
}

/// Filter and ordering for each row kind.
fn row_query(
    kind: RowKind,
    genre: Option<&str>,
    config: &RowsConfig,
    now: DateTime<Utc>,
    seed: u64,
) -> (ItemFilter, ItemSort) {
    match kind {
        RowKind::MyList => (
            ItemFilter {
                favorites_only: true,
                ..ItemFilter::default()
            },
            ItemSort::FavoritedDesc,
        ),
        RowKind::RecentlyAdded => (
            ItemFilter {
                added_after: Some(
                    now.checked_sub_signed(Duration::days(i64::from(config.recently_added_days)))
                        .unwrap_or(DateTime::<Utc>::MIN_UTC),
                ),
                ..ItemFilter::default()
            },
            ItemSort::DateAddedDesc,
        ),
        RowKind::RandomPicks => (ItemFilter::default(), ItemSort::Random { seed }),
        RowKind::Genre => (
            ItemFilter {
                genre: genre.map(String::from),
                item_kinds: vec![ItemKind::Movie, ItemKind::Series],
                ..ItemFilter::default()
            },
            ItemSort::Random { seed },
        ),
        RowKind::LongNotWatched => (
            ItemFilter {
                added_before: Some(
                    now.checked_sub_months(Months::new(config.long_not_watched_months))
                        .unwrap_or(DateTime::<Utc>::MIN_UTC),
                ),
                unplayed_only: true,
                ..ItemFilter::default()
            },
            ItemSort::DateAddedAsc,
        ),
    }
}

/// Seed that keeps a random row's order fixed for a user for one UTC day.
///
/// Derived from a SHA-256 digest so the value does not change across
/// toolchain upgrades.
fn daily_seed(user: &User, row_id: &str, day: NaiveDate) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(user.id.as_uuid().as_bytes());
    hasher.update(row_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(day.format("%Y-%m-%d").to_string().as_bytes());
    let digest = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head) & MAX_SHUFFLE_SEED
}
