//! In-memory collaborators for engine tests.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use hr_core::{Error, ItemKind, Result, UserId};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::library::{
    shuffle_seeded, ItemPresenter, ItemQuery, ItemSort, LibraryQuery, QueryPage, User,
    UserDirectory,
};

/// A catalog entry as the fake library stores it.
#[derive(Debug, Clone)]
pub struct FakeRecord {
    pub name: String,
    pub kind: ItemKind,
    pub genres: Vec<String>,
    pub date_added: DateTime<Utc>,
    pub favorited_at: Option<DateTime<Utc>>,
    pub played: bool,
}

impl FakeRecord {
    pub fn movie(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ItemKind::Movie,
            genres: Vec::new(),
            // Old enough to stay out of "recently added" by default.
            date_added: Utc::now() - Duration::days(120),
            favorited_at: None,
            played: true,
        }
    }

    pub fn kind(mut self, kind: ItemKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn genre(mut self, genre: &str) -> Self {
        self.genres.push(genre.to_string());
        self
    }

    pub fn added_days_ago(mut self, days: i64) -> Self {
        self.date_added = Utc::now() - Duration::days(days);
        self
    }

    pub fn favorite(mut self) -> Self {
        self.favorited_at = Some(self.date_added + Duration::seconds(1));
        self
    }

    pub fn unplayed(mut self) -> Self {
        self.played = false;
        self
    }
}

/// Library over a fixed list of records.
#[derive(Default)]
pub struct FakeLibrary {
    pub records: Vec<FakeRecord>,
    /// Queries filtering on one of these genres fail.
    pub failing_genres: HashSet<String>,
    /// Every query fails when set.
    pub fail_all: bool,
    /// Every query received, in order.
    pub seen: Mutex<Vec<ItemQuery>>,
}

impl FakeLibrary {
    pub fn new(records: Vec<FakeRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn fail_genre(mut self, genre: &str) -> Self {
        self.failing_genres.insert(genre.to_string());
        self
    }

    pub fn queries(&self) -> Vec<ItemQuery> {
        self.seen.lock().clone()
    }

    fn matches(record: &FakeRecord, query: &ItemQuery) -> bool {
        let f = &query.filter;
        if f.favorites_only && record.favorited_at.is_none() {
            return false;
        }
        if f.unplayed_only && record.played {
            return false;
        }
        if let Some(after) = f.added_after {
            if record.date_added < after {
                return false;
            }
        }
        if let Some(before) = f.added_before {
            if record.date_added > before {
                return false;
            }
        }
        if let Some(ref genre) = f.genre {
            if !record.genres.iter().any(|g| g.eq_ignore_ascii_case(genre)) {
                return false;
            }
        }
        f.item_kinds.is_empty() || f.item_kinds.contains(&record.kind)
    }
}

#[async_trait]
impl LibraryQuery for FakeLibrary {
    type Record = FakeRecord;

    async fn query(
        &self,
        _user: &User,
        query: &ItemQuery,
        cancel: &CancellationToken,
    ) -> Result<QueryPage<FakeRecord>> {
        self.seen.lock().push(query.clone());
        if cancel.is_cancelled() {
            return Err(Error::Cancelled("fake query".into()));
        }
        if self.fail_all {
            return Err(Error::database("library offline"));
        }
        if let Some(ref genre) = query.filter.genre {
            if self.failing_genres.contains(genre) {
                return Err(Error::database(format!("genre index for {genre} is corrupt")));
            }
        }

        let mut matched: Vec<FakeRecord> = self
            .records
            .iter()
            .filter(|r| Self::matches(r, query))
            .cloned()
            .collect();

        match query.sort {
            ItemSort::FavoritedDesc => matched.sort_by(|a, b| b.favorited_at.cmp(&a.favorited_at)),
            ItemSort::DateAddedDesc => matched.sort_by(|a, b| b.date_added.cmp(&a.date_added)),
            ItemSort::DateAddedAsc => matched.sort_by(|a, b| a.date_added.cmp(&b.date_added)),
            ItemSort::Random { seed } => {
                matched.sort_by(|a, b| a.name.cmp(&b.name));
                shuffle_seeded(&mut matched, seed);
            }
        }

        let total_count = matched.len();
        let items = matched
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();
        Ok(QueryPage { items, total_count })
    }
}

/// Directory that knows a single user.
pub struct FakeUsers {
    pub user: User,
}

impl FakeUsers {
    pub fn new() -> Self {
        Self {
            user: User {
                id: UserId::new(),
                name: "alice".into(),
            },
        }
    }

    pub fn id(&self) -> String {
        self.user.id.to_string()
    }
}

#[async_trait]
impl UserDirectory for FakeUsers {
    async fn resolve(&self, user_id: &str) -> Result<Option<User>> {
        Ok((user_id == self.user.id.to_string()).then(|| self.user.clone()))
    }
}

/// Presents a record as its name; names starting with `"broken"` fail.
pub struct NamePresenter;

impl ItemPresenter for NamePresenter {
    type Record = FakeRecord;
    type Item = String;

    fn present(&self, record: &FakeRecord, _user: &User) -> Result<String> {
        if record.name.starts_with("broken") {
            return Err(Error::Validation(format!("cannot present {}", record.name)));
        }
        Ok(record.name.clone())
    }
}

/// `count` movies tagged `genre`, named `"<genre> <n>"`.
pub fn genre_movies(genre: &str, count: usize) -> Vec<FakeRecord> {
    (0..count)
        .map(|i| FakeRecord::movie(format!("{genre} {i}")).genre(genre))
        .collect()
}
