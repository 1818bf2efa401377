//! [`SqliteLibrary`]: the engine's library and user directory over the pool.

use async_trait::async_trait;
use hr_core::{Error, Result, UserId};
use hr_engine::{ItemQuery, LibraryQuery, QueryPage, User, UserDirectory};
use tokio_util::sync::CancellationToken;

use crate::models::Item;
use crate::pool::{get_conn, DbPool};
use crate::queries;

/// Runs row queries against the SQLite library on tokio's blocking pool.
#[derive(Clone)]
pub struct SqliteLibrary {
    pool: DbPool,
}

impl SqliteLibrary {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl LibraryQuery for SqliteLibrary {
    type Record = Item;

    async fn query(
        &self,
        user: &User,
        query: &ItemQuery,
        cancel: &CancellationToken,
    ) -> Result<QueryPage<Item>> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled("item query".into()));
        }

        let pool = self.pool.clone();
        let user_id = user.id;
        let query = query.clone();
        let (items, total_count) = tokio::task::spawn_blocking(move || {
            let conn = get_conn(&pool)?;
            queries::items::query_items(&conn, user_id, &query)
        })
        .await
        .map_err(|e| Error::Internal(format!("spawn_blocking join error: {e}")))??;

        // The blocking call itself cannot be interrupted; drop its result.
        if cancel.is_cancelled() {
            return Err(Error::Cancelled("item query".into()));
        }

        Ok(QueryPage { items, total_count })
    }
}

#[async_trait]
impl UserDirectory for SqliteLibrary {
    async fn resolve(&self, user_id: &str) -> Result<Option<User>> {
        let Ok(id) = user_id.trim().parse::<UserId>() else {
            return Ok(None);
        };

        let pool = self.pool.clone();
        let user = tokio::task::spawn_blocking(move || {
            let conn = get_conn(&pool)?;
            queries::users::get_user_by_id(&conn, id)
        })
        .await
        .map_err(|e| Error::Internal(format!("spawn_blocking join error: {e}")))??;

        Ok(user.map(|u| User {
            id: u.id,
            name: u.name,
        }))
    }
}
