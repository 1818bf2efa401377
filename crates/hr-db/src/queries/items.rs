//! Item creation and the filtered, paginated item query behind every row.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use hr_core::{Error, ItemId, Result, UserId};
use hr_engine::{shuffle_seeded, ItemFilter, ItemQuery, ItemSort};
use rusqlite::types::ToSql;
use rusqlite::Connection;

use crate::models::{format_timestamp, Item};

/// Item columns plus the querying user's favorite and playback state.
/// `?1` is always the user id.
const SELECT_COLS: &str = "i.id, i.item_kind, i.name, i.year, i.date_added,
    (SELECT group_concat(g.genre, char(31)) FROM item_genres g WHERE g.item_id = i.id),
    f.created_at,
    COALESCE(p.completed, 0)";

const FROM_JOINED: &str = "FROM items i
    LEFT JOIN favorites f ON f.item_id = i.id AND f.user_id = ?1
    LEFT JOIN playback p ON p.item_id = i.id AND p.user_id = ?1";

type Params = Vec<Box<dyn ToSql>>;

fn as_refs(params: &Params) -> Vec<&dyn ToSql> {
    params.iter().map(|p| p.as_ref()).collect()
}

fn to_sql_count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Create an item tagged with `genres`.
pub fn create_item(
    conn: &Connection,
    item_kind: &str,
    name: &str,
    year: Option<i32>,
    date_added: DateTime<Utc>,
    genres: &[&str],
) -> Result<Item> {
    let id = ItemId::new();
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    tx.execute(
        "INSERT INTO items (id, item_kind, name, year, date_added) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            id.to_string(),
            item_kind,
            name,
            year,
            format_timestamp(date_added)
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    insert_genres(&tx, id, genres)?;
    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    let mut genres: Vec<String> = genres
        .iter()
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .map(String::from)
        .collect();
    genres.sort_by_key(|g| g.to_lowercase());
    genres.dedup_by(|a, b| a.eq_ignore_ascii_case(b));

    Ok(Item {
        id,
        item_kind: item_kind.to_string(),
        name: name.to_string(),
        year,
        date_added,
        genres,
        favorited_at: None,
        played: false,
    })
}

/// Replace an item's genre tags.
pub fn set_genres(conn: &Connection, item_id: ItemId, genres: &[&str]) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;
    tx.execute(
        "DELETE FROM item_genres WHERE item_id = ?1",
        [item_id.to_string()],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    insert_genres(&tx, item_id, genres)?;
    tx.commit().map_err(|e| Error::database(e.to_string()))
}

fn insert_genres(conn: &Connection, item_id: ItemId, genres: &[&str]) -> Result<()> {
    for genre in genres.iter().map(|g| g.trim()).filter(|g| !g.is_empty()) {
        conn.execute(
            "INSERT OR IGNORE INTO item_genres (item_id, genre) VALUES (?1, ?2)",
            rusqlite::params![item_id.to_string(), genre],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    }
    Ok(())
}

/// Get an item by ID, without any user's state.
pub fn get_item(conn: &Connection, id: ItemId) -> Result<Option<Item>> {
    let q = format!("SELECT {SELECT_COLS} {FROM_JOINED} WHERE i.id = ?2");
    match conn.query_row(&q, rusqlite::params!["", id.to_string()], Item::from_row) {
        Ok(i) => Ok(Some(i)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Run one row query for `user_id`, returning the requested page and the
/// total number of matching items.
///
/// Fixed orders are paginated in SQL. [`ItemSort::Random`] loads the
/// matching IDs in primary-key order, shuffles them with the seed and then
/// slices, so every page of the same seed comes from one permutation.
pub fn query_items(
    conn: &Connection,
    user_id: UserId,
    query: &ItemQuery,
) -> Result<(Vec<Item>, usize)> {
    let mut params: Params = vec![Box::new(user_id.to_string())];
    let where_sql = where_clause(&query.filter, &mut params);

    match query.sort {
        ItemSort::Random { seed } => query_shuffled(conn, params, &where_sql, query, seed),
        sort => query_ordered(conn, params, &where_sql, query, sort),
    }
}

fn where_clause(filter: &ItemFilter, params: &mut Params) -> String {
    let mut clauses: Vec<String> = Vec::new();

    if filter.favorites_only {
        clauses.push("f.item_id IS NOT NULL".into());
    }
    if filter.unplayed_only {
        clauses.push("COALESCE(p.completed, 0) = 0".into());
    }
    if let Some(after) = filter.added_after {
        params.push(Box::new(format_timestamp(after)));
        clauses.push(format!("i.date_added >= ?{}", params.len()));
    }
    if let Some(before) = filter.added_before {
        params.push(Box::new(format_timestamp(before)));
        clauses.push(format!("i.date_added <= ?{}", params.len()));
    }
    if let Some(ref genre) = filter.genre {
        params.push(Box::new(genre.trim().to_string()));
        clauses.push(format!(
            "EXISTS (SELECT 1 FROM item_genres g WHERE g.item_id = i.id AND g.genre = ?{})",
            params.len()
        ));
    }
    if !filter.item_kinds.is_empty() {
        let placeholders: Vec<String> = filter
            .item_kinds
            .iter()
            .map(|kind| {
                params.push(Box::new(kind.as_str()));
                format!("?{}", params.len())
            })
            .collect();
        clauses.push(format!("i.item_kind IN ({})", placeholders.join(",")));
    }

    if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    }
}

fn query_ordered(
    conn: &Connection,
    mut params: Params,
    where_sql: &str,
    query: &ItemQuery,
    sort: ItemSort,
) -> Result<(Vec<Item>, usize)> {
    let count_sql = format!("SELECT COUNT(*) {FROM_JOINED} {where_sql}");
    let total: i64 = conn
        .query_row(&count_sql, as_refs(&params).as_slice(), |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))?;

    let order = match sort {
        ItemSort::FavoritedDesc => "f.created_at DESC, i.id ASC",
        ItemSort::DateAddedDesc => "i.date_added DESC, i.id ASC",
        ItemSort::DateAddedAsc | ItemSort::Random { .. } => "i.date_added ASC, i.id ASC",
    };

    params.push(Box::new(to_sql_count(query.limit)));
    params.push(Box::new(to_sql_count(query.offset)));
    let sql = format!(
        "SELECT {SELECT_COLS} {FROM_JOINED} {where_sql} ORDER BY {order} LIMIT ?{} OFFSET ?{}",
        params.len() - 1,
        params.len()
    );

    let mut stmt = conn.prepare(&sql).map_err(|e| Error::database(e.to_string()))?;
    let items = stmt
        .query_map(as_refs(&params).as_slice(), Item::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok((items, usize::try_from(total).unwrap_or_default()))
}

fn query_shuffled(
    conn: &Connection,
    params: Params,
    where_sql: &str,
    query: &ItemQuery,
    seed: u64,
) -> Result<(Vec<Item>, usize)> {
    let id_sql = format!("SELECT i.id {FROM_JOINED} {where_sql} ORDER BY i.id ASC");
    let mut stmt = conn
        .prepare(&id_sql)
        .map_err(|e| Error::database(e.to_string()))?;
    let mut ids = stmt
        .query_map(as_refs(&params).as_slice(), |row| row.get::<_, String>(0))
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    let total = ids.len();
    shuffle_seeded(&mut ids, seed);
    let page: Vec<String> = ids
        .into_iter()
        .skip(query.offset)
        .take(query.limit)
        .collect();
    if page.is_empty() {
        return Ok((Vec::new(), total));
    }

    let user_param = params
        .into_iter()
        .next()
        .ok_or_else(|| Error::Internal("missing user parameter".into()))?;
    let mut fetch_params: Params = vec![user_param];
    let placeholders: Vec<String> = page
        .iter()
        .map(|id| {
            fetch_params.push(Box::new(id.clone()));
            format!("?{}", fetch_params.len())
        })
        .collect();
    let fetch_sql = format!(
        "SELECT {SELECT_COLS} {FROM_JOINED} WHERE i.id IN ({})",
        placeholders.join(",")
    );

    let mut stmt = conn
        .prepare(&fetch_sql)
        .map_err(|e| Error::database(e.to_string()))?;
    let mut items = stmt
        .query_map(as_refs(&fetch_params).as_slice(), Item::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    let position: HashMap<&str, usize> = page
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    items.sort_by_key(|item| {
        position
            .get(item.id.to_string().as_str())
            .copied()
            .unwrap_or(usize::MAX)
    });

    Ok((items, total))
}
