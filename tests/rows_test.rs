//! Row summary integration tests.
//!
//! Exercises `GET /rows` against a server backed by an in-memory SQLite
//! library.

mod common;

use std::collections::HashSet;

use common::{get_json, item_names, rows_only, TestHarness};
use hr_core::config::RowsConfig;

fn ids(rows: &serde_json::Value) -> Vec<String> {
    rows.as_array()
        .expect("rows should be an array")
        .iter()
        .map(|r| r["id"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn recent_and_genre_rows_in_order() {
    let rows = RowsConfig {
        max_rows: 3,
        min_genre_items: 5,
        ..rows_only(true, true, false, false, &["Action"])
    };
    let harness = TestHarness::with_rows(rows);
    let user = harness.add_user("alice");
    for i in 0..10 {
        harness.add_item("movie", &format!("Fresh {i}"), 1, &[]);
    }
    harness.add_genre_movies("Action", 6);
    let (_harness, addr) = harness.serve().await;

    let body = get_json(&format!("http://{addr}/rows?userId={user}")).await;
    assert_eq!(ids(&body), vec!["recentlyadded", "genre-action"]);

    let recent = &body[0];
    assert_eq!(recent["title"], "Recently Added");
    assert_eq!(recent["kind"], "recentlyadded");
    assert_eq!(recent["totalItemCount"], 10);
    assert_eq!(recent["previewItems"].as_array().unwrap().len(), 6);
    assert!(recent.get("shuffleSeed").is_none());

    let action = &body[1];
    assert_eq!(action["genre"], "Action");
    assert_eq!(action["totalItemCount"], 6);
    assert!(action["shuffleSeed"].is_u64());
    assert_eq!(action["previewItems"][0]["Type"], "Movie");
}

#[tokio::test]
async fn unknown_or_missing_user_gets_empty_list() {
    let harness = TestHarness::new();
    harness.add_genre_movies("Action", 6);
    let (_harness, addr) = harness.serve().await;

    for query in ["?userId=not-a-user", "?userId=00000000-0000-0000-0000-000000000000", ""] {
        let body = get_json(&format!("http://{addr}/rows{query}")).await;
        assert_eq!(body, serde_json::json!([]), "query {query:?}");
    }
}

#[tokio::test]
async fn pascal_case_user_param() {
    let harness = TestHarness::with_rows(rows_only(false, false, true, false, &[]));
    let user = harness.add_user("alice");
    harness.add_movie("Anything", &[]);
    let (_harness, addr) = harness.serve().await;

    let body = get_json(&format!("http://{addr}/rows?UserId={user}")).await;
    assert_eq!(ids(&body), vec!["randompicks"]);
}

#[tokio::test]
async fn my_list_shows_newest_favorites_first() {
    let harness = TestHarness::with_rows(rows_only(true, false, false, false, &[]));
    let user = harness.add_user("alice");
    let other = harness.add_user("bob");
    let first = harness.add_movie("First", &[]);
    let second = harness.add_movie("Second", &[]);
    let bobs = harness.add_movie("Bob's pick", &[]);
    harness.favorite(user, first, 60);
    harness.favorite(user, second, 5);
    harness.favorite(other, bobs, 1);
    let (_harness, addr) = harness.serve().await;

    let body = get_json(&format!("http://{addr}/rows?userId={user}")).await;
    assert_eq!(ids(&body), vec!["mylist"]);
    assert_eq!(body[0]["title"], "My List");
    assert_eq!(body[0]["totalItemCount"], 2);
    assert_eq!(item_names(&body[0]["previewItems"]), vec!["Second", "First"]);
    assert_eq!(body[0]["previewItems"][0]["UserData"]["IsFavorite"], true);
}

#[tokio::test]
async fn empty_library_has_no_rows() {
    let (harness, addr) = TestHarness::with_server().await;
    let user = harness.add_user("alice");

    let body = get_json(&format!("http://{addr}/rows?userId={user}")).await;
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn row_count_is_capped() {
    let rows = RowsConfig {
        max_rows: 2,
        min_genre_items: 1,
        ..rows_only(true, true, true, true, &["Action", "Comedy"])
    };
    let harness = TestHarness::with_rows(rows);
    let user = harness.add_user("alice");
    let fav = harness.add_movie("Fav", &[]);
    harness.favorite(user, fav, 1);
    harness.add_item("movie", "New", 1, &[]);
    harness.add_genre_movies("Action", 3);
    harness.add_genre_movies("Comedy", 3);
    let (_harness, addr) = harness.serve().await;

    let body = get_json(&format!("http://{addr}/rows?userId={user}")).await;
    assert_eq!(ids(&body), vec!["mylist", "recentlyadded"]);
}

#[tokio::test]
async fn random_row_order_keeps_the_same_rows() {
    let rows = RowsConfig {
        random_row_order: true,
        min_genre_items: 1,
        ..rows_only(true, true, true, true, &["Action", "Comedy"])
    };
    let harness = TestHarness::with_rows(rows);
    let user = harness.add_user("alice");
    let fav = harness.add_movie("Fav", &[]);
    harness.favorite(user, fav, 1);
    harness.add_item("movie", "New", 1, &[]);
    harness.add_item("movie", "Forgotten", 400, &[]);
    harness.add_genre_movies("Action", 3);
    harness.add_genre_movies("Comedy", 3);
    let (_harness, addr) = harness.serve().await;

    let expected: HashSet<String> = [
        "mylist",
        "recentlyadded",
        "randompicks",
        "genre-action",
        "genre-comedy",
        "longnotwatched",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    for _ in 0..3 {
        let body = get_json(&format!("http://{addr}/rows?userId={user}")).await;
        let got: HashSet<String> = ids(&body).into_iter().collect();
        assert_eq!(got, expected);
    }
}

#[tokio::test]
async fn small_and_blacklisted_genres_are_skipped() {
    let mut rows = RowsConfig {
        min_genre_items: 3,
        ..rows_only(false, false, false, false, &["Action", "Horror", "Western"])
    };
    rows.blacklisted_genres.insert("horror".into());
    rows.genre_titles
        .insert("Action".into(), "Explosions & Car Chases".into());
    let harness = TestHarness::with_rows(rows);
    let user = harness.add_user("alice");
    harness.add_genre_movies("Action", 3);
    harness.add_genre_movies("Horror", 10);
    harness.add_genre_movies("Western", 2);
    let (_harness, addr) = harness.serve().await;

    let body = get_json(&format!("http://{addr}/rows?userId={user}")).await;
    assert_eq!(ids(&body), vec!["genre-action"]);
    assert_eq!(body[0]["title"], "Explosions & Car Chases");
}

#[tokio::test]
async fn long_not_watched_skips_played_items() {
    let harness = TestHarness::with_rows(rows_only(false, false, false, true, &[]));
    let user = harness.add_user("alice");
    let seen = harness.add_item("movie", "Seen it", 400, &[]);
    harness.add_item("movie", "Dusty", 500, &[]);
    harness.add_item("movie", "Brand new", 2, &[]);
    harness.mark_played(user, seen);
    let (_harness, addr) = harness.serve().await;

    let body = get_json(&format!("http://{addr}/rows?userId={user}")).await;
    assert_eq!(ids(&body), vec!["longnotwatched"]);
    assert_eq!(body[0]["totalItemCount"], 1);
    assert_eq!(item_names(&body[0]["previewItems"]), vec!["Dusty"]);
    assert_eq!(body[0]["previewItems"][0]["UserData"]["Played"], false);
}

#[tokio::test]
async fn unpresentable_items_are_dropped_from_preview() {
    let harness = TestHarness::with_rows(rows_only(false, true, false, false, &[]));
    let user = harness.add_user("alice");
    harness.add_item("movie", "Good", 1, &[]);
    harness.add_item("boxset", "Odd one", 1, &[]);
    let (_harness, addr) = harness.serve().await;

    let body = get_json(&format!("http://{addr}/rows?userId={user}")).await;
    assert_eq!(body[0]["totalItemCount"], 2);
    assert_eq!(item_names(&body[0]["previewItems"]), vec!["Good"]);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let (_harness, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("http://{addr}/rows"))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["x-request-id"], "trace-me");
}
