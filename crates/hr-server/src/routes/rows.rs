//! Home-page row route handlers.
//!
//! Both endpoints always answer 200: an unknown user, an unknown row kind or
//! a failing row query shows up as fewer rows or an empty page.

use std::str::FromStr;

use axum::extract::{Query, State};
use axum::Json;
use hr_engine::RowItemsRequest;
use serde::Deserialize;

use crate::context::AppContext;
use crate::dto::{RowDto, RowItemsResponse};

/// Page size used when the client sends no `limit`.
const DEFAULT_PAGE_SIZE: usize = 20;

/// Query parameters for `GET /rows`.
///
/// Jellyfin clients send both camelCase and PascalCase names.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct RowsParams {
    #[serde(alias = "userId", alias = "UserId")]
    pub user_id: Option<String>,
}

/// Query parameters for `GET /rowItems`.
///
/// Numeric parameters arrive as text and are parsed leniently: a value that
/// is not a valid number is treated as absent.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct RowItemsParams {
    #[serde(alias = "userId", alias = "UserId")]
    pub user_id: Option<String>,
    /// Row kind, case-insensitive (`mylist`, `recentlyadded`, `randompicks`,
    /// `longnotwatched`, `genre`).
    #[serde(alias = "rowKind", alias = "RowKind")]
    pub row_kind: Option<String>,
    /// Required for genre rows.
    #[serde(alias = "Genre")]
    pub genre: Option<String>,
    #[serde(alias = "startIndex", alias = "StartIndex")]
    #[param(value_type = Option<usize>)]
    pub start_index: Option<String>,
    #[serde(alias = "Limit")]
    #[param(value_type = Option<usize>)]
    pub limit: Option<String>,
    /// `shuffleSeed` of the row, to continue the same random order.
    #[serde(alias = "Seed")]
    #[param(value_type = Option<u64>)]
    pub seed: Option<String>,
}

/// Parse an optional numeric query parameter, ignoring malformed values.
fn parse_param<T: FromStr>(name: &str, raw: Option<&str>) -> Option<T> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::debug!(param = name, value = raw, "ignoring malformed query parameter");
            None
        }
    }
}

/// GET /rows
#[utoipa::path(
    get,
    path = "/rows",
    params(RowsParams),
    responses(
        (status = 200, description = "Rows for the landing page, in display order", body = Vec<RowDto>)
    )
)]
pub async fn list_rows(
    State(ctx): State<AppContext>,
    Query(params): Query<RowsParams>,
) -> Json<Vec<RowDto>> {
    let config = ctx.config_store.snapshot();
    let cancel = ctx.shutdown.child_token();
    let user_id = params.user_id.unwrap_or_default();

    let rows = ctx.engine.list_rows(&user_id, &config, &cancel).await;
    Json(rows.into_iter().map(RowDto::from).collect())
}

/// GET /rowItems
#[utoipa::path(
    get,
    path = "/rowItems",
    params(RowItemsParams),
    responses(
        (status = 200, description = "One page of a single row", body = RowItemsResponse)
    )
)]
pub async fn row_items(
    State(ctx): State<AppContext>,
    Query(params): Query<RowItemsParams>,
) -> Json<RowItemsResponse> {
    let config = ctx.config_store.snapshot();
    let cancel = ctx.shutdown.child_token();

    let request = RowItemsRequest {
        user_id: params.user_id.unwrap_or_default(),
        row_kind: params.row_kind.unwrap_or_default(),
        genre: params.genre,
        start_index: parse_param("startIndex", params.start_index.as_deref()).unwrap_or(0),
        limit: parse_param("limit", params.limit.as_deref()).unwrap_or(DEFAULT_PAGE_SIZE),
        seed: parse_param("seed", params.seed.as_deref()),
    };

    let page = ctx.engine.get_row_items(&request, &config, &cancel).await;
    Json(page.into())
}
