//! Response bodies for the rows API.
//!
//! Items use the Jellyfin `BaseItemDto` casing (PascalCase) so the web
//! client can render them with its stock card code; the row envelopes use
//! camelCase.

use hr_core::{Row, RowPage};
use serde::Serialize;

/// A library item in Jellyfin's shape.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ItemDto {
    pub id: String,
    pub name: String,
    #[serde(rename = "Type")]
    pub item_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_year: Option<i32>,
    pub genres: Vec<String>,
    /// When the item was added to the library (RFC 3339).
    pub date_created: String,
    pub user_data: UserDataDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct UserDataDto {
    pub played: bool,
    pub is_favorite: bool,
}

/// One row of the landing page.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RowDto {
    pub id: String,
    pub title: String,
    /// Row kind slug (`mylist`, `recentlyadded`, `randompicks`,
    /// `longnotwatched`, `genre`).
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    pub total_item_count: usize,
    pub preview_items: Vec<ItemDto>,
    /// Pass back as `seed` to page through the same shuffle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shuffle_seed: Option<u64>,
}

impl From<Row<ItemDto>> for RowDto {
    fn from(row: Row<ItemDto>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            kind: row.kind.slug().to_string(),
            genre: row.genre,
            total_item_count: row.total_item_count,
            preview_items: row.preview_items,
            shuffle_seed: row.shuffle_seed,
        }
    }
}

/// One page of a single row.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RowItemsResponse {
    pub items: Vec<ItemDto>,
    pub total_count: usize,
}

impl From<RowPage<ItemDto>> for RowItemsResponse {
    fn from(page: RowPage<ItemDto>) -> Self {
        Self {
            items: page.items,
            total_count: page.total_count,
        }
    }
}
