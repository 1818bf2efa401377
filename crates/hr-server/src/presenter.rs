//! Converts database items into [`ItemDto`]s.

use hr_core::{Error, ItemKind, Result};
use hr_db::models::{format_timestamp, Item};
use hr_engine::{ItemPresenter, User};

use crate::dto::{ItemDto, UserDataDto};

/// Presents SQLite items as Jellyfin-style DTOs.
///
/// Items with a kind Jellyfin clients cannot render are rejected, which
/// drops them from the row.
#[derive(Debug, Clone, Copy, Default)]
pub struct DtoPresenter;

impl ItemPresenter for DtoPresenter {
    type Record = Item;
    type Item = ItemDto;

    fn present(&self, item: &Item, _user: &User) -> Result<ItemDto> {
        let kind = ItemKind::parse(&item.item_kind).ok_or_else(|| {
            Error::Validation(format!(
                "item {} has unknown kind '{}'",
                item.id, item.item_kind
            ))
        })?;

        let item_type = match kind {
            ItemKind::Movie => "Movie",
            ItemKind::Series => "Series",
            ItemKind::Season => "Season",
            ItemKind::Episode => "Episode",
        };

        Ok(ItemDto {
            id: item.id.to_string(),
            name: item.name.clone(),
            item_type: item_type.to_string(),
            production_year: item.year,
            genres: item.genres.clone(),
            date_created: format_timestamp(item.date_added),
            user_data: UserDataDto {
                played: item.played,
                is_favorite: item.is_favorite(),
            },
        })
    }
}
