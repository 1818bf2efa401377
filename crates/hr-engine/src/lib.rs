//! hr-engine: home-page row selection and pagination.
//!
//! The engine is generic over the host's library, user directory and item
//! presenter (see [`library`]), so the same selection rules run against the
//! SQLite adapter in `hr-db` and against in-memory fakes in tests.

pub mod engine;
pub mod library;

#[cfg(test)]
mod test_fixtures;

pub use engine::{RowEngine, RowItemsRequest, MAX_SHUFFLE_SEED};
pub use library::{
    shuffle_seeded, ItemFilter, ItemPresenter, ItemQuery, ItemSort, LibraryQuery, QueryPage,
    User, UserDirectory,
};
