//! Database query modules.

pub mod favorites;
pub mod items;
pub mod playback;
pub mod users;
