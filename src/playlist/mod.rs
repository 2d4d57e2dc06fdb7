//! Playlist order, cursor and named collections

mod coordinator;
pub mod models;

pub use coordinator::PlaylistCoordinator;
pub use models::{MediaItem, NamedCollection, PlaylistError};
