use std::collections::BTreeSet;
use std::error::Error;
use std::fmt;

/// One playable entry of the playlist. Identity is the locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub locator: String,
    pub display_name: String,
}

impl MediaItem {
    pub fn new(locator: impl Into<String>, display_name: impl Into<String>) -> Self {
        MediaItem {
            locator: locator.into(),
            display_name: display_name.into(),
        }
    }
}

/// User-defined, advisory grouping of playlist items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedCollection {
    pub name: String,
    /// Lower-cased display names.
    pub members: BTreeSet<String>,
}

impl NamedCollection {
    pub fn new(name: &str) -> Self {
        NamedCollection {
            name: name.to_string(),
            members: BTreeSet::new(),
        }
    }

    pub fn contains(&self, display_name: &str) -> bool {
        self.members.contains(&display_name.to_lowercase())
    }
}

/// Error types for playlist and collection operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistError {
    DuplicateName(String),
    UnknownCollection(String),
    ItemNotFound(String),
}

impl fmt::Display for PlaylistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaylistError::DuplicateName(name) => write!(f, "Collection '{}' already exists", name),
            PlaylistError::UnknownCollection(name) => write!(f, "No collection named '{}'", name),
            PlaylistError::ItemNotFound(name) => write!(f, "No playlist item '{}'", name),
        }
    }
}

impl Error for PlaylistError {}
