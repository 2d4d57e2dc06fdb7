use tracing::{debug, info, warn};

use crate::playlist::models::{MediaItem, NamedCollection, PlaylistError};

const PLAYLIST_LOG_TARGET: &str = "r_vidplay::playlist";

/// Ordered playlist with a cursor and the user's named collections.
///
/// Methods that move the cursor return the new index when the selection
/// changed; the caller is responsible for loading the item.
#[derive(Debug, Default)]
pub struct PlaylistCoordinator {
    items: Vec<MediaItem>,
    current_index: Option<usize>,
    collections: Vec<NamedCollection>,
}

impl PlaylistCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `item`. Selects it when nothing was selected yet.
    ///
    /// Items are identified by locator; enqueuing one that is already in the
    /// playlist does nothing.
    pub fn enqueue(&mut self, item: MediaItem) -> Option<usize> {
        if self.items.iter().any(|existing| existing.locator == item.locator) {
            debug!(target: PLAYLIST_LOG_TARGET, "{} is already in the playlist", item.display_name);
            return None;
        }
        debug!(target: PLAYLIST_LOG_TARGET, "Enqueuing {}", item.display_name);
        self.items.push(item);
        if self.current_index.is_none() {
            self.current_index = Some(0);
            return Some(0);
        }
        None
    }

    pub fn select_by_name(&mut self, name: &str) -> Result<usize, PlaylistError> {
        let index = self
            .items
            .iter()
            .position(|item| item.display_name == name)
            .ok_or_else(|| {
                warn!(target: PLAYLIST_LOG_TARGET, "Video {} not found in playlist", name);
                PlaylistError::ItemNotFound(name.to_string())
            })?;
        self.current_index = Some(index);
        Ok(index)
    }

    pub fn select_index(&mut self, index: usize) -> Result<usize, PlaylistError> {
        if index >= self.items.len() {
            return Err(PlaylistError::ItemNotFound(format!("#{}", index)));
        }
        self.current_index = Some(index);
        Ok(index)
    }

    /// Moves the cursor by `delta` if the target stays inside the playlist.
    pub fn step(&mut self, delta: isize) -> Option<usize> {
        let current = self.current_index?;
        let target = current.checked_add_signed(delta)?;
        if target >= self.items.len() || target == current {
            return None;
        }
        self.current_index = Some(target);
        Some(target)
    }

    pub fn create_collection(&mut self, name: &str) -> Result<(), PlaylistError> {
        if self.collections.iter().any(|c| c.name == name) {
            return Err(PlaylistError::DuplicateName(name.to_string()));
        }
        info!(target: PLAYLIST_LOG_TARGET, "Created collection {}", name);
        self.collections.push(NamedCollection::new(name));
        Ok(())
    }

    pub fn assign_to_collection(&mut self, collection: &str, item_name: &str) -> Result<(), PlaylistError> {
        let target = self
            .collections
            .iter_mut()
            .find(|c| c.name == collection)
            .ok_or_else(|| PlaylistError::UnknownCollection(collection.to_string()))?;
        target.members.insert(item_name.to_lowercase());
        debug!(target: PLAYLIST_LOG_TARGET, "Added {} to collection {}", item_name, collection);
        Ok(())
    }

    /// Items whose display name belongs to the collection. Unknown collections
    /// match nothing.
    pub fn filter_by_collection(&self, name: &str) -> Vec<MediaItem> {
        let Some(collection) = self.collections.iter().find(|c| c.name == name) else {
            return Vec::new();
        };
        self.items
            .iter()
            .filter(|item| collection.contains(&item.display_name))
            .cloned()
            .collect()
    }

    /// Case-insensitive substring match on display names.
    pub fn filter_by_text(&self, text: &str) -> Vec<MediaItem> {
        let needle = text.to_lowercase();
        self.items
            .iter()
            .filter(|item| item.display_name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub fn current(&self) -> Option<&MediaItem> {
        self.current_index.and_then(|index| self.items.get(index))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.current_index.is_some_and(|index| index + 1 < self.items.len())
    }

    pub fn collections(&self) -> &[NamedCollection] {
        &self.collections
    }

    pub fn collection_names(&self) -> Vec<String> {
        self.collections.iter().map(|c| c.name.clone()).collect()
    }
}
