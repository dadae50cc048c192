//! Pin store: the exclusive owner of the persisted bookmark list.
//!
//! All list mutation (add, delete, clear) goes through here, and every
//! operation re-reads the stored list first; nothing caches a copy across
//! an asynchronous boundary. Records are never edited in place: the only
//! lifecycle is create, delete-by-id (or by index), and bulk clear.

use serde_json::Value;
use uuid::Uuid;

use crate::storage::{ChangeListener, StorageGateway};
use crate::types::bookmark::{Bookmark, BookmarkDraft};
use crate::types::errors::PinError;
use crate::types::settings::PinSettings;

/// Storage key for the bookmark list.
pub const BOOKMARKS_KEY: &str = "bookmarks";
/// Storage key for the selection-capture toggle flag.
pub const ENABLED_KEY: &str = "extensionEnabled";

/// Trait defining pin store operations.
pub trait PinStoreTrait {
    /// Persists a capture draft, assigning its id and timestamp.
    fn pin(&mut self, draft: BookmarkDraft, now_ms: i64) -> Result<Bookmark, PinError>;
    /// Persists an already-complete record (popup/import path).
    fn insert(&mut self, bookmark: Bookmark) -> Result<(), PinError>;
    /// The stored list in insertion order.
    fn list(&self) -> Result<Vec<Bookmark>, PinError>;
    /// The stored list sorted newest-first, as the popup displays it.
    fn recent_first(&self) -> Result<Vec<Bookmark>, PinError>;
    /// Case-insensitive filter over text, page title, and platform.
    fn search(&self, term: &str) -> Result<Vec<Bookmark>, PinError>;
    fn delete(&mut self, id: &str) -> Result<(), PinError>;
    /// Removes exactly the record at `index`, preserving the order of the
    /// rest.
    fn delete_at(&mut self, index: usize) -> Result<Bookmark, PinError>;
    fn clear(&mut self) -> Result<(), PinError>;
    /// Whether selection capture is enabled (defaults to true).
    fn enabled(&self) -> Result<bool, PinError>;
    fn set_enabled(&mut self, enabled: bool) -> Result<(), PinError>;
}

/// Pin store backed by a storage gateway.
pub struct PinStore {
    gateway: Box<dyn StorageGateway>,
    max_pins: usize,
}

impl PinStore {
    pub fn new(gateway: Box<dyn StorageGateway>, settings: &PinSettings) -> Self {
        Self {
            gateway,
            max_pins: settings.max_pins,
        }
    }

    /// Forwards a change subscription to the underlying gateway, so list
    /// UIs can re-render on any mutation.
    pub fn subscribe(&mut self, listener: ChangeListener) {
        self.gateway.subscribe(listener);
    }

    /// First-run initialization: seeds an empty list when storage holds
    /// nothing yet, so readers never have to special-case a missing key.
    pub fn initialize(&mut self) -> Result<(), PinError> {
        if self.gateway.get(BOOKMARKS_KEY).map_err(storage)?.is_none() {
            self.save(&[])?;
        }
        Ok(())
    }

    fn load(&self) -> Result<Vec<Bookmark>, PinError> {
        match self.gateway.get(BOOKMARKS_KEY).map_err(storage)? {
            Some(value) => {
                serde_json::from_value(value).map_err(|e| PinError::Storage(e.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, list: &[Bookmark]) -> Result<(), PinError> {
        let value = serde_json::to_value(list).map_err(|e| PinError::Storage(e.to_string()))?;
        self.gateway.set(BOOKMARKS_KEY, value).map_err(storage)
    }

    fn guard_insert(&self, list: &[Bookmark], text: &str, full_text: Option<&str>) -> Result<(), PinError> {
        let has_text = !text.trim().is_empty() || full_text.map(|t| !t.trim().is_empty()).unwrap_or(false);
        if !has_text {
            return Err(PinError::EmptyText);
        }
        if list.len() >= self.max_pins {
            return Err(PinError::LimitReached(self.max_pins));
        }
        if list.iter().any(|b| b.text == text) {
            return Err(PinError::AlreadyPinned);
        }
        Ok(())
    }
}

fn storage(e: crate::types::errors::StorageError) -> PinError {
    PinError::Storage(e.to_string())
}

/// Time-derived unique id: capture timestamp plus a short random tail to
/// disambiguate same-millisecond captures.
fn assign_id(now_ms: i64) -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("{}-{}", now_ms, &uuid[..8])
}

impl PinStoreTrait for PinStore {
    fn pin(&mut self, draft: BookmarkDraft, now_ms: i64) -> Result<Bookmark, PinError> {
        let mut list = self.load()?;
        self.guard_insert(&list, &draft.text, draft.full_text.as_deref())?;
        let bookmark = Bookmark::from_draft(draft, assign_id(now_ms), now_ms);
        list.push(bookmark.clone());
        self.save(&list)?;
        Ok(bookmark)
    }

    fn insert(&mut self, bookmark: Bookmark) -> Result<(), PinError> {
        let mut list = self.load()?;
        self.guard_insert(&list, &bookmark.text, bookmark.full_text.as_deref())?;
        list.push(bookmark);
        self.save(&list)
    }

    fn list(&self) -> Result<Vec<Bookmark>, PinError> {
        self.load()
    }

    fn recent_first(&self) -> Result<Vec<Bookmark>, PinError> {
        let mut list = self.load()?;
        list.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(list)
    }

    fn search(&self, term: &str) -> Result<Vec<Bookmark>, PinError> {
        let term = term.to_lowercase();
        Ok(self
            .load()?
            .into_iter()
            .filter(|b| {
                b.text.to_lowercase().contains(&term)
                    || b.page_title.to_lowercase().contains(&term)
                    || b.platform.as_str().contains(&term)
            })
            .collect())
    }

    fn delete(&mut self, id: &str) -> Result<(), PinError> {
        let mut list = self.load()?;
        let before = list.len();
        list.retain(|b| b.id != id);
        if list.len() == before {
            return Err(PinError::NotFound(id.to_string()));
        }
        self.save(&list)
    }

    fn delete_at(&mut self, index: usize) -> Result<Bookmark, PinError> {
        let mut list = self.load()?;
        if index >= list.len() {
            return Err(PinError::IndexOutOfRange(index));
        }
        let removed = list.remove(index);
        self.save(&list)?;
        Ok(removed)
    }

    fn clear(&mut self) -> Result<(), PinError> {
        self.save(&[])
    }

    fn enabled(&self) -> Result<bool, PinError> {
        match self.gateway.get(ENABLED_KEY).map_err(storage)? {
            Some(Value::Bool(enabled)) => Ok(enabled),
            _ => Ok(true),
        }
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), PinError> {
        self.gateway
            .set(ENABLED_KEY, Value::Bool(enabled))
            .map_err(storage)
    }
}
