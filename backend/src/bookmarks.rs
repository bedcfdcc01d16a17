//! Bookmarked verses, kept in insertion order and stored as JSON under a
//! single named slot.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;

use crate::logger::{info, warn};
use crate::models::VerseRecord;
use crate::types::BookmarkError;

/// The serialized form of an empty collection.
pub const EMPTY_BOOKMARKS: &str = "[]";

/// Where the serialized bookmarks live between sessions.
pub trait BookmarkPersistence: Send {
    /// The stored bytes, or None if nothing was saved yet. The bytes are
    /// not checked, decoding happens in `deserialize_bookmarks`.
    fn load(&self) -> Result<Option<Vec<u8>>>;
    fn save(&self, data: &str) -> Result<()>;
}

/// A JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSlot {
    path: PathBuf,
}

impl JsonFileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSlot { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BookmarkPersistence for JsonFileSlot {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        Ok(Some(data))
    }

    fn save(&self, data: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        // Write a sibling file first so a failed write doesn't truncate the slot.
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, data)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

/// Keeps the slot in memory.
#[derive(Debug, Default)]
pub struct MemorySlot {
    data: Mutex<Option<Vec<u8>>>,
}

impl MemorySlot {
    pub fn new(data: Option<Vec<u8>>) -> Self {
        MemorySlot { data: Mutex::new(data) }
    }

    pub fn contents(&self) -> Option<String> {
        self.data
            .lock()
            .as_ref()
            .map(|data| String::from_utf8_lossy(data).into_owned())
    }
}

impl BookmarkPersistence for MemorySlot {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.data.lock().clone())
    }

    fn save(&self, data: &str) -> Result<()> {
        *self.data.lock() = Some(data.as_bytes().to_vec());
        Ok(())
    }
}

impl<P: BookmarkPersistence + Sync + ?Sized> BookmarkPersistence for std::sync::Arc<P> {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        (**self).load()
    }

    fn save(&self, data: &str) -> Result<()> {
        (**self).save(data)
    }
}

pub fn serialize_bookmarks(bookmarks: &[VerseRecord]) -> Result<String, BookmarkError> {
    Ok(serde_json::to_string(bookmarks)?)
}

pub fn try_deserialize_bookmarks(data: impl AsRef<[u8]>) -> Result<Vec<VerseRecord>, BookmarkError> {
    Ok(serde_json::from_slice(data.as_ref())?)
}

/// Decode stored bookmarks. Unreadable data, including bytes that are not
/// UTF-8, gives an empty collection and a warning in the log.
///
/// Duplicate ids in the data are dropped, keeping the first occurrence.
pub fn deserialize_bookmarks(data: impl AsRef<[u8]>) -> Vec<VerseRecord> {
    match try_deserialize_bookmarks(data) {
        Ok(bookmarks) => {
            let mut seen = BTreeSet::new();
            bookmarks.into_iter().filter(|b| seen.insert(b.id())).collect()
        }
        Err(e) => {
            warn(&format!("Failed to decode bookmarks: {}", e));
            Vec::new()
        }
    }
}

pub struct BookmarkStore {
    bookmarks: Vec<VerseRecord>,
    persistence: Box<dyn BookmarkPersistence>,
}

impl BookmarkStore {
    /// Start with the saved bookmarks, or none if the slot is empty or can't
    /// be decoded.
    pub fn open(persistence: impl BookmarkPersistence + 'static) -> Result<Self> {
        let bookmarks = match persistence.load().context("Failed to load bookmarks")? {
            Some(data) => deserialize_bookmarks(&data),
            None => Vec::new(),
        };
        info(&format!("Loaded {} bookmarks", bookmarks.len()));

        Ok(BookmarkStore {
            bookmarks,
            persistence: Box::new(persistence),
        })
    }

    pub fn bookmarks(&self) -> &[VerseRecord] {
        &self.bookmarks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VerseRecord> {
        self.bookmarks.iter()
    }

    pub fn get(&self, index: usize) -> Option<&VerseRecord> {
        self.bookmarks.get(index)
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    pub fn contains(&self, verse: &VerseRecord) -> bool {
        self.bookmarks.iter().any(|b| b.id() == verse.id())
    }

    /// Append `verse` unless a bookmark with the same id exists. Returns
    /// whether it was added. Every addition is saved right away, and an
    /// addition that can't be saved is undone.
    pub fn add(&mut self, verse: VerseRecord) -> Result<bool, BookmarkError> {
        if self.contains(&verse) {
            return Ok(false);
        }
        self.bookmarks.push(verse);
        if let Err(e) = self.persist() {
            self.bookmarks.pop();
            return Err(e);
        }
        Ok(true)
    }

    /// Remove the bookmarks at `indices`. If any index is out of range nothing
    /// is removed, the same as when the result can't be saved. Returns the
    /// removed bookmarks in their previous order.
    pub fn remove(&mut self, indices: &BTreeSet<usize>) -> Result<Vec<VerseRecord>, BookmarkError> {
        let len = self.bookmarks.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(BookmarkError::InvalidIndex { index, len });
        }
        if indices.is_empty() {
            return Ok(Vec::new());
        }

        let previous = self.bookmarks.clone();
        let (removed, kept): (Vec<_>, Vec<_>) = self
            .bookmarks
            .drain(..)
            .enumerate()
            .partition(|(i, _)| indices.contains(i));

        self.bookmarks = kept.into_iter().map(|(_, b)| b).collect();
        if let Err(e) = self.persist() {
            self.bookmarks = previous;
            return Err(e);
        }

        Ok(removed.into_iter().map(|(_, b)| b).collect())
    }

    pub fn clear(&mut self) -> Result<(), BookmarkError> {
        let previous = std::mem::take(&mut self.bookmarks);
        if let Err(e) = self.persist() {
            self.bookmarks = previous;
            return Err(e);
        }
        Ok(())
    }

    pub fn serialize(&self) -> Result<String, BookmarkError> {
        serialize_bookmarks(&self.bookmarks)
    }

    fn persist(&self) -> Result<(), BookmarkError> {
        let data = self.serialize()?;
        self.persistence.save(&data).map_err(BookmarkError::Persistence)
    }
}

impl std::fmt::Debug for BookmarkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookmarkStore")
            .field("bookmarks", &self.bookmarks)
            .finish_non_exhaustive()
    }
}
