mod helpers;

use std::collections::BTreeSet;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{anyhow, Result};

use quranjar_backend::bookmarks::{
    deserialize_bookmarks, serialize_bookmarks, BookmarkPersistence, BookmarkStore, JsonFileSlot, MemorySlot,
    EMPTY_BOOKMARKS,
};
use quranjar_backend::types::{BookmarkError, ErrorKind};
use quranjar_backend::verse_parser::parse_verse_string;
use quranjar_backend::VerseRecord;
use tempfile::tempdir;

use helpers::*;

/// A slot that refuses to save while `failing` is set.
#[derive(Default)]
struct FlakySlot {
    inner: MemorySlot,
    failing: AtomicBool,
}

impl FlakySlot {
    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl BookmarkPersistence for FlakySlot {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        self.inner.load()
    }

    fn save(&self, data: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("disk full"));
        }
        self.inner.save(data)
    }
}

fn parsed(n: u32) -> VerseRecord {
    parse_verse_string(&format!("Verse text {} (Surah Al-Baqarah: The Cow, Verse {})", n, n), "hope").unwrap()
}

#[test]
fn test_add_is_idempotent_by_id() {
    test_env_setup();
    let mut store = BookmarkStore::open(MemorySlot::default()).unwrap();
    let verse = parsed(1);

    assert!(store.add(verse.clone()).unwrap());
    assert_eq!(store.len(), 1);
    assert!(!store.add(verse.clone()).unwrap());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_same_text_from_two_parses_is_bookmarked_twice() {
    test_env_setup();
    let mut store = BookmarkStore::open(MemorySlot::default()).unwrap();

    assert!(store.add(parsed(1)).unwrap());
    assert!(store.add(parsed(1)).unwrap());
    assert_eq!(store.len(), 2);
}

#[test]
fn test_insertion_order_is_kept() {
    test_env_setup();
    let mut store = BookmarkStore::open(MemorySlot::default()).unwrap();
    for n in [5, 2, 9] {
        store.add(parsed(n)).unwrap();
    }
    let order: Vec<u32> = store.iter().map(|v| v.ayah_no()).collect();
    assert_eq!(order, vec![5, 2, 9]);
}

#[test]
fn test_remove_keeps_survivor_order() {
    test_env_setup();
    let mut store = BookmarkStore::open(MemorySlot::default()).unwrap();
    for n in 1..=5 {
        store.add(parsed(n)).unwrap();
    }

    let removed = store.remove(&BTreeSet::from([0, 3])).unwrap();

    let removed: Vec<u32> = removed.iter().map(|v| v.ayah_no()).collect();
    assert_eq!(removed, vec![1, 4]);
    let left: Vec<u32> = store.iter().map(|v| v.ayah_no()).collect();
    assert_eq!(left, vec![2, 3, 5]);
}

#[test]
fn test_remove_out_of_range_changes_nothing() {
    test_env_setup();
    let mut store = BookmarkStore::open(MemorySlot::default()).unwrap();
    store.add(parsed(1)).unwrap();
    store.add(parsed(2)).unwrap();

    let err = store.remove(&BTreeSet::from([0, 2])).unwrap_err();

    assert!(matches!(err, BookmarkError::InvalidIndex { index: 2, len: 2 }));
    assert_eq!(err.kind(), ErrorKind::InvalidIndex);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_remove_nothing() {
    test_env_setup();
    let mut store = BookmarkStore::open(MemorySlot::default()).unwrap();
    store.add(parsed(1)).unwrap();
    assert!(store.remove(&BTreeSet::new()).unwrap().is_empty());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_serialize_deserialize_round_trip() {
    test_env_setup();
    let corpus = small_corpus();
    let mut bookmarks: Vec<VerseRecord> = corpus.iter().cloned().collect();
    bookmarks.push(parsed(7));

    let data = serialize_bookmarks(&bookmarks).unwrap();
    let decoded = deserialize_bookmarks(&data);

    assert_eq!(decoded.len(), bookmarks.len());
    for (a, b) in decoded.iter().zip(bookmarks.iter()) {
        assert_eq!(a, b);
        assert!(a.same_content(b));
    }
}

#[test]
fn test_unparsable_slot_opens_empty() {
    test_env_setup();
    let store = BookmarkStore::open(MemorySlot::new(Some(b"[{\"broken\":".to_vec()))).unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_json_file_slot_survives_reopen() {
    test_env_setup();
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("bookmarks.json");

    let first = parsed(10);
    {
        let mut store = BookmarkStore::open(JsonFileSlot::new(&path)).unwrap();
        assert!(store.is_empty());
        store.add(first.clone()).unwrap();
        store.add(parsed(11)).unwrap();
        store.remove(&BTreeSet::from([1])).unwrap();
    }

    let mut reopened = BookmarkStore::open(JsonFileSlot::new(&path)).unwrap();
    assert_eq!(reopened.bookmarks(), &[first.clone()]);
    assert!(reopened.get(0).unwrap().same_content(&first));

    // The reloaded record keeps its id, so it still dedups.
    assert!(!reopened.add(first).unwrap());
}

#[test]
fn test_clear_writes_empty_list() {
    test_env_setup();
    let dir = tempdir().unwrap();
    let slot = JsonFileSlot::new(dir.path().join("bookmarks.json"));
    let mut store = BookmarkStore::open(slot.clone()).unwrap();
    store.add(parsed(1)).unwrap();

    store.clear().unwrap();

    assert_eq!(slot.load().unwrap().as_deref(), Some(EMPTY_BOOKMARKS.as_bytes()));
}

#[test]
fn test_shared_memory_slot() {
    test_env_setup();
    let slot = Arc::new(MemorySlot::default());
    let mut store = BookmarkStore::open(slot.clone()).unwrap();
    store.add(parsed(3)).unwrap();

    let other = BookmarkStore::open(slot).unwrap();
    assert_eq!(other.len(), 1);
}

#[test]
fn test_unsaved_add_is_undone_and_can_be_retried() {
    test_env_setup();
    let slot = Arc::new(FlakySlot::default());
    let mut store = BookmarkStore::open(slot.clone()).unwrap();
    let verse = parsed(1);

    slot.set_failing(true);
    let err = store.add(verse.clone()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceUnavailable);
    assert!(store.is_empty());
    assert!(slot.inner.contents().is_none());

    slot.set_failing(false);
    assert!(store.add(verse.clone()).unwrap());
    assert_eq!(deserialize_bookmarks(slot.inner.contents().unwrap()), vec![verse]);
}

#[test]
fn test_unsaved_remove_and_clear_are_undone() {
    test_env_setup();
    let slot = Arc::new(FlakySlot::default());
    let mut store = BookmarkStore::open(slot.clone()).unwrap();
    for n in 1..=3 {
        store.add(parsed(n)).unwrap();
    }
    let before: Vec<VerseRecord> = store.bookmarks().to_vec();

    slot.set_failing(true);
    assert!(matches!(store.remove(&BTreeSet::from([1])), Err(BookmarkError::Persistence(_))));
    assert_eq!(store.bookmarks(), before.as_slice());
    assert!(matches!(store.clear(), Err(BookmarkError::Persistence(_))));
    assert_eq!(store.bookmarks(), before.as_slice());

    let saved = deserialize_bookmarks(slot.inner.contents().unwrap());
    assert_eq!(saved, before);
}

#[test]
fn test_slot_with_invalid_utf8_opens_empty() {
    test_env_setup();
    let dir = tempdir().unwrap();
    let path = dir.path().join("bookmarks.json");
    fs::write(&path, [0xff, 0xfe, 0x5b, 0x5d]).unwrap();

    let mut store = BookmarkStore::open(JsonFileSlot::new(&path)).unwrap();
    assert!(store.is_empty());

    // The next save replaces the unreadable data.
    store.add(parsed(4)).unwrap();
    assert_eq!(deserialize_bookmarks(fs::read(&path).unwrap()).len(), 1);
}
