use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{anyhow, Result};
use parking_lot::{Mutex, MutexGuard};

use crate::app_settings::AppSettings;
use crate::bookmarks::{BookmarkPersistence, BookmarkStore, JsonFileSlot};
use crate::corpus::{load_corpus, Corpus};
use crate::get_create_quranjar_dir;
use crate::logger::info;
use crate::models::VerseRecord;
use crate::prediction::{is_prediction_input_ready, PredictionResponse};
use crate::search::{search, search_in_fields};
use crate::types::{BookmarkError, SearchField, SkippedRow};
use crate::verse_parser::parse_verse_string;

/// The corpus and bookmarks of one running session.
///
/// The corpus never changes after `new()`. Bookmark changes go through a
/// mutex, so callers on several threads are applied one at a time.
#[derive(Debug)]
pub struct AppData {
    pub app_dir: PathBuf,
    pub settings: AppSettings,
    corpus: Corpus,
    skipped_rows: Vec<SkippedRow>,
    corpus_available: bool,
    bookmarks: Mutex<BookmarkStore>,
}

impl AppData {
    /// Load settings, corpus and bookmarks from `app_dir`.
    pub fn new(app_dir: &Path) -> Result<Self> {
        let settings = AppSettings::load_or_default(app_dir);
        let slot = JsonFileSlot::new(settings.bookmarks_path_in(app_dir));
        Self::with_persistence(app_dir, settings, slot)
    }

    /// Like `new()`, with bookmarks kept in `persistence` instead of the
    /// configured file.
    pub fn with_persistence(
        app_dir: &Path,
        settings: AppSettings,
        persistence: impl BookmarkPersistence + 'static,
    ) -> Result<Self> {
        let load = load_corpus(&settings.corpus_path_in(app_dir));
        let corpus_available = load.unavailable.is_none();
        let bookmarks = BookmarkStore::open(persistence)?;

        info(&format!(
            "AppData ready: {} verses, {} skipped rows, {} bookmarks",
            load.corpus.len(),
            load.skipped.len(),
            bookmarks.len()
        ));

        Ok(AppData {
            app_dir: app_dir.to_path_buf(),
            settings,
            corpus: load.corpus,
            skipped_rows: load.skipped,
            corpus_available,
            bookmarks: Mutex::new(bookmarks),
        })
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn skipped_rows(&self) -> &[SkippedRow] {
        &self.skipped_rows
    }

    /// False when the corpus file couldn't be read. The corpus is empty then.
    pub fn corpus_available(&self) -> bool {
        self.corpus_available
    }

    pub fn search(&self, query: &str) -> Vec<&VerseRecord> {
        search(self.corpus.verses(), query)
    }

    pub fn search_fields(&self, query: &str, fields: &[SearchField]) -> Vec<&VerseRecord> {
        search_in_fields(self.corpus.verses(), query, fields)
    }

    pub fn prediction_input_ready(&self, text: &str) -> bool {
        is_prediction_input_ready(text, self.settings.min_prediction_words)
    }

    /// Lock the bookmarks for reading or for several changes in a row.
    pub fn bookmarks(&self) -> MutexGuard<'_, BookmarkStore> {
        self.bookmarks.lock()
    }

    pub fn bookmarks_snapshot(&self) -> Vec<VerseRecord> {
        self.bookmarks.lock().bookmarks().to_vec()
    }

    pub fn add_bookmark(&self, verse: VerseRecord) -> Result<bool, BookmarkError> {
        self.bookmarks.lock().add(verse)
    }

    pub fn remove_bookmarks(&self, indices: &BTreeSet<usize>) -> Result<Vec<VerseRecord>, BookmarkError> {
        self.bookmarks.lock().remove(indices)
    }

    pub fn clear_bookmarks(&self) -> Result<(), BookmarkError> {
        self.bookmarks.lock().clear()
    }

    /// Parse a verse string from the classifier and bookmark the result.
    ///
    /// Each call mints a new record, so bookmarking the same suggestion twice
    /// stores it twice.
    pub fn bookmark_verse_string(&self, verse_text: &str, emotion: &str) -> Result<VerseRecord> {
        let verse = parse_verse_string(verse_text, emotion)?;
        self.add_bookmark(verse.clone())?;
        Ok(verse)
    }

    pub fn bookmark_prediction(&self, response: &PredictionResponse) -> Result<VerseRecord> {
        self.bookmark_verse_string(&response.quranic_verse, &response.predicted_emotion)
    }

    /// Bookmark the corpus verse `surah_no:ayah_no`, retagged with `emotion`
    /// when given. Returns the bookmark and whether it was newly added.
    ///
    /// Without a new emotion the corpus record itself is stored, so asking
    /// twice in one session doesn't add it twice.
    pub fn bookmark_corpus_verse(
        &self,
        surah_no: u32,
        ayah_no: u32,
        emotion: Option<&str>,
    ) -> Result<(VerseRecord, bool)> {
        let found = self
            .corpus
            .find(surah_no, ayah_no)
            .ok_or_else(|| anyhow!("No verse {}:{} in the corpus", surah_no, ayah_no))?;

        let verse = match emotion {
            Some(emotion) => found.with_emotion(emotion),
            None => found.clone(),
        };
        let added = self.add_bookmark(verse.clone())?;
        Ok((verse, added))
    }
}

static APP_DATA: OnceLock<AppData> = OnceLock::new();

/// Set up the process-wide session from `app_dir`, or from
/// `get_create_quranjar_dir()` when None. Later calls return the first one.
pub fn init_app_data(app_dir: Option<PathBuf>) -> Result<&'static AppData> {
    if let Some(app_data) = APP_DATA.get() {
        return Ok(app_data);
    }

    let app_dir = match app_dir {
        Some(p) => p,
        None => get_create_quranjar_dir()?,
    };
    let app_data = AppData::new(&app_dir)?;

    Ok(APP_DATA.get_or_init(|| app_data))
}
