//! Loading the bundled verse dataset.
//!
//! The dataset is a plain comma separated file with a header row and six
//! columns: `surah_no, ayah_no, surah_name, ayah_arabic, emotion, ayah_english`.
//! There is no quoting, so a field can't contain a comma. Rows that don't fit
//! are left out and listed in the [`CorpusLoad`] report instead of failing the
//! whole load.

use std::collections::BTreeMap;
use std::fs;
use std::num::NonZeroU32;
use std::path::Path;

use crate::logger::{info, warn};
use crate::models::{NewVerse, VerseRecord};
use crate::types::{CorpusError, RowRejection, SkippedRow};

const COLUMN_COUNT: usize = 6;

/// The verses loaded at startup. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    verses: Vec<VerseRecord>,
}

impl Corpus {
    pub fn verses(&self) -> &[VerseRecord] {
        &self.verses
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VerseRecord> {
        self.verses.iter()
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    /// Number of verses per emotion label, labels as written in the data.
    pub fn emotion_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for verse in &self.verses {
            *counts.entry(verse.emotion().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// The first verse with this surah and ayah number.
    pub fn find(&self, surah_no: u32, ayah_no: u32) -> Option<&VerseRecord> {
        self.verses
            .iter()
            .find(|v| v.surah_no() == surah_no && v.ayah_no() == ayah_no)
    }

    /// Verses tagged with `emotion`, compared case-insensitively, in corpus order.
    pub fn with_emotion(&self, emotion: &str) -> Vec<&VerseRecord> {
        let emotion = emotion.trim().to_lowercase();
        self.verses
            .iter()
            .filter(|v| v.emotion().trim().to_lowercase() == emotion)
            .collect()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a VerseRecord;
    type IntoIter = std::slice::Iter<'a, VerseRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.verses.iter()
    }
}

/// Result of loading the dataset. Always carries a corpus, possibly empty.
#[derive(Debug, Default)]
pub struct CorpusLoad {
    pub corpus: Corpus,
    pub skipped: Vec<SkippedRow>,
    /// Set when the resource could not be read at all.
    pub unavailable: Option<CorpusError>,
}

impl CorpusLoad {
    pub fn into_corpus(self) -> Corpus {
        self.corpus
    }
}

fn parse_row(row: &str) -> Result<VerseRecord, RowRejection> {
    let columns: Vec<&str> = row.split(',').collect();
    if columns.len() != COLUMN_COUNT {
        return Err(RowRejection::ColumnCount(columns.len()));
    }

    let surah_no = columns[0]
        .trim()
        .parse::<u32>()
        .map_err(|_| RowRejection::InvalidSurahNumber(columns[0].to_string()))?;

    let ayah_no = columns[1]
        .trim()
        .parse::<NonZeroU32>()
        .map_err(|_| RowRejection::InvalidAyahNumber(columns[1].to_string()))?;

    Ok(VerseRecord::new(
        ayah_no,
        NewVerse {
            surah_no,
            surah_name: columns[2].to_string(),
            ayah_arabic: columns[3].to_string(),
            emotion: columns[4].to_string(),
            ayah_english: columns[5].to_string(),
            surah_meaning: String::new(),
        },
    ))
}

/// Parse the dataset from text. The first line is the header and is ignored.
/// Empty lines are not rows and are neither kept nor reported.
pub fn parse_corpus(content: &str) -> CorpusLoad {
    let mut verses = Vec::new();
    let mut skipped = Vec::new();

    for (idx, line) in content.split('\n').enumerate().skip(1) {
        let row = line.strip_suffix('\r').unwrap_or(line);
        if row.is_empty() {
            continue;
        }

        match parse_row(row) {
            Ok(verse) => verses.push(verse),
            Err(reason) => skipped.push(SkippedRow { line_number: idx + 1, reason }),
        }
    }

    CorpusLoad {
        corpus: Corpus { verses },
        skipped,
        unavailable: None,
    }
}

/// Read and parse the dataset file.
///
/// A missing or unreadable file is logged and gives an empty corpus, the
/// same as an empty file. The error is kept in [`CorpusLoad::unavailable`].
pub fn load_corpus(path: &Path) -> CorpusLoad {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(source) => {
            let err = CorpusError::ResourceUnavailable { path: path.to_path_buf(), source };
            warn(&format!("{}", err));
            return CorpusLoad {
                unavailable: Some(err),
                ..Default::default()
            };
        }
    };

    let load = parse_corpus(&content);

    if !load.skipped.is_empty() {
        warn(&format!("Skipped {} malformed rows in {}", load.skipped.len(), path.display()));
    }
    info(&format!("Loaded {} verses from {}", load.corpus.len(), path.display()));

    load
}
