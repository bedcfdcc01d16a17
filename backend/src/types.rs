use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Coarse classification shared by all core errors. The UI layer decides
/// what to do from the kind, the variants carry the detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    ResourceUnavailable,
    MalformedRow,
    MalformedInput,
    InvalidIndex,
    DeserializationFailure,
}

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Corpus resource unavailable at {path}: {source}")]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CorpusError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CorpusError::ResourceUnavailable { .. } => ErrorKind::ResourceUnavailable,
        }
    }
}

/// Why a corpus row was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    /// Number of columns found, six are required.
    ColumnCount(usize),
    InvalidSurahNumber(String),
    InvalidAyahNumber(String),
}

impl RowRejection {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::MalformedRow
    }
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowRejection::ColumnCount(n) => write!(f, "expected 6 columns, found {}", n),
            RowRejection::InvalidSurahNumber(s) => write!(f, "invalid surah number: '{}'", s),
            RowRejection::InvalidAyahNumber(s) => write!(f, "invalid ayah number: '{}'", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    // 1-based, the header is line 1
    pub line_number: usize,
    pub reason: RowRejection,
}

/// Failure points of the verse string parser. Each one is a distinct branch,
/// all of them are `MalformedInput`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerseParseError {
    #[error("Verse string has no parenthesized metadata")]
    MissingParentheses,
    #[error("Verse metadata must contain exactly one comma, found {0}")]
    CommaCount(usize),
    #[error("Surah clause must contain exactly one colon, found {0}")]
    ColonCount(usize),
    #[error("Invalid verse number: '{0}'")]
    InvalidVerseNumber(String),
}

impl VerseParseError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::MalformedInput
    }
}

#[derive(Error, Debug)]
pub enum BookmarkError {
    #[error("Bookmark index {index} is out of range for {len} bookmarks")]
    InvalidIndex { index: usize, len: usize },
    #[error("Bookmark data could not be decoded: {0}")]
    Deserialization(#[from] serde_json::Error),
    #[error("Bookmark storage failed: {0}")]
    Persistence(#[source] anyhow::Error),
}

impl BookmarkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookmarkError::InvalidIndex { .. } => ErrorKind::InvalidIndex,
            BookmarkError::Deserialization(_) => ErrorKind::DeserializationFailure,
            BookmarkError::Persistence(_) => ErrorKind::ResourceUnavailable,
        }
    }
}

/// The verse fields the search engine looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchField {
    #[serde(rename = "surah_name")]
    SurahName,
    #[serde(rename = "ayah_arabic")]
    AyahArabic,
    #[serde(rename = "ayah_english")]
    AyahEnglish,
    #[serde(rename = "emotion")]
    Emotion,
}

impl SearchField {
    pub const ALL: [SearchField; 4] = [
        SearchField::SurahName,
        SearchField::AyahArabic,
        SearchField::AyahEnglish,
        SearchField::Emotion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::SurahName => "surah_name",
            SearchField::AyahArabic => "ayah_arabic",
            SearchField::AyahEnglish => "ayah_english",
            SearchField::Emotion => "emotion",
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid SearchField value: {0}")]
pub struct ParseSearchFieldError(String);

impl FromStr for SearchField {
    type Err = ParseSearchFieldError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "surah_name" => Ok(SearchField::SurahName),
            "ayah_arabic" => Ok(SearchField::AyahArabic),
            "ayah_english" => Ok(SearchField::AyahEnglish),
            "emotion" => Ok(SearchField::Emotion),
            _ => Err(ParseSearchFieldError(s.to_string())),
        }
    }
}
