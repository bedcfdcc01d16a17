//! Recover a [`VerseRecord`] from the prediction service's verse string.
//!
//! The service answers with an English translation followed by a
//! parenthesized reference:
//!
//! ```text
//! Everything will perish except His Face. (Surah Al-Qasas: The Stories, Verse 88)
//! ```
//!
//! The string carries neither the surah number nor the Arabic text, so those
//! come back as `0` and `""`.

use std::num::NonZeroU32;

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{NewVerse, VerseRecord};
use crate::types::VerseParseError;

lazy_static! {
    // Text up to the first '(', then everything up to the first ')' after it.
    static ref RE_VERSE_ENVELOPE: Regex = Regex::new(
        r"(?s)^(?P<text>[^(]*)\((?P<metadata>[^)]*)\)"
    ).unwrap();

    // Surah Al-Qasas: The Stories
    static ref RE_SURAH_CLAUSE: Regex = Regex::new(
        r"(?s)^\s*(?:Surah )?(?P<name>[^:]*):(?P<meaning>[^:]*)$"
    ).unwrap();

    // Verse 88
    static ref RE_VERSE_CLAUSE: Regex = Regex::new(
        r"(?s)^\s*(?:Verse )?\s*(?P<number>.*?)\s*$"
    ).unwrap();
}

/// Parse `"<english> (Surah <name>: <meaning>, Verse <n>)"` into a new record
/// tagged with `emotion`.
///
/// Fails without producing a partial record when the parentheses are missing,
/// the metadata doesn't have exactly one comma, the surah clause doesn't have
/// exactly one colon, or the verse number isn't a positive integer.
pub fn parse_verse_string(verse_text: &str, emotion: &str) -> Result<VerseRecord, VerseParseError> {
    let envelope = RE_VERSE_ENVELOPE
        .captures(verse_text)
        .ok_or(VerseParseError::MissingParentheses)?;

    let ayah_english = envelope["text"].trim().to_string();
    let metadata = &envelope["metadata"];

    let clauses: Vec<&str> = metadata.split(',').collect();
    if clauses.len() != 2 {
        return Err(VerseParseError::CommaCount(clauses.len() - 1));
    }

    let surah = RE_SURAH_CLAUSE
        .captures(clauses[0])
        .ok_or_else(|| VerseParseError::ColonCount(clauses[0].matches(':').count()))?;

    let surah_name = surah["name"].trim().to_string();
    let surah_meaning = surah["meaning"].trim().to_string();

    let number = RE_VERSE_CLAUSE
        .captures(clauses[1])
        .map(|c| c["number"].to_string())
        .unwrap_or_default();

    let ayah_no = number
        .parse::<NonZeroU32>()
        .map_err(|_| VerseParseError::InvalidVerseNumber(clauses[1].trim().to_string()))?;

    Ok(VerseRecord::new(
        ayah_no,
        NewVerse {
            surah_no: 0,
            surah_name,
            ayah_arabic: String::new(),
            emotion: emotion.to_string(),
            ayah_english,
            surah_meaning,
        },
    ))
}

/// Render a record in the prediction service's format.
pub fn render_verse_string(verse: &VerseRecord) -> String {
    format!(
        "{} (Surah {}: {}, Verse {})",
        verse.ayah_english(),
        verse.surah_name(),
        verse.surah_meaning(),
        verse.ayah_no(),
    )
}
