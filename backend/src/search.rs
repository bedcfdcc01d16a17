use crate::models::VerseRecord;
use crate::types::SearchField;

fn field_value(verse: &VerseRecord, field: SearchField) -> &str {
    match field {
        SearchField::SurahName => verse.surah_name(),
        SearchField::AyahArabic => verse.ayah_arabic(),
        SearchField::AyahEnglish => verse.ayah_english(),
        SearchField::Emotion => verse.emotion(),
    }
}

/// Lowercase once per query, not once per verse.
///
/// This is `str::to_lowercase`, which maps each char on its own. Foldings
/// that change length don't apply, so "strasse" doesn't find "Straße".
fn normalize_query(query: &str) -> String {
    query.to_lowercase()
}

fn field_contains(verse: &VerseRecord, field: SearchField, normalized_query: &str) -> bool {
    field_value(verse, field).to_lowercase().contains(normalized_query)
}

/// Fields of `verse` containing `query`, case-insensitively.
pub fn matching_fields(verse: &VerseRecord, query: &str) -> Vec<SearchField> {
    let normalized_query = normalize_query(query);
    SearchField::ALL
        .into_iter()
        .filter(|field| field_contains(verse, *field, &normalized_query))
        .collect()
}

pub fn verse_matches(verse: &VerseRecord, query: &str) -> bool {
    let normalized_query = normalize_query(query);
    SearchField::ALL
        .iter()
        .any(|field| field_contains(verse, *field, &normalized_query))
}

/// Verses where `query` is a case-insensitive substring of the surah name,
/// Arabic text, English text or emotion label.
///
/// An empty query returns every verse. Results keep the corpus order.
pub fn search<'a>(verses: &'a [VerseRecord], query: &str) -> Vec<&'a VerseRecord> {
    search_in_fields(verses, query, &SearchField::ALL)
}

/// Like `search()`, looking only at `fields`. No fields means all of them.
pub fn search_in_fields<'a>(verses: &'a [VerseRecord], query: &str, fields: &[SearchField]) -> Vec<&'a VerseRecord> {
    if query.is_empty() {
        return verses.iter().collect();
    }

    let all = SearchField::ALL;
    let fields = if fields.is_empty() { &all[..] } else { fields };
    let normalized_query = normalize_query(query);

    verses
        .iter()
        .filter(|verse| {
            fields
                .iter()
                .any(|field| field_contains(verse, *field, &normalized_query))
        })
        .collect()
}
