use std::hash::{Hash, Hasher};
use std::num::NonZeroU32;

use serde::{Serialize, Deserialize};
use uuid::Uuid;

/// One verse of the corpus, together with the emotion it was tagged with.
///
/// Fields can only be read. A changed value means a new record, and a new
/// record always gets a new `id`.
///
/// Equality and hashing look at the `id` alone. Two records with identical
/// text are still different bookmarks unless one is a clone of the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerseRecord {
    id: Uuid,
    // 0 when unknown, e.g. for verses recovered from a prediction string
    surah_no: u32,
    ayah_no: NonZeroU32,
    surah_name: String,
    #[serde(default)]
    ayah_arabic: String,
    emotion: String,
    ayah_english: String,
    #[serde(default)]
    surah_meaning: String,
}

/// Field values for building a [`VerseRecord`].
#[derive(Debug, Clone, Default)]
pub struct NewVerse {
    pub surah_no: u32,
    pub surah_name: String,
    pub ayah_arabic: String,
    pub emotion: String,
    pub ayah_english: String,
    pub surah_meaning: String,
}

impl VerseRecord {
    pub fn new(ayah_no: NonZeroU32, fields: NewVerse) -> Self {
        VerseRecord {
            id: Uuid::new_v4(),
            surah_no: fields.surah_no,
            ayah_no,
            surah_name: fields.surah_name,
            ayah_arabic: fields.ayah_arabic,
            emotion: fields.emotion,
            ayah_english: fields.ayah_english,
            surah_meaning: fields.surah_meaning,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn surah_no(&self) -> u32 {
        self.surah_no
    }

    pub fn ayah_no(&self) -> u32 {
        self.ayah_no.get()
    }

    pub fn surah_name(&self) -> &str {
        &self.surah_name
    }

    pub fn ayah_arabic(&self) -> &str {
        &self.ayah_arabic
    }

    pub fn emotion(&self) -> &str {
        &self.emotion
    }

    pub fn ayah_english(&self) -> &str {
        &self.ayah_english
    }

    pub fn surah_meaning(&self) -> &str {
        &self.surah_meaning
    }

    /// True when the surah number is the "unknown" sentinel.
    pub fn has_unknown_surah(&self) -> bool {
        self.surah_no == 0
    }

    /// A copy of this verse tagged with another emotion. The copy is a new
    /// record and does not share the original's id.
    pub fn with_emotion(&self, emotion: &str) -> Self {
        VerseRecord {
            id: Uuid::new_v4(),
            emotion: emotion.to_string(),
            ..self.clone()
        }
    }

    /// Compare every field except the id.
    pub fn same_content(&self, other: &VerseRecord) -> bool {
        self.surah_no == other.surah_no
            && self.ayah_no == other.ayah_no
            && self.surah_name == other.surah_name
            && self.ayah_arabic == other.ayah_arabic
            && self.emotion == other.emotion
            && self.ayah_english == other.ayah_english
            && self.surah_meaning == other.surah_meaning
    }

    /// `Al-Qasas 28:88`, or `Al-Qasas :88` when the surah number is unknown.
    pub fn reference(&self) -> String {
        if self.has_unknown_surah() {
            format!("{} :{}", self.surah_name, self.ayah_no)
        } else {
            format!("{} {}:{}", self.surah_name, self.surah_no, self.ayah_no)
        }
    }
}

impl PartialEq for VerseRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for VerseRecord {}

impl Hash for VerseRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
