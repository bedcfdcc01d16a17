use serde::{Serialize, Deserialize};

use crate::models::VerseRecord;
use crate::types::VerseParseError;
use crate::verse_parser::parse_verse_string;

/// Fewest words the client sends to the emotion classifier.
pub const DEFAULT_MIN_PREDICTION_WORDS: usize = 3;

/// Body of the emotion classifier's `/predict` answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_emotion: String,
    pub quranic_verse: String,
    // one entry per emotion class
    #[serde(default)]
    pub probabilities: Vec<f32>,
}

impl PredictionResponse {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Parse the suggested verse into a record tagged with the predicted emotion.
    pub fn to_verse_record(&self) -> Result<VerseRecord, VerseParseError> {
        parse_verse_string(&self.quranic_verse, &self.predicted_emotion)
    }
}

/// Whether `text` has enough words to be worth classifying.
pub fn is_prediction_input_ready(text: &str, min_words: usize) -> bool {
    text.split_whitespace().count() >= min_words
}
