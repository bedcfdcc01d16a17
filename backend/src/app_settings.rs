use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Serialize, Deserialize};

use crate::logger::warn;
use crate::prediction::DEFAULT_MIN_PREDICTION_WORDS;
use crate::{BOOKMARKS_FILE_NAME, CORPUS_FILE_NAME, SETTINGS_FILE_NAME};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Relative paths are resolved against the app directory.
    pub corpus_path: PathBuf,
    pub bookmarks_file: PathBuf,
    pub min_prediction_words: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            corpus_path: PathBuf::from(CORPUS_FILE_NAME),
            bookmarks_file: PathBuf::from(BOOKMARKS_FILE_NAME),
            min_prediction_words: DEFAULT_MIN_PREDICTION_WORDS,
        }
    }
}

impl AppSettings {
    /// Read `settings.json` from `app_dir`. A missing file gives the
    /// defaults, so does a file that doesn't parse (with a warning).
    pub fn load_or_default(app_dir: &Path) -> Self {
        let path = app_dir.join(SETTINGS_FILE_NAME);
        if !path.exists() {
            return AppSettings::default();
        }

        match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => settings,
                Err(e) => {
                    warn(&format!("Ignoring invalid {}: {}", path.display(), e));
                    AppSettings::default()
                }
            },
            Err(e) => {
                warn(&format!("Can't read {}: {}", path.display(), e));
                AppSettings::default()
            }
        }
    }

    pub fn save(&self, app_dir: &Path) -> Result<()> {
        let path = app_dir.join(SETTINGS_FILE_NAME);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn corpus_path_in(&self, app_dir: &Path) -> PathBuf {
        app_dir.join(&self.corpus_path)
    }

    pub fn bookmarks_path_in(&self, app_dir: &Path) -> PathBuf {
        app_dir.join(&self.bookmarks_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let settings = AppSettings::load_or_default(dir.path());
        assert_eq!(settings, AppSettings::default());
        assert_eq!(settings.corpus_path_in(dir.path()), dir.path().join(CORPUS_FILE_NAME));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE_NAME), r#"{"min_prediction_words": 5}"#).unwrap();
        let settings = AppSettings::load_or_default(dir.path());
        assert_eq!(settings.min_prediction_words, 5);
        assert_eq!(settings.bookmarks_file, PathBuf::from(BOOKMARKS_FILE_NAME));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let settings = AppSettings {
            corpus_path: PathBuf::from("/data/verses.csv"),
            ..Default::default()
        };
        settings.save(dir.path()).unwrap();
        let loaded = AppSettings::load_or_default(dir.path());
        assert_eq!(loaded, settings);
        // absolute paths are kept as they are
        assert_eq!(loaded.corpus_path_in(dir.path()), PathBuf::from("/data/verses.csv"));
    }
}
