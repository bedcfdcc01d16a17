pub mod types;
pub mod models;
pub mod corpus;
pub mod verse_parser;
pub mod search;
pub mod bookmarks;
pub mod prediction;
pub mod app_settings;
pub mod app_data;
pub mod logger;

use std::env;
use std::fs::create_dir_all;
use std::path::PathBuf;

use anyhow::{Context, Result};
use app_dirs::{get_app_root, AppDataType, AppInfo};
use dotenvy::dotenv;

pub use app_data::{init_app_data, AppData};
pub use models::VerseRecord;

pub const APP_INFO: AppInfo = AppInfo{name: "quranjar", author: "quranjar"};

/// File name of the bundled verse dataset, looked up inside the app directory.
pub static CORPUS_FILE_NAME: &str = "quran_emotions_cleaned.csv";

/// File name of the single bookmark slot.
pub static BOOKMARKS_FILE_NAME: &str = "bookmarks.json";

pub static SETTINGS_FILE_NAME: &str = "settings.json";

pub fn get_create_quranjar_app_root() -> Result<PathBuf> {
    // AppDataType::UserData
    // - Linux: ~/.local/share/quranjar
    let p = get_app_root(AppDataType::UserData, &APP_INFO)
        .context("Can't determine the user data directory")?;
    if !p.exists() {
        create_dir_all(&p).with_context(|| format!("Can't create {}", p.display()))?;
    }
    Ok(p)
}

/// Resolve the directory holding the corpus, settings, bookmarks and logs.
///
/// Precedence:
/// - the QURANJAR_DIR env var (also read from a .env file)
/// - the platform user data dir
pub fn get_create_quranjar_dir() -> Result<PathBuf> {
    dotenv().ok();

    let p = match env::var("QURANJAR_DIR") {
        Ok(s) if !s.trim().is_empty() => PathBuf::from(s),
        _ => get_create_quranjar_app_root()?,
    };

    if !p.exists() {
        create_dir_all(&p).with_context(|| format!("Can't create {}", p.display()))?;
    }
    Ok(p)
}
