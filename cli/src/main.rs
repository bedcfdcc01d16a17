use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use thiserror::Error;

use quranjar_backend::{init_app_data, AppData, VerseRecord};
use quranjar_backend::logger::set_log_level_str;
use quranjar_backend::prediction::PredictionResponse;
use quranjar_backend::search::matching_fields;
use quranjar_backend::types::SearchField;
use quranjar_backend::verse_parser::{parse_verse_string, render_verse_string};

#[derive(Error, Debug)]
enum CliError {
    #[error("Corpus file not found or unreadable: {0}")]
    CorpusUnavailable(PathBuf),
    #[error("No verses tagged with emotion '{0}'")]
    NoVersesForEmotion(String),
    #[error("Unknown log level '{0}', use silent, error, warn, info or debug")]
    InvalidLogLevel(String),
}

fn print_verse(index: Option<usize>, verse: &VerseRecord) {
    match index {
        Some(i) => println!("[{}] {} ({})", i, verse.reference(), verse.emotion()),
        None => println!("{} ({})", verse.reference(), verse.emotion()),
    }
    if !verse.ayah_arabic().is_empty() {
        println!("    {}", verse.ayah_arabic());
    }
    println!("    {}", verse.ayah_english());
}

fn require_corpus(app_data: &AppData) -> Result<()> {
    if !app_data.corpus_available() {
        let path = app_data.settings.corpus_path_in(&app_data.app_dir);
        return Err(CliError::CorpusUnavailable(path).into());
    }
    Ok(())
}

fn search_verses(
    app_data: &AppData,
    query: &str,
    fields: &[SearchField],
    print_fields: bool,
    print_count: bool,
) -> Result<()> {
    require_corpus(app_data)?;
    let results = app_data.search_fields(query, fields);

    for verse in results.iter() {
        print_verse(None, verse);
        if print_fields && !query.is_empty() {
            let fields: Vec<&str> = matching_fields(verse, query).iter().map(|f| f.as_str()).collect();
            println!("    matched: {}", fields.join(", "));
        }
    }
    if print_count {
        println!("{}", results.len());
    }

    Ok(())
}

fn verses_for_emotion(app_data: &AppData, emotion: &str, limit: Option<usize>) -> Result<()> {
    require_corpus(app_data)?;
    let verses = app_data.corpus().with_emotion(emotion);
    if verses.is_empty() {
        return Err(CliError::NoVersesForEmotion(emotion.to_string()).into());
    }

    for verse in verses.iter().take(limit.unwrap_or(usize::MAX)) {
        println!("{}", render_verse_string(verse));
    }

    Ok(())
}

fn parse_and_maybe_bookmark(app_data: &AppData, emotion: &str, verse_text: &str, bookmark: bool) -> Result<()> {
    let verse = if bookmark {
        app_data.bookmark_verse_string(verse_text, emotion)?
    } else {
        parse_verse_string(verse_text, emotion)?
    };

    println!("surah:   {}", verse.surah_name());
    println!("meaning: {}", verse.surah_meaning());
    println!("verse:   {}", verse.ayah_no());
    println!("emotion: {}", verse.emotion());
    println!("text:    {}", verse.ayah_english());
    if bookmark {
        println!("Bookmarked as #{}", app_data.bookmarks().len() - 1);
    }

    Ok(())
}

fn ingest_prediction(app_data: &AppData, path: &Path, bookmark: bool) -> Result<()> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let response = PredictionResponse::from_json(&json)
        .with_context(|| format!("{} is not a prediction response", path.display()))?;

    parse_and_maybe_bookmark(app_data, &response.predicted_emotion, &response.quranic_verse, bookmark)
}

fn print_stats(app_data: &AppData) -> Result<()> {
    require_corpus(app_data)?;
    let corpus = app_data.corpus();
    let counts = corpus.emotion_counts();

    println!("Verses: {}", corpus.len());
    for (emotion, count) in counts.iter() {
        let share = *count as f64 / corpus.len() as f64 * 100.0;
        println!("{:>12}: {:>6} ({:.1}%)", emotion, count, share);
    }

    let skipped = app_data.skipped_rows();
    if !skipped.is_empty() {
        println!("Skipped rows: {}", skipped.len());
        for row in skipped.iter() {
            println!("  line {}: {}", row.line_number, row.reason);
        }
    }

    Ok(())
}

fn run_bookmarks_command(app_data: &AppData, command: BookmarksCommand) -> Result<()> {
    match command {
        BookmarksCommand::List => {
            let bookmarks = app_data.bookmarks_snapshot();
            if bookmarks.is_empty() {
                println!("No bookmarks yet.");
            }
            for (i, verse) in bookmarks.iter().enumerate() {
                print_verse(Some(i), verse);
            }
        }
        BookmarksCommand::Add { surah_no, ayah_no, emotion } => {
            require_corpus(app_data)?;
            let (verse, added) = app_data.bookmark_corpus_verse(surah_no, ayah_no, emotion.as_deref())?;
            if added {
                println!("Bookmarked {} ({})", verse.reference(), verse.emotion());
            } else {
                println!("{} is already bookmarked", verse.reference());
            }
        }
        BookmarksCommand::Remove { indices } => {
            let indices: BTreeSet<usize> = indices.into_iter().collect();
            let removed = app_data.remove_bookmarks(&indices)?;
            println!("Removed {} bookmarks", removed.len());
        }
        BookmarksCommand::Clear => {
            app_data.clear_bookmarks()?;
            println!("Bookmarks cleared");
        }
        BookmarksCommand::Export => {
            println!("{}", app_data.bookmarks().serialize()?);
        }
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(author, version, about = "QuranJar CLI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory holding the corpus, settings and bookmarks.
    /// If not provided, the QURANJAR_DIR environment variable will be used.
    #[arg(long, global = true, value_name = "DIRECTORY_PATH", env = "QURANJAR_DIR")]
    quranjar_dir: Option<PathBuf>,

    /// silent, error, warn, info or debug
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search the surah name, Arabic text, English text and emotion of every verse
    Search {
        /// Case-insensitive text to look for. Empty lists every verse.
        #[arg(default_value = "")]
        query: String,

        /// Only look in this field: surah_name, ayah_arabic, ayah_english or emotion.
        /// Can be repeated.
        #[arg(long = "field", value_name = "FIELD")]
        fields: Vec<SearchField>,

        /// Show which fields matched
        #[arg(long, default_value_t = false)]
        print_fields: bool,

        /// Print the count of the results
        #[arg(long, default_value_t = true)]
        print_count: bool,
    },

    /// List verses tagged with an emotion, in the prediction service's format
    Emotion {
        emotion: String,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Parse a verse string returned by the emotion classifier
    #[command(arg_required_else_help = true)]
    Parse {
        /// The predicted emotion label
        emotion: String,

        /// e.g. "Some text (Surah Al-Qasas: The Stories, Verse 88)"
        verse: String,

        /// Also add the verse to the bookmarks
        #[arg(long, default_value_t = false)]
        bookmark: bool,
    },

    /// Parse a saved JSON response of the emotion classifier
    #[command(arg_required_else_help = true)]
    Prediction {
        #[arg(value_name = "FILE_PATH")]
        path: PathBuf,

        #[arg(long, default_value_t = false)]
        bookmark: bool,
    },

    /// Manage bookmarks
    #[command(subcommand)]
    Bookmarks(BookmarksCommand),

    /// Show the emotion distribution of the corpus and any skipped rows
    Stats,
}

#[derive(Subcommand, Debug)]
enum BookmarksCommand {
    List,
    /// Bookmark a corpus verse by its surah and ayah number
    #[command(arg_required_else_help = true)]
    Add {
        surah_no: u32,
        ayah_no: u32,

        /// Store the verse under this emotion instead of its corpus label
        #[arg(long)]
        emotion: Option<String>,
    },
    /// Remove bookmarks by their position in `bookmarks list`
    #[command(arg_required_else_help = true)]
    Remove {
        indices: Vec<usize>,
    },
    Clear,
    /// Print the stored JSON
    Export,
}

fn run(cli: Cli) -> Result<()> {
    if let Some(level) = &cli.log_level {
        if !set_log_level_str(level) {
            return Err(CliError::InvalidLogLevel(level.clone()).into());
        }
    }

    if let Some(dir) = &cli.quranjar_dir {
        if !dir.is_dir() {
            anyhow::bail!("Directory does not exist or is not a directory: {:?}", dir);
        }
    }

    let app_data = init_app_data(cli.quranjar_dir.clone())?;

    match cli.command {
        Commands::Search { query, fields, print_fields, print_count } => {
            search_verses(app_data, &query, &fields, print_fields, print_count)
        }
        Commands::Emotion { emotion, limit } => {
            verses_for_emotion(app_data, &emotion, limit)
        }
        Commands::Parse { emotion, verse, bookmark } => {
            parse_and_maybe_bookmark(app_data, &emotion, &verse, bookmark)
        }
        Commands::Prediction { path, bookmark } => {
            ingest_prediction(app_data, &path, bookmark)
        }
        Commands::Bookmarks(command) => {
            run_bookmarks_command(app_data, command)
        }
        Commands::Stats => print_stats(app_data),
    }
}

fn main() {
    // A .env file may define QURANJAR_DIR, clap picks it up via `env = "QURANJAR_DIR"`.
    dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}
