use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

use crate::get_create_quranjar_dir;

/// Number of rotated `log.*.txt` files kept next to `log.txt`.
const KEEP_ROTATED_LOGS: usize = 5;

/// Log levels representing increasing verbosity.
///
/// Setting a level enables that level and every less verbose one:
///
/// - **Silent (0)**: nothing is logged
/// - **Error (1)**: only errors
/// - **Warn (2)**: warnings and errors
/// - **Info (3)**: info, warnings and errors (default)
/// - **Debug (4)**: everything
///
/// The level is read from the `LOG_LEVEL` environment variable and can be
/// changed at runtime with `set_log_level()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Silent = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl Level {
    /// Parse a level name, case insensitive. Returns None for unknown names.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "silent" => Some(Level::Silent),
            "error" => Some(Level::Error),
            "warn" => Some(Level::Warn),
            "info" => Some(Level::Info),
            "debug" => Some(Level::Debug),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Silent => "Silent",
            Level::Error => "Error",
            Level::Warn => "Warn",
            Level::Info => "Info",
            Level::Debug => "Debug",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            Level::Silent => "",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Move an existing log file aside as `log.<modified time>.txt` and prune
/// the oldest rotated files.
fn rotate_log_files(log_file: &Path) -> Result<()> {
    match log_file.try_exists() {
        Ok(true) => {}
        // Nothing to rotate, or no permission to look.
        Ok(false) | Err(_) => return Ok(()),
    }

    let modified = std::fs::metadata(log_file)?.modified()?;
    let datetime: DateTime<Local> = modified.into();
    let timestamp = datetime.format("%Y-%m-%dT%H-%M-%S");

    let parent = log_file.parent().context("Log file has no parent directory")?;
    std::fs::rename(log_file, parent.join(format!("log.{}.txt", timestamp)))?;

    let mut rotated: Vec<PathBuf> = std::fs::read_dir(parent)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|name| name.starts_with("log.") && name.ends_with(".txt") && name != "log.txt")
                .unwrap_or(false)
        })
        .collect();

    // The timestamped names sort chronologically.
    rotated.sort();

    if rotated.len() > KEEP_ROTATED_LOGS {
        for file in &rotated[0..rotated.len() - KEEP_ROTATED_LOGS] {
            if let Err(e) = std::fs::remove_file(file) {
                eprintln!("Failed to remove old log file {:?}: {}", file, e);
            }
        }
    }

    Ok(())
}

pub struct Logger {
    log_file: Option<PathBuf>,
    enable_print_log: bool,
    level: Mutex<Level>,
}

impl Logger {
    /// Logger writing to `log.txt` inside `dir`. The previous log is rotated.
    ///
    /// `DISABLE_LOG=true` turns off the file, `ENABLE_PRINT_LOG=true` also
    /// sends each message through `tracing`, `LOG_LEVEL` sets the level.
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log dir {}", dir.display()))?;
        let log_file = dir.join("log.txt");

        if let Err(e) = rotate_log_files(&log_file) {
            eprintln!("Failed to rotate log files: {}", e);
        }

        let level = std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|v| Level::from_name(&v))
            .unwrap_or(Level::Info);

        Ok(Logger {
            log_file: if env_flag("DISABLE_LOG") { None } else { Some(log_file) },
            enable_print_log: env_flag("ENABLE_PRINT_LOG"),
            level: Mutex::new(level),
        })
    }

    /// A logger that drops every message. Used when the log dir can't be created.
    pub fn disabled() -> Self {
        Logger {
            log_file: None,
            enable_print_log: false,
            level: Mutex::new(Level::Silent),
        }
    }

    pub fn init_tracing() -> Result<()> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_ids(true)
            .with_file(false)
            .with_line_number(false)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .context("Tracing subscriber was already set")?;

        Ok(())
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    fn write_to_file(&self, message: &str) -> Result<()> {
        let Some(log_file) = &self.log_file else {
            return Ok(());
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3fZ");
        file.write_all(format!("[{}] {}\n", timestamp, message).as_bytes())?;

        Ok(())
    }

    pub fn log(&self, level: Level, msg: &str) {
        if level == Level::Silent || *self.level.lock() < level {
            return;
        }

        if self.enable_print_log {
            match level {
                Level::Error => tracing::error!("{}", msg),
                Level::Warn => tracing::warn!("{}", msg),
                Level::Info => tracing::info!("{}", msg),
                Level::Debug => tracing::debug!("{}", msg),
                Level::Silent => {}
            }
        }

        if let Err(e) = self.write_to_file(&format!("{}: {}", level.prefix(), msg)) {
            eprintln!("Failed to write to log file: {}", e);
        }
    }

    pub fn get_level(&self) -> Level {
        *self.level.lock()
    }

    pub fn set_level(&self, new_level: Level) {
        *self.level.lock() = new_level;
    }
}

pub static LOGGER: OnceLock<Logger> = OnceLock::new();
static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

fn with_logger<F, R>(f: F) -> R
where
    F: FnOnce(&Logger) -> R,
{
    TRACING_INITIALIZED.get_or_init(|| {
        if let Err(e) = Logger::init_tracing() {
            eprintln!("Failed to initialize tracing: {}", e);
        }
    });

    let logger = LOGGER.get_or_init(|| {
        match get_create_quranjar_dir().and_then(|dir| Logger::new(&dir)) {
            Ok(logger) => logger,
            Err(e) => {
                eprintln!("Failed to create logger: {}", e);
                Logger::disabled()
            }
        }
    });

    f(logger)
}

pub fn info(msg: &str) {
    with_logger(|logger| logger.log(Level::Info, msg));
}

pub fn warn(msg: &str) {
    with_logger(|logger| logger.log(Level::Warn, msg));
}

pub fn error(msg: &str) {
    with_logger(|logger| logger.log(Level::Error, msg));
}

pub fn debug(msg: &str) {
    with_logger(|logger| logger.log(Level::Debug, msg));
}

pub fn get_log_level() -> Level {
    with_logger(|logger| logger.get_level())
}

pub fn set_log_level(level: Level) {
    with_logger(|logger| logger.set_level(level));
}

/// Set the level from a name like "debug" or "WARN". Returns false for
/// unknown names and leaves the level unchanged.
pub fn set_log_level_str(level_str: &str) -> bool {
    match Level::from_name(level_str) {
        Some(level) => {
            set_log_level(level);
            true
        }
        None => false,
    }
}
