//! Structured logging module for InnerCompanion
//!
//! Writes logs to the configured log directory with categories:
//! - CLASSIFY: Keyword classifier results
//! - PHASE: Response phase decisions
//! - GENERATION: Model calls and template fallbacks
//! - PROFILE: Profile reads and writes
//! - SESSION: Session lifecycle
//! - ERROR: Errors and degraded turns

use chrono::{DateTime, Local, Utc};
use once_cell::sync::Lazy;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Log categories for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    Classify,
    Phase,
    Generation,
    Profile,
    Session,
    Error,
}

impl LogCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Classify => "CLASSIFY",
            LogCategory::Phase => "PHASE",
            LogCategory::Generation => "GENERATION",
            LogCategory::Profile => "PROFILE",
            LogCategory::Session => "SESSION",
            LogCategory::Error => "ERROR",
        }
    }
}

/// Log directory, set once by `init_logging`. Logging is a no-op until then.
static LOG_DIR: Lazy<Mutex<Option<PathBuf>>> = Lazy::new(|| Mutex::new(None));

fn current_log_dir() -> Option<PathBuf> {
    LOG_DIR.lock().ok().and_then(|dir| dir.clone())
}

/// Initialize the logging system - creates log directory if needed
pub fn init_logging(log_dir: &Path) -> std::io::Result<()> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)?;
    }

    if let Ok(mut dir) = LOG_DIR.lock() {
        *dir = Some(log_dir.to_path_buf());
    }

    log(LogCategory::Session, None, "InnerCompanion logging initialized");

    Ok(())
}

/// Format a single log line
pub fn format_line(category: LogCategory, user_id: Option<&str>, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let user_context = user_id
        .map(|id| format!("user={} | ", id))
        .unwrap_or_default();

    format!(
        "[{}] [{}] {}{}\n",
        timestamp,
        category.as_str(),
        user_context,
        message
    )
}

/// Log a message with category and optional user context
pub fn log(category: LogCategory, user_id: Option<&str>, message: &str) {
    let Some(log_dir) = current_log_dir() else {
        return;
    };

    let log_line = format_line(category, user_id, message);

    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path(&log_dir))
    {
        let _ = file.write_all(log_line.as_bytes());
    }
}

pub fn log_classify(user_id: Option<&str>, message: &str) {
    log(LogCategory::Classify, user_id, message);
}

pub fn log_phase(user_id: Option<&str>, message: &str) {
    log(LogCategory::Phase, user_id, message);
}

pub fn log_generation(user_id: Option<&str>, message: &str) {
    log(LogCategory::Generation, user_id, message);
}

pub fn log_profile(user_id: Option<&str>, message: &str) {
    log(LogCategory::Profile, user_id, message);
}

pub fn log_session(user_id: Option<&str>, message: &str) {
    log(LogCategory::Session, user_id, message);
}

pub fn log_error(user_id: Option<&str>, message: &str) {
    log(LogCategory::Error, user_id, message);
}

const LOG_FILE_PREFIX: &str = "companion-";
const LOG_FILE_SUFFIX: &str = ".log";

/// Get today's log file path inside `log_dir`
fn log_file_path(log_dir: &Path) -> PathBuf {
    let today = Local::now().format("%Y-%m-%d").to_string();
    log_dir.join(format!("{}{}{}", LOG_FILE_PREFIX, today, LOG_FILE_SUFFIX))
}

fn is_log_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX) && name.ends_with(LOG_FILE_SUFFIX))
}

/// Clean up old log files (keep last 7 days)
pub fn cleanup_old_logs() -> std::io::Result<usize> {
    match current_log_dir() {
        Some(log_dir) => cleanup_logs_in(&log_dir, Utc::now() - chrono::Duration::days(7)),
        None => Ok(0),
    }
}

/// Delete `companion-*.log` files in `log_dir` last modified before `cutoff`.
/// Other files in the directory are never touched.
fn cleanup_logs_in(log_dir: &Path, cutoff: DateTime<Utc>) -> std::io::Result<usize> {
    let mut deleted = 0;

    if !log_dir.exists() {
        return Ok(0);
    }

    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !is_log_file(&path) {
            continue;
        }

        if let Ok(metadata) = entry.metadata() {
            if let Ok(modified) = metadata.modified() {
                let modified_time: DateTime<Utc> = modified.into();
                if modified_time < cutoff && fs::remove_file(&path).is_ok() {
                    deleted += 1;
                }
            }
        }
    }

    Ok(deleted)
}
