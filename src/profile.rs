//! User profile persistence
//!
//! All profiles live in one JSON object keyed by user id. Every write
//! re-reads the whole file, replaces one record and writes the file back.
//! There is no locking; one active session per profile is assumed.

use crate::classifier::EmotionTag;
use crate::logging;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_USER_ID: &str = "default_user";
pub const DEFAULT_MEMORY_FILE: &str = "memory/user_memory.json";

/// Prefixes marking conversation lines in `contexts`
pub const USER_LINE_PREFIX: &str = "User: ";
pub const COMPANION_LINE_PREFIX: &str = "Companion: ";

/// Context entries handed to the model as recent history
pub const HISTORY_WINDOW: usize = 10;
/// Free-text notes included in the profile summary
const SUMMARY_NOTES: usize = 5;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EmotionLogEntry {
    pub emotion: String,
    #[serde(alias = "time")]
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct UserProfile {
    pub name: Option<String>,
    pub age: Option<String>,
    pub contexts: Vec<String>,
    pub helpful_actions: Vec<String>,
    pub last_session_summary: String,
    pub emotion_log: Vec<EmotionLogEntry>,
}

/// Optional field updates; empty values are ignored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub age: Option<String>,
    pub context: Option<String>,
    pub helpful_action: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn push_unique(list: &mut Vec<String>, entry: &str) -> bool {
    if list.iter().any(|existing| existing == entry) {
        false
    } else {
        list.push(entry.to_string());
        true
    }
}

impl UserProfile {
    /// Append a context entry unless the exact string is already present
    pub fn add_context(&mut self, context: &str) -> bool {
        push_unique(&mut self.contexts, context)
    }

    pub fn add_helpful_action(&mut self, action: &str) -> bool {
        push_unique(&mut self.helpful_actions, action)
    }

    pub fn log_emotion(&mut self, emotion: EmotionTag) {
        self.emotion_log.push(EmotionLogEntry {
            emotion: emotion.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        });
    }

    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(name) = non_empty(update.name.as_ref()) {
            self.name = Some(name.to_string());
        }
        if let Some(age) = non_empty(update.age.as_ref()) {
            self.age = Some(age.to_string());
        }
        if let Some(context) = non_empty(update.context.as_ref()) {
            self.add_context(context);
        }
        if let Some(action) = non_empty(update.helpful_action.as_ref()) {
            self.add_helpful_action(action);
        }
    }

    /// Last `n` context entries in insertion order
    pub fn recent_contexts(&self, n: usize) -> &[String] {
        let start = self.contexts.len().saturating_sub(n);
        &self.contexts[start..]
    }

    /// Free-text notes, i.e. contexts that are not conversation lines
    pub fn notes(&self) -> impl Iterator<Item = &String> {
        self.contexts.iter().filter(|c| {
            !c.starts_with(USER_LINE_PREFIX) && !c.starts_with(COMPANION_LINE_PREFIX)
        })
    }

    /// One-paragraph background for the model prompt
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if let Some(name) = non_empty(self.name.as_ref()) {
            parts.push(format!("Name: {}.", name));
        }
        if let Some(age) = non_empty(self.age.as_ref()) {
            parts.push(format!("Age: {}.", age));
        }

        let notes: Vec<&String> = self.notes().collect();
        if !notes.is_empty() {
            let start = notes.len().saturating_sub(SUMMARY_NOTES);
            let background = notes[start..]
                .iter()
                .map(|n| n.trim_end_matches('.'))
                .collect::<Vec<_>>()
                .join("; ");
            parts.push(format!("Background: {}.", background));
        }

        if parts.is_empty() {
            "First-time user.".to_string()
        } else {
            parts.join(" ")
        }
    }
}

// ============ Store ============

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Profile storage I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Profile storage at {} is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Keyed whole-record profile persistence
pub trait ProfileStore {
    /// Returns a default-shaped profile if the user is unknown
    fn load(&self, user_id: &str) -> Result<UserProfile, ProfileError>;

    fn save(&self, user_id: &str, profile: &UserProfile) -> Result<(), ProfileError>;
}

#[derive(Debug, Clone)]
pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> ProfileError {
        ProfileError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn json_error(&self, source: serde_json::Error) -> ProfileError {
        ProfileError::Json {
            path: self.path.clone(),
            source,
        }
    }

    /// Create the parent directory and an empty mapping if missing
    fn init(&self) -> Result<(), ProfileError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }
        if !self.path.exists() {
            fs::write(&self.path, "{}").map_err(|e| self.io_error(e))?;
        }
        Ok(())
    }

    fn load_all(&self) -> Result<Map<String, Value>, ProfileError> {
        self.init()?;
        let raw = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        serde_json::from_str(&raw).map_err(|e| self.json_error(e))
    }

    fn save_all(&self, data: &Map<String, Value>) -> Result<(), ProfileError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        data.serialize(&mut serializer).map_err(|e| self.json_error(e))?;
        fs::write(&self.path, buf).map_err(|e| self.io_error(e))
    }
}

impl ProfileStore for JsonProfileStore {
    fn load(&self, user_id: &str) -> Result<UserProfile, ProfileError> {
        let mut data = self.load_all()?;
        match data.remove(user_id) {
            Some(record) => serde_json::from_value(record).map_err(|e| self.json_error(e)),
            None => Ok(UserProfile::default()),
        }
    }

    fn save(&self, user_id: &str, profile: &UserProfile) -> Result<(), ProfileError> {
        let mut data = self.load_all()?;
        let record = serde_json::to_value(profile).map_err(|e| self.json_error(e))?;
        data.insert(user_id.to_string(), record);
        self.save_all(&data)?;

        logging::log_profile(Some(user_id), &format!(
            "Saved profile: {} contexts, {} emotion entries",
            profile.contexts.len(),
            profile.emotion_log.len()
        ));
        Ok(())
    }
}

/// Load, apply an update and write back
pub fn update_user_profile(
    store: &dyn ProfileStore,
    user_id: &str,
    update: &ProfileUpdate,
) -> Result<UserProfile, ProfileError> {
    let mut profile = store.load(user_id)?;
    profile.apply(update);
    store.save(user_id, &profile)?;
    Ok(profile)
}
