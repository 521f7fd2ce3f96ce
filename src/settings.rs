//! Per-chat settings persisted to a JSON file.
//!
//! The whole map is rewritten on every mutation. Writes go to a temporary
//! file in the same directory which is then renamed over the target, so a
//! crash mid-write never leaves a truncated settings file behind.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::localization::Language;

/// Preferences stored for a single chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSettings {
    pub language: Language,
    pub updated_at: DateTime<Utc>,
}

pub struct SettingsStore {
    path: PathBuf,
    chats: Mutex<HashMap<i64, ChatSettings>>,
}

impl SettingsStore {
    /// Open the store at `path`, loading any previously saved settings.
    ///
    /// A missing file starts an empty store; an unreadable or malformed one
    /// is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let chats = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str::<HashMap<i64, ChatSettings>>(&content)
                .with_context(|| format!("Malformed settings file {}", path.display()))?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "No settings file yet, starting empty");
                HashMap::new()
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read settings file {}", path.display()))
            }
        };

        info!(path = %path.display(), chats = chats.len(), "Settings store opened");
        Ok(Self {
            path,
            chats: Mutex::new(chats),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Language for the chat, falling back to the default when unset
    pub fn language(&self, chat_id: i64) -> Language {
        self.stored_language(chat_id).unwrap_or(Language::DEFAULT)
    }

    /// Language explicitly stored for the chat, if any
    pub fn stored_language(&self, chat_id: i64) -> Option<Language> {
        self.lock().get(&chat_id).map(|settings| settings.language)
    }

    pub fn get(&self, chat_id: i64) -> Option<ChatSettings> {
        self.lock().get(&chat_id).cloned()
    }

    /// Store the language named by `code`.
    ///
    /// Unknown codes are replaced by the default language. Returns the
    /// language actually stored.
    pub fn set_language(&self, chat_id: i64, code: &str) -> Result<Language> {
        let language = match Language::from_code(code) {
            Some(language) => language,
            None => {
                warn!(chat_id, code, "Unknown language code, using default");
                Language::DEFAULT
            }
        };

        self.set(chat_id, language)?;
        Ok(language)
    }

    /// Store `language` for the chat.
    ///
    /// The in-memory map only changes once the file write succeeded, so a
    /// failed write leaves both exactly as they were.
    pub fn set(&self, chat_id: i64, language: Language) -> Result<()> {
        let mut chats = self.lock();

        let mut updated = chats.clone();
        updated.insert(
            chat_id,
            ChatSettings {
                language,
                updated_at: Utc::now(),
            },
        );
        self.flush(&updated)?;
        *chats = updated;

        debug!(chat_id, language = %language, "Chat language updated");
        Ok(())
    }

    /// Store the language reported by the Telegram client, unless the chat
    /// already has a selection. Returns the chat's effective language.
    pub fn seed_language(&self, chat_id: i64, user_language: Option<&str>) -> Result<Language> {
        if let Some(language) = self.stored_language(chat_id) {
            return Ok(language);
        }

        let language = Language::from_code_or_default(user_language);
        self.set(chat_id, language)?;
        Ok(language)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i64, ChatSettings>> {
        // The map is always left consistent, a poisoned lock is still usable
        self.chats.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Blocking write, done under the lock so writers from different chats
    /// cannot reorder. The file holds one small entry per chat.
    fn flush(&self, chats: &HashMap<i64, ChatSettings>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let json = serde_json::to_vec_pretty(chats).context("Failed to serialize settings")?;

        let mut temp_file = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        temp_file
            .write_all(&json)
            .context("Failed to write settings")?;
        temp_file
            .persist(&self.path)
            .with_context(|| format!("Failed to save settings to {}", self.path.display()))?;

        Ok(())
    }
}
