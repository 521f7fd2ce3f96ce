//! Shared fixtures: a transport that records every outbound call and a
//! geocoder with a fixed answer.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use teloxide::types::{ChatId, InlineKeyboardButtonKind, InlineKeyboardMarkup, MessageId};

use dequa_bot::bot::{Command, ConversationEngine, Event, Transport};
use dequa_bot::geocoding::{AddressResult, Coordinates, Geocoder};
use dequa_bot::localization::LocalizationManager;
use dequa_bot::settings::SettingsStore;

pub const BASE_URL: &str = "https://www.dequa.it/";
pub const CHAT: ChatId = ChatId(4242);
pub const MENU_MESSAGE: MessageId = MessageId(17);

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text {
        chat_id: ChatId,
        text: String,
    },
    Keyboard {
        chat_id: ChatId,
        text: String,
        keyboard: InlineKeyboardMarkup,
    },
    Edit {
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    Location {
        chat_id: ChatId,
        latitude: f64,
        longitude: f64,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    CallbackAnswer,
}

/// Records outbound calls; keyboards get ids counting up from `MENU_MESSAGE`
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    next_message_id: Mutex<i32>,
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            next_message_id: Mutex::new(MENU_MESSAGE.0),
        }
    }
}

impl RecordingTransport {
    /// Everything sent so far, clearing the record
    pub fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    fn push(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(&self, chat_id: ChatId, text: String) -> Result<()> {
        self.push(Sent::Text { chat_id, text });
        Ok(())
    }

    async fn send_keyboard(
        &self,
        chat_id: ChatId,
        text: String,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<MessageId> {
        self.push(Sent::Keyboard {
            chat_id,
            text,
            keyboard,
        });

        let mut next = self.next_message_id.lock().unwrap();
        let message_id = MessageId(*next);
        *next += 1;
        Ok(message_id)
    }

    async fn edit_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        self.push(Sent::Edit {
            chat_id,
            message_id,
            text,
            keyboard,
        });
        Ok(())
    }

    async fn send_location(
        &self,
        chat_id: ChatId,
        latitude: f64,
        longitude: f64,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        self.push(Sent::Location {
            chat_id,
            latitude,
            longitude,
            keyboard,
        });
        Ok(())
    }

    async fn answer_callback(&self) -> Result<()> {
        self.push(Sent::CallbackAnswer);
        Ok(())
    }
}

/// Geocoder that always gives the same answer and remembers every query
pub struct ScriptedGeocoder {
    result: AddressResult,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGeocoder {
    pub fn found(latitude: f64, longitude: f64) -> Self {
        Self::new(AddressResult::Found(Coordinates {
            latitude,
            longitude,
        }))
    }

    pub fn not_found() -> Self {
        Self::new(AddressResult::NotFound)
    }

    fn new(result: AddressResult) -> Self {
        Self {
            result,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    async fn lookup(&self, address: &str) -> AddressResult {
        self.calls.lock().unwrap().push(address.to_string());
        self.result
    }
}

pub fn locales_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("locales")
}

pub fn load_localization() -> LocalizationManager {
    LocalizationManager::load(locales_dir()).expect("Failed to load locales")
}

/// Engine with real catalogs and a settings file inside a fresh temp dir
pub fn engine_with(geocoder: Arc<dyn Geocoder>) -> (ConversationEngine, TempDir) {
    engine_with_settings_at(geocoder, "settings.json")
}

/// Like [`engine_with`], with the settings file at `relative_path` inside
/// the temp dir. Parent directories are not created.
pub fn engine_with_settings_at(
    geocoder: Arc<dyn Geocoder>,
    relative_path: &str,
) -> (ConversationEngine, TempDir) {
    let dir = TempDir::new().unwrap();
    let settings = SettingsStore::open(dir.path().join(relative_path)).unwrap();
    let engine = ConversationEngine::new(
        Arc::new(load_localization()),
        Arc::new(settings),
        geocoder,
        BASE_URL,
    );
    (engine, dir)
}

pub fn command(text: &str) -> Event {
    command_from(text, None)
}

pub fn command_from(text: &str, user_language: Option<&str>) -> Event {
    Event::Command {
        chat_id: CHAT,
        command: Command::parse(text).expect("not a command"),
        user_language: user_language.map(str::to_string),
    }
}

pub fn text(text: &str) -> Event {
    Event::Text {
        chat_id: CHAT,
        text: text.to_string(),
    }
}

/// Press a button on the first settings menu
pub fn button(data: &str) -> Event {
    button_on(MENU_MESSAGE, data)
}

pub fn button_on(message_id: MessageId, data: &str) -> Event {
    Event::Button {
        chat_id: CHAT,
        message_id,
        data: data.to_string(),
    }
}

/// Callback data of every button, row by row
pub fn callback_data(keyboard: &InlineKeyboardMarkup) -> Vec<String> {
    keyboard
        .inline_keyboard
        .iter()
        .flatten()
        .filter_map(|button| match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
            _ => None,
        })
        .collect()
}

/// URL of the first URL button
pub fn first_url(keyboard: &InlineKeyboardMarkup) -> Option<String> {
    keyboard
        .inline_keyboard
        .iter()
        .flatten()
        .find_map(|button| match &button.kind {
            InlineKeyboardButtonKind::Url(url) => Some(url.to_string()),
            _ => None,
        })
}
