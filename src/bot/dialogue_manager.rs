//! Dialogue Manager module: the address search and settings flows.
//!
//! [`ConversationEngine`] consumes one [`Event`] at a time and answers through
//! a [`Transport`]. Per-chat flow state lives in teloxide in-memory dialogue
//! storage; the chat language comes from the [`SettingsStore`].

use anyhow::Result;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::types::{ChatId, MessageId};
use tracing::{debug, error, info, warn};

use crate::dialogue::{finish, normalize_address, AddressDialogue, AddressState, SettingsDialogue, SettingsState};
use crate::geocoding::{map_url, AddressResult, Geocoder};
use crate::localization::{Language, LocalizationManager};
use crate::settings::SettingsStore;

use super::commands::Command;
use super::transport::Transport;
use super::ui_builder::{
    create_language_keyboard, create_language_updated_keyboard, create_open_map_keyboard,
    create_settings_keyboard, format_current_language, CALLBACK_LANGUAGE_MENU, CALLBACK_LANGUAGE_PREFIX,
    CALLBACK_SETTINGS_DONE, CALLBACK_SETTINGS_MENU,
};

/// Inbound event, already stripped of transport details
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Command {
        chat_id: ChatId,
        command: Command,
        /// Language code reported by the user's Telegram client
        user_language: Option<String>,
    },
    Text {
        chat_id: ChatId,
        text: String,
    },
    Button {
        chat_id: ChatId,
        message_id: MessageId,
        data: String,
    },
}

pub struct ConversationEngine {
    l10n: Arc<LocalizationManager>,
    settings: Arc<SettingsStore>,
    geocoder: Arc<dyn Geocoder>,
    base_url: String,
    address_storage: Arc<InMemStorage<AddressState>>,
    settings_storage: Arc<InMemStorage<SettingsState>>,
}

impl ConversationEngine {
    pub fn new(
        l10n: Arc<LocalizationManager>,
        settings: Arc<SettingsStore>,
        geocoder: Arc<dyn Geocoder>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            l10n,
            settings,
            geocoder,
            base_url: base_url.into(),
            address_storage: InMemStorage::new(),
            settings_storage: InMemStorage::new(),
        }
    }

    pub fn address_dialogue(&self, chat_id: ChatId) -> AddressDialogue {
        AddressDialogue::new(Arc::clone(&self.address_storage), chat_id)
    }

    pub fn settings_dialogue(&self, chat_id: ChatId) -> SettingsDialogue {
        SettingsDialogue::new(Arc::clone(&self.settings_storage), chat_id)
    }

    pub async fn address_state(&self, chat_id: ChatId) -> Result<Option<AddressState>> {
        Ok(self.address_dialogue(chat_id).get().await?)
    }

    pub async fn settings_state(&self, chat_id: ChatId) -> Result<Option<SettingsState>> {
        Ok(self.settings_dialogue(chat_id).get().await?)
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Process one event to completion
    pub async fn handle(&self, transport: &dyn Transport, event: Event) -> Result<()> {
        match event {
            Event::Command {
                chat_id,
                command,
                user_language,
            } => {
                self.handle_command(transport, chat_id, command, user_language.as_deref())
                    .await
            }
            Event::Text { chat_id, text } => self.handle_text(transport, chat_id, &text).await,
            Event::Button {
                chat_id,
                message_id,
                data,
            } => self.handle_button(transport, chat_id, message_id, &data).await,
        }
    }

    fn language(&self, chat_id: ChatId) -> Language {
        self.settings.language(chat_id.0)
    }

    async fn handle_command(
        &self,
        transport: &dyn Transport,
        chat_id: ChatId,
        command: Command,
        user_language: Option<&str>,
    ) -> Result<()> {
        debug!(chat_id = %chat_id, command = ?command, "Received command");

        match command {
            Command::Start => {
                let language = self.settings.seed_language(chat_id.0, user_language)?;
                transport
                    .send_text(chat_id, self.l10n.translate("start-greeting", language))
                    .await
            }
            Command::Help => {
                let language = self.language(chat_id);
                transport
                    .send_text(chat_id, self.l10n.translate("help", language))
                    .await
            }
            Command::Address(text) => self.start_address_search(transport, chat_id, &text).await,
            Command::Settings => self.show_settings(transport, chat_id).await,
            Command::Cancel => self.cancel(transport, chat_id).await,
            Command::Unknown(name) => {
                debug!(chat_id = %chat_id, command = %name, "Ignoring unknown command");
                Ok(())
            }
        }
    }

    async fn handle_text(&self, transport: &dyn Transport, chat_id: ChatId, text: &str) -> Result<()> {
        let dialogue = self.address_dialogue(chat_id);

        match dialogue.get().await? {
            Some(AddressState::AwaitingAddress) => match normalize_address(text) {
                Some(address) => {
                    finish(&dialogue).await?;
                    self.search_address(transport, chat_id, &address).await
                }
                None => {
                    // Still waiting, ask again
                    let language = self.language(chat_id);
                    transport
                        .send_text(chat_id, self.l10n.translate("address-prompt", language))
                        .await
                }
            },
            None => {
                debug!(chat_id = %chat_id, "Ignoring text outside of a conversation");
                Ok(())
            }
        }
    }

    async fn handle_button(
        &self,
        transport: &dyn Transport,
        chat_id: ChatId,
        message_id: MessageId,
        data: &str,
    ) -> Result<()> {
        // Telegram keeps the button spinning until the press is answered
        if let Err(e) = transport.answer_callback().await {
            warn!(chat_id = %chat_id, error = %e, "Failed to answer callback query");
        }

        let dialogue = self.settings_dialogue(chat_id);
        let state = dialogue.get().await?;

        // Only the most recent menu drives the flow
        if let Some(menu_id) = state.as_ref().map(SettingsState::message_id) {
            if menu_id != message_id {
                debug!(chat_id = %chat_id, data, "Ignoring button on an older settings menu");
                return Ok(());
            }
        }

        match state {
            Some(SettingsState::MenuShown { .. }) => match data {
                CALLBACK_LANGUAGE_MENU => self.show_language_menu(transport, chat_id, message_id).await,
                CALLBACK_SETTINGS_MENU => self.show_settings_menu(transport, chat_id, message_id).await,
                CALLBACK_SETTINGS_DONE => self.end_settings(transport, chat_id, message_id).await,
                _ => {
                    debug!(chat_id = %chat_id, data, "Ignoring button in settings menu");
                    Ok(())
                }
            },
            Some(SettingsState::LanguageMenuShown { .. }) => {
                if data == CALLBACK_SETTINGS_DONE {
                    self.end_settings(transport, chat_id, message_id).await
                } else if let Some(code) = data.strip_prefix(CALLBACK_LANGUAGE_PREFIX) {
                    self.choose_language(transport, chat_id, message_id, code).await
                } else {
                    debug!(chat_id = %chat_id, data, "Ignoring button in language menu");
                    Ok(())
                }
            }
            None => {
                debug!(chat_id = %chat_id, data, "Ignoring button outside of a conversation");
                Ok(())
            }
        }
    }

    async fn start_address_search(
        &self,
        transport: &dyn Transport,
        chat_id: ChatId,
        text: &str,
    ) -> Result<()> {
        let dialogue = self.address_dialogue(chat_id);

        match normalize_address(text) {
            Some(address) => {
                finish(&dialogue).await?;
                self.search_address(transport, chat_id, &address).await
            }
            None => {
                let language = self.language(chat_id);
                transport
                    .send_text(chat_id, self.l10n.translate("address-prompt", language))
                    .await?;
                dialogue.update(AddressState::AwaitingAddress).await?;
                Ok(())
            }
        }
    }

    async fn search_address(&self, transport: &dyn Transport, chat_id: ChatId, address: &str) -> Result<()> {
        let language = self.language(chat_id);
        info!(chat_id = %chat_id, address, "Searching address");

        match self.geocoder.lookup(address).await {
            AddressResult::Found(coordinates) => {
                let keyboard = match map_url(&self.base_url, address) {
                    Ok(url) => Some(create_open_map_keyboard(&self.l10n, language, url)),
                    Err(e) => {
                        warn!(chat_id = %chat_id, error = %e, "Could not build map link");
                        None
                    }
                };

                transport
                    .send_location(chat_id, coordinates.latitude, coordinates.longitude, keyboard)
                    .await
            }
            AddressResult::NotFound => {
                transport
                    .send_text(chat_id, self.l10n.translate("address-not-found", language))
                    .await
            }
        }
    }

    async fn cancel(&self, transport: &dyn Transport, chat_id: ChatId) -> Result<()> {
        let language = self.language(chat_id);

        let address_dialogue = self.address_dialogue(chat_id);
        if address_dialogue.get().await?.is_some() {
            finish(&address_dialogue).await?;
            return transport
                .send_text(chat_id, self.l10n.translate("address-cancelled", language))
                .await;
        }

        let settings_dialogue = self.settings_dialogue(chat_id);
        if settings_dialogue.get().await?.is_some() {
            finish(&settings_dialogue).await?;
            return transport
                .send_text(chat_id, self.l10n.translate("settings-saved", language))
                .await;
        }

        debug!(chat_id = %chat_id, "Nothing to cancel");
        Ok(())
    }

    async fn show_settings(&self, transport: &dyn Transport, chat_id: ChatId) -> Result<()> {
        let language = self.language(chat_id);

        let message_id = transport
            .send_keyboard(
                chat_id,
                self.l10n.translate("settings", language),
                create_settings_keyboard(&self.l10n, language),
            )
            .await?;

        self.settings_dialogue(chat_id)
            .update(SettingsState::MenuShown { message_id })
            .await?;
        Ok(())
    }

    async fn show_settings_menu(
        &self,
        transport: &dyn Transport,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<()> {
        let language = self.language(chat_id);

        self.edit_or_log(
            transport,
            chat_id,
            message_id,
            self.l10n.translate("settings", language),
            Some(create_settings_keyboard(&self.l10n, language)),
        )
        .await;

        self.settings_dialogue(chat_id)
            .update(SettingsState::MenuShown { message_id })
            .await?;
        Ok(())
    }

    async fn show_language_menu(
        &self,
        transport: &dyn Transport,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<()> {
        let language = self.language(chat_id);
        let stored = self.settings.stored_language(chat_id.0);

        self.edit_or_log(
            transport,
            chat_id,
            message_id,
            format_current_language(&self.l10n, language, stored),
            Some(create_language_keyboard()),
        )
        .await;

        self.settings_dialogue(chat_id)
            .update(SettingsState::LanguageMenuShown { message_id })
            .await?;
        Ok(())
    }

    async fn choose_language(
        &self,
        transport: &dyn Transport,
        chat_id: ChatId,
        message_id: MessageId,
        code: &str,
    ) -> Result<()> {
        let language = match self.settings.set_language(chat_id.0, code) {
            Ok(language) => language,
            Err(e) => {
                // Nothing changed, keep the picker open so the user can retry
                error!(chat_id = %chat_id, error = %e, "Failed to save chat language");
                let language = self.language(chat_id);
                self.edit_or_log(
                    transport,
                    chat_id,
                    message_id,
                    self.l10n.translate("settings-save-failed", language),
                    Some(create_language_keyboard()),
                )
                .await;
                return Ok(());
            }
        };
        info!(chat_id = %chat_id, language = %language, "Chat language changed");

        self.edit_or_log(
            transport,
            chat_id,
            message_id,
            self.l10n
                .translate_with_args("language-updated", language, &[("language", language.name())]),
            Some(create_language_updated_keyboard(&self.l10n, language)),
        )
        .await;

        self.settings_dialogue(chat_id)
            .update(SettingsState::MenuShown { message_id })
            .await?;
        Ok(())
    }

    async fn end_settings(
        &self,
        transport: &dyn Transport,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<()> {
        let language = self.language(chat_id);

        self.edit_or_log(
            transport,
            chat_id,
            message_id,
            self.l10n.translate("settings-saved", language),
            None,
        )
        .await;

        finish(&self.settings_dialogue(chat_id)).await?;
        Ok(())
    }

    /// Edits fail when the message is gone or unchanged; the flow still moves on
    async fn edit_or_log(
        &self,
        transport: &dyn Transport,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<teloxide::types::InlineKeyboardMarkup>,
    ) {
        if let Err(e) = transport.edit_message(chat_id, message_id, text, keyboard).await {
            error!(chat_id = %chat_id, error = %e, "Failed to edit settings message");
        }
    }
}
