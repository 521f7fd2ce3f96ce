//! UI Builder module for creating keyboards and formatting messages

use reqwest::Url;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::localization::{Language, LocalizationManager};

/// Callback data of the buttons shown by the settings flow
pub const CALLBACK_SETTINGS_MENU: &str = "settings_menu";
pub const CALLBACK_SETTINGS_DONE: &str = "settings_done";
pub const CALLBACK_LANGUAGE_MENU: &str = "language_menu";
pub const CALLBACK_LANGUAGE_PREFIX: &str = "language_";

const GLOBE: &str = "\u{1F310}";

/// Callback data carried by a language picker button
pub fn language_callback(language: Language) -> String {
    format!("{}{}", CALLBACK_LANGUAGE_PREFIX, language.code())
}

/// Settings menu: language picker and done
pub fn create_settings_keyboard(l10n: &LocalizationManager, language: Language) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(GLOBE, CALLBACK_LANGUAGE_MENU)],
        vec![InlineKeyboardButton::callback(
            l10n.translate("settings-done-button", language),
            CALLBACK_SETTINGS_DONE,
        )],
    ])
}

/// One flag button per supported language, on a single row
pub fn create_language_keyboard() -> InlineKeyboardMarkup {
    let row = Language::ALL
        .iter()
        .map(|language| InlineKeyboardButton::callback(language.flag(), language_callback(*language)))
        .collect::<Vec<_>>();

    InlineKeyboardMarkup::new(vec![row])
}

/// Shown after a language was picked: back to settings, or done
pub fn create_language_updated_keyboard(
    l10n: &LocalizationManager,
    language: Language,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            l10n.translate("settings-back-button", language),
            CALLBACK_SETTINGS_MENU,
        )],
        vec![InlineKeyboardButton::callback(
            l10n.translate("settings-done-button", language),
            CALLBACK_SETTINGS_DONE,
        )],
    ])
}

/// Single URL button opening the address on the DeQua website
pub fn create_open_map_keyboard(
    l10n: &LocalizationManager,
    language: Language,
    url: Url,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        l10n.translate("address-open-map", language),
        url,
    )]])
}

/// Text of the language picker, naming the chat's current selection
pub fn format_current_language(
    l10n: &LocalizationManager,
    language: Language,
    stored: Option<Language>,
) -> String {
    let current = match stored {
        Some(stored) => stored.name().to_string(),
        None => l10n.translate("language-not-set", language),
    };

    l10n.translate_with_args("language-current", language, &[("language", current.as_str())])
}
