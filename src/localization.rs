//! # Localization Module
//!
//! Loads one Fluent catalog per supported [`Language`] and resolves message
//! keys with a two-tier fallback: the requested language, then the default
//! language, then the key itself.

use anyhow::{anyhow, Context, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use unic_langid::LanguageIdentifier;

/// Languages the bot can reply in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    It,
}

impl Language {
    /// Every supported language, in the order the picker shows them
    pub const ALL: [Language; 2] = [Language::It, Language::En];

    /// Language used whenever a chat has no valid selection
    pub const DEFAULT: Language = Language::En;

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::It => "it",
        }
    }

    /// Display name, written in the language itself
    pub fn name(self) -> &'static str {
        match self {
            Language::En => "english",
            Language::It => "italiano",
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Language::En => "\u{1F1EC}\u{1F1E7}",
            Language::It => "\u{1F1EE}\u{1F1F9}",
        }
    }

    /// Parse a language code such as `it`, `IT` or `it-IT`.
    ///
    /// Returns `None` for languages the bot does not support.
    pub fn from_code(code: &str) -> Option<Language> {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase();

        match primary.as_str() {
            "en" => Some(Language::En),
            "it" => Some(Language::It),
            _ => None,
        }
    }

    /// Like [`Language::from_code`] but substitutes the default language
    pub fn from_code_or_default(code: Option<&str>) -> Language {
        code.and_then(Language::from_code).unwrap_or(Language::DEFAULT)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Localization manager for the bot
pub struct LocalizationManager {
    bundles: HashMap<Language, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Load every catalog from `<dir>/<code>/main.ftl`.
    ///
    /// Any missing or malformed file is an error: the bot must not start
    /// with an incomplete translation table.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut bundles = HashMap::new();

        for language in Language::ALL {
            let bundle = Self::create_bundle(dir, language)?;
            bundles.insert(language, bundle);
        }

        info!(locales_dir = %dir.display(), languages = bundles.len(), "Localization catalogs loaded");
        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific language
    fn create_bundle(dir: &Path, language: Language) -> Result<FluentBundle<FluentResource>> {
        let locale: LanguageIdentifier = language
            .code()
            .parse()
            .with_context(|| format!("Invalid language identifier {}", language.code()))?;

        let resource_path = dir.join(language.code()).join("main.ftl");
        let content = fs::read_to_string(&resource_path)
            .with_context(|| format!("Failed to read locale file {}", resource_path.display()))?;

        let resource = FluentResource::try_new(content).map_err(|(_, errors)| {
            anyhow!(
                "Malformed locale file {}: {:?}",
                resource_path.display(),
                errors
            )
        })?;

        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        // Placeables are inserted into plain Telegram text, not bidi-aware markup
        bundle.set_use_isolating(false);
        bundle.add_resource(resource).map_err(|errors| {
            anyhow!(
                "Duplicate messages in locale file {}: {:?}",
                resource_path.display(),
                errors
            )
        })?;

        Ok(bundle)
    }

    /// Whether `language`'s own catalog defines `key`
    pub fn has_message(&self, key: &str, language: Language) -> bool {
        self.bundles
            .get(&language)
            .and_then(|bundle| bundle.get_message(key))
            .and_then(|msg| msg.value())
            .is_some()
    }

    /// Get a localized message
    pub fn translate(&self, key: &str, language: Language) -> String {
        self.resolve(key, language, None)
    }

    /// Get a localized message with simple string arguments
    pub fn translate_with_args(&self, key: &str, language: Language, args: &[(&str, &str)]) -> String {
        let mut fluent_args = FluentArgs::new();
        for (name, value) in args {
            fluent_args.set(*name, FluentValue::from(*value));
        }
        self.resolve(key, language, Some(&fluent_args))
    }

    fn resolve(&self, key: &str, language: Language, args: Option<&FluentArgs>) -> String {
        if let Some(text) = self.format(key, language, args) {
            return text;
        }

        if language != Language::DEFAULT {
            if let Some(text) = self.format(key, Language::DEFAULT, args) {
                debug!(key, language = %language, "Message missing, using default language");
                return text;
            }
        }

        debug!(key, language = %language, "Message missing in every catalog");
        key.to_string()
    }

    fn format(&self, key: &str, language: Language, args: Option<&FluentArgs>) -> Option<String> {
        let bundle = self.bundles.get(&language)?;
        let pattern = bundle.get_message(key)?.value()?;

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, args, &mut errors);
        if !errors.is_empty() {
            debug!(key, language = %language, ?errors, "Message formatted with errors");
        }

        Some(value.into_owned())
    }
}
