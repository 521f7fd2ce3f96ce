//! Conversation states for the address search and settings flows.
//!
//! Each flow keeps its own state per chat. A chat with no stored state for a
//! flow is idle in that flow.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage, InMemStorageError};
use teloxide::types::MessageId;

/// State of the address search flow
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressState {
    /// `/address` was sent without text, the next message is the address
    #[default]
    AwaitingAddress,
}

/// State of the settings flow, remembering which message holds the menu
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingsState {
    /// The settings menu (language / done) is on screen
    MenuShown { message_id: MessageId },
    /// The language picker is on screen
    LanguageMenuShown { message_id: MessageId },
}

impl SettingsState {
    pub fn message_id(&self) -> MessageId {
        match self {
            SettingsState::MenuShown { message_id } | SettingsState::LanguageMenuShown { message_id } => {
                *message_id
            }
        }
    }
}

pub type AddressDialogue = Dialogue<AddressState, InMemStorage<AddressState>>;
pub type SettingsDialogue = Dialogue<SettingsState, InMemStorage<SettingsState>>;

/// End a flow, returning the chat to idle.
///
/// Ending a flow that is already idle is not an error.
pub async fn finish<S>(dialogue: &Dialogue<S, InMemStorage<S>>) -> Result<(), InMemStorageError>
where
    S: Clone + Send + 'static,
{
    match dialogue.exit().await {
        Err(InMemStorageError::DialogueNotFound) => Ok(()),
        other => other,
    }
}

/// Normalize a free-text address: trim it and collapse inner whitespace.
///
/// Returns `None` when nothing is left.
pub fn normalize_address(text: &str) -> Option<String> {
    let address = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if address.is_empty() {
        None
    } else {
        Some(address)
    }
}
