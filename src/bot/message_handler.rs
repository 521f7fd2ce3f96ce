//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use super::commands::Command;
use super::dialogue_manager::{ConversationEngine, Event};
use super::transport::TelegramTransport;

/// Turn a Telegram message into an engine event.
///
/// Returns `None` for messages without text (photos, stickers, ...).
pub fn message_to_event(msg: &Message) -> Option<Event> {
    let text = msg.text()?;
    let chat_id = msg.chat.id;

    let event = match Command::parse(text) {
        Some(command) => Event::Command {
            chat_id,
            command,
            user_language: msg
                .from
                .as_ref()
                .and_then(|user| user.language_code.clone()),
        },
        None => Event::Text {
            chat_id,
            text: text.to_string(),
        },
    };
    Some(event)
}

pub async fn message_handler(bot: Bot, msg: Message, engine: Arc<ConversationEngine>) -> Result<()> {
    match message_to_event(&msg) {
        Some(event) => {
            let transport = TelegramTransport::for_message(&bot);
            engine.handle(&transport, event).await
        }
        None => {
            debug!(chat_id = %msg.chat.id, "Ignoring non-text message");
            Ok(())
        }
    }
}
