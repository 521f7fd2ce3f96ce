//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use super::dialogue_manager::{ConversationEngine, Event};
use super::transport::{TelegramTransport, Transport};

/// Handle callback queries from inline keyboards
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    engine: Arc<ConversationEngine>,
) -> Result<()> {
    debug!(user_id = %q.from.id, "Received callback query from user");

    let transport = TelegramTransport::for_callback(&bot, &q);

    match &q.message {
        Some(msg) => {
            let event = Event::Button {
                chat_id: msg.chat().id,
                message_id: msg.id(),
                data: q.data.clone().unwrap_or_default(),
            };
            engine.handle(&transport, event).await
        }
        None => {
            // The message is too old to edit, only stop the button spinner
            transport.answer_callback().await
        }
    }
}
