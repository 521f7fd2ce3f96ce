//! Outbound side of the chat transport.
//!
//! The conversation engine only talks to Telegram through [`Transport`], so
//! the flows can be driven without a network connection.

use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, InlineKeyboardMarkup, MessageId};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: String) -> Result<()>;

    /// Send a message with inline buttons, returning its id for later edits
    async fn send_keyboard(
        &self,
        chat_id: ChatId,
        text: String,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<MessageId>;

    async fn edit_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()>;

    async fn send_location(
        &self,
        chat_id: ChatId,
        latitude: f64,
        longitude: f64,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()>;

    /// Acknowledge the button press that produced the current event
    async fn answer_callback(&self) -> Result<()>;
}

/// [`Transport`] backed by the Telegram Bot API, scoped to one update
pub struct TelegramTransport<'a> {
    bot: &'a Bot,
    query: Option<&'a CallbackQuery>,
}

impl<'a> TelegramTransport<'a> {
    pub fn for_message(bot: &'a Bot) -> Self {
        Self { bot, query: None }
    }

    pub fn for_callback(bot: &'a Bot, query: &'a CallbackQuery) -> Self {
        Self {
            bot,
            query: Some(query),
        }
    }
}

#[async_trait]
impl<'a> Transport for TelegramTransport<'a> {
    async fn send_text(&self, chat_id: ChatId, text: String) -> Result<()> {
        self.bot.send_message(chat_id, text).await?;
        Ok(())
    }

    async fn send_keyboard(
        &self,
        chat_id: ChatId,
        text: String,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<MessageId> {
        let sent_message = self
            .bot
            .send_message(chat_id, text)
            .reply_markup(keyboard)
            .await?;
        Ok(sent_message.id)
    }

    async fn edit_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        let mut request = self.bot.edit_message_text(chat_id, message_id, text);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        request.await?;
        Ok(())
    }

    async fn send_location(
        &self,
        chat_id: ChatId,
        latitude: f64,
        longitude: f64,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        let mut request = self.bot.send_location(chat_id, latitude, longitude);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        request.await?;
        Ok(())
    }

    async fn answer_callback(&self) -> Result<()> {
        if let Some(query) = self.query {
            self.bot.answer_callback_query(query.id.clone()).await?;
        }
        Ok(())
    }
}
