//! Bot module for handling Telegram interactions
//!
//! - `commands`: parses `/command` messages
//! - `dialogue_manager`: the conversation engine driving both flows
//! - `message_handler`: turns incoming messages into engine events
//! - `callback_handler`: turns inline keyboard presses into engine events
//! - `transport`: sends the engine's replies through the Bot API
//! - `ui_builder`: creates keyboards and formats messages

pub mod callback_handler;
pub mod commands;
pub mod dialogue_manager;
pub mod message_handler;
pub mod transport;
pub mod ui_builder;

pub use callback_handler::callback_handler;
pub use commands::Command;
pub use dialogue_manager::{ConversationEngine, Event};
pub use message_handler::message_handler;
pub use transport::{TelegramTransport, Transport};
