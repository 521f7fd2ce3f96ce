//! # DeQua Telegram Bot
//!
//! A Telegram bot that finds Venice addresses through the DeQua API and
//! replies with their map location, in English or Italian.

pub mod bot;
pub mod config;
pub mod dialogue;
pub mod geocoding;
pub mod localization;
pub mod settings;
