use anyhow::{Context, Result};
use dequa_bot::bot::{self, Command, ConversationEngine};
use dequa_bot::config::{BotConfig, LogFormat};
use dequa_bot::geocoding::DequaClient;
use dequa_bot::localization::LocalizationManager;
use dequa_bot::settings::SettingsStore;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = BotConfig::from_env()?;
    init_tracing(config.log_format);

    info!("Starting DeQua Telegram Bot");

    let l10n = LocalizationManager::load(&config.locales_dir)
        .context("Failed to load localization catalogs")?;
    let settings = SettingsStore::open(&config.settings_path)?;
    let geocoder = DequaClient::new(&config.api_url, &config.api_token, config.request_timeout)
        .context("Failed to create DeQua API client")?;

    let engine = Arc::new(ConversationEngine::new(
        Arc::new(l10n),
        Arc::new(settings),
        Arc::new(geocoder),
        config.base_url.clone(),
    ));

    // Initialize the bot
    let bot = Bot::new(&config.telegram_token);

    let commands = Command::MENU
        .iter()
        .map(|(name, description)| BotCommand::new(*name, *description))
        .collect::<Vec<_>>();
    if let Err(e) = bot.set_my_commands(commands).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint({
            let engine = Arc::clone(&engine);
            move |bot: Bot, msg: Message| {
                let engine = Arc::clone(&engine);
                async move { bot::message_handler(bot, msg, engine).await }
            }
        }))
        .branch(Update::filter_callback_query().endpoint({
            let engine = Arc::clone(&engine);
            move |bot: Bot, q: CallbackQuery| {
                let engine = Arc::clone(&engine);
                async move { bot::callback_handler(bot, q, engine).await }
            }
        }));

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
