/// TeleOTP companion bot - Main entry point.
///
/// A launcher bot for the TeleOTP two-factor-authentication mini-app. It
/// greets users with a button that opens the web app, and when the mini-app
/// sends back an account export it republishes the payload as a QR code photo
/// plus a shareable deep link.
///
/// The export payload is opaque to this bot: it is never parsed, logged, or
/// stored, only re-encoded for transfer.
mod bot;
mod config;
mod error;
mod locale;
mod relay;

use bot::{handle_export, handle_start, handle_web_app_data, BotState};
use config::Config;
use error::Result;
use locale::LocaleTable;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::Update;
use teloxide::utils::command::BotCommands;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Telegram bot commands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "TeleOTP Bot Commands:")]
enum Command {
    #[command(description = "Open TeleOTP and see the welcome message")]
    Start,
    #[command(description = "Export your accounts as a QR code and link")]
    Export,
}

/// Main bot command handler.
async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: BotState,
) -> ResponseResult<()> {
    match cmd {
        Command::Start => handle_start(bot, msg, state).await,
        Command::Export => handle_export(bot, msg, state).await,
    }
}

/// Set up the command menu that appears in Telegram.
async fn set_bot_commands(bot: &Bot) -> Result<()> {
    use teloxide::types::BotCommand;

    let commands = vec![
        BotCommand {
            command: "start".to_string(),
            description: "Open TeleOTP and see the welcome message".to_string(),
        },
        BotCommand {
            command: "export".to_string(),
            description: "Export your accounts as a QR code and link".to_string(),
        },
    ];

    bot.set_my_commands(commands).await?;
    info!("Bot commands menu set successfully");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "teleotp_bot=info,teloxide=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TeleOTP companion bot...");

    // Load .env file if present (for development)
    if let Err(e) = dotenvy::dotenv() {
        info!("No .env file found or error loading it: {}", e);
    }

    // Load configuration from environment variables
    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    info!("Configuration loaded successfully");
    info!("Mini-app URL: {}", config.webapp_url);
    info!("Deep link base: {}", config.app_link);

    // Load translations before any update is handled; read-only afterwards
    let locales = match &config.locales_dir {
        Some(dir) => {
            let table = LocaleTable::load(dir).map_err(|e| {
                error!("Failed to load locales from {}: {}", dir.display(), e);
                e
            })?;
            info!("Locales loaded from {}", dir.display());
            table
        }
        None => {
            info!("LOCALES_DIR not set, using built-in English strings");
            LocaleTable::default()
        }
    };

    // Create bot instance
    let bot = Bot::new(&config.bot_token);

    info!("Bot initialized, starting dispatcher...");

    // Set up command menu in Telegram
    set_bot_commands(&bot).await?;

    // Create shared state
    let state = BotState::new(config, locales);

    // Mini-app data first, then commands, then the greeting for everything
    // else (the original bot greets on any message)
    let message_handler = Update::filter_message()
        .branch(
            dptree::filter(|msg: Message| msg.web_app_data().is_some())
                .endpoint(handle_web_app_data),
        )
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(dptree::endpoint(handle_start));

    // Start the dispatcher
    Dispatcher::builder(bot, message_handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");

    Ok(())
}
