/// Telegram handlers: greeting, export prompt, and the mini-app data relay.
use crate::config::Config;
use crate::locale::{keys, LocaleTable};
use crate::relay;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, KeyboardButton,
    KeyboardMarkup, KeyboardRemove, WebAppInfo,
};
use tracing::{error, info};

/// Shared bot state: configuration plus the startup-loaded locale table.
/// Both are read-only, so handlers may run concurrently without coordination.
#[derive(Clone)]
pub struct BotState {
    pub config: Arc<Config>,
    pub locales: Arc<LocaleTable>,
}

impl BotState {
    pub fn new(config: Config, locales: LocaleTable) -> Self {
        Self {
            config: Arc::new(config),
            locales: Arc::new(locales),
        }
    }
}

/// Telegram language code of the message sender, if any.
fn user_locale(msg: &Message) -> Option<&str> {
    msg.from().and_then(|user| user.language_code.as_deref())
}

/// Greeting handler. The original bot routes every plain message here, so
/// this serves both /start and any unrecognized input.
pub async fn handle_start(bot: Bot, msg: Message, state: BotState) -> ResponseResult<()> {
    let locale = user_locale(&msg);

    let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::web_app(
        state.locales.get(locale, keys::OPEN_APP),
        WebAppInfo {
            url: state.config.webapp_open_url(),
        },
    )]]);

    bot.send_message(msg.chat.id, state.locales.get(locale, keys::WELCOME))
        .reply_markup(keyboard)
        .await?;

    info!("Greeted chat {}", msg.chat.id);

    Ok(())
}

/// Handler for the /export command.
///
/// Sends a reply-keyboard button opening the mini-app with `?export`. It has
/// to be a keyboard button rather than an inline one: only keyboard-launched
/// web apps can answer through `web_app_data`.
pub async fn handle_export(bot: Bot, msg: Message, state: BotState) -> ResponseResult<()> {
    let locale = user_locale(&msg);

    let keyboard = KeyboardMarkup::new(vec![vec![KeyboardButton::new(
        state.locales.get(locale, keys::EXPORT_BUTTON),
    )
    .request(ButtonRequest::WebApp(WebAppInfo {
        url: state.config.webapp_export_url(),
    }))]])
    .resize_keyboard()
    .one_time_keyboard();

    bot.send_message(msg.chat.id, state.locales.get(locale, keys::EXPORT_PROMPT))
        .reply_markup(keyboard)
        .await?;

    Ok(())
}

/// Handler for `web_app_data` messages: the account export sent back by the
/// mini-app. Relays the opaque payload as a QR photo plus a deep link caption.
pub async fn handle_web_app_data(bot: Bot, msg: Message, state: BotState) -> ResponseResult<()> {
    let Some(data) = msg.web_app_data() else {
        return Ok(());
    };

    let locale = user_locale(&msg);
    let payload = data.data.as_bytes();

    info!(
        "Received export payload from chat {} ({} bytes)",
        msg.chat.id,
        payload.len()
    );

    let template = state.locales.get(locale, keys::MIGRATION_CAPTION);
    let reply = match relay::handle_export(payload, &state.config.app_link, template) {
        Ok(reply) => reply,
        Err(e) => {
            // Capacity overflows and encoder failures fail this one request;
            // nothing is sent to the user.
            error!("Failed to relay export for chat {}: {}", msg.chat.id, e);
            return Ok(());
        }
    };

    bot.send_photo(msg.chat.id, InputFile::memory(reply.qr_png))
        .caption(reply.caption)
        .reply_markup(KeyboardRemove::new())
        .await?;

    Ok(())
}
