/// Configuration management for the TeleOTP companion bot.
use crate::error::{BotError, Result};
use std::env;
use std::path::PathBuf;
use url::Url;

/// Main application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token (from TELEGRAM_BOT_TOKEN).
    pub bot_token: String,
    /// Base URL of the TeleOTP mini-app.
    pub webapp_url: Url,
    /// Public deep-link identifier of the bot, e.g. `https://t.me/<bot>/<app>`.
    pub app_link: String,
    /// Optional directory with `<locale>.json` translation files.
    pub locales_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `TELEGRAM_BOT_TOKEN`: The bot token from BotFather.
    /// - `WEBAPP_URL`: Base URL the mini-app is served from.
    /// - `TG_APP`: Public link used to build deep links, e.g. `https://t.me/mybot/app`.
    ///
    /// Optional environment variables:
    /// - `LOCALES_DIR`: Directory with `<locale>.json` files merged over the
    ///   built-in English strings.
    pub fn from_env() -> Result<Self> {
        // Required: bot token
        let bot_token = env::var("TELEGRAM_BOT_TOKEN").map_err(|_| {
            BotError::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required. \
                 Get your token from @BotFather on Telegram."
                    .to_string(),
            )
        })?;

        if bot_token.is_empty() {
            return Err(BotError::Config(
                "TELEGRAM_BOT_TOKEN cannot be empty".to_string(),
            ));
        }

        // Required: mini-app base URL
        let webapp_url = env::var("WEBAPP_URL").map_err(|_| {
            BotError::Config("WEBAPP_URL environment variable is required".to_string())
        })?;

        let webapp_url = Url::parse(&webapp_url)
            .map_err(|e| BotError::Config(format!("WEBAPP_URL is not a valid URL: {}", e)))?;

        // Required: deep link base
        let app_link = env::var("TG_APP").map_err(|_| {
            BotError::Config(
                "TG_APP environment variable is required, e.g. https://t.me/mybot/app"
                    .to_string(),
            )
        })?;

        if app_link.is_empty() {
            return Err(BotError::Config("TG_APP cannot be empty".to_string()));
        }

        // Optional: locale directory
        let locales_dir = env::var("LOCALES_DIR").ok().map(PathBuf::from);

        Ok(Config {
            bot_token,
            webapp_url,
            app_link,
            locales_dir,
        })
    }

    /// URL opened by the welcome button.
    pub fn webapp_open_url(&self) -> Url {
        self.webapp_url.clone()
    }

    /// URL opened by the export keyboard button; the `export` query string
    /// tells the mini-app to send the account export back via `web_app_data`.
    pub fn webapp_export_url(&self) -> Url {
        let mut url = self.webapp_url.clone();
        url.set_query(Some("export"));
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            bot_token: "test_token".to_string(),
            webapp_url: Url::parse("https://teleotp.example.com/").unwrap(),
            app_link: "https://t.me/test_bot/app".to_string(),
            locales_dir: None,
        }
    }

    #[test]
    fn test_export_url_carries_query() {
        let config = test_config();
        assert_eq!(
            config.webapp_export_url().as_str(),
            "https://teleotp.example.com/?export"
        );
    }

    #[test]
    fn test_open_url_is_base() {
        let config = test_config();
        assert_eq!(
            config.webapp_open_url().as_str(),
            "https://teleotp.example.com/"
        );
    }
}
