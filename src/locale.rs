/// Startup-loaded translation tables with English fallback.
///
/// Mirrors the mini-app's `lang/<code>` files: each locale is a flat map from
/// message key to display string. The table is built once before the
/// dispatcher starts and is read-only afterwards, so handlers can share it
/// through an `Arc` without any locking.
use crate::error::{BotError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Fallback locale for any missing key or unknown language code.
pub const DEFAULT_LOCALE: &str = "en";

/// Message keys used by the bot.
pub mod keys {
    pub const WELCOME: &str = "Welcome";
    pub const OPEN_APP: &str = "OpenApp";
    pub const EXPORT_PROMPT: &str = "ExportPrompt";
    pub const EXPORT_BUTTON: &str = "ExportButton";
    pub const MIGRATION_CAPTION: &str = "MigrationCaption";
}

/// Mapping of language code to message-key table.
#[derive(Debug)]
pub struct LocaleTable {
    tables: HashMap<String, HashMap<String, String>>,
}

/// English strings compiled in so the bot works without any locale directory.
fn builtin_english() -> HashMap<String, String> {
    [
        (
            keys::WELCOME,
            "👋 Welcome to TeleOTP!\n\
             I can help you protect your accounts with 2FA.\n\
             Click the button below to get started!",
        ),
        (keys::OPEN_APP, "Open TeleOTP"),
        (
            keys::EXPORT_PROMPT,
            "Press the button below to export your accounts from TeleOTP.",
        ),
        (keys::EXPORT_BUTTON, "Export accounts"),
        (
            keys::MIGRATION_CAPTION,
            "Scan this QR code with Google Authenticator or TeleOTP to import \
             your accounts.\nOr open this link on another device: {link}\n\n\
             Keep it secret! Anyone with this code can access your accounts.",
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl Default for LocaleTable {
    fn default() -> Self {
        let mut tables = HashMap::new();
        tables.insert(DEFAULT_LOCALE.to_string(), builtin_english());
        Self { tables }
    }
}

impl LocaleTable {
    /// Built-in English table plus every `<code>.json` file found in `dir`,
    /// merged over the built-ins. File stems are the locale codes.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut table = Self::default();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let code = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_ascii_lowercase(),
                None => continue,
            };

            let raw = fs::read_to_string(&path)?;
            let strings: HashMap<String, String> = serde_json::from_str(&raw)
                .map_err(|e| BotError::Locale(format!("{}: {}", path.display(), e)))?;

            info!(locale = %code, keys = strings.len(), "loaded locale file");
            table.tables.entry(code).or_default().extend(strings);
        }

        Ok(table)
    }

    /// Total lookup with the default chain: exact locale, then the primary
    /// language subtag (`pt-BR` → `pt`), then English. A key absent from every
    /// table resolves to an empty string and is logged, never raised.
    pub fn get(&self, locale: Option<&str>, key: &str) -> &str {
        if let Some(code) = locale {
            let code = code.to_ascii_lowercase();
            if let Some(s) = self.lookup(&code, key) {
                return s;
            }
            if let Some(primary) = code.split('-').next() {
                if primary != code {
                    if let Some(s) = self.lookup(primary, key) {
                        return s;
                    }
                }
            }
        }

        if let Some(s) = self.lookup(DEFAULT_LOCALE, key) {
            return s;
        }

        warn!(key, "translation missing in every locale");
        ""
    }

    fn lookup(&self, locale: &str, key: &str) -> Option<&str> {
        self.tables.get(locale)?.get(key).map(String::as_str)
    }
}
