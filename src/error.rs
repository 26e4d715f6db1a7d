/// Custom error types for the TeleOTP companion bot.
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum BotError {
    /// Configuration errors (missing or invalid environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The migration URI does not fit into the largest QR symbol.
    #[error("Export payload too large for a QR code")]
    QrCapacity,

    /// Any other QR encoding failure.
    #[error("QR encoding error: {0}")]
    Qr(String),

    /// PNG encoding errors.
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    /// Locale file parsing errors.
    #[error("Locale file error: {0}")]
    Locale(String),

    /// Telegram API errors.
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    /// Generic I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient Result alias using our custom error type.
pub type Result<T> = std::result::Result<T, BotError>;
