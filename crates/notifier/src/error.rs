use thiserror::Error;

use booking_common::error::AppError;

/// Failures from the chat and email senders.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Bot API answered with a non-success status or `ok != true`.
    #[error("Telegram failed: {status} {description}")]
    Telegram { status: u16, description: String },

    #[error("Telegram bot token is not configured")]
    MissingBotToken,

    /// Transport-level failure. The request URL embeds the bot token, so
    /// it is stripped before the error is stored.
    #[error("Telegram request failed: {0}")]
    Http(reqwest::Error),

    /// A callback message did not carry the booking details it needs.
    #[error("Callback message is missing {0}")]
    MissingField(&'static str),

    #[error("SMTP configuration missing: {0}")]
    SmtpConfig(String),

    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

impl From<NotifyError> for AppError {
    fn from(err: NotifyError) -> Self {
        AppError::Delivery(err.to_string())
    }
}
