//! Shared application state for the Axum API server.

use std::sync::Arc;

use booking_common::config::AppConfig;
use booking_notifier::dispatch::BookingDispatcher;
use booking_notifier::email::SmtpMailer;
use booking_notifier::routing::RouteResolver;
use booking_notifier::telegram::TelegramClient;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: BookingDispatcher,

    /// Expected Telegram webhook secret; `None` disables the webhook
    pub webhook_secret: Option<Arc<str>>,
}

impl AppState {
    pub fn new(dispatcher: BookingDispatcher) -> Self {
        Self {
            dispatcher,
            webhook_secret: None,
        }
    }

    pub fn with_webhook_secret(mut self, secret: Option<String>) -> Self {
        self.webhook_secret = secret.map(Arc::from);
        self
    }

    /// Wire the production Telegram and SMTP senders from config.
    pub fn from_config(config: &AppConfig) -> Self {
        let resolver = Arc::new(RouteResolver::new(config.telegram.clone()));
        let chat = Arc::new(TelegramClient::new(config.telegram.api_base.clone()));
        let mailer = Arc::new(SmtpMailer::new(config.smtp.clone()));

        Self::new(BookingDispatcher::new(resolver, chat, mailer))
            .with_webhook_secret(config.telegram.webhook_secret.clone())
    }
}
