//! Booking notifications: route resolution, message templates and the two
//! outbound senders (Telegram chat + SMTP email).

pub mod callback;
pub mod dispatch;
pub mod email;
pub mod error;
pub mod routing;
pub mod telegram;
pub mod template;

use async_trait::async_trait;

use booking_common::types::NotificationRoute;

use crate::error::NotifyError;
use crate::template::OutgoingEmail;

/// Delivers a formatted text message to a staff chat.
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    /// Send `text` to the route's chat, with an optional inline keyboard.
    /// Returns the provider's response body.
    async fn send_chat(
        &self,
        route: &NotificationRoute,
        text: &str,
        reply_markup: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value, NotifyError>;
}

/// Delivers a single email. One attempt per call.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_mail(&self, email: &OutgoingEmail) -> Result<(), NotifyError>;
}
