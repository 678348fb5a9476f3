//! Telegram Bot API sender (`sendMessage`, HTML parse mode).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use booking_common::types::NotificationRoute;

use crate::ChatNotifier;
use crate::error::NotifyError;

/// Bot API client. One `reqwest::Client` is shared by all sends; the token
/// comes from the route so different bots can use the same client.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: Client,
    api_base: String,
}

impl TelegramClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// POST `{chat_id, text, parse_mode: "HTML"}` to `/bot<token>/sendMessage`,
    /// plus `reply_markup` when given.
    ///
    /// Fails unless the HTTP status is 2xx and the body's `ok` is `true`.
    pub async fn send_message(
        &self,
        route: &NotificationRoute,
        text: &str,
        reply_markup: Option<&Value>,
    ) -> Result<Value, NotifyError> {
        if route.bot_token.is_empty() {
            return Err(NotifyError::MissingBotToken);
        }

        let url = format!("{}/bot{}/sendMessage", self.api_base, route.bot_token);
        let mut payload = json!({
            "chat_id": route.chat_id,
            "text": text,
            "parse_mode": "HTML",
        });
        if let Some(markup) = reply_markup {
            payload["reply_markup"] = markup.clone();
        }

        let res = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.without_url()))?;
        let status = res.status();
        // A non-JSON body is treated like `ok: false`
        let body: Value = res.json().await.unwrap_or_default();

        let ok = body.get("ok").and_then(Value::as_bool) == Some(true);
        if !status.is_success() || !ok {
            let description = body
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());

            return Err(NotifyError::Telegram {
                status: status.as_u16(),
                description,
            });
        }

        tracing::debug!(chat_id = route.chat_id, "Telegram message sent");
        Ok(body)
    }
}

#[async_trait]
impl ChatNotifier for TelegramClient {
    async fn send_chat(
        &self,
        route: &NotificationRoute,
        text: &str,
        reply_markup: Option<&Value>,
    ) -> Result<Value, NotifyError> {
        self.send_message(route, text, reply_markup).await
    }
}
