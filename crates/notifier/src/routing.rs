//! Property code → notification route resolution.
//!
//! The sentinel code `ALL` goes to the consolidated bot and chat. Every other
//! code uses the default bot with the chat id from the property chat map,
//! falling back to the default chat id and finally to `0`. Unknown codes
//! never fail.

use booking_common::config::{CONSOLIDATED_PROPERTY_CODE, TelegramConfig};
use booking_common::types::NotificationRoute;

/// Resolves routes against configuration parsed once at startup.
#[derive(Debug, Clone)]
pub struct RouteResolver {
    config: TelegramConfig,
}

impl RouteResolver {
    pub fn new(config: TelegramConfig) -> Self {
        Self { config }
    }

    pub fn resolve(&self, property_code: &str) -> NotificationRoute {
        if property_code == CONSOLIDATED_PROPERTY_CODE {
            return NotificationRoute {
                bot_token: self.config.consolidated_bot_token.clone().unwrap_or_default(),
                chat_id: self.config.consolidated_chat_id.unwrap_or(0),
            };
        }

        let chat_id = match self.config.chat_map.get(property_code) {
            Some(id) => id,
            None => {
                let fallback = self.config.default_chat_id.unwrap_or(0);
                tracing::warn!(
                    property_code,
                    chat_id = fallback,
                    "Property not in chat map, using default chat"
                );
                fallback
            }
        };

        NotificationRoute {
            bot_token: self.config.default_bot_token.clone().unwrap_or_default(),
            chat_id,
        }
    }
}
