use std::collections::HashMap;
use std::fmt;

/// Sentinel property code that routes to the consolidated chat.
pub const CONSOLIDATED_PROPERTY_CODE: &str = "ALL";

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket address the API server binds to (default: 0.0.0.0:3000)
    pub bind_addr: String,

    /// Outbound SMTP settings for guest emails
    pub smtp: SmtpConfig,

    /// Telegram bot credentials and per-property chat routing
    pub telegram: TelegramConfig,
}

/// SMTP settings. Host, user and password are checked lazily at send time.
#[derive(Clone, Default)]
pub struct SmtpConfig {
    pub host: Option<String>,

    /// SMTP port (default: 587; 465 means implicit TLS)
    pub port: u16,

    pub user: Option<String>,
    pub password: Option<String>,

    /// Sender address; falls back to `user` when unset
    pub from: Option<String>,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("from", &self.from)
            .finish()
    }
}

/// Telegram bot settings.
#[derive(Clone, Default)]
pub struct TelegramConfig {
    /// Bot API base URL (default: https://api.telegram.org)
    pub api_base: String,

    pub default_bot_token: Option<String>,
    pub default_chat_id: Option<i64>,

    /// Bot and chat used for the `ALL` property code
    pub consolidated_bot_token: Option<String>,
    pub consolidated_chat_id: Option<i64>,

    /// Property code → chat id, parsed from `TELEGRAM_PROPERTY_CHAT_MAP`
    pub chat_map: PropertyChatMap,

    /// Expected `X-Telegram-Bot-Api-Secret-Token` on webhook calls. The
    /// webhook route refuses every call while this is unset.
    pub webhook_secret: Option<String>,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |token: &Option<String>| token.as_ref().map(|_| "<redacted>");
        f.debug_struct("TelegramConfig")
            .field("api_base", &self.api_base)
            .field("default_bot_token", &redact(&self.default_bot_token))
            .field("default_chat_id", &self.default_chat_id)
            .field("consolidated_bot_token", &redact(&self.consolidated_bot_token))
            .field("consolidated_chat_id", &self.consolidated_chat_id)
            .field("chat_map", &self.chat_map)
            .field("webhook_secret", &redact(&self.webhook_secret))
            .finish()
    }
}

/// Mapping from property code to Telegram chat id.
///
/// Built once from a comma-separated list of `code:chatId` pairs and never
/// modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyChatMap(HashMap<String, i64>);

impl PropertyChatMap {
    /// Parse `"A:111, B:222"` style input. Malformed entries are skipped.
    pub fn parse(raw: &str) -> Self {
        let mut map = HashMap::new();

        for entry in raw.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            let Some((code, chat_id)) = entry.split_once(':') else {
                tracing::debug!(entry, "Skipping chat map entry without ':'");
                continue;
            };

            let (code, chat_id) = (code.trim(), chat_id.trim());
            if code.is_empty() || chat_id.is_empty() {
                tracing::debug!(entry, "Skipping incomplete chat map entry");
                continue;
            }

            match chat_id.parse::<i64>() {
                Ok(id) => {
                    map.insert(code.to_string(), id);
                }
                Err(_) => tracing::debug!(entry, "Skipping chat map entry with non-numeric id"),
            }
        }

        Self(map)
    }

    pub fn get(&self, property_code: &str) -> Option<i64> {
        self.0.get(property_code).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key → value source.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| {
            get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let chat_id = |key: &str| -> anyhow::Result<Option<i64>> {
            var(key)
                .map(|v| {
                    v.parse()
                        .map_err(|_| anyhow::anyhow!("{key} must be a valid integer chat id"))
                })
                .transpose()
        };

        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            smtp: SmtpConfig {
                host: var("SMTP_HOST"),
                port: var("SMTP_PORT")
                    .unwrap_or_else(|| "587".to_string())
                    .parse()
                    .map_err(|_| anyhow::anyhow!("SMTP_PORT must be a valid u16"))?,
                user: var("SMTP_USER"),
                password: var("SMTP_PASS"),
                from: var("SMTP_FROM"),
            },
            telegram: TelegramConfig {
                api_base: var("TELEGRAM_API_BASE")
                    .unwrap_or_else(|| "https://api.telegram.org".to_string()),
                default_bot_token: var("TELEGRAM_DEFAULT_BOT_TOKEN"),
                default_chat_id: chat_id("TELEGRAM_DEFAULT_CHAT_ID")?,
                consolidated_bot_token: var("TELEGRAM_CONSOLIDATED_BOT_TOKEN"),
                consolidated_chat_id: chat_id("TELEGRAM_CONSOLIDATED_CHAT_ID")?,
                chat_map: PropertyChatMap::parse(
                    &var("TELEGRAM_PROPERTY_CHAT_MAP").unwrap_or_default(),
                ),
                webhook_secret: var("TELEGRAM_WEBHOOK_SECRET"),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_map() {
        let map = PropertyChatMap::parse("A:111, B:222");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("A"), Some(111));
        assert_eq!(map.get("B"), Some(222));
    }

    #[test]
    fn test_parse_chat_map_skips_malformed_entries() {
        let map = PropertyChatMap::parse("A:111,,  ,NOCOLON, :5, C: ,D:abc, E : -1001");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("A"), Some(111));
        assert_eq!(map.get("E"), Some(-1001));
        assert_eq!(map.get("NOCOLON"), None);
        assert_eq!(map.get("C"), None);
        assert_eq!(map.get("D"), None);
    }

    #[test]
    fn test_parse_chat_map_empty_input() {
        assert!(PropertyChatMap::parse("").is_empty());
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.smtp.host, None);
        assert_eq!(config.telegram.api_base, "https://api.telegram.org");
        assert_eq!(config.telegram.default_chat_id, None);
        assert_eq!(config.telegram.webhook_secret, None);
        assert!(config.telegram.chat_map.is_empty());
    }

    #[test]
    fn test_values_are_read_and_trimmed() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SMTP_HOST", " smtp.example.com "),
            ("SMTP_PORT", "465"),
            ("SMTP_FROM", "desk@example.com"),
            ("TELEGRAM_DEFAULT_CHAT_ID", "-1001"),
            ("TELEGRAM_CONSOLIDATED_CHAT_ID", "42"),
            ("TELEGRAM_PROPERTY_CHAT_MAP", "A:111, B:222"),
        ]))
        .unwrap();
        assert_eq!(config.smtp.host.as_deref(), Some("smtp.example.com"));
        assert_eq!(config.smtp.port, 465);
        assert_eq!(config.smtp.from.as_deref(), Some("desk@example.com"));
        assert_eq!(config.telegram.default_chat_id, Some(-1001));
        assert_eq!(config.telegram.consolidated_chat_id, Some(42));
        assert_eq!(config.telegram.chat_map.get("B"), Some(222));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SMTP_HOST", "   "),
            ("SMTP_PORT", ""),
            ("TELEGRAM_DEFAULT_BOT_TOKEN", ""),
            ("TELEGRAM_DEFAULT_CHAT_ID", " "),
            ("TELEGRAM_API_BASE", ""),
        ]))
        .unwrap();
        assert_eq!(config.smtp.host, None);
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.telegram.default_bot_token, None);
        assert_eq!(config.telegram.default_chat_id, None);
        assert_eq!(config.telegram.api_base, "https://api.telegram.org");
    }

    #[test]
    fn test_invalid_smtp_port_is_error() {
        let err = AppConfig::from_lookup(lookup(&[("SMTP_PORT", "smtp")])).unwrap_err();
        assert!(err.to_string().contains("SMTP_PORT"));

        assert!(AppConfig::from_lookup(lookup(&[("SMTP_PORT", "70000")])).is_err());
    }

    #[test]
    fn test_invalid_chat_id_is_error() {
        let err = AppConfig::from_lookup(lookup(&[("TELEGRAM_DEFAULT_CHAT_ID", "abc")]))
            .unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_DEFAULT_CHAT_ID"));

        let err = AppConfig::from_lookup(lookup(&[("TELEGRAM_CONSOLIDATED_CHAT_ID", "1.5")]))
            .unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_CONSOLIDATED_CHAT_ID"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let smtp = SmtpConfig {
            password: Some("hunter2".to_string()),
            ..Default::default()
        };
        let telegram = TelegramConfig {
            default_bot_token: Some("123:secret".to_string()),
            ..Default::default()
        };
        assert!(!format!("{:?}", smtp).contains("hunter2"));
        assert!(!format!("{:?}", telegram).contains("123:secret"));
    }
}
