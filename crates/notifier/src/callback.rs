//! Telegram callback queries from the Confirm/Reject keyboard.
//!
//! Only the fields the decision flow reads are modelled; everything else in
//! the update is ignored.

use serde::Deserialize;

/// Telegram caps `callback_data` at 64 bytes.
const CALLBACK_DATA_LIMIT: usize = 64;

/// Incoming webhook update.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    /// The staff message the button was attached to
    #[serde(default)]
    pub message: Option<CallbackMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackMessage {
    pub message_id: i64,
    pub chat: Chat,
    /// Plain text of the message, HTML removed
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Staff decision on a booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Reject,
}

impl Decision {
    fn tag(self) -> &'static str {
        match self {
            Decision::Confirm => "CONFIRM",
            Decision::Reject => "REJECT",
        }
    }
}

/// Button payload: `CONFIRM|<request_id>`, or just `CONFIRM` when the
/// request id would push it past Telegram's limit.
pub fn callback_data(decision: Decision, request_id: &str) -> String {
    let full = format!("{}|{}", decision.tag(), request_id);
    if full.len() <= CALLBACK_DATA_LIMIT {
        full
    } else {
        decision.tag().to_string()
    }
}

/// Parse a button payload into the decision and the request id it carries.
pub fn parse_callback_data(data: &str) -> Option<(Decision, Option<&str>)> {
    let (tag, request_id) = match data.split_once('|') {
        Some((tag, id)) => (tag, Some(id).filter(|id| !id.is_empty())),
        None => (data, None),
    };

    let decision = match tag {
        "CONFIRM" => Decision::Confirm,
        "REJECT" => Decision::Reject,
        _ => return None,
    };
    Some((decision, request_id))
}
