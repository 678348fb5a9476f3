//! Booking notification pipeline.
//!
//! For one validated booking:
//! 1. Build a request id and the staff chat message
//! 2. Resolve the chat route for the property
//! 3. Send the staff chat message
//! 4. Send the guest confirmation email
//!
//! Steps run in order and the first failure stops the sequence. Nothing is
//! retried or rolled back.
//!
//! The staff message carries Confirm/Reject buttons. A button press comes
//! back as a callback update; the booking is read back from the message text,
//! so no booking state is kept between the two.

use std::sync::Arc;

use chrono::Utc;

use booking_common::types::ValidatedBooking;

use crate::callback::{Decision, Update, parse_callback_data};
use crate::error::NotifyError;
use crate::routing::RouteResolver;
use crate::template::{
    GuestEmail, decision_ack, decision_keyboard, parse_staff_message, request_id, staff_message,
};
use crate::{ChatNotifier, Mailer};

#[derive(Clone)]
pub struct BookingDispatcher {
    resolver: Arc<RouteResolver>,
    chat: Arc<dyn ChatNotifier>,
    mailer: Arc<dyn Mailer>,
}

impl BookingDispatcher {
    pub fn new(
        resolver: Arc<RouteResolver>,
        chat: Arc<dyn ChatNotifier>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            resolver,
            chat,
            mailer,
        }
    }

    /// Notify staff, then the guest. Returns the request id on success.
    pub async fn dispatch(&self, booking: &ValidatedBooking) -> Result<String, NotifyError> {
        let request_id = request_id(&booking.property_code, &booking.room_id, Utc::now());
        let text = staff_message(booking, &request_id);

        let route = self.resolver.resolve(&booking.property_code);
        let keyboard = decision_keyboard(&request_id);
        self.chat.send_chat(&route, &text, Some(&keyboard)).await?;

        let email = GuestEmail::from_booking(booking, &request_id).render();
        self.mailer.send_mail(&email).await?;

        tracing::info!(
            request_id = %request_id,
            property_code = %booking.property_code,
            chat_id = route.chat_id,
            "Booking notifications delivered"
        );

        Ok(request_id)
    }

    /// Act on a Confirm/Reject button press.
    ///
    /// Updates that are not a recognised button press return `Ok(None)`.
    /// Otherwise the decision is acknowledged in the same chat and the guest
    /// gets the matching email.
    pub async fn handle_callback(&self, update: &Update) -> Result<Option<Decision>, NotifyError> {
        let Some(query) = &update.callback_query else {
            return Ok(None);
        };
        let Some((decision, data_request_id)) = query.data.as_deref().and_then(parse_callback_data)
        else {
            tracing::debug!(update_id = update.update_id, "Ignoring unknown callback data");
            return Ok(None);
        };

        let message = query
            .message
            .as_ref()
            .ok_or(NotifyError::MissingField("message"))?;
        let text = message
            .text
            .as_deref()
            .ok_or(NotifyError::MissingField("text"))?;

        let mut guest = parse_staff_message(text)?;
        if let Some(id) = data_request_id {
            guest.request_id = id.to_string();
        }

        // Same bot as the original message, answering in the chat it came from
        let mut route = self.resolver.resolve(&guest.property_code);
        route.chat_id = message.chat.id;

        self.chat
            .send_chat(&route, &decision_ack(decision, &guest.request_id), None)
            .await?;
        self.mailer.send_mail(&guest.render_decision(decision)).await?;

        tracing::info!(
            request_id = %guest.request_id,
            decision = ?decision,
            chat_id = route.chat_id,
            "Booking decision delivered"
        );

        Ok(Some(decision))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use booking_common::config::{PropertyChatMap, TelegramConfig};
    use booking_common::types::{BookingRequest, NotificationRoute};

    use super::*;
    use crate::template::OutgoingEmail;

    #[derive(Default)]
    struct FakeChat {
        fail: bool,
        sent: Mutex<Vec<(NotificationRoute, String, Option<Value>)>>,
    }

    #[async_trait]
    impl ChatNotifier for FakeChat {
        async fn send_chat(
            &self,
            route: &NotificationRoute,
            text: &str,
            reply_markup: Option<&Value>,
        ) -> Result<Value, NotifyError> {
            self.sent
                .lock()
                .unwrap()
                .push((route.clone(), text.to_string(), reply_markup.cloned()));
            if self.fail {
                return Err(NotifyError::Telegram {
                    status: 200,
                    description: "chat not found".to_string(),
                });
            }
            Ok(json!({"ok": true}))
        }
    }

    #[derive(Default)]
    struct FakeMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl Mailer for FakeMailer {
        async fn send_mail(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    fn resolver() -> Arc<RouteResolver> {
        Arc::new(RouteResolver::new(TelegramConfig {
            default_bot_token: Some("default-token".to_string()),
            chat_map: PropertyChatMap::parse("B2X:555"),
            ..Default::default()
        }))
    }

    fn booking() -> ValidatedBooking {
        BookingRequest {
            property_code: "B2X".to_string(),
            room_id: "101".to_string(),
            guest_name: "Jane Doe".to_string(),
            phone: "+15551234567".to_string(),
            email: "jane@example.com".to_string(),
            check_in: "2024-06-01".to_string(),
            check_out: "2024-06-05".to_string(),
            note: String::new(),
        }
        .validate_into()
        .unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_sends_chat_then_email() {
        let chat = Arc::new(FakeChat::default());
        let mailer = Arc::new(FakeMailer::default());
        let dispatcher = BookingDispatcher::new(resolver(), chat.clone(), mailer.clone());

        let request_id = dispatcher.dispatch(&booking()).await.unwrap();
        assert!(request_id.starts_with("BR-"));
        assert!(request_id.ends_with("-B2X-101"));

        let chats = chat.sent.lock().unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].0.chat_id, 555);
        assert_eq!(chats[0].0.bot_token, "default-token");
        assert!(chats[0].1.contains(&request_id));
        assert_eq!(chats[0].2, Some(decision_keyboard(&request_id)));

        let mails = mailer.sent.lock().unwrap();
        assert_eq!(mails.len(), 1);
        assert_eq!(mails[0].to, "jane@example.com");
    }

    #[tokio::test]
    async fn test_chat_failure_skips_email() {
        let chat = Arc::new(FakeChat {
            fail: true,
            ..Default::default()
        });
        let mailer = Arc::new(FakeMailer::default());
        let dispatcher = BookingDispatcher::new(resolver(), chat.clone(), mailer.clone());

        let err = dispatcher.dispatch(&booking()).await.unwrap_err();
        assert_eq!(err.to_string(), "Telegram failed: 200 chat not found");
        assert_eq!(chat.sent.lock().unwrap().len(), 1);
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    /// Plain text Telegram hands back for a staff message.
    fn staff_text(request_id: &str) -> String {
        staff_message(&booking(), request_id)
            .replace("<b>", "")
            .replace("</b>", "")
            .replace("<code>", "")
            .replace("</code>", "")
    }

    fn button_press(data: &str, text: Option<String>) -> Update {
        serde_json::from_value(json!({
            "update_id": 10,
            "callback_query": {
                "id": "cb-1",
                "data": data,
                "message": {
                    "message_id": 99,
                    "chat": {"id": -4242},
                    "text": text,
                }
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_confirm_press_acks_and_emails_guest() {
        let chat = Arc::new(FakeChat::default());
        let mailer = Arc::new(FakeMailer::default());
        let dispatcher = BookingDispatcher::new(resolver(), chat.clone(), mailer.clone());

        let update = button_press(
            "CONFIRM|BR-1717200000-B2X-101",
            Some(staff_text("BR-1717200000-B2X-101")),
        );
        let decision = dispatcher.handle_callback(&update).await.unwrap();
        assert_eq!(decision, Some(Decision::Confirm));

        let chats = chat.sent.lock().unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].0.chat_id, -4242);
        assert_eq!(chats[0].0.bot_token, "default-token");
        assert!(chats[0].1.contains("CONFIRMED"));
        assert!(chats[0].1.contains("BR-1717200000-B2X-101"));
        assert_eq!(chats[0].2, None);

        let mails = mailer.sent.lock().unwrap();
        assert_eq!(mails.len(), 1);
        assert_eq!(mails[0].to, "jane@example.com");
        assert_eq!(mails[0].subject, "Booking Confirmed");
    }

    #[tokio::test]
    async fn test_reject_press_without_id_uses_message_id_line() {
        let chat = Arc::new(FakeChat::default());
        let mailer = Arc::new(FakeMailer::default());
        let dispatcher = BookingDispatcher::new(resolver(), chat.clone(), mailer.clone());

        let update = button_press("REJECT", Some(staff_text("BR-9-B2X-101")));
        let decision = dispatcher.handle_callback(&update).await.unwrap();
        assert_eq!(decision, Some(Decision::Reject));

        let mails = mailer.sent.lock().unwrap();
        assert_eq!(mails[0].subject, "Booking Not Confirmed");
        assert!(mails[0].text.contains("BR-9-B2X-101"));
        assert!(chat.sent.lock().unwrap()[0].1.contains("BR-9-B2X-101"));
    }

    #[tokio::test]
    async fn test_non_button_updates_are_ignored() {
        let chat = Arc::new(FakeChat::default());
        let mailer = Arc::new(FakeMailer::default());
        let dispatcher = BookingDispatcher::new(resolver(), chat.clone(), mailer.clone());

        let update: Update = serde_json::from_value(json!({"update_id": 1})).unwrap();
        assert_eq!(dispatcher.handle_callback(&update).await.unwrap(), None);

        let update = button_press("SNOOZE|BR-1", Some(staff_text("BR-1")));
        assert_eq!(dispatcher.handle_callback(&update).await.unwrap(), None);

        assert!(chat.sent.lock().unwrap().is_empty());
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_press_without_message_text_is_error() {
        let chat = Arc::new(FakeChat::default());
        let mailer = Arc::new(FakeMailer::default());
        let dispatcher = BookingDispatcher::new(resolver(), chat.clone(), mailer.clone());

        let err = dispatcher
            .handle_callback(&button_press("CONFIRM|BR-1", None))
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::MissingField("text")));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }
}
