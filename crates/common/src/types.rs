use std::fmt;
use std::ops::Deref;

use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;

/// Inbound booking request as posted by the booking form.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[validate(length(min = 3, message = "propertyCode must be at least 3 characters"))]
    pub property_code: String,

    #[validate(length(min = 1, message = "roomId is required"))]
    pub room_id: String,

    #[validate(length(min = 2, message = "guestName must be at least 2 characters"))]
    pub guest_name: String,

    #[validate(length(min = 6, message = "phone must be at least 6 characters"))]
    pub phone: String,

    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,

    /// Date strings are passed through as-is; no calendar validation.
    #[validate(length(min = 8, message = "checkIn must be at least 8 characters"))]
    pub check_in: String,

    #[validate(length(min = 8, message = "checkOut must be at least 8 characters"))]
    pub check_out: String,

    #[serde(default)]
    pub note: String,
}

impl BookingRequest {
    /// Validate the request, consuming it into a read-only [`ValidatedBooking`].
    pub fn validate_into(self) -> Result<ValidatedBooking, AppError> {
        match self.validate() {
            Ok(()) => Ok(ValidatedBooking(self)),
            Err(errors) => {
                let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
                fields.sort_by(|a, b| a.0.cmp(&b.0));

                let message = fields
                    .iter()
                    .flat_map(|(field, errs)| {
                        errs.iter().map(move |e| match &e.message {
                            Some(msg) => msg.to_string(),
                            None => format!("{} is invalid", field),
                        })
                    })
                    .collect::<Vec<_>>()
                    .join("; ");

                Err(AppError::Validation(message))
            }
        }
    }
}

/// A booking request that passed validation. Fields are only readable.
#[derive(Debug, Clone)]
pub struct ValidatedBooking(BookingRequest);

impl Deref for ValidatedBooking {
    type Target = BookingRequest;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Where a staff chat message goes: bot credential plus chat id.
///
/// Resolved per request and never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct NotificationRoute {
    pub bot_token: String,
    pub chat_id: i64,
}

impl fmt::Debug for NotificationRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationRoute")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}
