//! Booking → notification content.
//!
//! Produces the HTML staff chat message with its Confirm/Reject keyboard,
//! and the guest emails. Every guest-supplied value is escaped before it
//! goes into HTML.
//!
//! The staff message doubles as the record of the booking: when staff press
//! a button, [`parse_staff_message`] reads the details back from the
//! message text Telegram returns with the callback.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use booking_common::types::ValidatedBooking;

use crate::callback::{Decision, callback_data};
use crate::error::NotifyError;

const GUEST_EMAIL_SUBJECT: &str = "Booking Request Received";

const LABEL_PROPERTY: &str = "Property";
const LABEL_ROOM: &str = "Room";
const LABEL_GUEST: &str = "Guest";
const LABEL_PHONE: &str = "Phone";
const LABEL_EMAIL: &str = "Email";
const LABEL_CHECK_IN: &str = "Check-in";
const LABEL_CHECK_OUT: &str = "Check-out";
const LABEL_NOTE: &str = "Note";
const LABEL_REQUEST_ID: &str = "Request ID";

/// Reference shown to staff and guest, e.g. `BR-1717200000-B2X-101`.
pub fn request_id(property_code: &str, room_id: &str, now: DateTime<Utc>) -> String {
    format!("BR-{}-{}-{}", now.timestamp(), property_code, room_id)
}

/// Escape the characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// One `<b>Label:</b> value` line. Line breaks in the value are flattened
/// so each field stays on its own line.
fn field_line(label: &str, value: &str) -> String {
    format!(
        "<b>{}:</b> {}",
        label,
        escape_html(&value.replace(['\r', '\n'], " "))
    )
}

/// Multi-line staff notification. The note line is omitted when empty.
pub fn staff_message(booking: &ValidatedBooking, request_id: &str) -> String {
    let mut lines = vec![
        "<b>New booking request</b>".to_string(),
        field_line(LABEL_PROPERTY, &booking.property_code),
        field_line(LABEL_ROOM, &booking.room_id),
        field_line(LABEL_GUEST, &booking.guest_name),
        field_line(LABEL_PHONE, &booking.phone),
        field_line(LABEL_EMAIL, &booking.email),
        field_line(LABEL_CHECK_IN, &booking.check_in),
        field_line(LABEL_CHECK_OUT, &booking.check_out),
    ];

    if !booking.note.is_empty() {
        lines.push(field_line(LABEL_NOTE, &booking.note));
    }

    lines.push(format!(
        "<b>{}:</b> <code>{}</code>",
        LABEL_REQUEST_ID,
        escape_html(request_id)
    ));
    lines.join("\n")
}

/// Inline keyboard attached to the staff message.
pub fn decision_keyboard(request_id: &str) -> Value {
    json!({
        "inline_keyboard": [[
            {"text": "✅ Confirm", "callback_data": callback_data(Decision::Confirm, request_id)},
            {"text": "❌ Reject", "callback_data": callback_data(Decision::Reject, request_id)},
        ]]
    })
}

/// Chat acknowledgement posted after staff decide.
pub fn decision_ack(decision: Decision, request_id: &str) -> String {
    let verdict = match decision {
        Decision::Confirm => "✅ CONFIRMED",
        Decision::Reject => "❌ REJECTED",
    };
    format!("{} <code>{}</code>", verdict, escape_html(request_id))
}

/// Recover the guest email fields from the plain text of a staff message.
///
/// Telegram returns message text with the HTML removed, so each field is a
/// `Label: value` line. The first occurrence of a label wins, except the
/// request id, which is always the last line.
pub fn parse_staff_message(text: &str) -> Result<GuestEmail, NotifyError> {
    let mut fields: HashMap<&str, &str> = HashMap::new();
    let mut request_id = None;

    for line in text.lines() {
        let Some((label, value)) = line.split_once(": ") else {
            continue;
        };
        let (label, value) = (label.trim(), value.trim());
        if label == LABEL_REQUEST_ID {
            request_id = Some(value);
        } else {
            fields.entry(label).or_insert(value);
        }
    }

    let take = |label: &'static str| {
        fields
            .get(label)
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
            .ok_or(NotifyError::MissingField(label))
    };

    Ok(GuestEmail {
        to: take(LABEL_EMAIL)?,
        guest_name: take(LABEL_GUEST)?,
        property_code: take(LABEL_PROPERTY)?,
        room_id: take(LABEL_ROOM)?,
        check_in: take(LABEL_CHECK_IN)?,
        check_out: take(LABEL_CHECK_OUT)?,
        request_id: request_id
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or(NotifyError::MissingField(LABEL_REQUEST_ID))?,
    })
}

/// Fully rendered email, ready for the SMTP sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Booking fields the guest confirmation email is built from.
#[derive(Debug, Clone)]
pub struct GuestEmail {
    pub to: String,
    pub guest_name: String,
    pub property_code: String,
    pub room_id: String,
    pub check_in: String,
    pub check_out: String,
    pub request_id: String,
}

impl GuestEmail {
    pub fn from_booking(booking: &ValidatedBooking, request_id: &str) -> Self {
        Self {
            to: booking.email.clone(),
            guest_name: booking.guest_name.clone(),
            property_code: booking.property_code.clone(),
            room_id: booking.room_id.clone(),
            check_in: booking.check_in.clone(),
            check_out: booking.check_out.clone(),
            request_id: request_id.to_string(),
        }
    }

    pub fn render(&self) -> OutgoingEmail {
        let text = format!(
            "Hello {name},\n\n\
             Your booking request has been received.\n\n\
             Property: {property}\n\
             Room: {room}\n\
             Dates: {check_in} to {check_out}\n\
             Request ID: {request_id}\n\n\
             Our team will call you soon to confirm.",
            name = self.guest_name,
            property = self.property_code,
            room = self.room_id,
            check_in = self.check_in,
            check_out = self.check_out,
            request_id = self.request_id,
        );

        let html = format!(
            "<p>Hello {name},</p>\
             <p>Your booking request has been received.</p>\
             <table>\
             <tr><td><b>Property</b></td><td>{property}</td></tr>\
             <tr><td><b>Room</b></td><td>{room}</td></tr>\
             <tr><td><b>Dates</b></td><td>{check_in} to {check_out}</td></tr>\
             <tr><td><b>Request ID</b></td><td>{request_id}</td></tr>\
             </table>\
             <p>Our team will call you soon to confirm.</p>",
            name = escape_html(&self.guest_name),
            property = escape_html(&self.property_code),
            room = escape_html(&self.room_id),
            check_in = escape_html(&self.check_in),
            check_out = escape_html(&self.check_out),
            request_id = escape_html(&self.request_id),
        );

        OutgoingEmail {
            to: self.to.clone(),
            subject: GUEST_EMAIL_SUBJECT.to_string(),
            html,
            text,
        }
    }

    /// Email sent once staff confirm or reject the booking.
    pub fn render_decision(&self, decision: Decision) -> OutgoingEmail {
        let (subject, headline) = match decision {
            Decision::Confirm => ("Booking Confirmed", "Your booking is confirmed."),
            Decision::Reject => (
                "Booking Not Confirmed",
                "Unfortunately your booking could not be confirmed.",
            ),
        };

        let text = format!(
            "Hello {name},\n\n\
             {headline}\n\n\
             Property: {property}\n\
             Room: {room}\n\
             Dates: {check_in} to {check_out}\n\
             Request ID: {request_id}",
            name = self.guest_name,
            property = self.property_code,
            room = self.room_id,
            check_in = self.check_in,
            check_out = self.check_out,
            request_id = self.request_id,
        );

        let html = format!(
            "<p>Hello {name},</p>\
             <p>{headline}</p>\
             <table>\
             <tr><td><b>Property</b></td><td>{property}</td></tr>\
             <tr><td><b>Room</b></td><td>{room}</td></tr>\
             <tr><td><b>Dates</b></td><td>{check_in} to {check_out}</td></tr>\
             <tr><td><b>Request ID</b></td><td>{request_id}</td></tr>\
             </table>",
            name = escape_html(&self.guest_name),
            property = escape_html(&self.property_code),
            room = escape_html(&self.room_id),
            check_in = escape_html(&self.check_in),
            check_out = escape_html(&self.check_out),
            request_id = escape_html(&self.request_id),
        );

        OutgoingEmail {
            to: self.to.clone(),
            subject: subject.to_string(),
            html,
            text,
        }
    }
}
