//! SMTP email sender.
//!
//! A transport is built for every send and dropped when the send returns,
//! so each email opens, uses and closes its own connection. Port 465 uses
//! implicit TLS; any other port upgrades with STARTTLS when the server
//! offers it.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use booking_common::config::SmtpConfig;

use crate::Mailer;
use crate::error::NotifyError;
use crate::template::OutgoingEmail;

const IMPLICIT_TLS_PORT: u16 = 465;

#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Build a fresh transport from config. Missing host, user or password
    /// is reported here rather than at startup.
    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifyError> {
        let (Some(host), Some(user), Some(password)) = (
            self.config.host.as_deref(),
            self.config.user.as_deref(),
            self.config.password.as_deref(),
        ) else {
            return Err(NotifyError::SmtpConfig(
                "SMTP_HOST, SMTP_USER and SMTP_PASS must all be set".to_string(),
            ));
        };

        let params = TlsParameters::new(host.to_string())?;
        let tls = if self.config.port == IMPLICIT_TLS_PORT {
            Tls::Wrapper(params)
        } else {
            Tls::Opportunistic(params)
        };

        Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(self.config.port)
            .tls(tls)
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .build())
    }

    /// Sender mailbox: `SMTP_FROM`, else the SMTP user.
    fn from_address(&self) -> Result<Mailbox, NotifyError> {
        let from = self
            .config
            .from
            .as_deref()
            .or(self.config.user.as_deref())
            .unwrap_or_default();
        Ok(from.parse()?)
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, NotifyError> {
        let message = Message::builder()
            .from(self.from_address()?)
            .to(email.to.parse()?)
            .subject(email.subject.as_str())
            .multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                email.html.clone(),
            ))?;
        Ok(message)
    }

    /// Send one email. No retry; errors propagate unchanged.
    pub async fn send(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
        let transport = self.transport()?;
        let message = self.build_message(email)?;

        transport.send(message).await?;

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_mail(&self, email: &OutgoingEmail) -> Result<(), NotifyError> {
        self.send(email).await
    }
}
