use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Settings;

/// Outbound mail seam. The dispatch pipeline only depends on this trait,
/// so tests can swap the SMTP transport for a recording fake.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<(), String>;
}

pub type Mailer = Arc<dyn MailTransport>;

/// SMTP-backed transport. Built once at startup and reused for every
/// notification; lettre pools the underlying connections.
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(settings: &Settings) -> Result<Self, String> {
        let creds = Credentials::new(
            settings.smtp_username.clone(),
            settings.smtp_password.clone(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
            .map_err(|e| format!("invalid SMTP host: {e}"))?
            .port(settings.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self {
            mailer,
            from: settings.mail_from.clone(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> Result<(), String> {
        let email = Message::builder()
            .from(self.from.parse().map_err(|e| format!("invalid from address: {e}"))?)
            .to(to.parse().map_err(|e| format!("invalid recipient address: {e}"))?)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(
                text_body.to_string(),
                html_body.to_string(),
            ))
            .map_err(|e| format!("failed to build email: {e}"))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| format!("SMTP error: {e}"))?;

        Ok(())
    }
}
