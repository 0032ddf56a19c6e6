use super::{Notification, Notifier};
use crate::config::{EmailConfig, SmtpSecurity};
use crate::error::{PlantCareError, Result};
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Sends notifications as plain-text email over authenticated SMTP.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    host: String,
}

impl SmtpNotifier {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let builder = match config.security {
            SmtpSecurity::Implicit => {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            }
            SmtpSecurity::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            }
        }
        .map_err(|e| {
            PlantCareError::Notify(format!("SMTP setup for {}: {}", config.smtp_host, e))
        })?;

        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: parse_mailbox(config.sender())?,
            to: parse_mailbox(config.recipient())?,
            host: config.smtp_host.clone(),
        })
    }

    fn build_message(&self, notification: &Notification) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(notification.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .map_err(|e| PlantCareError::Notify(format!("Failed to build email: {}", e)))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| PlantCareError::Config(format!("Invalid email address '{}': {}", address, e)))
}

#[async_trait]
impl Notifier for SmtpNotifier {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn notify(&self, notification: &Notification) -> Result<()> {
        let message = self.build_message(notification)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| PlantCareError::Notify(format!("SMTP {}: {}", self.host, e)))?;

        tracing::info!(
            to = %self.to,
            subject = %notification.subject,
            "Email sent"
        );
        Ok(())
    }

    async fn test_connection(&self) -> Result<bool> {
        self.transport
            .test_connection()
            .await
            .map_err(|e| PlantCareError::Notify(format!("SMTP {}: {}", self.host, e)))
    }
}
