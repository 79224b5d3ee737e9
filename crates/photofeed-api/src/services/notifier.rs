//! Subscriber notification fan-out over SMTP.
//!
//! One message per active subscriber; a failed send is counted and logged
//! with the recipient, never raised. The aggregate outcome comes back as a
//! [`NotifyReport`].

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use uuid::Uuid;

use photofeed_core::models::NO_DESCRIPTION;
use photofeed_core::{AppError, Config};
use photofeed_db::SubscriberStore;

const NOTIFY_SUBJECT: &str = "New photo uploaded";

/// Single-recipient mail transport, swappable in tests.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body_html: &str) -> Result<(), String>;
}

/// Lettre SMTP transport. The original service talks implicit TLS on 465,
/// which is lettre's `relay` default.
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Create the mailer from config. Returns `None` if SMTP is not
    /// configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let host = config.smtp_host.as_deref()?;
        let from: Mailbox = config.from_email.as_deref()?.parse().ok()?;

        let builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .ok()?
            .port(config.smtp_port);
        let builder = if let (Some(user), Some(pass)) =
            (&config.smtp_user, &config.smtp_password)
        {
            builder.credentials(Credentials::new(user.clone(), pass.clone()))
        } else {
            builder
        };
        tracing::info!(host = %host, port = config.smtp_port, "SMTP mailer initialized");

        Some(Self {
            mailer: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body_html: &str) -> Result<(), String> {
        let to_addr: Mailbox = to
            .parse()
            .map_err(|e| format!("Invalid recipient address: {}", e))?;
        let email = Message::builder()
            .from(self.from.clone())
            .to(to_addr)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body_html.to_string())
            .map_err(|e| e.to_string())?;
        self.mailer.send(email).await.map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyReport {
    pub sent: usize,
    pub failed: usize,
}

/// Sends the new-photo announcement to every active subscriber.
pub struct Notifier {
    subscribers: Arc<dyn SubscriberStore>,
    mailer: Arc<dyn Mailer>,
    base_url: String,
}

impl Notifier {
    pub fn new(
        subscribers: Arc<dyn SubscriberStore>,
        mailer: Arc<dyn Mailer>,
        base_url: String,
    ) -> Self {
        Self {
            subscribers,
            mailer,
            base_url,
        }
    }

    /// Build the notifier from config. Returns `None` when SMTP is not
    /// configured and notifications are disabled.
    pub fn from_config(config: &Config, subscribers: Arc<dyn SubscriberStore>) -> Option<Self> {
        let mailer = SmtpMailer::from_config(config)?;
        Some(Self::new(
            subscribers,
            Arc::new(mailer),
            config.base_url.clone(),
        ))
    }

    /// Notify all active subscribers about a committed image. Per-recipient
    /// failures are recorded and the loop continues.
    pub async fn notify_all(
        &self,
        description: Option<&str>,
        people_detected: i64,
        image_id: Uuid,
    ) -> Result<NotifyReport, AppError> {
        let active = self.subscribers.list_active().await?;
        let body = self.build_body(description, people_detected, image_id);

        let mut report = NotifyReport::default();
        for subscriber in &active {
            match self.mailer.send(&subscriber.email, NOTIFY_SUBJECT, &body).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        recipient = %subscriber.email,
                        error = %e,
                        "Failed to send notification"
                    );
                }
            }
        }
        Ok(report)
    }

    fn build_body(
        &self,
        description: Option<&str>,
        people_detected: i64,
        image_id: Uuid,
    ) -> String {
        format!(
            "<p>A new photo has been uploaded.</p>\n\
             <p><strong>Description:</strong> {}</p>\n\
             <p><strong>People detected:</strong> {}</p>\n\
             <p>View image: <a href=\"{}/images/{}\">Open photo</a></p>",
            description.unwrap_or(NO_DESCRIPTION),
            people_detected,
            self.base_url.trim_end_matches('/'),
            image_id
        )
    }
}
