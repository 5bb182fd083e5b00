// src/notify/email.rs
//! SMTP delivery for the HTML report.

use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSender {
    /// Build from SMTP_HOST/SMTP_USER/SMTP_PASS + REPORT_EMAIL_FROM/TO.
    /// Returns an error (rather than panicking) so the pipeline can run
    /// without email configured.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("SMTP_HOST").context("SMTP_HOST missing")?;
        let user = std::env::var("SMTP_USER").context("SMTP_USER missing")?;
        let pass = std::env::var("SMTP_PASS").context("SMTP_PASS missing")?;
        let from_addr = std::env::var("REPORT_EMAIL_FROM").context("REPORT_EMAIL_FROM missing")?;
        let to_addr = std::env::var("REPORT_EMAIL_TO").context("REPORT_EMAIL_TO missing")?;

        let creds = Credentials::new(user, pass);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .context("invalid SMTP_HOST")?
            .credentials(creds)
            .build();

        let from = from_addr.parse().context("invalid REPORT_EMAIL_FROM")?;
        let to = to_addr.parse().context("invalid REPORT_EMAIL_TO")?;

        Ok(Self { mailer, from, to })
    }

    pub async fn send_report(&self, subject: &str, html: String) -> Result<()> {
        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(header::ContentType::TEXT_HTML)
            .body(html)
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        tracing::info!(%subject, "report emailed");
        Ok(())
    }
}
