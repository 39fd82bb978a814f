use std::sync::LazyLock;
use crate::domain::ports::EmailService;
use crate::error::AppError;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use regex::Regex;

static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid regex"));

/// Sends multipart (text + HTML) mail over STARTTLS SMTP.
pub struct SmtpEmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpEmailService {
    pub fn new(host: &str, username: String, password: String, from: String) -> Result<Self, AppError> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::InternalWithMsg(format!("SMTP relay {} unusable: {}", host, e)))?
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self { mailer, from })
    }
}

/// Plain-text fallback: tags stripped, blank lines collapsed.
fn plain_text(html: &str) -> String {
    TAGS.replace_all(html, "")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        let from = self.from.parse()
            .map_err(|_| AppError::InternalWithMsg(format!("Invalid sender address: {}", self.from)))?;
        let to = recipient.parse()
            .map_err(|_| AppError::InternalWithMsg(format!("Invalid recipient address: {}", recipient)))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(plain_text(html_body)),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::InternalWithMsg(format!("Failed to build message: {}", e)))?;

        self.mailer.send(email).await
            .map_err(|e| AppError::InternalWithMsg(format!("SMTP delivery failed: {}", e)))?;

        tracing::info!(to = %recipient, subject = %subject, "Email sent over SMTP");
        Ok(())
    }
}
