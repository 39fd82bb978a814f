use crate::domain::ports::EmailService;
use crate::error::AppError;
use async_trait::async_trait;
use tracing::info;

/// Development transport: nothing leaves the process.
pub struct LogEmailService;

#[async_trait]
impl EmailService for LogEmailService {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        info!(to = %recipient, subject = %subject, bytes = html_body.len(), "Email not sent (log transport)");
        tracing::debug!(body = %html_body, "Email body");
        Ok(())
    }
}
