use async_trait::async_trait;
use tracing::info;

use crate::shared::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl EmailMessage {
    /// Builds the account verification email for `token`
    pub fn verification(email_domain: &str, client_url: &str, to: &str, token: &str) -> Self {
        let link = format!(
            "{}/verify-email?code={}",
            client_url.trim_end_matches('/'),
            token
        );

        Self {
            from: format!("Appetized <no-reply@{}>", email_domain),
            to: to.to_string(),
            subject: "Verify your email".to_string(),
            html: format!("<a href=\"{}\">Verify your email</a>", link),
        }
    }
}

/// Outbound mail transport
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError>;
}

/// Writes messages to the log instead of delivering them
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            body = %message.html,
            "Outgoing email"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_message() {
        let message = EmailMessage::verification(
            "appetized.app",
            "http://localhost:3000/",
            "dee@example.com",
            "abc",
        );

        assert_eq!(message.from, "Appetized <no-reply@appetized.app>");
        assert_eq!(message.to, "dee@example.com");
        assert!(message
            .html
            .contains("http://localhost:3000/verify-email?code=abc"));
    }

    #[tokio::test]
    async fn test_log_mailer_accepts_messages() {
        let message = EmailMessage::verification("d", "c", "to@example.com", "t");
        assert!(LogMailer.send(&message).await.is_ok());
    }
}
