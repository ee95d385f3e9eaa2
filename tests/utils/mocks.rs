use async_trait::async_trait;
use tokio::sync::Mutex;

use appetized::{
    verification::{EmailMessage, Mailer},
    AppError,
};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Mailer that keeps every outgoing message instead of delivering it
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

#[allow(dead_code)]
impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().await.clone()
    }

    /// The `code` query parameter of the newest verification link sent to `to`
    pub async fn verification_code_for(&self, to: &str) -> Option<String> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|message| message.to == to)
            .and_then(|message| {
                let (_, rest) = message.html.split_once("code=")?;
                rest.split('"').next().map(str::to_string)
            })
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}
