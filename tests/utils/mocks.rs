use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{sleep, Duration};

use latter::notify::{Mailer, NotifyError, OutgoingMail};

// ============================================================================
// Mock Infrastructure
// ============================================================================

#[derive(Clone, Default)]
pub struct MockMailer {
    sent: Arc<RwLock<Vec<OutgoingMail>>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.read().await.clone()
    }

    /// Waits for the notification worker to deliver at least `count` mails
    pub async fn wait_for(&self, count: usize) -> Vec<OutgoingMail> {
        for _ in 0..100 {
            if self.sent.read().await.len() >= count {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        self.sent().await
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), NotifyError> {
        self.sent.write().await.push(mail.clone());
        Ok(())
    }
}
