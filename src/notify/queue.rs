use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::{ChallengeNotification, Mailer, NotifyError, OutgoingMail};

/// Handle for queueing notification mails.
///
/// A single worker task delivers mails in the order they were queued.
/// The worker stops once every handle has been dropped and the queue drained.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    sender: mpsc::UnboundedSender<OutgoingMail>,
}

impl NotificationQueue {
    /// Spawns the delivery worker and returns a handle to feed it
    pub fn start(mailer: Arc<dyn Mailer>) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_delivery_worker(mailer, receiver));
        (Self { sender }, worker)
    }

    /// Queues a challenge notification; never blocks and never fails the caller
    pub fn notify(&self, notification: &ChallengeNotification) {
        debug!(
            template = notification.template_name(),
            challenge_id = %notification.context().challenge.id,
            "Queueing challenge notification"
        );
        if let Err(e) = self.enqueue(notification.to_mail()) {
            warn!(error = %e, "Dropping challenge notification");
        }
    }

    pub fn enqueue(&self, mail: OutgoingMail) -> Result<(), NotifyError> {
        self.sender.send(mail).map_err(|_| NotifyError::QueueClosed)
    }
}

#[instrument(skip_all)]
async fn run_delivery_worker(
    mailer: Arc<dyn Mailer>,
    mut receiver: mpsc::UnboundedReceiver<OutgoingMail>,
) {
    info!("Starting notification delivery worker");

    while let Some(mail) = receiver.recv().await {
        match mailer.send(&mail).await {
            Ok(()) => {
                info!(to = %mail.to, subject = %mail.subject, "Notification delivered");
            }
            Err(e) => {
                warn!(
                    to = %mail.to,
                    subject = %mail.subject,
                    error = %e,
                    "Notification delivery failed"
                );
            }
        }
    }

    info!("Notification delivery worker stopped");
}
