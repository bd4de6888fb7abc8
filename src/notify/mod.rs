// Challenge e-mail notifications
//
// Notifications are built after a challenge change has been persisted and
// handed to a background queue. Delivery is best-effort: a failed send is
// logged and never reported back to the request that caused it.

// Public API - what other modules can use
pub use mailer::{LogMailer, Mailer, NotifyError, OutgoingMail, SendGridMailer, SENDGRID_ENDPOINT};
pub use notification::{ChallengeNotification, NotificationContext, NotificationKind};
pub use queue::NotificationQueue;

// Internal modules
mod mailer;
mod notification;
mod queue;
