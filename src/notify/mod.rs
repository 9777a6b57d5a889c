//! Notification fan-out.
//!
//! Runs after the triggering write has committed, in the same request. Each
//! recipient gets one record; a failed write is logged and skipped, never retried,
//! and never turns the mutation's response into an error.

pub mod events;

use uuid::Uuid;

use crate::models::Notification;
use crate::store::Store;

pub use events::{task_link, MutationEvent};

/// How many notification records were written and how many writes failed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanOutReport {
    pub delivered: usize,
    pub failed: usize,
}

impl FanOutReport {
    fn absorb(&mut self, other: FanOutReport) {
        self.delivered += other.delivered;
        self.failed += other.failed;
    }
}

/// Writes one notification per recipient. Callers pass distinct ids.
pub async fn notify(
    store: &dyn Store,
    recipients: &[Uuid],
    message: &str,
    link: &str,
) -> FanOutReport {
    let mut report = FanOutReport::default();
    for recipient in recipients {
        let notification = Notification::new(*recipient, message, link);
        match store.insert_notification(&notification).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                log::warn!("notification for user {} was not stored: {}", recipient, e);
                report.failed += 1;
            }
        }
    }
    report
}

/// Fans out every event in order.
pub async fn dispatch(
    store: &dyn Store,
    events: impl IntoIterator<Item = MutationEvent>,
) -> FanOutReport {
    let mut report = FanOutReport::default();
    for event in events {
        let recipients = event.recipients();
        if recipients.is_empty() {
            continue;
        }
        report.absorb(notify(store, &recipients, &event.message(), &event.link()).await);
    }
    if report.failed > 0 {
        log::error!(
            "notification fan-out incomplete: {} stored, {} failed",
            report.delivered,
            report.failed
        );
    }
    report
}
