use serde_json::json;
use tracing::warn;

use crate::{
    domain::{BucketKind, CleanupOutcome, Notification},
    github::{self, FetchError, RestClient},
    progress::{ProgressEvent, ProgressSink},
};

/// Marks notifications read and unsubscribes from their threads.
///
/// Both calls are attempted for every notification; a failure is logged and
/// counted, never retried here and never aborts the sweep. There is no
/// rollback, so a half-failed notification can end up read but still
/// subscribed (or the reverse).
pub struct Cleanup<'a, C> {
    client: &'a C,
    progress: &'a dyn ProgressSink,
}

impl<'a, C: RestClient> Cleanup<'a, C> {
    pub fn new(client: &'a C, progress: &'a dyn ProgressSink) -> Self {
        Self { client, progress }
    }

    pub fn sweep(&self, bucket: BucketKind, notifications: &[Notification]) -> CleanupOutcome {
        let mut outcome = CleanupOutcome::default();
        for notification in notifications {
            outcome.attempted += 1;

            let marked_read = match self.mark_read(notification) {
                Ok(()) => true,
                Err(err) => {
                    warn!(
                        bucket = bucket.label(),
                        notification = %notification.id,
                        error = %err,
                        "Error marking as read"
                    );
                    false
                }
            };

            let unsubscribed = match self.unsubscribe(notification) {
                Ok(()) => true,
                Err(err) => {
                    warn!(
                        bucket = bucket.label(),
                        notification = %notification.id,
                        error = %err,
                        "Error unsubscribing"
                    );
                    false
                }
            };

            outcome.marked_read += usize::from(marked_read);
            outcome.unsubscribed += usize::from(unsubscribed);
            outcome.failures += usize::from(!marked_read) + usize::from(!unsubscribed);

            self.progress.record(&ProgressEvent::NotificationCleaned {
                bucket,
                notification_id: notification.id.clone(),
                marked_read,
                unsubscribed,
            });
        }
        outcome
    }

    fn mark_read(&self, notification: &Notification) -> Result<(), FetchError> {
        let path = github::api_path(self.client.base_url(), &notification.url)?;
        self.client.patch_json(&path, &json!([]))
    }

    fn unsubscribe(&self, notification: &Notification) -> Result<(), FetchError> {
        let path = github::api_path(self.client.base_url(), &notification.subscription_url)?;
        self.client.delete(&path)
    }
}
