use tracing::{debug, warn};

use crate::{
    domain::{BucketKind, Buckets, Notification, PullRequest},
    github::{self, FetchError, RestClient},
    progress::{ProgressEvent, ProgressSink},
};

pub const DEPLOY_TRAIN_MARKER: &str = "Grouped deploy branch train";

pub fn is_deploy_train(notification: &Notification) -> bool {
    notification.subject.kind == "PullRequest"
        && notification.subject.title.contains(DEPLOY_TRAIN_MARKER)
}

pub fn is_ci_activity(notification: &Notification) -> bool {
    notification.reason == "ci_activity"
}

pub fn is_review_requested(notification: &Notification) -> bool {
    notification.reason == "review_requested"
}

/// Fetches the pull request a notification points at. Not cached: two
/// notifications for the same pull request mean two requests.
pub fn lookup_pull_request<C: RestClient>(
    client: &C,
    notification: &Notification,
) -> Result<PullRequest, FetchError> {
    let url = notification
        .subject
        .url
        .as_deref()
        .ok_or(FetchError::MissingSubjectUrl)?;
    let path = github::api_path(client.base_url(), url)?;
    client.get_json(&path)
}

pub struct Classifier<'a, C> {
    client: &'a C,
    progress: &'a dyn ProgressSink,
}

impl<'a, C: RestClient> Classifier<'a, C> {
    pub fn new(client: &'a C, progress: &'a dyn ProgressSink) -> Self {
        Self { client, progress }
    }

    /// Sorts one page into buckets. Each predicate is tested independently,
    /// so a notification may land in more than one bucket.
    pub fn classify_page(&self, page: &[Notification]) -> Buckets {
        let mut buckets = Buckets::default();
        for notification in page {
            if is_deploy_train(notification) {
                buckets.push(BucketKind::DeployTrain, notification.clone());
            }
            if is_ci_activity(notification) {
                buckets.push(BucketKind::CiActivity, notification.clone());
            }
            if self.is_reviewed_and_closed(notification) {
                buckets.push(BucketKind::ReviewedClosed, notification.clone());
            }
        }
        buckets
    }

    fn is_reviewed_and_closed(&self, notification: &Notification) -> bool {
        if !is_review_requested(notification) {
            return false;
        }

        match lookup_pull_request(self.client, notification) {
            Ok(pull_request) => {
                let closed = pull_request.is_closed();
                debug!(
                    notification = %notification.id,
                    pull_request = %pull_request.url,
                    state = %pull_request.state,
                    "looked up review request"
                );
                self.progress.record(&ProgressEvent::PullRequestLookedUp {
                    notification_id: notification.id.clone(),
                    closed,
                });
                closed
            }
            // A failed lookup says nothing about the pull request; leave the
            // notification alone.
            Err(err) => {
                warn!(
                    notification = %notification.id,
                    title = %notification.subject.title,
                    error = %err,
                    "Error fetching pull request"
                );
                self.progress.record(&ProgressEvent::PullRequestLookupFailed {
                    notification_id: notification.id.clone(),
                });
                false
            }
        }
    }
}
