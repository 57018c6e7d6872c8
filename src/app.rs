use tracing::info;

use crate::{
    classify::Classifier,
    cleanup::Cleanup,
    domain::{BucketKind, Buckets, TriageReport},
    github::RestClient,
    paginate::NotificationPager,
    progress::ProgressSink,
};

pub const APP_NAME: &str = "sweep";

/// One full pass: page through the feed, classify each page as it arrives,
/// then clean up every bucket.
pub struct Triage<'a, C> {
    client: &'a C,
    progress: &'a dyn ProgressSink,
}

impl<'a, C: RestClient> Triage<'a, C> {
    pub fn new(client: &'a C, progress: &'a dyn ProgressSink) -> Self {
        Self { client, progress }
    }

    pub fn collect(&self) -> (usize, Buckets) {
        let classifier = Classifier::new(self.client, self.progress);
        let mut total = 0;
        let mut buckets = Buckets::default();
        for page in NotificationPager::new(self.client, self.progress) {
            total += page.notifications.len();
            buckets.extend(classifier.classify_page(&page.notifications));
        }
        (total, buckets)
    }

    pub fn run(&self) -> TriageReport {
        let (total_notifications, buckets) = self.collect();

        let cleanup = Cleanup::new(self.client, self.progress);
        let outcomes = BucketKind::ALL
            .iter()
            .map(|&kind| (kind, cleanup.sweep(kind, buckets.get(kind))))
            .collect();

        let report = TriageReport {
            total_notifications,
            deploy_trains: buckets.deploy_trains.len(),
            ci_activity: buckets.ci_activity.len(),
            reviewed_closed: buckets.reviewed_closed.len(),
            cleanup: outcomes,
        };
        info!(
            total = report.total_notifications,
            deploy_trains = report.deploy_trains,
            ci = report.ci_activity,
            reviewed = report.reviewed_closed,
            failures = report.total_failures(),
            "sweep finished"
        );
        report
    }
}
