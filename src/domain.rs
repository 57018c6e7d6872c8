use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// Domain data structures shared across modules.

/// A notification thread as returned by `GET /notifications`.
#[derive(Clone, Debug, Deserialize)]
pub struct Notification {
    pub id: String,
    pub unread: bool,
    pub reason: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_read_at: Option<DateTime<Utc>>,
    pub subject: Subject,
    pub url: String,
    pub subscription_url: String,
}

/// Timestamps are informational only; a malformed one decodes as `None`
/// rather than failing the whole page.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|timestamp| timestamp.with_timezone(&Utc)))
}

#[derive(Clone, Debug, Deserialize)]
pub struct Subject {
    pub title: String,
    // Check suites and a few other subject kinds carry no API url.
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PullRequest {
    pub url: String,
    pub state: String,
    pub title: String,
}

impl PullRequest {
    pub fn is_closed(&self) -> bool {
        self.state == "closed"
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
    DeployTrain,
    CiActivity,
    ReviewedClosed,
}

impl BucketKind {
    /// Cleanup order: deploy trains, then CI, then closed review requests.
    pub const ALL: [BucketKind; 3] = [
        BucketKind::DeployTrain,
        BucketKind::CiActivity,
        BucketKind::ReviewedClosed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BucketKind::DeployTrain => "deploy train",
            BucketKind::CiActivity => "CI activity",
            BucketKind::ReviewedClosed => "closed review request",
        }
    }
}

/// Notifications grouped by classification, in arrival order.
#[derive(Clone, Debug, Default)]
pub struct Buckets {
    pub deploy_trains: Vec<Notification>,
    pub ci_activity: Vec<Notification>,
    pub reviewed_closed: Vec<Notification>,
}

impl Buckets {
    pub fn get(&self, kind: BucketKind) -> &[Notification] {
        match kind {
            BucketKind::DeployTrain => &self.deploy_trains,
            BucketKind::CiActivity => &self.ci_activity,
            BucketKind::ReviewedClosed => &self.reviewed_closed,
        }
    }

    pub fn push(&mut self, kind: BucketKind, notification: Notification) {
        match kind {
            BucketKind::DeployTrain => self.deploy_trains.push(notification),
            BucketKind::CiActivity => self.ci_activity.push(notification),
            BucketKind::ReviewedClosed => self.reviewed_closed.push(notification),
        }
    }

    /// Appends another page's buckets after the ones collected so far.
    pub fn extend(&mut self, other: Buckets) {
        self.deploy_trains.extend(other.deploy_trains);
        self.ci_activity.extend(other.ci_activity);
        self.reviewed_closed.extend(other.reviewed_closed);
    }
}

/// Per-bucket tally of the mark-as-read and unsubscribe calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub attempted: usize,
    pub marked_read: usize,
    pub unsubscribed: usize,
    pub failures: usize,
}

#[derive(Clone, Debug, Default)]
pub struct TriageReport {
    pub total_notifications: usize,
    pub deploy_trains: usize,
    pub ci_activity: usize,
    pub reviewed_closed: usize,
    pub cleanup: Vec<(BucketKind, CleanupOutcome)>,
}

impl TriageReport {
    pub fn total_failures(&self) -> usize {
        self.cleanup.iter().map(|(_, outcome)| outcome.failures).sum()
    }
}

impl fmt::Display for TriageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total notifications: {}", self.total_notifications)?;
        writeln!(f, "Total deploy trains: {}", self.deploy_trains)?;
        writeln!(f, "Total CI: {}", self.ci_activity)?;
        write!(f, "Total reviewed PRs: {}", self.reviewed_closed)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};

    use super::{Notification, Subject};

    pub fn notification(id: &str, reason: &str, kind: &str, title: &str) -> Notification {
        Notification {
            id: id.to_owned(),
            unread: true,
            reason: reason.to_owned(),
            updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single(),
            last_read_at: None,
            subject: Subject {
                title: title.to_owned(),
                url: Some(format!("https://api.github.com/repos/acme/widgets/pulls/{id}")),
                kind: kind.to_owned(),
            },
            url: format!("https://api.github.com/notifications/threads/{id}"),
            subscription_url: format!(
                "https://api.github.com/notifications/threads/{id}/subscription"
            ),
        }
    }
}
