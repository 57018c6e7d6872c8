//! Sweeps a GitHub notification inbox: pages through unread notifications,
//! sorts out deploy-train pull requests, CI activity and review requests on
//! pull requests that have since closed, then marks those read and
//! unsubscribes from their threads.

pub mod app;
pub mod classify;
pub mod cleanup;
pub mod config;
pub mod domain;
pub mod github;
pub mod paginate;
pub mod progress;
pub mod retry;

pub use app::{APP_NAME, Triage};
pub use config::{ConfigError, Settings};
pub use domain::{BucketKind, Notification, PullRequest, Subject, TriageReport};
pub use github::{FetchError, GitHubClient, RestClient};
pub use progress::{DotReporter, NoopSink, ProgressEvent, ProgressSink};
