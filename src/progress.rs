//! Progress events emitted while the sweep runs, and the sinks that render
//! them.

use std::io::{self, Write};

use serde::Serialize;

use crate::domain::BucketKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    PageFetched { page: u32, notifications: usize },
    PageFailed { page: u32 },
    PullRequestLookedUp { notification_id: String, closed: bool },
    PullRequestLookupFailed { notification_id: String },
    NotificationCleaned {
        bucket: BucketKind,
        notification_id: String,
        marked_read: bool,
        unsubscribed: bool,
    },
}

pub trait ProgressSink {
    fn record(&self, event: &ProgressEvent);
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn record(&self, _event: &ProgressEvent) {}
}

/// Prints one symbol per event to stdout: `.` per page, `*` per pull
/// request lookup, `d` per cleaned notification.
#[derive(Debug, Default)]
pub struct DotReporter;

impl DotReporter {
    pub fn symbol(event: &ProgressEvent) -> Option<char> {
        match event {
            ProgressEvent::PageFetched { .. } => Some('.'),
            ProgressEvent::PullRequestLookedUp { .. }
            | ProgressEvent::PullRequestLookupFailed { .. } => Some('*'),
            ProgressEvent::NotificationCleaned { .. } => Some('d'),
            ProgressEvent::PageFailed { .. } => None,
        }
    }
}

impl ProgressSink for DotReporter {
    fn record(&self, event: &ProgressEvent) {
        let Some(symbol) = Self::symbol(event) else {
            return;
        };
        let mut stdout = io::stdout().lock();
        // Progress dots are cosmetic; a closed stdout must not stop the sweep.
        let _ignored = write!(stdout, "{symbol}").and_then(|()| stdout.flush());
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use std::cell::RefCell;

    use super::{ProgressEvent, ProgressSink};

    #[derive(Debug, Default)]
    pub struct RecordingSink {
        events: RefCell<Vec<ProgressEvent>>,
    }

    impl RecordingSink {
        pub fn events(&self) -> Vec<ProgressEvent> {
            self.events.borrow().clone()
        }

        pub fn symbols(&self) -> String {
            self.events
                .borrow()
                .iter()
                .filter_map(super::DotReporter::symbol)
                .collect()
        }
    }

    impl ProgressSink for RecordingSink {
        fn record(&self, event: &ProgressEvent) {
            self.events.borrow_mut().push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_match_event_kinds() {
        assert_eq!(
            DotReporter::symbol(&ProgressEvent::PageFetched {
                page: 1,
                notifications: 3
            }),
            Some('.')
        );
        assert_eq!(
            DotReporter::symbol(&ProgressEvent::PullRequestLookupFailed {
                notification_id: "1".to_owned()
            }),
            Some('*')
        );
        assert_eq!(DotReporter::symbol(&ProgressEvent::PageFailed { page: 2 }), None);
    }

    #[test]
    fn events_serialize_as_tagged_json() {
        let event = ProgressEvent::PullRequestLookedUp {
            notification_id: "42".to_owned(),
            closed: true,
        };
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "type": "pull_request_looked_up",
                "notification_id": "42",
                "closed": true
            })
        );
    }
}
