use tracing::{debug, warn};

use crate::{
    domain::Notification,
    github::{FetchError, RestClient},
    progress::{ProgressEvent, ProgressSink},
};

/// One non-empty page of the notification feed.
#[derive(Debug)]
pub struct Page {
    pub number: u32,
    pub notifications: Vec<Notification>,
}

pub fn page_path(number: u32) -> String {
    format!("notifications?page={number}")
}

pub fn fetch_page<C: RestClient>(client: &C, number: u32) -> Result<Vec<Notification>, FetchError> {
    client.get_json(&page_path(number))
}

/// Walks the notification feed from page 1 until a page comes back empty.
///
/// A page that cannot be fetched counts as empty and ends the walk.
pub struct NotificationPager<'a, C> {
    client: &'a C,
    progress: &'a dyn ProgressSink,
    next_page: u32,
    finished: bool,
}

impl<'a, C: RestClient> NotificationPager<'a, C> {
    pub fn new(client: &'a C, progress: &'a dyn ProgressSink) -> Self {
        Self {
            client,
            progress,
            next_page: 1,
            finished: false,
        }
    }
}

impl<C: RestClient> Iterator for NotificationPager<'_, C> {
    type Item = Page;

    fn next(&mut self) -> Option<Page> {
        if self.finished {
            return None;
        }

        let number = self.next_page;
        match fetch_page(self.client, number) {
            Ok(notifications) if notifications.is_empty() => {
                debug!(page = number, "empty page, end of notifications");
                self.finished = true;
                None
            }
            Ok(notifications) => {
                debug!(page = number, count = notifications.len(), "fetched page");
                self.next_page += 1;
                self.progress.record(&ProgressEvent::PageFetched {
                    page: number,
                    notifications: notifications.len(),
                });
                Some(Page {
                    number,
                    notifications,
                })
            }
            Err(err) => {
                warn!(page = number, error = %err, "Error fetching notifications");
                self.progress.record(&ProgressEvent::PageFailed { page: number });
                self.finished = true;
                None
            }
        }
    }
}

pub fn fetch_all<C: RestClient>(client: &C, progress: &dyn ProgressSink) -> Vec<Notification> {
    NotificationPager::new(client, progress)
        .flat_map(|page| page.notifications)
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        github::fake::{Call, FakeClient},
        progress::{NoopSink, recording::RecordingSink},
    };

    fn raw(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "unread": true,
            "reason": "subscribed",
            "updated_at": "2024-05-01T12:00:00Z",
            "last_read_at": null,
            "subject": { "title": "Something", "url": null, "type": "Issue" },
            "url": format!("https://api.github.com/notifications/threads/{id}"),
            "subscription_url":
                format!("https://api.github.com/notifications/threads/{id}/subscription")
        })
    }

    #[test]
    fn stops_at_first_empty_page() {
        let client = FakeClient::new()
            .respond("notifications?page=1", json!([raw("1"), raw("2")]))
            .respond("notifications?page=2", json!([raw("3")]))
            .respond("notifications?page=3", json!([]))
            .respond("notifications?page=4", json!([raw("never")]));

        let all = fetch_all(&client, &NoopSink);

        let ids: Vec<_> = all.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(
            client.calls(),
            vec![
                Call::Get("notifications?page=1".to_owned()),
                Call::Get("notifications?page=2".to_owned()),
                Call::Get("notifications?page=3".to_owned()),
            ]
        );
    }

    #[test]
    fn pages_are_numbered_from_one() {
        let client = FakeClient::new()
            .respond("notifications?page=1", json!([raw("1")]))
            .respond("notifications?page=2", json!([raw("2")]));
        let sink = RecordingSink::default();

        let numbers: Vec<_> = NotificationPager::new(&client, &sink)
            .map(|p| p.number)
            .collect();

        assert_eq!(numbers, [1, 2]);
        assert_eq!(sink.symbols(), "..");
    }

    #[test]
    fn failed_page_ends_pagination() {
        let client = FakeClient::new()
            .respond("notifications?page=1", json!([raw("1")]))
            .fail("notifications?page=2")
            .respond("notifications?page=3", json!([raw("3")]));
        let sink = RecordingSink::default();

        let all = fetch_all(&client, &sink);

        assert_eq!(all.len(), 1);
        assert_eq!(client.calls().len(), 2);
        assert!(sink.events().contains(&ProgressEvent::PageFailed { page: 2 }));
    }

    #[test]
    fn empty_feed_yields_nothing() {
        let client = FakeClient::new();
        assert!(fetch_all(&client, &NoopSink).is_empty());
    }
}
