//! In-process change feed for committed writes to the catalog tables.
//!
//! Services publish a [`TableChange`] after every successful insert, update
//! or delete. Consumers (the lead notification worker, admin consoles over
//! SSE) subscribe and re-fetch whatever they display. Subscribers that lag
//! behind the channel capacity are dropped and simply resubscribe; nothing
//! is replayed because consumers re-fetch wholesale anyway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

/// Tables whose writes are broadcast on the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrackedTable {
    Leads,
    Products,
    QuoteRequests,
}

impl TrackedTable {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "leads" => Some(Self::Leads),
            "products" => Some(Self::Products),
            "quote_requests" => Some(Self::QuoteRequests),
            _ => None,
        }
    }
}

/// Kind of committed write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "insert" => Some(Self::Insert),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// A single committed write, as delivered to subscribers
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TableChange {
    pub table: TrackedTable,
    pub kind: ChangeKind,
    pub record_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl TableChange {
    /// Whether this change passes a subscriber's filter (None = wildcard)
    pub fn matches(&self, table: Option<TrackedTable>, kind: Option<ChangeKind>) -> bool {
        table.is_none_or(|t| t == self.table) && kind.is_none_or(|k| k == self.kind)
    }
}

/// Broadcast hub shared by all services that write to tracked tables
pub struct ChangeFeed {
    tx: broadcast::Sender<TableChange>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a committed write. Delivery is best-effort: with no
    /// subscribers the event is dropped, which is fine.
    pub fn publish(&self, table: TrackedTable, kind: ChangeKind, record_id: Uuid) {
        let change = TableChange {
            table,
            kind,
            record_id,
            occurred_at: Utc::now(),
        };
        if self.tx.send(change).is_err() {
            tracing::debug!(
                "No subscribers for change on {:?} ({:?})",
                table,
                kind
            );
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_published_changes_to_subscribers() {
        let feed = ChangeFeed::new(16);
        let mut rx = feed.subscribe();

        let id = Uuid::new_v4();
        feed.publish(TrackedTable::Leads, ChangeKind::Insert, id);

        let change = rx.recv().await.unwrap();
        assert_eq!(change.table, TrackedTable::Leads);
        assert_eq!(change.kind, ChangeKind::Insert);
        assert_eq!(change.record_id, id);
    }

    #[test]
    fn publish_without_subscribers_is_a_noop() {
        let feed = ChangeFeed::new(16);
        feed.publish(TrackedTable::Products, ChangeKind::Delete, Uuid::new_v4());
    }

    #[test]
    fn filter_matching_honors_wildcards() {
        let change = TableChange {
            table: TrackedTable::Leads,
            kind: ChangeKind::Insert,
            record_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
        };

        assert!(change.matches(None, None));
        assert!(change.matches(Some(TrackedTable::Leads), None));
        assert!(change.matches(None, Some(ChangeKind::Insert)));
        assert!(!change.matches(Some(TrackedTable::Products), None));
        assert!(!change.matches(Some(TrackedTable::Leads), Some(ChangeKind::Update)));
    }

    #[test]
    fn parses_table_and_kind_names() {
        assert_eq!(TrackedTable::parse("leads"), Some(TrackedTable::Leads));
        assert_eq!(
            TrackedTable::parse("quote_requests"),
            Some(TrackedTable::QuoteRequests)
        );
        assert_eq!(TrackedTable::parse("unknown"), None);
        assert_eq!(ChangeKind::parse("update"), Some(ChangeKind::Update));
        assert_eq!(ChangeKind::parse("*"), None);
    }
}
