//! Change broadcaster for the realtime channel.
//!
//! Every successful write publishes one [`ChangeEvent`] to all connected
//! subscribers. Delivery is fire-and-forget: there is no acknowledgment and no
//! replay, so a subscriber that connects later must list the collection
//! first and then apply subsequent events.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::{Fields, Record};

/// Events buffered per subscriber before it starts skipping.
pub const DEFAULT_CAPACITY: usize = 256;

/// Writable collections, each with its own event name. Users are read-only
/// and have no channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Bookings,
    Fleet,
    Settings,
}

impl Channel {
    /// Event name clients listen on.
    pub fn event_name(&self) -> &'static str {
        match self {
            Channel::Bookings => "booking_update",
            Channel::Fleet => "fleet_update",
            Channel::Settings => "settings_update",
        }
    }
}

/// What happened to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    New,
    Update,
    Delete,
}

/// Post-write state carried by an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChangePayload {
    Record(Record),
    Settings(Fields),
    Deleted { id: String, deleted: bool },
}

/// A single notification, serialized as
/// `{"event": "booking_update", "type": "new", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    pub event: &'static str,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub data: ChangePayload,
}

impl ChangeEvent {
    pub fn created(channel: Channel, record: Record) -> Self {
        Self::new(channel, ChangeKind::New, ChangePayload::Record(record))
    }

    pub fn updated(channel: Channel, record: Record) -> Self {
        Self::new(channel, ChangeKind::Update, ChangePayload::Record(record))
    }

    pub fn deleted(channel: Channel, id: impl Into<String>) -> Self {
        Self::new(
            channel,
            ChangeKind::Delete,
            ChangePayload::Deleted {
                id: id.into(),
                deleted: true,
            },
        )
    }

    pub fn settings(settings: Fields) -> Self {
        Self::new(
            Channel::Settings,
            ChangeKind::Update,
            ChangePayload::Settings(settings),
        )
    }

    fn new(channel: Channel, kind: ChangeKind, data: ChangePayload) -> Self {
        Self {
            event: channel.event_name(),
            kind,
            data,
        }
    }
}

/// Fans events out to every live subscriber.
///
/// A slow subscriber never blocks publication; once it falls more than the
/// channel capacity behind it skips the missed events.
#[derive(Debug)]
pub struct ChangeHub {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Registers a subscriber. It only sees events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event, returning how many subscribers it was queued for.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        tracing::debug!("Publishing {} ({:?})", event.event, event.kind);
        // No subscribers is not an error.
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
