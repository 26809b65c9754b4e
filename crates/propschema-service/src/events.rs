use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::id::Id;

/// What changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    #[serde(rename = "schema.created")]
    SchemaCreated,
    #[serde(rename = "schema.name_changed")]
    SchemaNameChanged,
    #[serde(rename = "schema.props_changed")]
    SchemaPropsChanged,
    #[serde(rename = "config.created")]
    ConfigCreated,
    #[serde(rename = "config.name_changed")]
    ConfigNameChanged,
    #[serde(rename = "config.config_changed")]
    ConfigDataChanged,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::SchemaCreated,
        Topic::SchemaNameChanged,
        Topic::SchemaPropsChanged,
        Topic::ConfigCreated,
        Topic::ConfigNameChanged,
        Topic::ConfigDataChanged,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Topic::SchemaCreated => "schema.created",
            Topic::SchemaNameChanged => "schema.name_changed",
            Topic::SchemaPropsChanged => "schema.props_changed",
            Topic::ConfigCreated => "config.created",
            Topic::ConfigNameChanged => "config.name_changed",
            Topic::ConfigDataChanged => "config.config_changed",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change to a schema or config record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub aggregate_id: Id,
    pub topic: Topic,
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(aggregate_id: &Id, topic: Topic, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            aggregate_id: aggregate_id.clone(),
            topic,
            payload,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// A subscriber rejected an event; later events were not delivered.
    #[error("subscriber for `{topic}` failed: {message}")]
    Subscriber { topic: Topic, message: String },
}

/// Sink for record events.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, events: &[Event]) -> Result<(), EventError>;
}

type Subscription = Arc<dyn Fn(&Event) -> Result<(), String> + Send + Sync>;

/// Synchronous in-process bus: events are delivered to each subscriber of
/// their topic, in subscription order, before `publish` returns.
#[derive(Default)]
pub struct InMemoryEventBus {
    subscriptions: RwLock<HashMap<Topic, Vec<Subscription>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `handler` for every event on any of `topics`.
    pub fn subscribe<F>(&self, topics: &[Topic], handler: F)
    where
        F: Fn(&Event) -> Result<(), String> + Send + Sync + 'static,
    {
        let handler: Subscription = Arc::new(handler);
        let mut subscriptions = self.subscriptions.write();
        for topic in topics {
            subscriptions
                .entry(*topic)
                .or_default()
                .push(Arc::clone(&handler));
        }
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.subscriptions.read().get(&topic).map_or(0, Vec::len)
    }
}

impl EventPublisher for InMemoryEventBus {
    fn publish(&self, events: &[Event]) -> Result<(), EventError> {
        for event in events {
            // Handlers run without the lock held so they may subscribe.
            let handlers = self
                .subscriptions
                .read()
                .get(&event.topic)
                .cloned()
                .unwrap_or_default();
            debug!(topic = %event.topic, aggregate = %event.aggregate_id, handlers = handlers.len(), "publishing event");
            for handler in handlers {
                handler(event).map_err(|message| EventError::Subscriber {
                    topic: event.topic,
                    message,
                })?;
            }
        }
        Ok(())
    }
}
