//! Stored schemas and configs.
//!
//! [`ConfigService`] creates, updates and deletes [`SchemaRecord`]s and
//! [`ConfigRecord`]s through the [`SchemaStore`] and [`ConfigStore`]
//! contracts and announces every change as an [`Event`]. Configs are kept
//! even when they do not satisfy their schema; reads report the verdict.

pub mod error;
pub mod events;
pub mod id;
pub mod record;
pub mod service;
pub mod store;

pub use error::{Result, ServiceError};
pub use events::{Event, EventError, EventPublisher, InMemoryEventBus, Topic};
pub use id::{slugify, Id, Name};
pub use record::{ConfigRecord, SchemaRecord};
pub use service::{ConfigService, ConfigView, CreateConfig, CreateSchema, UpdateConfig, UpdateSchema};
pub use store::{ConfigStore, InMemoryConfigStore, InMemorySchemaStore, SchemaStore, StoreError};
