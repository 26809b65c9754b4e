use std::sync::Arc;

use propschema_schema::{ConfigData, Schema, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, ServiceError};
use crate::events::{Event, EventPublisher};
use crate::id::{Id, Name};
use crate::record::{ConfigRecord, SchemaRecord};
use crate::store::{ConfigStore, SchemaStore};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSchema {
    /// Slugified into the id; defaults to the name.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub schema: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSchema {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub schema: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateConfig {
    /// Slugified into the id; defaults to the name.
    #[serde(default)]
    pub id: Option<String>,
    pub schema_id: String,
    pub name: String,
    pub config: ConfigData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateConfig {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub config: Option<ConfigData>,
}

/// A stored config together with its validation verdict.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigView {
    pub id: Id,
    pub schema_id: Id,
    pub name: Name,
    pub config: ConfigData,
    pub valid_schema: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_message: Option<String>,
    pub config_sum: String,
    pub version: u64,
}

impl ConfigView {
    fn new(record: &ConfigRecord, verdict: Validation) -> Result<Self> {
        Ok(Self {
            id: record.id().clone(),
            schema_id: record.schema_id().clone(),
            name: record.name().clone(),
            config: record.data().clone(),
            valid_schema: verdict.valid,
            validation_message: verdict.message,
            config_sum: record.config_sum()?,
            version: record.version(),
        })
    }
}

/// Schema and config use cases over pluggable stores and an event sink.
///
/// Every write is stored first and then announced; a write that returns
/// `Ok` is persisted even if some subscriber rejected its events.
#[derive(Clone)]
pub struct ConfigService {
    schemas: Arc<dyn SchemaStore>,
    configs: Arc<dyn ConfigStore>,
    events: Arc<dyn EventPublisher>,
}

impl ConfigService {
    pub fn new(
        schemas: Arc<dyn SchemaStore>,
        configs: Arc<dyn ConfigStore>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            schemas,
            configs,
            events,
        }
    }

    pub fn create_schema(&self, cmd: CreateSchema) -> Result<SchemaRecord> {
        let name = Name::new(&cmd.name)?;
        let id = Id::from_slug(cmd.id.as_deref().unwrap_or(name.as_str()))?;
        if self.schemas.find(&id)?.is_some() {
            return Err(ServiceError::SchemaExists(id));
        }

        let schema = Schema::from_value(&cmd.schema)?;
        let mut record = SchemaRecord::new(id, name, schema);
        self.schemas.save(&record)?;
        self.announce(record.take_events());

        debug!(id = %record.id(), props = record.schema().len(), "created schema");
        Ok(record)
    }

    pub fn get_schema(&self, id: &str) -> Result<SchemaRecord> {
        self.find_schema(&Id::new(id)?)
    }

    pub fn update_schema(&self, cmd: UpdateSchema) -> Result<SchemaRecord> {
        let mut record = self.find_schema(&Id::new(cmd.id)?)?;

        if let Some(name) = cmd.name {
            record.rename(Name::new(&name)?);
        }
        if let Some(schema) = cmd.schema {
            record.replace_schema(Schema::from_value(&schema)?);
        }

        self.schemas.save(&record)?;
        self.announce(record.take_events());

        debug!(id = %record.id(), version = record.version(), "updated schema");
        Ok(record)
    }

    /// Delete a schema no config refers to.
    pub fn delete_schema(&self, id: &str) -> Result<()> {
        let record = self.find_schema(&Id::new(id)?)?;
        let configs = self.configs.find_by_schema(record.id())?.len();
        if configs > 0 {
            return Err(ServiceError::SchemaInUse {
                id: record.id().clone(),
                configs,
            });
        }

        self.schemas.delete(record.id())?;
        debug!(id = %record.id(), "deleted schema");
        Ok(())
    }

    /// Store a new config. The config is kept even when it does not
    /// satisfy its schema; the view reports the verdict.
    pub fn create_config(&self, cmd: CreateConfig) -> Result<ConfigView> {
        let schema = self.find_schema(&Id::new(cmd.schema_id)?)?;
        let name = Name::new(&cmd.name)?;
        let id = Id::from_slug(cmd.id.as_deref().unwrap_or(name.as_str()))?;
        if self.configs.find(&id)?.is_some() {
            return Err(ServiceError::ConfigExists(id));
        }

        let mut record = ConfigRecord::new(id, schema.id().clone(), name, cmd.config)?;
        self.configs.save(&record)?;
        self.announce(record.take_events());

        debug!(id = %record.id(), schema = %schema.id(), "created config");
        self.view(&record, &schema)
    }

    pub fn get_config(&self, id: &str) -> Result<ConfigView> {
        let record = self.find_config(&Id::new(id)?)?;
        let schema = self.find_schema(record.schema_id())?;
        self.view(&record, &schema)
    }

    pub fn update_config(&self, cmd: UpdateConfig) -> Result<ConfigView> {
        let mut record = self.find_config(&Id::new(cmd.id)?)?;
        let schema = self.find_schema(record.schema_id())?;

        if let Some(name) = cmd.name {
            record.rename(Name::new(&name)?);
        }
        if let Some(config) = cmd.config {
            record.replace_data(config)?;
        }

        self.configs.save(&record)?;
        self.announce(record.take_events());

        debug!(id = %record.id(), version = record.version(), "updated config");
        self.view(&record, &schema)
    }

    pub fn delete_config(&self, id: &str) -> Result<()> {
        let record = self.find_config(&Id::new(id)?)?;
        self.configs.delete(record.id())?;
        debug!(id = %record.id(), "deleted config");
        Ok(())
    }

    /// Configs bound to a schema, ordered by id.
    pub fn configs_for_schema(&self, schema_id: &str) -> Result<Vec<ConfigView>> {
        let schema = self.find_schema(&Id::new(schema_id)?)?;
        self.configs
            .find_by_schema(schema.id())?
            .iter()
            .map(|record| self.view(record, &schema))
            .collect()
    }

    /// Deliver events for a write that is already stored. Delivery is best
    /// effort: a failing subscriber is logged and does not fail the write.
    fn announce(&self, events: Vec<Event>) {
        if let Err(err) = self.events.publish(&events) {
            warn!(error = %err, events = events.len(), "event delivery failed");
        }
    }

    fn find_schema(&self, id: &Id) -> Result<SchemaRecord> {
        self.schemas
            .find(id)?
            .ok_or_else(|| ServiceError::SchemaNotFound(id.clone()))
    }

    fn find_config(&self, id: &Id) -> Result<ConfigRecord> {
        self.configs
            .find(id)?
            .ok_or_else(|| ServiceError::ConfigNotFound(id.clone()))
    }

    fn view(&self, record: &ConfigRecord, schema: &SchemaRecord) -> Result<ConfigView> {
        let verdict = schema.schema().check(record.data());
        if let Some(message) = &verdict.message {
            warn!(id = %record.id(), schema = %schema.id(), %message, "config does not satisfy its schema");
        }
        ConfigView::new(record, verdict)
    }
}
