use chrono::{DateTime, Utc};
use propschema_schema::{ConfigData, Schema};
use serde::Serialize;
use serde_json::json;

use crate::error::{Result, ServiceError};
use crate::events::{Event, Topic};
use crate::id::{Id, Name};

/// A named, versioned schema.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaRecord {
    id: Id,
    name: Name,
    schema: Schema,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<Event>,
}

impl SchemaRecord {
    pub fn new(id: Id, name: Name, schema: Schema) -> Self {
        let now = Utc::now();
        let created = Event::new(
            &id,
            Topic::SchemaCreated,
            json!({"id": id, "name": name, "props": schema.to_value()}),
        );
        Self {
            id,
            name,
            schema,
            version: 1,
            created_at: now,
            updated_at: now,
            events: vec![created],
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Change the name. Renaming to the current name records nothing.
    pub fn rename(&mut self, name: Name) {
        if name == self.name {
            return;
        }
        self.name = name;
        self.touch();
        self.events.push(Event::new(
            &self.id,
            Topic::SchemaNameChanged,
            json!({"id": self.id, "name": self.name}),
        ));
    }

    pub fn replace_schema(&mut self, schema: Schema) {
        self.schema = schema;
        self.touch();
        self.events.push(Event::new(
            &self.id,
            Topic::SchemaPropsChanged,
            json!({"id": self.id, "props": self.schema.to_value()}),
        ));
    }

    /// Drain the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

/// A named, versioned configuration document bound to a schema.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigRecord {
    id: Id,
    schema_id: Id,
    name: Name,
    data: ConfigData,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    events: Vec<Event>,
}

impl ConfigRecord {
    /// Fails on an empty document.
    pub fn new(id: Id, schema_id: Id, name: Name, data: ConfigData) -> Result<Self> {
        if data.is_empty() {
            return Err(ServiceError::EmptyConfig);
        }
        let created = Event::new(
            &id,
            Topic::ConfigCreated,
            json!({
                "id": id,
                "schema_id": schema_id,
                "name": name,
                "config": data,
                "config_sum": data.hash()?,
            }),
        );
        let now = Utc::now();
        Ok(Self {
            id,
            schema_id,
            name,
            data,
            version: 1,
            created_at: now,
            updated_at: now,
            events: vec![created],
        })
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn schema_id(&self) -> &Id {
        &self.schema_id
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn data(&self) -> &ConfigData {
        &self.data
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Change the name. Renaming to the current name records nothing.
    pub fn rename(&mut self, name: Name) {
        if name == self.name {
            return;
        }
        self.name = name;
        self.touch();
        self.events.push(Event::new(
            &self.id,
            Topic::ConfigNameChanged,
            json!({"id": self.id, "name": self.name}),
        ));
    }

    /// Replace the document. Fails on an empty document.
    pub fn replace_data(&mut self, data: ConfigData) -> Result<()> {
        if data.is_empty() {
            return Err(ServiceError::EmptyConfig);
        }
        let config_sum = data.hash()?;
        self.data = data;
        self.touch();
        self.events.push(Event::new(
            &self.id,
            Topic::ConfigDataChanged,
            json!({"id": self.id, "config": self.data, "config_sum": config_sum}),
        ));
        Ok(())
    }

    /// Content digest of the document as lowercase hex.
    pub fn config_sum(&self) -> Result<String> {
        Ok(self.data.hash()?)
    }

    /// Drain the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}
