use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::digest::{CanonicalBytes, ContentDigest};
use crate::error::{Result, SchemaError};

/// A configuration document: a JSON object validated against a [`Schema`](crate::Schema).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigData(Map<String, Value>);

impl ConfigData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::try_from(value)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn canonical_bytes(&self) -> Result<CanonicalBytes> {
        Ok(CanonicalBytes::new(&self.to_value())?)
    }

    /// SHA-256 over the canonical encoding; independent of key order.
    pub fn digest(&self) -> Result<ContentDigest> {
        Ok(ContentDigest::sha256(&self.canonical_bytes()?))
    }

    /// The digest as lowercase hex.
    pub fn hash(&self) -> Result<String> {
        Ok(self.digest()?.to_hex())
    }
}

impl From<Map<String, Value>> for ConfigData {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for ConfigData {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(SchemaError::NotAnObject),
        }
    }
}

impl From<ConfigData> for Value {
    fn from(data: ConfigData) -> Self {
        Value::Object(data.0)
    }
}
