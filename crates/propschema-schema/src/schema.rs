use std::collections::BTreeMap;

use propschema_props::{FieldPath, Prop, PropType, ValidationError, ValidationErrorKind};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::data::ConfigData;
use crate::error::{Result, SchemaError};
use crate::parser::SchemaParser;
use crate::serializer::render_schema;

/// A validated tree of props describing a configuration document.
///
/// Immutable once built; share it behind an `Arc` to validate concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    props: BTreeMap<String, Prop>,
}

impl Schema {
    /// Build a schema from root-level props. A later prop with the same
    /// name replaces an earlier one.
    pub fn new<I>(props: I) -> Result<Self>
    where
        I: IntoIterator<Item = Prop>,
    {
        let props: BTreeMap<String, Prop> = props
            .into_iter()
            .map(|prop| (prop.name().to_string(), prop))
            .collect();
        if props.is_empty() {
            return Err(SchemaError::EmptySchema);
        }
        Ok(Self { props })
    }

    /// Parse the declarative JSON notation.
    pub fn from_json(json: &str) -> Result<Self> {
        SchemaParser::new().parse_str(json)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        SchemaParser::new().parse_value(value)
    }

    pub fn from_map(map: &Map<String, Value>) -> Result<Self> {
        SchemaParser::new().parse_map(map)
    }

    /// Root-level props keyed by name.
    pub fn props(&self) -> &BTreeMap<String, Prop> {
        &self.props
    }

    pub fn get(&self, name: &str) -> Option<&Prop> {
        self.props.get(name)
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Always false; a schema holds at least one prop.
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Render back to the declarative notation.
    pub fn to_map(&self) -> Map<String, Value> {
        render_schema(self)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }

    /// Validate `data`, returning it with defaults applied.
    ///
    /// Root props are checked in name order and the first failure is
    /// returned. Keys the schema does not declare are kept as given.
    pub fn validate(&self, data: &ConfigData) -> std::result::Result<ConfigData, ValidationError> {
        let document = data.as_map();
        let mut resolved = document.clone();
        for (name, prop) in &self.props {
            if let Some(value) = prop.validate_member(document)? {
                resolved.insert(name.clone(), value);
            }
        }
        Ok(ConfigData::from(resolved))
    }

    /// Validate an arbitrary JSON value; anything but an object fails at the root.
    pub fn validate_value(&self, value: &Value) -> std::result::Result<Value, ValidationError> {
        match value {
            Value::Object(map) => {
                let resolved = self.validate(&ConfigData::from(map.clone()))?;
                Ok(Value::Object(resolved.into_inner()))
            }
            other => Err(ValidationError::new(
                FieldPath::root(),
                ValidationErrorKind::TypeMismatch {
                    expected: PropType::Object,
                    value: other.clone(),
                },
            )),
        }
    }

    /// Validate `data` and report the outcome instead of failing.
    pub fn check(&self, data: &ConfigData) -> Validation {
        match self.validate(data) {
            Ok(_) => Validation::valid(),
            Err(err) => Validation::invalid(err.to_string()),
        }
    }
}

/// Soft validation verdict, stored alongside configs that may not conform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Validation {
    pub fn valid() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Schema::from_map(&map).map_err(serde::de::Error::custom)
    }
}
