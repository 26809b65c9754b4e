use propschema_props::{Constraint, Prop, PropError, PropType, MAX_DEPTH};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ParserConfig;
use crate::error::{Result, SchemaError};
use crate::schema::Schema;

/// Key that marks a leaf declaration.
pub const MARKER_KEY: &str = "$schema";

/// Contents of a `$schema` marker.
#[derive(Debug, Deserialize)]
struct Descriptor {
    #[serde(rename = "type")]
    type_name: Option<String>,
    default: Option<Value>,
    required: Option<bool>,
    #[serde(alias = "enum")]
    values: Option<Vec<Value>>,
    regex: Option<String>,
    interval: Option<Bounds>,
}

#[derive(Debug, Deserialize)]
struct Bounds {
    min: f64,
    max: f64,
}

/// Builds [`Schema`]s from the declarative JSON notation.
#[derive(Debug, Clone, Default)]
pub struct SchemaParser {
    config: ParserConfig,
}

impl SchemaParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser with `config`; `max_depth` is capped at [`MAX_DEPTH`].
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config: ParserConfig {
                max_depth: config.max_depth.min(MAX_DEPTH),
            },
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn parse_str(&self, json: &str) -> Result<Schema> {
        let value: Value = serde_json::from_str(json)?;
        self.parse_value(&value)
    }

    pub fn parse_value(&self, value: &Value) -> Result<Schema> {
        match value {
            Value::Object(map) => self.parse_map(map),
            _ => Err(SchemaError::NotAnObject),
        }
    }

    pub fn parse_map(&self, map: &Map<String, Value>) -> Result<Schema> {
        if map.is_empty() {
            return Err(SchemaError::EmptySchema);
        }
        let props = self.parse_props(map, "", 0)?;
        debug!(props = props.len(), "parsed schema");
        Schema::new(props)
    }

    fn parse_props(&self, map: &Map<String, Value>, parent: &str, depth: usize) -> Result<Vec<Prop>> {
        if depth >= self.config.max_depth {
            return Err(SchemaError::TooDeep {
                path: parent.to_string(),
                max: self.config.max_depth,
            });
        }
        map.iter()
            .map(|(key, value)| self.parse_prop(key, value, &join(parent, key), depth))
            .collect()
    }

    fn parse_prop(&self, key: &str, value: &Value, path: &str, depth: usize) -> Result<Prop> {
        let mut constraints = Vec::new();
        let declaration = match value {
            Value::Array(items) => {
                let [item] = items.as_slice() else {
                    return Err(SchemaError::InvalidArray(path.to_string()));
                };
                constraints.push(Constraint::Array);
                item
            }
            other => other,
        };

        let Value::Object(entries) = declaration else {
            return Err(if constraints.is_empty() {
                SchemaError::InvalidDeclaration(path.to_string())
            } else {
                SchemaError::InvalidArrayElement(path.to_string())
            });
        };

        if let Some(marker) = entries.get(MARKER_KEY) {
            return parse_leaf(key, path, marker, constraints);
        }
        if entries.is_empty() {
            return Err(SchemaError::EmptyObject(path.to_string()));
        }

        let children = self.parse_props(entries, path, depth + 1)?;
        constraints.push(Constraint::Props(children));
        Prop::object(key, constraints).map_err(|source| invalid_prop(path, source))
    }
}

fn parse_leaf(key: &str, path: &str, marker: &Value, mut constraints: Vec<Constraint>) -> Result<Prop> {
    let descriptor = Descriptor::deserialize(marker).map_err(|source| SchemaError::InvalidDescriptor {
        path: path.to_string(),
        source,
    })?;

    let type_name = descriptor.type_name.unwrap_or_default();
    let prop_type = match PropType::parse(&type_name.to_ascii_lowercase()) {
        Ok(PropType::Object) | Err(_) => {
            return Err(SchemaError::InvalidType {
                path: path.to_string(),
                value: type_name,
            })
        }
        Ok(prop_type) => prop_type,
    };

    constraints.push(Constraint::Required(descriptor.required.unwrap_or(false)));
    if let Some(default) = descriptor.default {
        constraints.push(Constraint::Default(default));
    }
    if let Some(values) = descriptor.values {
        constraints.push(Constraint::Values(values));
    }
    if let Some(regex) = descriptor.regex.filter(|regex| !regex.is_empty()) {
        constraints.push(Constraint::Regex(regex));
    }
    if let Some(bounds) = descriptor.interval {
        let interval = Constraint::interval(bounds.min, bounds.max)
            .map_err(|source| invalid_prop(path, source))?;
        constraints.push(interval);
    }

    Prop::new(key, prop_type, constraints).map_err(|source| invalid_prop(path, source))
}

fn invalid_prop(path: &str, source: PropError) -> SchemaError {
    SchemaError::InvalidProp {
        path: path.to_string(),
        source,
    }
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use propschema_props::PropKind;
    use serde_json::json;

    use super::*;

    fn parse(value: Value) -> Result<Schema> {
        SchemaParser::new().parse_value(&value)
    }

    #[test]
    fn parses_leaf_with_all_constraints() {
        let schema = parse(json!({
            "port": {"$schema": {
                "type": "Integer",
                "default": 8080,
                "required": true,
                "enum": [80, 8080],
                "interval": {"min": 1, "max": 65535}
            }}
        }))
        .unwrap();

        let port = schema.get("port").unwrap();
        assert_eq!(port.prop_type(), PropType::Integer);
        assert!(port.is_required());
        assert_eq!(port.default_value(), Some(json!(8080)));
        assert_eq!(port.values(), vec![json!(80), json!(8080)]);
        let interval = port.interval().unwrap();
        assert_eq!((interval.min(), interval.max()), (1.0, 65535.0));
    }

    #[test]
    fn leaves_default_to_optional() {
        let schema = parse(json!({"name": {"$schema": {"type": "string"}}})).unwrap();
        let name = schema.get("name").unwrap();
        assert!(!name.is_required());
        assert_eq!(name.default_value(), None);
        assert_eq!(name.regex(), None);
    }

    #[test]
    fn null_default_and_empty_regex_are_absent() {
        let schema = parse(json!({
            "name": {"$schema": {"type": "string", "default": null, "regex": ""}}
        }))
        .unwrap();
        let name = schema.get("name").unwrap();
        assert_eq!(name.default_value(), None);
        assert_eq!(name.regex(), None);
    }

    #[test]
    fn parses_nested_objects_and_arrays() {
        let schema = parse(json!({
            "db": {
                "host": {"$schema": {"type": "string", "required": true}},
                "replicas": [{
                    "host": {"$schema": {"type": "string"}},
                    "port": {"$schema": {"type": "integer"}}
                }]
            },
            "tags": [{"$schema": {"type": "string"}}]
        }))
        .unwrap();

        let db = schema.get("db").unwrap();
        assert_eq!(db.prop_type(), PropType::Object);
        assert!(db.is_required());
        let replicas = &db.props().unwrap()["replicas"];
        assert!(replicas.is_array());
        assert!(matches!(replicas.kind(), PropKind::Object { props } if props.len() == 2));

        let tags = schema.get("tags").unwrap();
        assert!(tags.is_array());
        assert_eq!(tags.prop_type(), PropType::String);
    }

    #[test]
    fn array_must_hold_exactly_one_element() {
        let err = parse(json!({"tags": [
            {"$schema": {"type": "string"}},
            {"$schema": {"type": "string"}}
        ]}))
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidArray(ref key) if key == "tags"));
        assert_eq!(err.to_string(), "invalid array for `tags`");

        assert!(matches!(
            parse(json!({"tags": []})),
            Err(SchemaError::InvalidArray(_))
        ));
        assert!(matches!(
            parse(json!({"tags": ["string"]})),
            Err(SchemaError::InvalidArrayElement(_))
        ));
    }

    #[test]
    fn scalar_declaration_is_rejected() {
        let err = parse(json!({"db": {"host": "string"}})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDeclaration(ref path) if path == "db.host"));
    }

    #[test]
    fn unknown_missing_and_object_types_are_rejected() {
        for descriptor in [json!({"type": "date"}), json!({}), json!({"type": "object"})] {
            let err = parse(json!({"when": {"$schema": descriptor}})).unwrap_err();
            assert!(matches!(err, SchemaError::InvalidType { .. }), "{err}");
        }

        let err = parse(json!({"when": {"$schema": {"type": "date"}}})).unwrap_err();
        assert_eq!(err.to_string(), "invalid type `date` for `when`");
    }

    #[test]
    fn malformed_descriptor_is_rejected() {
        let err = parse(json!({"port": {"$schema": {"type": "integer", "required": "yes"}}}))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDescriptor { ref path, .. } if path == "port"));

        assert!(matches!(
            parse(json!({"port": {"$schema": "integer"}})),
            Err(SchemaError::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn construction_errors_carry_the_dotted_path() {
        let err = parse(json!({
            "server": {"port": {"$schema": {"type": "integer", "default": "80"}}}
        }))
        .unwrap_err();
        match err {
            SchemaError::InvalidProp { path, source } => {
                assert_eq!(path, "server.port");
                assert!(matches!(source, PropError::MismatchedDefault { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(matches!(
            parse(json!({"port": {"$schema": {"type": "integer", "interval": {"min": 9, "max": 1}}}})),
            Err(SchemaError::InvalidProp { source: PropError::InvalidInterval { .. }, .. })
        ));
        assert!(matches!(
            parse(json!({"flag": {"$schema": {"type": "bool", "regex": "^x$"}}})),
            Err(SchemaError::InvalidProp { source: PropError::NotAllowed { .. }, .. })
        ));
    }

    #[test]
    fn empty_schema_and_empty_object_are_rejected() {
        assert!(matches!(parse(json!({})), Err(SchemaError::EmptySchema)));
        assert!(matches!(
            parse(json!({"db": {}})),
            Err(SchemaError::EmptyObject(ref path)) if path == "db"
        ));
        assert!(matches!(parse(json!([1])), Err(SchemaError::NotAnObject)));
    }

    #[test]
    fn invalid_json_is_reported() {
        assert!(matches!(
            SchemaParser::new().parse_str("{not json"),
            Err(SchemaError::InvalidJson(_))
        ));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let mut declaration = json!({"leaf": {"$schema": {"type": "bool"}}});
        for _ in 0..4 {
            let mut wrapper = Map::new();
            wrapper.insert("inner".to_string(), declaration);
            declaration = Value::Object(wrapper);
        }

        let shallow = SchemaParser::with_config(ParserConfig { max_depth: 3 });
        assert!(matches!(
            shallow.parse_value(&declaration),
            Err(SchemaError::TooDeep { max: 3, .. })
        ));

        let deep = SchemaParser::with_config(ParserConfig { max_depth: 8 });
        assert!(deep.parse_value(&declaration).is_ok());
    }

    #[test]
    fn depth_limit_is_capped_at_validation_depth() {
        let parser = SchemaParser::with_config(ParserConfig { max_depth: 1000 });
        assert_eq!(parser.config().max_depth, MAX_DEPTH);

        let nested = |levels: usize| {
            let mut declaration = json!({"flag": {"$schema": {"type": "bool", "default": true}}});
            let mut document = json!({});
            for _ in 0..levels {
                let mut wrapper = Map::new();
                wrapper.insert("inner".to_string(), declaration);
                declaration = Value::Object(wrapper);
                let mut wrapper = Map::new();
                wrapper.insert("inner".to_string(), document);
                document = Value::Object(wrapper);
            }
            (declaration, document)
        };

        let (declaration, _) = nested(MAX_DEPTH);
        assert!(matches!(
            parser.parse_value(&declaration),
            Err(SchemaError::TooDeep { max: MAX_DEPTH, .. })
        ));

        let (declaration, document) = nested(MAX_DEPTH - 1);
        let schema = parser.parse_value(&declaration).unwrap();
        assert!(schema.validate_value(&document).is_ok());
    }
}
