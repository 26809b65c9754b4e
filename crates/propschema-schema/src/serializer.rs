use propschema_props::Prop;
use serde_json::{json, Map, Value};

use crate::parser::MARKER_KEY;
use crate::schema::Schema;

/// Render a schema in the declarative notation [`Schema::from_map`] reads.
pub fn render_schema(schema: &Schema) -> Map<String, Value> {
    schema
        .props()
        .values()
        .map(|prop| (prop.name().to_string(), render_prop(prop)))
        .collect()
}

/// Render one prop. Leaves become `{"$schema": {...}}`, objects a map of
/// their children, and array-marked props are wrapped in a one-element list.
pub fn render_prop(prop: &Prop) -> Value {
    let node = match prop.props() {
        Some(children) => Value::Object(
            children
                .values()
                .map(|child| (child.name().to_string(), render_prop(child)))
                .collect(),
        ),
        None => {
            let mut marker = Map::new();
            marker.insert(MARKER_KEY.to_string(), Value::Object(descriptor(prop)));
            Value::Object(marker)
        }
    };

    if prop.is_array() {
        Value::Array(vec![node])
    } else {
        node
    }
}

fn descriptor(prop: &Prop) -> Map<String, Value> {
    let mut descriptor = Map::new();
    descriptor.insert("type".to_string(), json!(prop.prop_type().as_str()));
    descriptor.insert("required".to_string(), json!(prop.is_required()));
    if let Some(default) = prop.default_value() {
        descriptor.insert("default".to_string(), default);
    }
    let values = prop.values();
    if !values.is_empty() {
        descriptor.insert("values".to_string(), Value::Array(values));
    }
    if let Some(regex) = prop.regex() {
        descriptor.insert("regex".to_string(), json!(regex));
    }
    if let Some(interval) = prop.interval() {
        descriptor.insert(
            "interval".to_string(),
            json!({"min": interval.min(), "max": interval.max()}),
        );
    }
    descriptor
}

#[cfg(test)]
mod tests {
    use propschema_props::Constraint;
    use serde_json::json;

    use super::*;

    #[test]
    fn renders_leaf_descriptor() {
        let prop = Prop::string(
            "env",
            [
                Constraint::Required(true),
                Constraint::values(["dev", "prod"]),
                Constraint::Regex("^[a-z]+$".to_string()),
            ],
        )
        .unwrap();

        assert_eq!(
            render_prop(&prop),
            json!({"$schema": {
                "type": "string",
                "required": true,
                "values": ["dev", "prod"],
                "regex": "^[a-z]+$"
            }})
        );
    }

    #[test]
    fn renders_interval_and_default() {
        let prop = Prop::integer(
            "port",
            [
                Constraint::default_value(8080),
                Constraint::interval(80.0, 18080.0).unwrap(),
            ],
        )
        .unwrap();

        assert_eq!(
            render_prop(&prop),
            json!({"$schema": {
                "type": "integer",
                "required": false,
                "default": 8080,
                "interval": {"min": 80.0, "max": 18080.0}
            }})
        );
    }

    #[test]
    fn renders_objects_and_arrays() {
        let host = Prop::string("host", []).unwrap();
        let servers = Prop::object("servers", [Constraint::Array, Constraint::Props(vec![host])])
            .unwrap();

        assert_eq!(
            render_prop(&servers),
            json!([{"host": {"$schema": {"type": "string", "required": false}}}])
        );
    }

    #[test]
    fn rendered_schema_parses_back() {
        let schema = Schema::from_json(
            r#"{
                "app": {
                    "name": {"$schema": {"type": "STRING", "enum": ["a", "b"]}},
                    "workers": {"$schema": {"type": "integer", "interval": {"min": 1, "max": 64}}}
                },
                "flags": [{"$schema": {"type": "bool", "default": true}}]
            }"#,
        )
        .unwrap();

        let rendered = render_schema(&schema);
        assert_eq!(Schema::from_map(&rendered).unwrap(), schema);
        assert_eq!(
            rendered["app"]["name"]["$schema"]["values"],
            json!(["a", "b"])
        );
    }
}
