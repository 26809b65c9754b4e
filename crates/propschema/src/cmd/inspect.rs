use propschema_props::Prop;
use propschema_schema::Schema;
use serde::Serialize;
use serde_json::Value;

use crate::cmd::InspectArgs;
use crate::exit::{read_file, schema_error, CliResult, SUCCESS};
use crate::output::{print_json, render_value, table, OutputFormat};

#[derive(Serialize, Debug, PartialEq)]
struct PropRow {
    path: String,
    #[serde(rename = "type")]
    prop_type: &'static str,
    required: bool,
    array: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    values: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interval: Option<[f64; 2]>,
}

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let source = read_file(&args.schema)?;
    let schema = Schema::from_json(&source).map_err(|err| schema_error("invalid schema", err))?;
    let rows = rows(&schema);

    match format {
        OutputFormat::Json => print_json(&rows),
        OutputFormat::Table => {
            let mut table = table(vec![
                "PATH", "TYPE", "REQUIRED", "DEFAULT", "VALUES", "REGEX", "INTERVAL",
            ]);
            for row in &rows {
                table.add_row(vec![
                    row.path.clone(),
                    row.prop_type.to_string(),
                    row.required.to_string(),
                    row.default.as_ref().map(render_value).unwrap_or_default(),
                    render_values(&row.values),
                    row.regex.clone().unwrap_or_default(),
                    row.interval
                        .map(|[min, max]| format!("[{min}, {max}]"))
                        .unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in &rows {
                let marker = if row.required { " (required)" } else { "" };
                println!("{}: {}{marker}", row.path, row.prop_type);
            }
        }
        OutputFormat::Raw => {
            for row in &rows {
                println!("{}", row.path);
            }
        }
    }
    Ok(SUCCESS)
}

fn rows(schema: &Schema) -> Vec<PropRow> {
    let mut rows = Vec::new();
    for prop in schema.props().values() {
        collect(prop, "", &mut rows);
    }
    rows
}

/// Depth-first, children in name order. Array-marked props get a `[]` suffix.
fn collect(prop: &Prop, parent: &str, rows: &mut Vec<PropRow>) {
    let mut path = if parent.is_empty() {
        prop.name().to_string()
    } else {
        format!("{parent}.{}", prop.name())
    };
    if prop.is_array() {
        path.push_str("[]");
    }

    rows.push(PropRow {
        path: path.clone(),
        prop_type: prop.prop_type().as_str(),
        required: prop.is_required(),
        array: prop.is_array(),
        default: prop.default_value(),
        values: prop.values(),
        regex: prop.regex().map(str::to_string),
        interval: prop.interval().map(|i| [i.min(), i.max()]),
    });

    if let Some(children) = prop.props() {
        for child in children.values() {
            collect(child, &path, rows);
        }
    }
}

fn render_values(values: &[Value]) -> String {
    values
        .iter()
        .map(render_value)
        .collect::<Vec<_>>()
        .join(", ")
}
