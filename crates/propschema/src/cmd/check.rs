use std::path::Path;

use propschema_schema::{ConfigData, Schema, SchemaRegistry};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cmd::CheckArgs;
use crate::exit::{read_file, schema_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_json, print_pretty_json, table, OutputFormat};

#[derive(Serialize)]
struct CheckOutput {
    config: String,
    schema: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    config_sum: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved: Option<Value>,
}

pub fn run(args: CheckArgs, format: OutputFormat) -> CliResult<i32> {
    let (schema, schema_label) = load_schema(&args)?;
    let source = read_file(&args.config)?;
    let data = ConfigData::from_json(&source).map_err(|err| schema_error("invalid config", err))?;
    let config_sum = data
        .hash()
        .map_err(|err| schema_error("digest failed", err))?;

    let mut out = CheckOutput {
        config: args.config.display().to_string(),
        schema: schema_label,
        valid: true,
        path: None,
        message: None,
        config_sum,
        resolved: None,
    };

    match schema.validate(&data) {
        Ok(resolved) => {
            debug!(config = %out.config, "config is valid");
            out.resolved = Some(resolved.to_value());
        }
        Err(err) => {
            warn!(config = %out.config, error = %err, "config is invalid");
            out.valid = false;
            if !err.path().is_root() {
                out.path = Some(err.path().to_string());
            }
            out.message = Some(err.to_string());
        }
    }

    print_check(&out, format);
    Ok(if out.valid { SUCCESS } else { DATA_INVALID })
}

fn load_schema(args: &CheckArgs) -> CliResult<(Schema, String)> {
    if let Some(path) = &args.schema {
        let source = read_file(path)?;
        let schema = Schema::from_json(&source).map_err(|err| schema_error("invalid schema", err))?;
        return Ok((schema, path.display().to_string()));
    }

    match (&args.registry, &args.name) {
        (Some(dir), Some(name)) => load_from_registry(dir, name),
        _ => Err(CliError::new(USAGE, "either --schema or --registry with --name is required")),
    }
}

fn load_from_registry(dir: &Path, name: &str) -> CliResult<(Schema, String)> {
    let registry = SchemaRegistry::from_directory(dir)
        .map_err(|err| schema_error(&format!("loading {}", dir.display()), err))?;
    let schema = registry.get(name).ok_or_else(|| {
        CliError::new(
            USAGE,
            format!(
                "no schema named `{name}` in {} (available: {})",
                dir.display(),
                registry.names().join(", ")
            ),
        )
    })?;
    Ok((schema.as_ref().clone(), name.to_string()))
}

fn print_check(out: &CheckOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = table(vec!["CONFIG", "SCHEMA", "VALID", "ERROR"]);
            table.add_row(vec![
                out.config.clone(),
                out.schema.clone(),
                out.valid.to_string(),
                out.message.clone().unwrap_or_default(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => match &out.message {
            None => println!("{}: valid against {}", out.config, out.schema),
            Some(message) => println!("{}: invalid against {}: {message}", out.config, out.schema),
        },
        OutputFormat::Raw => {
            if let Some(resolved) = &out.resolved {
                print_pretty_json(resolved);
            }
        }
    }
}
