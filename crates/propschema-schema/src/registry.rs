use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::RegistryConfig;
use crate::data::ConfigData;
use crate::error::{Result, SchemaError};
use crate::parser::SchemaParser;
use crate::schema::{Schema, Validation};

const SCHEMA_SUFFIX: &str = ".schema.json";

/// Name-keyed registry of parsed schemas.
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Schema>>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            schemas: HashMap::new(),
            config,
        }
    }

    /// Register a schema under `name` from its JSON declaration.
    pub fn register(&mut self, name: &str, schema_json: &str) -> Result<()> {
        let schema = self.parser().parse_str(schema_json)?;
        self.register_schema(name, schema);
        Ok(())
    }

    /// Register a schema under `name` from a JSON value.
    pub fn register_value(&mut self, name: &str, schema: &Value) -> Result<()> {
        let schema = self.parser().parse_value(schema)?;
        self.register_schema(name, schema);
        Ok(())
    }

    /// Register an already built schema, replacing any previous one.
    pub fn register_schema(&mut self, name: &str, schema: Schema) {
        debug!(name, props = schema.len(), "registered schema");
        self.schemas.insert(name.to_string(), Arc::new(schema));
    }

    /// Load `<name>.schema.json` files from a directory.
    pub fn from_directory(path: &Path) -> Result<Self> {
        Self::from_directory_with_config(path, RegistryConfig::default())
    }

    /// Load schemas from a directory with explicit config.
    ///
    /// Every `<name>.schema.json` regular file is registered under `<name>`,
    /// in name order. Symlinked schema files, unrecognized names, more files
    /// than `max_schemas_from_directory` and files over
    /// `max_schema_file_size` fail the whole load.
    pub fn from_directory_with_config(dir: &Path, config: RegistryConfig) -> Result<Self> {
        let files = schema_files(dir)?;
        if files.len() > config.max_schemas_from_directory {
            return Err(SchemaError::LoadFailed(format!(
                "{} holds {} schemas, more than the configured max of {}",
                dir.display(),
                files.len(),
                config.max_schemas_from_directory
            )));
        }

        let mut registry = Self::with_config(config);
        for file in &files {
            let source = read_schema_source(file, config.max_schema_file_size)?;
            registry
                .register(&file.name, &source)
                .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", file.file_name)))?;
        }

        debug!(dir = %dir.display(), schemas = files.len(), "loaded schema directory");
        Ok(registry)
    }

    /// Load from embedded `(name, json)` pairs.
    pub fn from_embedded(schemas: &[(&str, &str)]) -> Result<Self> {
        let mut registry = Self::new();
        for (name, schema) in schemas {
            registry.register(name, schema)?;
        }
        Ok(registry)
    }

    /// Validate `data` against the schema registered as `name`, returning
    /// the resolved document.
    ///
    /// Unknown names pass `data` through unchanged unless
    /// `fail_on_missing_schema` is set.
    pub fn validate(&self, name: &str, data: &ConfigData) -> Result<ConfigData> {
        match self.schemas.get(name) {
            Some(schema) => schema
                .validate(data)
                .map_err(|source| SchemaError::ValidationFailed {
                    name: name.to_string(),
                    source,
                }),
            None if self.config.fail_on_missing_schema => {
                Err(SchemaError::NoSchema(name.to_string()))
            }
            None => Ok(data.clone()),
        }
    }

    /// Like [`SchemaRegistry::validate`], reporting failure as a verdict.
    pub fn check(&self, name: &str, data: &ConfigData) -> Validation {
        match self.validate(name, data) {
            Ok(_) => Validation::valid(),
            Err(SchemaError::ValidationFailed { source, .. }) => {
                Validation::invalid(source.to_string())
            }
            Err(err) => Validation::invalid(err.to_string()),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }

    /// Check if a name has a registered schema.
    pub fn has_schema(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn parser(&self) -> SchemaParser {
        SchemaParser::with_config(self.config.parser)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// `my-app.schema.json` → `my-app`. Names are ASCII letters, digits, `-`
/// and `_`; anything else is not a schema name.
fn schema_name_from_file_name(file_name: &str) -> Option<String> {
    let lower = file_name.to_ascii_lowercase();
    let stem = lower.strip_suffix(SCHEMA_SUFFIX)?;
    let valid = !stem.is_empty()
        && stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then(|| stem.to_string())
}

/// A `<name>.schema.json` file found in a schema directory.
struct SchemaFile {
    name: String,
    file_name: String,
    path: PathBuf,
}

/// Schema files of `dir`, sorted by schema name. Other entries are skipped.
fn schema_files(dir: &Path) -> Result<Vec<SchemaFile>> {
    let unreadable =
        |err: io::Error| SchemaError::LoadFailed(format!("{}: {err}", dir.display()));

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.to_ascii_lowercase().ends_with(SCHEMA_SUFFIX) {
            continue;
        }

        // DirEntry::file_type does not follow symlinks.
        let file_type = entry.file_type().map_err(unreadable)?;
        if file_type.is_symlink() {
            warn!(file = %file_name, "refusing schema symlink");
            return Err(SchemaError::LoadFailed(format!(
                "refusing to load schema symlink: {file_name}"
            )));
        }
        if !file_type.is_file() {
            continue;
        }

        let name = schema_name_from_file_name(&file_name).ok_or_else(|| {
            SchemaError::LoadFailed(format!("unrecognized schema filename: {file_name}"))
        })?;
        files.push(SchemaFile {
            name,
            file_name,
            path: entry.path(),
        });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Read the file, refusing it once more than `limit` bytes have been read.
fn read_schema_source(file: &SchemaFile, limit: usize) -> Result<String> {
    let failed = |err: io::Error| SchemaError::LoadFailed(format!("{}: {err}", file.file_name));

    let handle = File::open(&file.path).map_err(failed)?;
    let mut source = String::new();
    handle
        .take((limit as u64).saturating_add(1))
        .read_to_string(&mut source)
        .map_err(failed)?;
    if source.len() > limit {
        return Err(SchemaError::LoadFailed(format!(
            "{}: larger than {limit} bytes",
            file.file_name
        )));
    }
    Ok(source)
}
