//! Declarative configuration schemas.
//!
//! A schema is written as a JSON object whose keys are field names. A key
//! maps to one of:
//!
//! - `{"$schema": {"type": "integer", "default": 8080, ...}}`: a leaf field
//! - a plain object: a nested object whose keys are its children
//! - a one-element array wrapping either form: a list of such values
//!
//! [`Schema::from_json`] parses that notation into a tree of
//! [`Prop`](propschema_props::Prop)s, [`Schema::validate`] checks a
//! [`ConfigData`] document against it, and [`Schema::to_map`] renders it
//! back. [`SchemaRegistry`] keeps named schemas loaded from a directory.

pub mod config;
pub mod data;
pub mod digest;
pub mod error;
pub mod parser;
pub mod registry;
pub mod schema;
pub mod serializer;

pub use config::{ParserConfig, RegistryConfig};
pub use data::ConfigData;
pub use digest::{CanonicalBytes, ContentDigest, DigestAlgorithm};
pub use error::{Result, SchemaError};
pub use parser::{SchemaParser, MARKER_KEY};
pub use registry::SchemaRegistry;
pub use schema::{Schema, Validation};
pub use serializer::{render_prop, render_schema};
