use propschema_props::{PropError, ValidationError};

/// Errors raised while parsing, loading or applying schemas.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A declared prop failed construction.
    #[error("invalid prop `{path}`: {source}")]
    InvalidProp {
        path: String,
        #[source]
        source: PropError,
    },

    /// An array declaration must hold exactly one element.
    #[error("invalid array for `{0}`")]
    InvalidArray(String),

    /// The single element of an array declaration is not an object.
    #[error("invalid array element for `{0}`: expected an object")]
    InvalidArrayElement(String),

    /// A scalar where a declaration was expected.
    #[error("invalid declaration for `{0}`")]
    InvalidDeclaration(String),

    /// Missing or unknown `type` in a `$schema` descriptor.
    #[error("invalid type `{value}` for `{path}`")]
    InvalidType { path: String, value: String },

    /// The `$schema` descriptor has the wrong shape.
    #[error("invalid descriptor for `{path}`: {source}")]
    InvalidDescriptor {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("empty schema")]
    EmptySchema,

    /// A nested object without children.
    #[error("object `{0}` does not have props")]
    EmptyObject(String),

    #[error("schema nests deeper than {max} levels at `{path}`")]
    TooDeep { path: String, max: usize },

    /// A schema or config document must be a JSON object.
    #[error("expected a JSON object")]
    NotAnObject,

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The schema file could not be loaded.
    #[error("failed to load schema: {0}")]
    LoadFailed(String),

    /// No schema registered under the given name.
    #[error("no schema registered as `{0}`")]
    NoSchema(String),

    /// The config failed validation against the named schema.
    #[error("validation failed against `{name}`: {source}")]
    ValidationFailed {
        name: String,
        #[source]
        source: ValidationError,
    },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
