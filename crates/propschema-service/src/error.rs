use propschema_schema::SchemaError;

use crate::id::Id;
use crate::store::StoreError;

/// Errors returned by [`crate::ConfigService`].
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("id `{0}` too short")]
    InvalidId(String),

    #[error("name `{0}` too short")]
    InvalidName(String),

    #[error("schema `{0}` not found")]
    SchemaNotFound(Id),

    #[error("config `{0}` not found")]
    ConfigNotFound(Id),

    #[error("schema with id `{0}` already exists")]
    SchemaExists(Id),

    #[error("config with id `{0}` already exists")]
    ConfigExists(Id),

    /// Configs still reference the schema.
    #[error("schema `{id}` is used by {configs} config(s)")]
    SchemaInUse { id: Id, configs: usize },

    #[error("empty configuration")]
    EmptyConfig,

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
