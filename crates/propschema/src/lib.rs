//! Declarative configuration schemas with typed validation.
//!
//! propschema parses schemas written in a small JSON notation, validates
//! configuration documents against them (filling in defaults), renders
//! schemas back, and computes stable content digests of documents.
//!
//! # Crate Structure
//!
//! - [`props`]: typed schema nodes and value validation
//! - [`schema`]: the declarative notation, documents, digests and the registry
//! - [`service`]: stored schemas and configs with change events (behind `service` feature)

/// Re-export prop types.
pub mod props {
    pub use propschema_props::*;
}

/// Re-export schema types.
pub mod schema {
    pub use propschema_schema::*;
}

/// Re-export service types (requires `service` feature).
#[cfg(feature = "service")]
pub mod service {
    pub use propschema_service::*;
}
