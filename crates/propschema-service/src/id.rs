use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ServiceError};

/// Shortest accepted id or name.
pub const MIN_LEN: usize = 4;

/// Identifier of a stored schema or config.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Id(String);

impl Id {
    /// Use `id` as given.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.len() < MIN_LEN {
            return Err(ServiceError::InvalidId(id));
        }
        Ok(Self(id))
    }

    /// Slugify `source` and use the result.
    pub fn from_slug(source: &str) -> Result<Self> {
        let slug = slugify(source);
        if slug.len() < MIN_LEN {
            return Err(ServiceError::InvalidId(source.to_string()));
        }
        Ok(Self(slug))
    }

    /// A fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Id {
    type Error = ServiceError;

    fn try_from(id: String) -> Result<Self> {
        Self::new(id)
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.0
    }
}

/// Display name of a schema or config, stored slugified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    pub fn new(name: &str) -> Result<Self> {
        let slug = slugify(name);
        if slug.len() < MIN_LEN {
            return Err(ServiceError::InvalidName(name.to_string()));
        }
        Ok(Self(slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Name {
    type Error = ServiceError;

    fn try_from(name: String) -> Result<Self> {
        Self::new(&name)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

/// Transliterate to ASCII, lowercase, and collapse every run of other
/// characters into a single `-`, with no leading or trailing `-`.
pub fn slugify(source: &str) -> String {
    slug::slugify(source)
}
