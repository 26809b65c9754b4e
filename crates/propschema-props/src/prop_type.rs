use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PropError;

/// The closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropType {
    String,
    Integer,
    Float,
    Bool,
    Object,
}

impl PropType {
    pub const ALL: [PropType; 5] = [
        PropType::String,
        PropType::Integer,
        PropType::Float,
        PropType::Bool,
        PropType::Object,
    ];

    /// Parse the textual type name used by the declarative format.
    pub fn parse(name: &str) -> Result<Self, PropError> {
        match name {
            "string" => Ok(PropType::String),
            "integer" => Ok(PropType::Integer),
            "float" => Ok(PropType::Float),
            "bool" => Ok(PropType::Bool),
            "object" => Ok(PropType::Object),
            other => Err(PropError::UnknownType(other.to_string())),
        }
    }

    /// Returns true if `name` is one of the known type names.
    pub fn is_valid(name: &str) -> bool {
        Self::parse(name).is_ok()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PropType::String => "string",
            PropType::Integer => "integer",
            PropType::Float => "float",
            PropType::Bool => "bool",
            PropType::Object => "object",
        }
    }

    /// Returns true for `Integer` and `Float`.
    pub fn is_numeric(self) -> bool {
        matches!(self, PropType::Integer | PropType::Float)
    }

    pub(crate) fn with_article(self) -> &'static str {
        match self {
            PropType::String => "a string",
            PropType::Integer => "an integer",
            PropType::Float => "a float",
            PropType::Bool => "a boolean",
            PropType::Object => "an object",
        }
    }
}

impl fmt::Display for PropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropType {
    type Err = PropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_known_name() {
        for prop_type in PropType::ALL {
            assert_eq!(PropType::parse(prop_type.as_str()).unwrap(), prop_type);
            assert!(PropType::is_valid(prop_type.as_str()));
        }
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(matches!(
            PropType::parse("number"),
            Err(PropError::UnknownType(name)) if name == "number"
        ));
        assert!(!PropType::is_valid(""));
        assert!(!PropType::is_valid("String"));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let encoded = serde_json::to_string(&PropType::Bool).unwrap();
        assert_eq!(encoded, "\"bool\"");
        let decoded: PropType = serde_json::from_str("\"integer\"").unwrap();
        assert_eq!(decoded, PropType::Integer);
    }

    #[test]
    fn numeric_types() {
        assert!(PropType::Integer.is_numeric());
        assert!(PropType::Float.is_numeric());
        assert!(!PropType::String.is_numeric());
    }
}
