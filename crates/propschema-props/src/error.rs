use serde_json::Value;

use crate::path::FieldPath;
use crate::prop_type::PropType;

/// Errors raised while building a prop. Construction never yields a
/// partially valid node.
#[derive(Debug, thiserror::Error)]
pub enum PropError {
    /// Props must be named.
    #[error("empty name in prop")]
    EmptyName,

    /// The type name is not one of the known kinds.
    #[error("invalid type `{0}`")]
    UnknownType(String),

    /// `min` is greater than `max`, or a bound is NaN.
    #[error("invalid interval [{min}, {max}]")]
    InvalidInterval { min: f64, max: f64 },

    /// A constraint was supplied to a type it does not apply to.
    #[error("{prop_type} prop `{name}` cannot have {constraint}")]
    NotAllowed {
        name: String,
        prop_type: PropType,
        constraint: &'static str,
    },

    /// Objects are always required.
    #[error("object prop `{0}` must be required")]
    ObjectNotRequired(String),

    /// The default value does not match the declared type.
    #[error("{expected} default value expected for `{name}`, got {value}")]
    MismatchedDefault {
        name: String,
        expected: PropType,
        value: Value,
    },

    /// An allowed value does not match the declared type.
    #[error("{expected} enum value expected for `{name}`, got {value}")]
    MismatchedValue {
        name: String,
        expected: PropType,
        value: Value,
    },

    /// The regex does not compile.
    #[error("invalid regex `{pattern}`: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Objects need at least one child.
    #[error("object prop `{0}` does not have subprops")]
    EmptyObject(String),
}

pub type Result<T> = std::result::Result<T, PropError>;

/// Why a value was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationErrorKind {
    /// Null where the prop is required and has no default.
    #[error("value is required")]
    Required,

    /// A required root-level prop is absent from the document.
    #[error("prop `{0}` not found in config")]
    NotFound(String),

    /// A required child prop is absent from its object.
    #[error("missing prop for key `{0}`")]
    MissingKey(String),

    #[error("{0} is not an array")]
    NotArray(Value),

    #[error("{value} is not in allowed values {}", render_values(.values))]
    NotInValues { value: Value, values: Vec<Value> },

    #[error("{value} is not {}", article(.expected))]
    TypeMismatch { expected: PropType, value: Value },

    #[error("{value} is lesser than the minimum value {min} in interval")]
    BelowMinimum { value: Value, min: f64 },

    #[error("{value} is greater than the maximum value {max} in interval")]
    AboveMaximum { value: Value, max: f64 },

    #[error("{value:?} does not match regex `{pattern}`")]
    PatternMismatch { value: String, pattern: String },

    /// An object prop without children; cannot be built through [`crate::Prop::new`].
    #[error("object does not have subprops")]
    NoSubprops,

    #[error("document nests deeper than {0} levels")]
    TooDeep(usize),
}

/// A rejected value together with where it sits in the document.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", render_error(.path, .kind))]
pub struct ValidationError {
    path: FieldPath,
    kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(path: FieldPath, kind: ValidationErrorKind) -> Self {
        Self { path, kind }
    }

    /// Location of the offending field. For missing-key errors this is the
    /// containing object; the key is named by the kind.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn kind(&self) -> &ValidationErrorKind {
        &self.kind
    }
}

fn render_error(path: &FieldPath, kind: &ValidationErrorKind) -> String {
    if path.is_root() {
        kind.to_string()
    } else {
        format!("`{path}`: {kind}")
    }
}

fn article(prop_type: &PropType) -> &'static str {
    prop_type.with_article()
}

fn render_values(values: &[Value]) -> String {
    Value::Array(values.to_vec()).to_string()
}
