use serde_json::Value;

use crate::error::Result;
use crate::interval::Interval;
use crate::prop::Prop;

/// One constraint applied while building a [`Prop`].
///
/// Constraints are applied in the order given; the first one that is not
/// legal for the prop's type aborts construction.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Value substituted when the field is absent or null.
    Default(Value),
    /// Whether the field must be present. Objects are always required.
    Required(bool),
    /// The closed set of values the field may take.
    Values(Vec<Value>),
    /// Pattern string values must match. Strings only.
    Regex(String),
    /// Inclusive numeric bounds. Integers and floats only.
    Interval(Interval),
    /// Child props. Objects only; a later child with the same name wins.
    Props(Vec<Prop>),
    /// The field holds a list, each element validated against this prop.
    Array,
}

impl Constraint {
    /// Build an [`Constraint::Interval`], checking the bounds.
    pub fn interval(min: f64, max: f64) -> Result<Self> {
        Interval::new(min, max).map(Constraint::Interval)
    }

    pub fn values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Constraint::Values(values.into_iter().map(Into::into).collect())
    }

    pub fn default_value(value: impl Into<Value>) -> Self {
        Constraint::Default(value.into())
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Constraint::Default(_) => "default",
            Constraint::Required(_) => "required",
            Constraint::Values(_) => "enum values",
            Constraint::Regex(_) => "regex",
            Constraint::Interval(_) => "interval",
            Constraint::Props(_) => "subprops",
            Constraint::Array => "array",
        }
    }
}
