use std::collections::BTreeMap;

use regex::Regex;
use serde_json::Value;

use crate::coerce::Scalar;
use crate::constraint::Constraint;
use crate::error::{PropError, Result};
use crate::interval::Interval;
use crate::prop_type::PropType;

/// Default and allowed values of a leaf prop, typed by its scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf<T> {
    default: Option<T>,
    values: Vec<T>,
}

impl<T> Default for Leaf<T> {
    fn default() -> Self {
        Self {
            default: None,
            values: Vec::new(),
        }
    }
}

impl<T: Scalar> Leaf<T> {
    pub fn default_value(&self) -> Option<&T> {
        self.default.as_ref()
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    fn set_default(&mut self, name: &str, value: Value) -> Result<()> {
        let typed = T::from_value(&value).ok_or_else(|| PropError::MismatchedDefault {
            name: name.to_string(),
            expected: T::TYPE,
            value,
        })?;
        self.default = Some(typed);
        Ok(())
    }

    fn set_values(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        let mut typed = Vec::with_capacity(values.len());
        for value in values {
            match T::from_value(&value) {
                Some(v) => typed.push(v),
                None => {
                    return Err(PropError::MismatchedValue {
                        name: name.to_string(),
                        expected: T::TYPE,
                        value,
                    })
                }
            }
        }
        self.values = typed;
        Ok(())
    }
}

/// A compiled regex that compares by its source text.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self> {
        let regex = Regex::new(source).map_err(|source_err| PropError::InvalidRegex {
            pattern: source.to_string(),
            source: source_err,
        })?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Type-specific part of a prop. Each variant only carries the constraints
/// that are legal for its type.
#[derive(Debug, Clone, PartialEq)]
pub enum PropKind {
    String {
        leaf: Leaf<String>,
        pattern: Option<Pattern>,
    },
    Integer {
        leaf: Leaf<i64>,
        interval: Option<Interval>,
    },
    Float {
        leaf: Leaf<f64>,
        interval: Option<Interval>,
    },
    Bool {
        leaf: Leaf<bool>,
    },
    Object {
        props: BTreeMap<String, Prop>,
    },
}

impl PropKind {
    fn empty(prop_type: PropType) -> Self {
        match prop_type {
            PropType::String => PropKind::String {
                leaf: Leaf::default(),
                pattern: None,
            },
            PropType::Integer => PropKind::Integer {
                leaf: Leaf::default(),
                interval: None,
            },
            PropType::Float => PropKind::Float {
                leaf: Leaf::default(),
                interval: None,
            },
            PropType::Bool => PropKind::Bool {
                leaf: Leaf::default(),
            },
            PropType::Object => PropKind::Object {
                props: BTreeMap::new(),
            },
        }
    }

    pub fn prop_type(&self) -> PropType {
        match self {
            PropKind::String { .. } => PropType::String,
            PropKind::Integer { .. } => PropType::Integer,
            PropKind::Float { .. } => PropType::Float,
            PropKind::Bool { .. } => PropType::Bool,
            PropKind::Object { .. } => PropType::Object,
        }
    }
}

/// A schema node: one field of a configuration document.
#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    name: String,
    required: bool,
    array: bool,
    kind: PropKind,
}

impl Prop {
    /// Build a prop, applying `constraints` in order.
    ///
    /// Returns the first violated rule: empty name, a constraint the type
    /// does not support, a default or allowed value of the wrong type, an
    /// uncompilable regex, an optional object, or an object without children.
    pub fn new<I>(name: impl Into<String>, prop_type: PropType, constraints: I) -> Result<Self>
    where
        I: IntoIterator<Item = Constraint>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(PropError::EmptyName);
        }

        let mut draft = Draft {
            name,
            required: prop_type == PropType::Object,
            array: false,
            kind: PropKind::empty(prop_type),
        };
        for constraint in constraints {
            draft.apply(constraint)?;
        }
        draft.finish()
    }

    pub fn string<I>(name: impl Into<String>, constraints: I) -> Result<Self>
    where
        I: IntoIterator<Item = Constraint>,
    {
        Self::new(name, PropType::String, constraints)
    }

    pub fn integer<I>(name: impl Into<String>, constraints: I) -> Result<Self>
    where
        I: IntoIterator<Item = Constraint>,
    {
        Self::new(name, PropType::Integer, constraints)
    }

    pub fn float<I>(name: impl Into<String>, constraints: I) -> Result<Self>
    where
        I: IntoIterator<Item = Constraint>,
    {
        Self::new(name, PropType::Float, constraints)
    }

    pub fn boolean<I>(name: impl Into<String>, constraints: I) -> Result<Self>
    where
        I: IntoIterator<Item = Constraint>,
    {
        Self::new(name, PropType::Bool, constraints)
    }

    /// Build an object prop. `Required(true)` is applied before the caller's
    /// constraints, so an explicit `Required(false)` is rejected.
    pub fn object<I>(name: impl Into<String>, constraints: I) -> Result<Self>
    where
        I: IntoIterator<Item = Constraint>,
    {
        let constraints = std::iter::once(Constraint::Required(true)).chain(constraints);
        Self::new(name, PropType::Object, constraints)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prop_type(&self) -> PropType {
        self.kind.prop_type()
    }

    pub fn kind(&self) -> &PropKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_array(&self) -> bool {
        self.array
    }

    /// The default as a JSON value.
    pub fn default_value(&self) -> Option<Value> {
        match &self.kind {
            PropKind::String { leaf, .. } => leaf.default_value().map(Scalar::to_value),
            PropKind::Integer { leaf, .. } => leaf.default_value().map(Scalar::to_value),
            PropKind::Float { leaf, .. } => leaf.default_value().map(Scalar::to_value),
            PropKind::Bool { leaf } => leaf.default_value().map(Scalar::to_value),
            PropKind::Object { .. } => None,
        }
    }

    /// The allowed values as JSON values; empty when unrestricted.
    pub fn values(&self) -> Vec<Value> {
        fn render<T: Scalar>(leaf: &Leaf<T>) -> Vec<Value> {
            leaf.values().iter().map(Scalar::to_value).collect()
        }

        match &self.kind {
            PropKind::String { leaf, .. } => render(leaf),
            PropKind::Integer { leaf, .. } => render(leaf),
            PropKind::Float { leaf, .. } => render(leaf),
            PropKind::Bool { leaf } => render(leaf),
            PropKind::Object { .. } => Vec::new(),
        }
    }

    pub fn regex(&self) -> Option<&str> {
        match &self.kind {
            PropKind::String { pattern, .. } => pattern.as_ref().map(Pattern::as_str),
            _ => None,
        }
    }

    pub fn interval(&self) -> Option<&Interval> {
        match &self.kind {
            PropKind::Integer { interval, .. } | PropKind::Float { interval, .. } => {
                interval.as_ref()
            }
            _ => None,
        }
    }

    /// Child props of an object; `None` for leaves.
    pub fn props(&self) -> Option<&BTreeMap<String, Prop>> {
        match &self.kind {
            PropKind::Object { props } => Some(props),
            _ => None,
        }
    }

    /// Depth of the subtree rooted here; leaves are 1.
    pub fn depth(&self) -> usize {
        match &self.kind {
            PropKind::Object { props } => 1 + props.values().map(Prop::depth).max().unwrap_or(0),
            _ => 1,
        }
    }
}

struct Draft {
    name: String,
    required: bool,
    array: bool,
    kind: PropKind,
}

impl Draft {
    fn apply(&mut self, constraint: Constraint) -> Result<()> {
        let constraint_name = constraint.name();
        let name = self.name.as_str();
        match (constraint, &mut self.kind) {
            (Constraint::Default(value), PropKind::String { leaf, .. }) => {
                leaf.set_default(name, value)
            }
            (Constraint::Default(value), PropKind::Integer { leaf, .. }) => {
                leaf.set_default(name, value)
            }
            (Constraint::Default(value), PropKind::Float { leaf, .. }) => {
                leaf.set_default(name, value)
            }
            (Constraint::Default(value), PropKind::Bool { leaf }) => leaf.set_default(name, value),

            (Constraint::Values(values), PropKind::String { leaf, .. }) => {
                leaf.set_values(name, values)
            }
            (Constraint::Values(values), PropKind::Integer { leaf, .. }) => {
                leaf.set_values(name, values)
            }
            (Constraint::Values(values), PropKind::Float { leaf, .. }) => {
                leaf.set_values(name, values)
            }
            (Constraint::Values(values), PropKind::Bool { leaf }) => leaf.set_values(name, values),

            (Constraint::Required(false), PropKind::Object { .. }) => {
                Err(PropError::ObjectNotRequired(self.name.clone()))
            }
            (Constraint::Required(required), _) => {
                self.required = required;
                Ok(())
            }

            (Constraint::Regex(source), PropKind::String { pattern, .. }) => {
                *pattern = Some(Pattern::new(&source)?);
                Ok(())
            }

            (Constraint::Interval(bounds), PropKind::Integer { interval, .. })
            | (Constraint::Interval(bounds), PropKind::Float { interval, .. }) => {
                *interval = Some(bounds);
                Ok(())
            }

            (Constraint::Props(children), PropKind::Object { props }) => {
                for child in children {
                    props.insert(child.name.clone(), child);
                }
                Ok(())
            }

            (Constraint::Array, _) => {
                self.array = true;
                Ok(())
            }

            (_, kind) => Err(PropError::NotAllowed {
                name: self.name.clone(),
                prop_type: kind.prop_type(),
                constraint: constraint_name,
            }),
        }
    }

    fn finish(self) -> Result<Prop> {
        if let PropKind::Object { props } = &self.kind {
            if props.is_empty() {
                return Err(PropError::EmptyObject(self.name));
            }
        }
        Ok(Prop {
            name: self.name,
            required: self.required,
            array: self.array,
            kind: self.kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn port() -> Prop {
        Prop::integer(
            "port",
            [
                Constraint::default_value(8080),
                Constraint::interval(80.0, 18080.0).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(matches!(
            Prop::string("", []),
            Err(PropError::EmptyName)
        ));
    }

    #[test]
    fn leaf_accessors() {
        let prop = port();
        assert_eq!(prop.name(), "port");
        assert_eq!(prop.prop_type(), PropType::Integer);
        assert_eq!(prop.default_value(), Some(json!(8080)));
        assert_eq!(prop.interval().map(Interval::min), Some(80.0));
        assert!(!prop.is_required());
        assert!(!prop.is_array());
        assert!(prop.props().is_none());
        assert_eq!(prop.depth(), 1);
    }

    #[test]
    fn integer_default_accepts_whole_float() {
        let prop = Prop::integer("port", [Constraint::default_value(8080.0)]).unwrap();
        assert_eq!(prop.default_value(), Some(json!(8080)));

        assert!(matches!(
            Prop::integer("port", [Constraint::default_value(80.5)]),
            Err(PropError::MismatchedDefault { expected: PropType::Integer, .. })
        ));
    }

    #[test]
    fn mismatched_default_fails() {
        assert!(matches!(
            Prop::integer("port", [Constraint::default_value("8080")]),
            Err(PropError::MismatchedDefault { .. })
        ));
        assert!(matches!(
            Prop::boolean("debug", [Constraint::default_value(1)]),
            Err(PropError::MismatchedDefault { .. })
        ));
        assert!(Prop::float("ratio", [Constraint::default_value(1)]).is_ok());
    }

    #[test]
    fn mismatched_values_fail() {
        assert!(matches!(
            Prop::string("env", [Constraint::values([json!("dev"), json!(1)])]),
            Err(PropError::MismatchedValue { .. })
        ));

        let prop = Prop::integer("n", [Constraint::values([4.0, 5.0, 6.0])]).unwrap();
        assert_eq!(prop.values(), vec![json!(4), json!(5), json!(6)]);
    }

    #[test]
    fn regex_only_on_strings() {
        assert!(Prop::string("version", [Constraint::Regex("v[0-9]+".into())]).is_ok());
        assert!(matches!(
            Prop::integer("n", [Constraint::Regex("[0-9]+".into())]),
            Err(PropError::NotAllowed { constraint: "regex", .. })
        ));
        assert!(matches!(
            Prop::string("bad", [Constraint::Regex("(".into())]),
            Err(PropError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn interval_only_on_numbers() {
        let interval = Constraint::interval(0.0, 1.0).unwrap();
        assert!(Prop::float("ratio", [interval.clone()]).is_ok());
        assert!(matches!(
            Prop::string("s", [interval]),
            Err(PropError::NotAllowed { constraint: "interval", .. })
        ));
        assert!(matches!(
            Constraint::interval(1.0, 0.0),
            Err(PropError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn object_is_always_required() {
        let object = Prop::object("db", [Constraint::Props(vec![port()])]).unwrap();
        assert!(object.is_required());

        let object = Prop::new("db", PropType::Object, [Constraint::Props(vec![port()])]).unwrap();
        assert!(object.is_required());

        assert!(matches!(
            Prop::object(
                "db",
                [Constraint::Props(vec![port()]), Constraint::Required(false)]
            ),
            Err(PropError::ObjectNotRequired(_))
        ));
    }

    #[test]
    fn object_rejects_leaf_constraints() {
        assert!(matches!(
            Prop::object(
                "db",
                [Constraint::Props(vec![port()]), Constraint::default_value(1)]
            ),
            Err(PropError::NotAllowed { constraint: "default", .. })
        ));
        assert!(matches!(
            Prop::object(
                "db",
                [Constraint::Props(vec![port()]), Constraint::values([1])]
            ),
            Err(PropError::NotAllowed { .. })
        ));
    }

    #[test]
    fn children_only_on_objects_and_never_empty() {
        assert!(matches!(
            Prop::string("s", [Constraint::Props(vec![port()])]),
            Err(PropError::NotAllowed { constraint: "subprops", .. })
        ));
        assert!(matches!(
            Prop::object("db", []),
            Err(PropError::EmptyObject(_))
        ));
    }

    #[test]
    fn duplicate_children_last_wins() {
        let first = Prop::string("host", []).unwrap();
        let second = Prop::integer("host", []).unwrap();
        let object = Prop::object("db", [Constraint::Props(vec![first, second])]).unwrap();
        let props = object.props().unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props["host"].prop_type(), PropType::Integer);
        assert_eq!(object.depth(), 2);
    }

    #[test]
    fn array_allowed_on_every_type() {
        for prop_type in [PropType::String, PropType::Integer, PropType::Float, PropType::Bool] {
            let prop = Prop::new("xs", prop_type, [Constraint::Array]).unwrap();
            assert!(prop.is_array());
        }
        let object = Prop::object("items", [Constraint::Props(vec![port()]), Constraint::Array]).unwrap();
        assert!(object.is_array());
    }

    #[test]
    fn pattern_compares_by_source() {
        let a = Prop::string("v", [Constraint::Regex("v[0-9]+".into())]).unwrap();
        let b = Prop::string("v", [Constraint::Regex("v[0-9]+".into())]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.regex(), Some("v[0-9]+"));
    }
}
