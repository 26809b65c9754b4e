use serde_json::{Map, Value};

use crate::coerce::{self, Scalar};
use crate::error::{ValidationError, ValidationErrorKind};
use crate::interval::Interval;
use crate::path::FieldPath;
use crate::prop::{Leaf, Prop, PropKind};

/// Deepest object nesting a validation walks before giving up.
pub const MAX_DEPTH: usize = 64;

type Outcome = std::result::Result<Option<Value>, ValidationError>;

impl Prop {
    /// Validate a single value against this prop.
    ///
    /// Returns the resolved value: defaults substituted for null fields at
    /// any depth, everything else as given.
    pub fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        let resolved = self.resolve(Some(value), &FieldPath::root(), 0, true)?;
        Ok(resolved.unwrap_or(Value::Null))
    }

    /// Returns true if `value` passes [`Prop::validate`].
    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate(value).is_ok()
    }

    /// Validate the root-level member of `document` named after this prop.
    ///
    /// An absent member takes the default if there is one, fails as not
    /// found if the prop is required, and is otherwise left absent
    /// (`Ok(None)`).
    pub fn validate_member(
        &self,
        document: &Map<String, Value>,
    ) -> Result<Option<Value>, ValidationError> {
        self.member(document, &FieldPath::root(), 0, true)
    }

    fn member(
        &self,
        entries: &Map<String, Value>,
        parent: &FieldPath,
        depth: usize,
        top_level: bool,
    ) -> Outcome {
        let path = parent.key(self.name());
        match entries.get(self.name()) {
            Some(value) => self.resolve(Some(value), &path, depth, true),
            None if self.is_required() && self.default_value().is_none() => {
                let key = self.name().to_string();
                let kind = if top_level {
                    ValidationErrorKind::NotFound(key)
                } else {
                    ValidationErrorKind::MissingKey(key)
                };
                Err(ValidationError::new(parent.clone(), kind))
            }
            None => self.resolve(None, &path, depth, true),
        }
    }

    fn resolve(&self, value: Option<&Value>, path: &FieldPath, depth: usize, as_array: bool) -> Outcome {
        let as_array = as_array && self.is_array();

        let substituted;
        let value = match value {
            Some(value) if !value.is_null() => value,
            _ => match self.fallback(as_array) {
                Some(default) => {
                    substituted = default;
                    &substituted
                }
                None if self.is_required() => {
                    return Err(fail(path, ValidationErrorKind::Required));
                }
                // Optional and absent: nothing to check.
                None => return Ok(value.cloned()),
            },
        };

        if as_array {
            let Value::Array(items) = value else {
                return Err(fail(path, ValidationErrorKind::NotArray(value.clone())));
            };
            let mut resolved = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let item = self.resolve(Some(item), &path.index(index), depth, false)?;
                resolved.push(item.unwrap_or(Value::Null));
            }
            return Ok(Some(Value::Array(resolved)));
        }

        match self.kind() {
            PropKind::String { leaf, pattern } => {
                let text = check_leaf(leaf, value, path)?;
                if let Some(pattern) = pattern {
                    if !pattern.is_match(&text) {
                        return Err(fail(
                            path,
                            ValidationErrorKind::PatternMismatch {
                                value: text,
                                pattern: pattern.as_str().to_string(),
                            },
                        ));
                    }
                }
            }
            PropKind::Integer { leaf, interval } => {
                check_leaf(leaf, value, path)?;
                check_interval(interval.as_ref(), value, path)?;
            }
            PropKind::Float { leaf, interval } => {
                check_leaf(leaf, value, path)?;
                check_interval(interval.as_ref(), value, path)?;
            }
            PropKind::Bool { leaf } => {
                check_leaf(leaf, value, path)?;
            }
            PropKind::Object { props } => {
                let Value::Object(entries) = value else {
                    return Err(fail(
                        path,
                        ValidationErrorKind::TypeMismatch {
                            expected: self.prop_type(),
                            value: value.clone(),
                        },
                    ));
                };
                if props.is_empty() {
                    return Err(fail(path, ValidationErrorKind::NoSubprops));
                }
                if depth >= MAX_DEPTH {
                    return Err(fail(path, ValidationErrorKind::TooDeep(MAX_DEPTH)));
                }

                let mut resolved = entries.clone();
                for (key, child) in props {
                    if let Some(child_value) = child.member(entries, path, depth + 1, false)? {
                        resolved.insert(key.clone(), child_value);
                    }
                }
                return Ok(Some(Value::Object(resolved)));
            }
        }

        Ok(Some(value.clone()))
    }

    /// Replacement for a null or absent value. An array prop's default
    /// describes one element, so the absent list becomes `[default]`.
    fn fallback(&self, as_array: bool) -> Option<Value> {
        let default = self.default_value()?;
        if as_array {
            Some(Value::Array(vec![default]))
        } else {
            Some(default)
        }
    }
}

fn fail(path: &FieldPath, kind: ValidationErrorKind) -> ValidationError {
    ValidationError::new(path.clone(), kind)
}

/// Allowed-values check followed by the type check, both on the coerced value.
fn check_leaf<T: Scalar>(leaf: &Leaf<T>, value: &Value, path: &FieldPath) -> Result<T, ValidationError> {
    let scalar = T::from_value(value);

    let allowed = leaf.values();
    if !allowed.is_empty() && !scalar.as_ref().is_some_and(|s| allowed.contains(s)) {
        return Err(fail(
            path,
            ValidationErrorKind::NotInValues {
                value: value.clone(),
                values: allowed.iter().map(Scalar::to_value).collect(),
            },
        ));
    }

    scalar.ok_or_else(|| {
        fail(
            path,
            ValidationErrorKind::TypeMismatch {
                expected: T::TYPE,
                value: value.clone(),
            },
        )
    })
}

fn check_interval(interval: Option<&Interval>, value: &Value, path: &FieldPath) -> Result<(), ValidationError> {
    let (Some(interval), Some(number)) = (interval, coerce::as_number(value)) else {
        return Ok(());
    };
    if number < interval.min() {
        return Err(fail(
            path,
            ValidationErrorKind::BelowMinimum {
                value: value.clone(),
                min: interval.min(),
            },
        ));
    }
    if number > interval.max() {
        return Err(fail(
            path,
            ValidationErrorKind::AboveMaximum {
                value: value.clone(),
                max: interval.max(),
            },
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::constraint::Constraint;

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

    fn env() -> Prop {
        Prop::string("env", [Constraint::values(["dev", "staging", "prod"])]).unwrap()
    }

    #[test]
    fn interval_bounds_are_inclusive() {
        let prop = port();
        assert!(prop.is_valid(&json!(80)));
        assert!(prop.is_valid(&json!(18080)));
        assert!(prop.is_valid(&json!(80.0)));

        let err = prop.validate(&json!(79)).unwrap_err();
        assert!(matches!(err.kind(), ValidationErrorKind::BelowMinimum { .. }));
        let err = prop.validate(&json!(18081)).unwrap_err();
        assert!(matches!(err.kind(), ValidationErrorKind::AboveMaximum { .. }));
    }

    #[test]
    fn float_interval_epsilon() {
        let prop = Prop::float("ratio", [Constraint::interval(1.5, 6.8).unwrap()]).unwrap();
        assert!(prop.is_valid(&json!(1.5)));
        assert!(prop.is_valid(&json!(6.8)));
        assert!(!prop.is_valid(&json!(1.4999999)));
        assert!(!prop.is_valid(&json!(6.8000001)));
        assert!(prop.is_valid(&json!(3)));
    }

    #[test]
    fn integer_rejects_fractions_and_strings() {
        let prop = Prop::integer("n", []).unwrap();
        assert!(prop.is_valid(&json!(3)));
        assert!(prop.is_valid(&json!(3.0)));
        assert!(!prop.is_valid(&json!(3.5)));
        let err = prop.validate(&json!("3")).unwrap_err();
        assert_eq!(err.to_string(), r#""3" is not an integer"#);
    }

    #[test]
    fn null_takes_default() {
        assert_eq!(port().validate(&Value::Null).unwrap(), json!(8080));
    }

    #[test]
    fn required_without_default_rejects_null() {
        let prop = Prop::string("url", [Constraint::Required(true)]).unwrap();
        let err = prop.validate(&Value::Null).unwrap_err();
        assert_eq!(err.kind(), &ValidationErrorKind::Required);
    }

    #[test]
    fn optional_null_is_vacuously_valid() {
        let prop = Prop::string("url", []).unwrap();
        assert_eq!(prop.validate(&Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn default_is_checked_like_a_value() {
        let prop = Prop::integer(
            "port",
            [
                Constraint::default_value(10),
                Constraint::interval(80.0, 90.0).unwrap(),
            ],
        )
        .unwrap();
        assert!(prop.validate(&Value::Null).is_err());
    }

    #[test]
    fn allowed_values() {
        let prop = env();
        assert!(prop.is_valid(&json!("staging")));
        let err = prop.validate(&json!("qa")).unwrap_err();
        assert!(matches!(err.kind(), ValidationErrorKind::NotInValues { .. }));

        // Values outside the declared type are reported against the allowed set.
        let err = prop.validate(&json!(1)).unwrap_err();
        assert!(matches!(err.kind(), ValidationErrorKind::NotInValues { .. }));
    }

    #[test]
    fn float_values_compare_numerically() {
        let prop = Prop::float("ratio", [Constraint::values([0.5, 1.0])]).unwrap();
        assert!(prop.is_valid(&json!(1)));
        assert!(!prop.is_valid(&json!(2)));
    }

    #[test]
    fn regex_is_enforced() {
        let prop = Prop::string("version", [Constraint::Regex("^v[0-9]+$".into())]).unwrap();
        assert!(prop.is_valid(&json!("v12")));
        let err = prop.validate(&json!("12")).unwrap_err();
        assert!(matches!(err.kind(), ValidationErrorKind::PatternMismatch { .. }));
    }

    #[test]
    fn bool_type_check() {
        let prop = Prop::boolean("debug", []).unwrap();
        assert!(prop.is_valid(&json!(false)));
        assert!(!prop.is_valid(&json!("false")));
    }

    #[test]
    fn arrays_validate_each_element() {
        let prop = Prop::string("tags", [Constraint::Array]).unwrap();
        assert_eq!(prop.validate(&json!(["a", "b"])).unwrap(), json!(["a", "b"]));
        assert!(prop.is_valid(&json!([])));

        let err = prop.validate(&json!("a")).unwrap_err();
        assert_eq!(err.to_string(), r#""a" is not an array"#);

        let err = prop.validate(&json!(["a", 2])).unwrap_err();
        assert_eq!(err.path().to_string(), "[1]");
    }

    #[test]
    fn nested_arrays_are_not_stacked() {
        let prop = Prop::integer("ns", [Constraint::Array]).unwrap();
        assert!(!prop.is_valid(&json!([[1]])));
    }

    #[test]
    fn array_default_fills_elements_and_absent_lists() {
        let prop = Prop::integer("ns", [Constraint::Array, Constraint::default_value(1)]).unwrap();
        assert_eq!(prop.validate(&json!([5, null])).unwrap(), json!([5, 1]));
        assert_eq!(prop.validate(&Value::Null).unwrap(), json!([1]));
    }

    #[test]
    fn objects_validate_children_with_paths() {
        let host = Prop::string("host", [Constraint::Required(true)]).unwrap();
        let db = Prop::object("db", [Constraint::Props(vec![host, port()])]).unwrap();

        let resolved = db.validate(&json!({"host": "x"})).unwrap();
        assert_eq!(resolved, json!({"host": "x", "port": 8080}));

        let err = db.validate(&json!({"port": 81})).unwrap_err();
        assert_eq!(err.kind(), &ValidationErrorKind::MissingKey("host".into()));

        let err = db.validate(&json!({"host": "x", "port": 1})).unwrap_err();
        assert_eq!(err.path().to_string(), "port");

        let err = db.validate(&json!("db")).unwrap_err();
        assert!(matches!(err.kind(), ValidationErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn optional_absent_child_stays_absent() {
        let host = Prop::string("host", []).unwrap();
        let db = Prop::object("db", [Constraint::Props(vec![host])]).unwrap();
        assert_eq!(db.validate(&json!({})).unwrap(), json!({}));
    }

    #[test]
    fn undeclared_keys_are_kept() {
        let db = Prop::object("db", [Constraint::Props(vec![port()])]).unwrap();
        let resolved = db.validate(&json!({"extra": true})).unwrap();
        assert_eq!(resolved, json!({"extra": true, "port": 8080}));
    }

    #[test]
    fn array_of_objects_paths() {
        let name = Prop::string("name", [Constraint::Required(true)]).unwrap();
        let items = Prop::object("items", [Constraint::Props(vec![name]), Constraint::Array]).unwrap();
        let err = items
            .validate(&json!([{"name": "a"}, {"name": 3}]))
            .unwrap_err();
        assert_eq!(err.path().to_string(), "[1].name");
    }

    #[test]
    fn validation_is_idempotent() {
        let db = Prop::object("db", [Constraint::Props(vec![port(), env()])]).unwrap();
        let doc = json!({"env": "dev"});
        let first = db.validate(&doc);
        let second = db.validate(&doc);
        assert_eq!(first, second);
    }

    #[test]
    fn deep_nesting_is_bounded() {
        let mut prop = Prop::string("leaf", []).unwrap();
        let mut doc = json!("x");
        for level in 0..=MAX_DEPTH {
            let name = format!("level{level}");
            let mut wrapper = Map::new();
            wrapper.insert(prop.name().to_string(), doc);
            doc = Value::Object(wrapper);
            prop = Prop::object(name, [Constraint::Props(vec![prop])]).unwrap();
        }
        let err = prop.validate(&doc).unwrap_err();
        assert_eq!(err.kind(), &ValidationErrorKind::TooDeep(MAX_DEPTH));
    }
}
