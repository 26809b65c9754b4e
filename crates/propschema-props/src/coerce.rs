//! Conversion between JSON values and the typed scalars props store.
//!
//! Every place that reads a scalar out of a JSON value (defaults, allowed
//! values, validation) goes through [`Scalar::from_value`], so the numeric
//! rules live in one spot: integers accept whole-valued floats that fit in
//! `i64`, floats accept any number.

use serde_json::Value;

use crate::prop_type::PropType;

/// A leaf value type that can be read from and written to JSON.
pub trait Scalar: Clone + PartialEq + Sized {
    /// The prop type this scalar backs.
    const TYPE: PropType;

    /// Read the scalar, coercing numeric representations. `None` on mismatch.
    fn from_value(value: &Value) -> Option<Self>;

    fn to_value(&self) -> Value;
}

impl Scalar for String {
    const TYPE: PropType = PropType::String;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Scalar for i64 {
    const TYPE: PropType = PropType::Integer;

    fn from_value(value: &Value) -> Option<Self> {
        as_integer(value)
    }

    fn to_value(&self) -> Value {
        Value::from(*self)
    }
}

impl Scalar for f64 {
    const TYPE: PropType = PropType::Float;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }

    fn to_value(&self) -> Value {
        Value::from(*self)
    }
}

impl Scalar for bool {
    const TYPE: PropType = PropType::Bool;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

/// Integral view of a JSON number, if it has one that fits in `i64`.
pub fn as_integer(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(int) = number.as_i64() {
        return Some(int);
    }
    if number.is_u64() {
        return None;
    }
    number.as_f64().and_then(whole_f64_to_i64)
}

fn whole_f64_to_i64(value: f64) -> Option<i64> {
    // i64::MAX is not representable as f64; 2^63 is the first excluded value.
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    if value.is_finite() && value.fract() == 0.0 && value >= -UPPER && value < UPPER {
        Some(value as i64)
    } else {
        None
    }
}

/// Numeric view used for interval checks.
pub fn as_number(value: &Value) -> Option<f64> {
    value.as_f64()
}
