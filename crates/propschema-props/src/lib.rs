//! Typed schema nodes for configuration documents.
//!
//! A [`Prop`] describes one field of a configuration document: its
//! [`PropType`], whether it is required, and the constraints its value must
//! satisfy (default, allowed values, regex, [`Interval`], children for
//! objects, and the array flag). Props are validated once when they are
//! built and are immutable afterwards, so a tree of them can be shared by
//! any number of concurrent validations.
//!
//! Values are plain [`serde_json::Value`]s. Numbers are coerced per declared
//! type: an integer prop accepts whole-valued floats, a float prop accepts
//! any number.

pub mod coerce;
pub mod constraint;
pub mod error;
pub mod interval;
pub mod path;
pub mod prop;
pub mod prop_type;
pub mod validator;

pub use coerce::Scalar;
pub use constraint::Constraint;
pub use error::{PropError, Result, ValidationError, ValidationErrorKind};
pub use interval::Interval;
pub use path::{FieldPath, Segment};
pub use prop::{Leaf, Pattern, Prop, PropKind};
pub use prop_type::PropType;
pub use validator::MAX_DEPTH;
