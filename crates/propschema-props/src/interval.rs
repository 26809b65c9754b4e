use crate::error::{PropError, Result};

/// Closed numeric range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    min: f64,
    max: f64,
}

impl Interval {
    /// Create an interval. Fails when `min > max` or either bound is NaN.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(PropError::InvalidInterval { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Returns true if `value` lies within the bounds, inclusive.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn valid_bounds_round_trip() {
        let interval = Interval::new(80.0, 18080.0).unwrap();
        assert_eq!(interval.min(), 80.0);
        assert_eq!(interval.max(), 18080.0);

        let point = Interval::new(3.5, 3.5).unwrap();
        assert!(point.contains(3.5));
    }

    #[test]
    fn inverted_bounds_fail() {
        assert!(matches!(
            Interval::new(2.0, 1.0),
            Err(PropError::InvalidInterval { .. })
        ));
        assert!(Interval::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn bounds_are_inclusive() {
        let interval = Interval::new(1.5, 6.8).unwrap();
        assert!(interval.contains(1.5));
        assert!(interval.contains(6.8));
        assert!(!interval.contains(1.5 - f64::EPSILON * 4.0));
        assert!(!interval.contains(6.8 + 1e-9));
    }

    proptest! {
        #[test]
        fn ordered_bounds_build_and_contain_themselves(a in -1e12f64..1e12, b in -1e12f64..1e12) {
            let (min, max) = if a <= b { (a, b) } else { (b, a) };
            let interval = Interval::new(min, max).unwrap();
            prop_assert_eq!(interval.min(), min);
            prop_assert_eq!(interval.max(), max);
            prop_assert!(interval.contains(min) && interval.contains(max));
            if min < max {
                prop_assert!(Interval::new(max, min).is_err());
            }
        }
    }
}
