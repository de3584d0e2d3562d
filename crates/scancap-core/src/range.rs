//! Range decoding, expansion and membership.
//!
//! A range-shaped capability result arrives as a flat five-item list
//! `[min, max, step, default, current]`. [`ValueRange::decode`] turns that
//! list into a typed [`RangeDescriptor`], which can be expanded into the
//! explicit ascending sequence `min, min+step, ... <= max` or asked whether
//! a value is reachable on that grid.
//!
//! Integer ranges use exact arithmetic. Float ranges (Fix32 capabilities)
//! compute each element as `min + k*step` and admit it while
//! `v <= max + RANGE_EPSILON`, so binary rounding never drops the last
//! element.

use thiserror::Error;

use crate::capability::DataType;
use crate::value::Value;

/// Tolerance for float range boundaries and step residuals.
pub const RANGE_EPSILON: f64 = 1e-8;

/// Number of items in the flat range encoding.
pub const RANGE_TUPLE_LEN: usize = 5;

/// Errors from decoding or validating a range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeError {
    /// The flat encoding does not have exactly five items.
    #[error("range encoding has {len} items, expected 5")]
    WrongLength { len: usize },

    /// `min` is greater than `max` (or either is NaN).
    #[error("range minimum is greater than its maximum")]
    MinGreaterThanMax,

    /// `step` is zero or negative for a range with more than one point.
    #[error("range step must be positive")]
    NonPositiveStep,

    /// A float bound or step is infinite.
    #[error("range bounds and step must not be infinite")]
    NonFinite,

    /// An item of the flat encoding has the wrong value type.
    #[error("range item {index} has an unexpected value type")]
    WrongValueType { index: usize },

    /// The capability's data type has no numeric range domain.
    #[error("data type {0:?} cannot be expressed as a range")]
    UnsupportedDataType(DataType),
}

/// Numeric domain of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeDomain {
    Integer,
    Float,
}

impl RangeDomain {
    /// Domain for a capability data type, if it has one.
    pub fn for_data_type(data_type: DataType) -> Result<Self, RangeError> {
        if data_type.is_integer() {
            Ok(Self::Integer)
        } else if data_type == DataType::Fix32 {
            Ok(Self::Float)
        } else {
            Err(RangeError::UnsupportedDataType(data_type))
        }
    }

    /// Infers the domain from the items themselves: any `Float` item makes
    /// it a float range. Used when no data type is known.
    pub fn infer(values: &[Value]) -> Self {
        if values.iter().any(|v| matches!(v, Value::Float(_))) {
            Self::Float
        } else {
            Self::Integer
        }
    }
}

/// A validated numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeDescriptor<T> {
    min: T,
    max: T,
    step: T,
    default: T,
    current: T,
}

impl<T: Copy> RangeDescriptor<T> {
    pub fn min(&self) -> T {
        self.min
    }

    pub fn max(&self) -> T {
        self.max
    }

    pub fn step(&self) -> T {
        self.step
    }

    pub fn default_value(&self) -> T {
        self.default
    }

    pub fn current(&self) -> T {
        self.current
    }
}

impl RangeDescriptor<i64> {
    /// Creates an integer range. `step` is ignored for a single-point range.
    pub fn new(
        min: i64,
        max: i64,
        step: i64,
        default: i64,
        current: i64,
    ) -> Result<Self, RangeError> {
        if min > max {
            return Err(RangeError::MinGreaterThanMax);
        }
        if min < max && step <= 0 {
            return Err(RangeError::NonPositiveStep);
        }
        Ok(Self {
            min,
            max,
            step,
            default,
            current,
        })
    }

    /// Expands the range into its ascending sequence of grid points.
    pub fn expand(&self) -> Vec<i64> {
        if self.min == self.max {
            return vec![self.min];
        }
        let mut out = Vec::new();
        let mut v = self.min;
        loop {
            out.push(v);
            match v.checked_add(self.step) {
                Some(next) if next <= self.max => v = next,
                _ => break,
            }
        }
        out
    }

    /// Returns true if `value` is `min + k*step` for some `k >= 0` within `max`.
    pub fn contains(&self, value: i64) -> bool {
        if value < self.min || value > self.max {
            return false;
        }
        if self.min == self.max {
            return true;
        }
        (i128::from(value) - i128::from(self.min)) % i128::from(self.step) == 0
    }
}

impl RangeDescriptor<f64> {
    /// Creates a float range. `step` is ignored for a single-point range
    /// but must still be finite.
    pub fn new(
        min: f64,
        max: f64,
        step: f64,
        default: f64,
        current: f64,
    ) -> Result<Self, RangeError> {
        if min.is_infinite() || max.is_infinite() || step.is_infinite() {
            return Err(RangeError::NonFinite);
        }
        if min.is_nan() || max.is_nan() || min > max {
            return Err(RangeError::MinGreaterThanMax);
        }
        if min < max && (step.is_nan() || step <= 0.0) {
            return Err(RangeError::NonPositiveStep);
        }
        Ok(Self {
            min,
            max,
            step,
            default,
            current,
        })
    }

    /// Expands the range into its ascending sequence of grid points.
    ///
    /// Each element is computed as `min + k*step` rather than by repeated
    /// addition, and admitted while it is within `RANGE_EPSILON` of `max`.
    pub fn expand(&self) -> Vec<f64> {
        if self.min == self.max {
            return vec![self.min];
        }
        let limit = self.max + RANGE_EPSILON;
        let mut out = Vec::new();
        let mut k: u64 = 0;
        loop {
            let v = self.min + (k as f64) * self.step;
            if v > limit {
                break;
            }
            out.push(v);
            k += 1;
        }
        out
    }

    /// Returns true if `value` lies on the step grid within `RANGE_EPSILON`.
    pub fn contains(&self, value: f64) -> bool {
        if value < self.min - RANGE_EPSILON || value > self.max + RANGE_EPSILON {
            return false;
        }
        if self.min == self.max {
            return (value - self.min).abs() <= RANGE_EPSILON;
        }
        let residual = (value - self.min).rem_euclid(self.step);
        residual <= RANGE_EPSILON || self.step - residual <= RANGE_EPSILON
    }
}

/// A decoded range in either numeric domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRange {
    Integer(RangeDescriptor<i64>),
    Float(RangeDescriptor<f64>),
}

impl ValueRange {
    /// Decodes the flat `[min, max, step, default, current]` encoding.
    pub fn decode(values: &[Value], domain: RangeDomain) -> Result<Self, RangeError> {
        if values.len() != RANGE_TUPLE_LEN {
            return Err(RangeError::WrongLength { len: values.len() });
        }
        match domain {
            RangeDomain::Integer => {
                let mut items = [0i64; RANGE_TUPLE_LEN];
                for (index, (slot, value)) in items.iter_mut().zip(values).enumerate() {
                    *slot = value
                        .as_i64()
                        .ok_or(RangeError::WrongValueType { index })?;
                }
                let [min, max, step, default, current] = items;
                RangeDescriptor::<i64>::new(min, max, step, default, current).map(Self::Integer)
            }
            RangeDomain::Float => {
                let mut items = [0f64; RANGE_TUPLE_LEN];
                for (index, (slot, value)) in items.iter_mut().zip(values).enumerate() {
                    *slot = value
                        .as_f64()
                        .ok_or(RangeError::WrongValueType { index })?;
                }
                let [min, max, step, default, current] = items;
                RangeDescriptor::<f64>::new(min, max, step, default, current).map(Self::Float)
            }
        }
    }

    /// Expands into value items of the matching variant.
    pub fn expand(&self) -> Vec<Value> {
        match self {
            Self::Integer(r) => r.expand().into_iter().map(Value::Integer).collect(),
            Self::Float(r) => r.expand().into_iter().map(Value::Float).collect(),
        }
    }

    /// Tests membership. Integer ranges only accept `Integer` values;
    /// float ranges accept `Float` and `Integer` values.
    pub fn contains(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Integer(r), Value::Integer(v)) => r.contains(*v),
            (Self::Float(r), v) => v.as_f64().is_some_and(|v| r.contains(v)),
            _ => false,
        }
    }

    /// The range's current value.
    pub fn current(&self) -> Value {
        match self {
            Self::Integer(r) => Value::Integer(r.current()),
            Self::Float(r) => Value::Float(r.current()),
        }
    }

    /// The range's default value.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Integer(r) => Value::Integer(r.default_value()),
            Self::Float(r) => Value::Float(r.default_value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(items: [i64; 5]) -> Vec<Value> {
        items.into_iter().map(Value::Integer).collect()
    }

    fn floats(items: [f64; 5]) -> Vec<Value> {
        items.into_iter().map(Value::Float).collect()
    }

    #[test]
    fn integer_expand() {
        let range = RangeDescriptor::<i64>::new(0, 10, 2, 0, 0).unwrap();
        assert_eq!(range.expand(), vec![0, 2, 4, 6, 8, 10]);

        // max not on the grid
        let range = RangeDescriptor::<i64>::new(1, 10, 4, 1, 1).unwrap();
        assert_eq!(range.expand(), vec![1, 5, 9]);
    }

    #[test]
    fn integer_expand_near_overflow() {
        let range = RangeDescriptor::<i64>::new(i64::MAX - 3, i64::MAX, 2, 0, 0).unwrap();
        assert_eq!(range.expand(), vec![i64::MAX - 3, i64::MAX - 1]);
    }

    #[test]
    fn float_expand_keeps_last_element() {
        let range = RangeDescriptor::<f64>::new(0.0, 1.0, 0.1, 0.5, 0.5).unwrap();
        let expanded = range.expand();
        assert_eq!(expanded.len(), 11);
        for (k, v) in expanded.iter().enumerate() {
            assert!((v - k as f64 * 0.1).abs() <= RANGE_EPSILON, "element {k} = {v}");
        }
        assert!((expanded[10] - 1.0).abs() <= RANGE_EPSILON);
    }

    #[test]
    fn float_expand_tolerates_drift_past_max() {
        // 0.3 is 0.30000000000000004 when computed as 3 * 0.1
        let range = RangeDescriptor::<f64>::new(0.0, 0.3, 0.1, 0.0, 0.0).unwrap();
        assert_eq!(range.expand().len(), 4);
    }

    #[test]
    fn single_point_ranges() {
        assert_eq!(RangeDescriptor::<i64>::new(5, 5, 0, 5, 5).unwrap().expand(), vec![5]);
        let r = RangeDescriptor::<f64>::new(2.5, 2.5, 0.0, 2.5, 2.5).unwrap();
        assert_eq!(r.expand(), vec![2.5]);
        assert!(r.contains(2.5));
        assert!(!r.contains(2.6));
    }

    #[test]
    fn integer_contains() {
        let range = RangeDescriptor::<i64>::new(0, 10, 2, 0, 0).unwrap();
        assert!(range.contains(0));
        assert!(range.contains(6));
        assert!(range.contains(10));
        assert!(!range.contains(5));
        assert!(!range.contains(12));
        assert!(!range.contains(-2));
    }

    #[test]
    fn float_contains() {
        let range = RangeDescriptor::<f64>::new(0.0, 1.0, 0.1, 0.0, 0.0).unwrap();
        assert!(range.contains(0.3));
        assert!(range.contains(0.7));
        assert!(range.contains(1.0));
        assert!(!range.contains(0.35));
        assert!(!range.contains(1.1));
    }

    #[test]
    fn invalid_ranges() {
        assert_eq!(
            RangeDescriptor::<i64>::new(10, 0, 1, 0, 0),
            Err(RangeError::MinGreaterThanMax)
        );
        assert_eq!(
            RangeDescriptor::<i64>::new(0, 10, 0, 0, 0),
            Err(RangeError::NonPositiveStep)
        );
        assert_eq!(
            RangeDescriptor::<f64>::new(0.0, 1.0, -0.1, 0.0, 0.0),
            Err(RangeError::NonPositiveStep)
        );
        assert_eq!(
            RangeDescriptor::<f64>::new(f64::NAN, 1.0, 0.1, 0.0, 0.0),
            Err(RangeError::MinGreaterThanMax)
        );
    }

    #[test]
    fn infinite_float_ranges_are_rejected() {
        assert_eq!(
            RangeDescriptor::<f64>::new(0.0, 1.0, f64::INFINITY, 0.0, 0.0),
            Err(RangeError::NonFinite)
        );
        assert_eq!(
            RangeDescriptor::<f64>::new(0.0, f64::INFINITY, 1.0, 0.0, 0.0),
            Err(RangeError::NonFinite)
        );
        assert_eq!(
            RangeDescriptor::<f64>::new(f64::NEG_INFINITY, 0.0, 1.0, 0.0, 0.0),
            Err(RangeError::NonFinite)
        );
        assert_eq!(
            ValueRange::decode(&floats([0.0, f64::INFINITY, 1.0, 0.0, 0.0]), RangeDomain::Float),
            Err(RangeError::NonFinite)
        );
    }

    #[test]
    fn decode_flat_encoding() {
        let range = ValueRange::decode(&ints([50, 600, 50, 300, 200]), RangeDomain::Integer).unwrap();
        assert_eq!(range.expand().len(), 12);
        assert_eq!(range.current(), Value::Integer(200));
        assert_eq!(range.default_value(), Value::Integer(300));
        assert!(range.contains(&Value::Integer(250)));
        assert!(!range.contains(&Value::Integer(275)));
        assert!(!range.contains(&Value::Float(250.0)));

        let range =
            ValueRange::decode(&floats([-1.0, 1.0, 0.5, 0.0, 0.0]), RangeDomain::Float).unwrap();
        assert_eq!(
            range.expand(),
            vec![
                Value::Float(-1.0),
                Value::Float(-0.5),
                Value::Float(0.0),
                Value::Float(0.5),
                Value::Float(1.0)
            ]
        );
        assert!(range.contains(&Value::Integer(1)));
    }

    #[test]
    fn decode_rejects_malformed_encodings() {
        assert_eq!(
            ValueRange::decode(&ints([0, 1, 1, 0, 0])[..4], RangeDomain::Integer),
            Err(RangeError::WrongLength { len: 4 })
        );
        let mut mixed = ints([0, 10, 1, 0, 0]);
        mixed[2] = Value::from("one");
        assert_eq!(
            ValueRange::decode(&mixed, RangeDomain::Integer),
            Err(RangeError::WrongValueType { index: 2 })
        );
        assert_eq!(
            ValueRange::decode(&floats([0.0, 1.0, 0.5, 0.0, 0.0]), RangeDomain::Integer),
            Err(RangeError::WrongValueType { index: 0 })
        );
        assert_eq!(
            ValueRange::decode(&ints([9, 1, 1, 0, 0]), RangeDomain::Integer),
            Err(RangeError::MinGreaterThanMax)
        );
    }

    #[test]
    fn domain_selection() {
        assert_eq!(RangeDomain::for_data_type(DataType::UInt16), Ok(RangeDomain::Integer));
        assert_eq!(RangeDomain::for_data_type(DataType::Fix32), Ok(RangeDomain::Float));
        assert_eq!(
            RangeDomain::for_data_type(DataType::Str255),
            Err(RangeError::UnsupportedDataType(DataType::Str255))
        );
        assert_eq!(RangeDomain::infer(&floats([0.0, 1.0, 0.5, 0.0, 0.0])), RangeDomain::Float);
        assert_eq!(RangeDomain::infer(&ints([0, 1, 1, 0, 0])), RangeDomain::Integer);
    }
}
