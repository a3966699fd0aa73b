// Copyright 2025 Queryengine Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Runtime values
//!
//! A [`Value`] is what every evaluator produces and what rows are made of.
//! NULL is a value, not an error.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::types::DataType;

/// A runtime value
///
/// Text uses `Arc<str>` so rows can be cloned cheaply during scans.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// SQL NULL
    #[default]
    Null,

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit floating point
    Double(f64),

    /// Boolean value
    Boolean(bool),

    /// UTF-8 text (Arc for cheap cloning)
    Text(Arc<str>),
}

impl Value {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create an integer value
    pub fn integer(value: i64) -> Self {
        Value::Integer(value)
    }

    /// Create a double value
    pub fn double(value: f64) -> Self {
        Value::Double(value)
    }

    /// Create a boolean value
    pub fn boolean(value: bool) -> Self {
        Value::Boolean(value)
    }

    /// Create a text value
    pub fn text(value: impl AsRef<str>) -> Self {
        Value::Text(Arc::from(value.as_ref()))
    }

    // =========================================================================
    // Type accessors
    // =========================================================================

    /// Returns the data type of this value, or None for NULL
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Integer(_) => Some(DataType::Integer),
            Value::Double(_) => Some(DataType::Double),
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Text(_) => Some(DataType::Text),
        }
    }

    /// Returns true if this value is NULL
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this value can be stored in a column of `data_type`
    pub fn conforms_to(&self, data_type: DataType) -> bool {
        self.data_type().map_or(true, |dt| dt == data_type)
    }

    // =========================================================================
    // Value extractors
    // =========================================================================

    /// Extract as i64 (INTEGER only)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract as f64, widening INTEGER
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Extract as bool (BOOLEAN only)
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract as &str (TEXT only)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    /// Compares two values of the same type.
    ///
    /// Returns None when either side is NULL or the types differ.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total order used for sorting: NULL first, then by type, then by value.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
            _ => self
                .compare(other)
                .unwrap_or_else(|| self.type_rank().cmp(&other.type_rank())),
        }
    }

    fn type_rank(&self) -> u8 {
        self.data_type().map_or(0, |dt| dt as u8)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

// Doubles hash by normalized bit pattern so that equal values hash equally
// (0.0 == -0.0, all NaNs equal).
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Integer(v) => v.hash(state),
            Value::Double(v) => {
                let bits = if *v == 0.0 {
                    0u64
                } else if v.is_nan() {
                    f64::NAN.to_bits()
                } else {
                    v.to_bits()
                };
                bits.hash(state)
            }
            Value::Boolean(b) => b.hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Double(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    write!(f, "{:.1}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            Value::Boolean(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::text(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(Arc::from(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_data_type() {
        assert_eq!(Value::integer(1).data_type(), Some(DataType::Integer));
        assert_eq!(Value::double(1.0).data_type(), Some(DataType::Double));
        assert_eq!(Value::text("a").data_type(), Some(DataType::Text));
        assert_eq!(Value::Null.data_type(), None);
        assert!(Value::Null.conforms_to(DataType::Text));
        assert!(!Value::integer(1).conforms_to(DataType::Double));
    }

    #[test]
    fn test_compare() {
        assert_eq!(
            Value::integer(1).compare(&Value::integer(2)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::text("b").compare(&Value::text("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(Value::integer(1).compare(&Value::Null), None);
        assert_eq!(Value::integer(1).compare(&Value::double(1.0)), None);
    }

    #[test]
    fn test_sort_cmp_nulls_first() {
        let mut values = vec![Value::double(2.0), Value::Null, Value::double(-1.0)];
        values.sort_by(|a, b| a.sort_cmp(b));
        assert_eq!(values, vec![Value::Null, Value::double(-1.0), Value::double(2.0)]);
    }

    #[test]
    fn test_hash_consistent_with_eq() {
        let mut set = FxHashSet::default();
        set.insert(Value::double(0.0));
        assert!(set.contains(&Value::double(-0.0)));
        set.insert(Value::double(f64::NAN));
        assert!(set.contains(&Value::double(f64::NAN)));
        set.insert(Value::Null);
        assert!(set.contains(&Value::Null));
        assert!(!set.contains(&Value::integer(0)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::double(3.0).to_string(), "3.0");
        assert_eq!(Value::double(2.5).to_string(), "2.5");
        assert_eq!(Value::integer(-4).to_string(), "-4");
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::boolean(true).to_string(), "true");
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(Some(1.5)), Value::double(1.5));
        assert_eq!(Value::from(None::<f64>), Value::Null);
    }
}
