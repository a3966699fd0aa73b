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

//! Row type - a fixed-length collection of column values

use std::fmt;
use std::ops::Index;

use super::error::{Error, Result};
use super::schema::Schema;
use super::value::Value;

/// A row of values, one per field of the producing operator's schema.
///
/// Operators hand out a fresh `Row` on every `next()` call; the caller owns it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// Create a new empty row
    #[inline]
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Create a row with pre-allocated capacity
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Create a row from a vector of values
    #[inline]
    pub fn from_values(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Number of values in the row
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row has no values
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a value by index
    #[inline]
    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Append a value
    #[inline]
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Iterate over the values
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Borrow the values as a slice
    #[inline]
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    /// Consume the row, returning its values
    #[inline]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Check that the row matches the schema's width and field types
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        if self.len() != schema.len() {
            return Err(Error::InvalidArgument(format!(
                "row has {} values, schema has {} fields",
                self.len(),
                schema.len()
            )));
        }
        for (value, field) in self.values.iter().zip(schema.fields()) {
            if !value.conforms_to(field.data_type) {
                return Err(Error::TypeMismatch(format!(
                    "value {} is not a {} (field '{}')",
                    value, field.data_type, field.name
                )));
            }
        }
        Ok(())
    }
}

impl Index<usize> for Row {
    type Output = Value;

    #[inline]
    fn index(&self, idx: usize) -> &Value {
        &self.values[idx]
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self::from_values(values)
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_values(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "]")
    }
}

/// Build a [`Row`] from a list of expressions convertible into [`Value`].
///
/// ```
/// use queryengine::{row, Value};
///
/// let r = row![1.0, "a", None::<f64>];
/// assert_eq!(r.get(2), Some(&Value::Null));
/// ```
#[macro_export]
macro_rules! row {
    () => {
        $crate::Row::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Row::from_values(vec![$($crate::Value::from($value)),+])
    };
}
