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

//! Core type definitions: DataType and the implicit widening rules

use std::fmt;
use std::str::FromStr;

use super::error::Error;

/// Column and expression data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataType {
    /// 64-bit signed integer
    Integer = 1,

    /// 64-bit floating point number
    Double = 2,

    /// Boolean true/false
    Boolean = 3,

    /// UTF-8 text string
    Text = 4,
}

impl DataType {
    /// Returns true if this type is numeric (INTEGER or DOUBLE)
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Double)
    }

    /// Returns the common type two operands are widened to, if any.
    ///
    /// This is the only place implicit conversions are defined. Identical
    /// types unify to themselves and INTEGER widens to DOUBLE.
    pub fn common_type(left: DataType, right: DataType) -> Option<DataType> {
        match (left, right) {
            (l, r) if l == r => Some(l),
            (DataType::Integer, DataType::Double) | (DataType::Double, DataType::Integer) => {
                Some(DataType::Double)
            }
            _ => None,
        }
    }

    /// Returns true if a value of `self` may be implicitly widened to `target`
    pub fn widens_to(&self, target: DataType) -> bool {
        *self == target || (*self == DataType::Integer && target == DataType::Double)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "INTEGER"),
            DataType::Double => write!(f, "DOUBLE"),
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::Text => write!(f, "TEXT"),
        }
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INTEGER" | "INT" | "BIGINT" => Ok(DataType::Integer),
            "DOUBLE" | "FLOAT" | "REAL" => Ok(DataType::Double),
            "BOOLEAN" | "BOOL" => Ok(DataType::Boolean),
            "TEXT" | "VARCHAR" | "STRING" => Ok(DataType::Text),
            other => Err(Error::InvalidArgument(format!("unknown data type '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_type() {
        use DataType::*;
        assert_eq!(DataType::common_type(Integer, Integer), Some(Integer));
        assert_eq!(DataType::common_type(Integer, Double), Some(Double));
        assert_eq!(DataType::common_type(Double, Integer), Some(Double));
        assert_eq!(DataType::common_type(Text, Text), Some(Text));
        assert_eq!(DataType::common_type(Text, Double), None);
        assert_eq!(DataType::common_type(Boolean, Integer), None);
    }

    #[test]
    fn test_widening() {
        assert!(DataType::Integer.widens_to(DataType::Double));
        assert!(!DataType::Double.widens_to(DataType::Integer));
        assert!(DataType::Text.widens_to(DataType::Text));
    }

    #[test]
    fn test_parse_data_type() {
        assert_eq!("int".parse::<DataType>().unwrap(), DataType::Integer);
        assert_eq!("DOUBLE".parse::<DataType>().unwrap(), DataType::Double);
        assert_eq!("varchar".parse::<DataType>().unwrap(), DataType::Text);
        assert!("blob".parse::<DataType>().is_err());
    }
}
