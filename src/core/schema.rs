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

//! Schema definitions: named, typed fields

use std::fmt;

use rustc_hash::FxHashMap;

use super::error::{Error, Result};
use super::types::DataType;

/// A named, typed field. Identity within a schema is by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Field data type
    pub data_type: DataType,
}

impl Field {
    /// Create a new field
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)
    }
}

/// An ordered sequence of fields with unique names
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
    by_name: FxHashMap<String, usize>,
}

impl Schema {
    /// Create a schema, rejecting duplicate field names
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        let mut by_name = FxHashMap::default();
        for (i, field) in fields.iter().enumerate() {
            if by_name.insert(field.name.clone(), i).is_some() {
                return Err(Error::DuplicateColumn(field.name.clone()));
            }
        }
        Ok(Self { fields, by_name })
    }

    /// Create an empty schema
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a schema
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// All fields in order
    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of fields
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the schema has no fields
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get a field by position
    #[inline]
    pub fn field(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    /// Position of a field by name
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Look up a field by name
    pub fn lookup(&self, name: &str) -> Option<(usize, &Field)> {
        self.index_of(name).map(|idx| (idx, &self.fields[idx]))
    }

    /// Field names in order
    pub fn names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Returns the sub-schema for the named fields, in the requested order
    pub fn project(&self, names: &[String]) -> Result<Schema> {
        let fields = names
            .iter()
            .map(|name| {
                self.lookup(name)
                    .map(|(_, f)| f.clone())
                    .ok_or_else(|| Error::UnresolvedColumn(name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        Schema::new(fields)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for Schema {}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", field)?;
        }
        write!(f, ")")
    }
}

/// Builder for [`Schema`]
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: Vec<Field>,
}

impl SchemaBuilder {
    /// Add a field
    pub fn field(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.fields.push(Field::new(name, data_type));
        self
    }

    /// Build the schema
    pub fn build(self) -> Result<Schema> {
        Schema::new(self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lookup() {
        let schema = Schema::builder()
            .field("foo", DataType::Double)
            .field("bar", DataType::Integer)
            .build()
            .unwrap();

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.index_of("bar"), Some(1));
        assert_eq!(schema.lookup("foo").unwrap().1.data_type, DataType::Double);
        assert!(schema.lookup("baz").is_none());
        assert_eq!(schema.to_string(), "(foo DOUBLE, bar INTEGER)");
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = Schema::builder()
            .field("foo", DataType::Double)
            .field("foo", DataType::Integer)
            .build()
            .unwrap_err();
        assert_eq!(err, Error::DuplicateColumn("foo".to_string()));
    }

    #[test]
    fn test_project() {
        let schema = Schema::builder()
            .field("a", DataType::Double)
            .field("b", DataType::Integer)
            .field("c", DataType::Text)
            .build()
            .unwrap();

        let projected = schema.project(&["c".to_string(), "a".to_string()]).unwrap();
        assert_eq!(projected.names(), vec!["c", "a"]);
        assert_eq!(projected.field(0).unwrap().data_type, DataType::Text);

        let err = schema.project(&["z".to_string()]).unwrap_err();
        assert_eq!(err, Error::UnresolvedColumn("z".to_string()));
    }
}
