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

//! Materialized query results

use crate::core::{Field, Row, Value};

/// Rows returned by a query, together with the output columns
#[derive(Debug, Clone, PartialEq)]
pub struct Rows {
    fields: Vec<Field>,
    rows: Vec<Row>,
}

impl Rows {
    pub(crate) fn new(fields: Vec<Field>, rows: Vec<Row>) -> Self {
        Self { fields, rows }
    }

    /// Output column names, in order
    pub fn columns(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Output fields
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Index of the first output column called `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at `idx`
    pub fn get(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    /// Value of column `name` in row `idx`
    pub fn value(&self, idx: usize, name: &str) -> Option<&Value> {
        let column = self.column_index(name)?;
        self.rows.get(idx)?.get(column)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Consume into the bare rows
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

impl IntoIterator for Rows {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a Rows {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DataType;
    use crate::row;

    #[test]
    fn test_accessors() {
        let rows = Rows::new(
            vec![
                Field::new("k", DataType::Text),
                Field::new("total", DataType::Double),
            ],
            vec![row!["a", 1.5], row!["b", 2.5]],
        );
        assert_eq!(rows.columns(), vec!["k", "total"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.value(1, "total"), Some(&Value::double(2.5)));
        assert_eq!(rows.value(0, "missing"), None);
        assert_eq!(rows.value(5, "k"), None);
        let keys: Vec<String> = rows.iter().map(|r| r[0].to_string()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(rows.into_rows().len(), 2);
    }
}
