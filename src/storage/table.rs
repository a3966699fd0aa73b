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

//! Table trait and the in-memory implementation

use std::sync::Arc;

use crate::core::{Error, Field, Result, Row, Schema};
use crate::executor::operator::{Operator, OperatorState};

/// A scannable source of fixed-width rows
pub trait Table: Send + Sync {
    /// Returns the name of the table
    fn name(&self) -> &str;

    /// Returns the schema of the table
    fn schema(&self) -> &Schema;

    /// Number of rows, if known
    fn row_count(&self) -> Option<usize> {
        None
    }

    /// Creates a scan over the table.
    ///
    /// With a projection the scan only materializes the named columns, in
    /// the given order. Unknown names fail with `UnresolvedColumn`.
    fn scan(&self, projection: Option<&[String]>) -> Result<Box<dyn Operator>>;
}

/// Immutable in-memory table
///
/// Rows are shared through `Arc`, so scans never copy the table.
#[derive(Debug, Clone)]
pub struct MemoryTable {
    name: String,
    schema: Schema,
    rows: Arc<Vec<Row>>,
}

impl MemoryTable {
    /// Create a table, validating every row against the schema
    pub fn new(name: impl Into<String>, schema: Schema, rows: Vec<Row>) -> Result<Self> {
        let name = name.into();
        for (i, row) in rows.iter().enumerate() {
            row.validate(&schema).map_err(|e| match e {
                Error::TypeMismatch(msg) => {
                    Error::TypeMismatch(format!("table '{}' row {}: {}", name, i, msg))
                }
                Error::InvalidArgument(msg) => {
                    Error::InvalidArgument(format!("table '{}' row {}: {}", name, i, msg))
                }
                other => other,
            })?;
        }
        Ok(Self {
            name,
            schema,
            rows: Arc::new(rows),
        })
    }

    /// Create an empty table
    pub fn empty(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: Arc::new(Vec::new()),
        }
    }

    /// All rows
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

impl Table for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn row_count(&self) -> Option<usize> {
        Some(self.rows.len())
    }

    fn scan(&self, projection: Option<&[String]>) -> Result<Box<dyn Operator>> {
        let scan = match projection {
            Some(names) => {
                let indices = names
                    .iter()
                    .map(|name| {
                        self.schema
                            .index_of(name)
                            .ok_or_else(|| Error::UnresolvedColumn(name.clone()))
                    })
                    .collect::<Result<Vec<_>>>()?;
                let fields = self.schema.project(names)?.fields().to_vec();
                ScanOperator::new(Arc::clone(&self.rows), fields, Some(indices))
            }
            None => ScanOperator::new(Arc::clone(&self.rows), self.schema.fields().to_vec(), None),
        };
        Ok(Box::new(scan))
    }
}

/// Streams rows of a [`MemoryTable`] by index
pub struct ScanOperator {
    rows: Arc<Vec<Row>>,
    schema: Vec<Field>,
    /// Source column per output column; None reads whole rows
    projection: Option<Vec<usize>>,
    position: usize,
    state: OperatorState,
}

impl ScanOperator {
    /// Create a scan over shared rows
    pub fn new(rows: Arc<Vec<Row>>, schema: Vec<Field>, projection: Option<Vec<usize>>) -> Self {
        Self {
            rows,
            schema,
            projection,
            position: 0,
            state: OperatorState::Created,
        }
    }
}

impl Operator for ScanOperator {
    fn open(&mut self) -> Result<()> {
        self.state.open("Scan")?;
        self.position = 0;
        tracing::trace!(rows = self.rows.len(), columns = self.schema.len(), "scan opened");
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>> {
        self.state.check_next("Scan")?;
        let Some(source) = self.rows.get(self.position) else {
            return Ok(None);
        };
        self.position += 1;

        let row = match &self.projection {
            Some(indices) => indices
                .iter()
                .map(|&i| source.get(i).cloned().unwrap_or_default())
                .collect(),
            None => source.clone(),
        };
        Ok(Some(row))
    }

    fn close(&mut self) -> Result<()> {
        self.state.close();
        Ok(())
    }

    fn schema(&self) -> &[Field] {
        &self.schema
    }

    fn name(&self) -> &str {
        "Scan"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataType, Value};
    use crate::executor::operator::collect;
    use crate::row;

    fn table() -> MemoryTable {
        let schema = Schema::builder()
            .field("foo", DataType::Double)
            .field("bar", DataType::Integer)
            .field("baz", DataType::Text)
            .build()
            .unwrap();
        MemoryTable::new(
            "t",
            schema,
            vec![row![1.0, 10i64, "a"], row![2.0, None::<i64>, "b"]],
        )
        .unwrap()
    }

    #[test]
    fn test_full_scan() {
        let t = table();
        let mut scan = t.scan(None).unwrap();
        assert_eq!(scan.schema().len(), 3);
        let rows = collect(&mut scan).unwrap();
        assert_eq!(rows, vec![row![1.0, 10i64, "a"], row![2.0, None::<i64>, "b"]]);
    }

    #[test]
    fn test_projected_scan_reorders_columns() {
        let t = table();
        let projection = vec!["baz".to_string(), "foo".to_string()];
        let mut scan = t.scan(Some(&projection)).unwrap();
        assert_eq!(scan.schema()[0].name, "baz");
        assert_eq!(scan.schema()[1].data_type, DataType::Double);
        let rows = collect(&mut scan).unwrap();
        assert_eq!(rows[1].as_slice(), &[Value::text("b"), Value::double(2.0)]);
    }

    #[test]
    fn test_projection_unknown_column() {
        let projection = vec!["nope".to_string()];
        assert_eq!(
            table().scan(Some(&projection)).err(),
            Some(Error::UnresolvedColumn("nope".to_string()))
        );
    }

    #[test]
    fn test_rows_validated() {
        let schema = Schema::builder()
            .field("foo", DataType::Double)
            .build()
            .unwrap();
        let err = MemoryTable::new("t", schema, vec![row![1.0], row!["x"]]).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(msg) if msg.contains("row 1")));
    }

    #[test]
    fn test_scan_state_discipline() {
        let mut scan = table().scan(None).unwrap();
        assert!(matches!(scan.next(), Err(Error::InvalidOperatorState(_))));
        scan.open().unwrap();
        scan.close().unwrap();
        scan.open().unwrap();
        assert!(scan.next().unwrap().is_some());
    }
}
