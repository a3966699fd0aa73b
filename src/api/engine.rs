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

//! The engine facade: register tables, run SQL

use std::sync::Arc;

use super::config::EngineConfig;
use super::rows::Rows;
use crate::core::{Result, Row};
use crate::executor::{
    build_logical_plan_with, build_physical_plan_with, operator, ExecutionMode, LogicalPlan,
    Operator,
};
use crate::parser::parse_query;
use crate::storage::{Table, TableRegistry};

/// Embeddable query engine
///
/// Owns a [`TableRegistry`] and runs the parse → plan → execute pipeline.
/// The registry is shared, so clones of an engine see the same tables.
///
/// ```
/// use std::sync::Arc;
/// use queryengine::{row, DataType, Engine, ExecutionMode, MemoryTable, Schema, Value};
///
/// let schema = Schema::builder()
///     .field("foo", DataType::Double)
///     .field("bar", DataType::Double)
///     .build()
///     .unwrap();
/// let table = MemoryTable::new("t", schema, vec![row![1.0, 2.0], row![2.0, 4.0]]).unwrap();
///
/// let engine = Engine::new();
/// engine.register_table(Arc::new(table));
///
/// let rows = engine
///     .query_with_mode("SELECT SUM(foo + 10 * bar) FROM t", ExecutionMode::BytecodeCompiler)
///     .unwrap();
/// assert_eq!(rows.get(0).unwrap()[0], Value::double(63.0));
/// ```
#[derive(Clone, Default)]
pub struct Engine {
    tables: Arc<TableRegistry>,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the given configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            tables: Arc::new(TableRegistry::new()),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The table registry
    pub fn tables(&self) -> &Arc<TableRegistry> {
        &self.tables
    }

    /// Register a table under its own name, returning the table it replaced
    pub fn register_table(&self, table: Arc<dyn Table>) -> Option<Arc<dyn Table>> {
        let name = table.name().to_string();
        self.tables.register(name, table)
    }

    /// Remove a table
    pub fn deregister_table(&self, name: &str) -> Option<Arc<dyn Table>> {
        self.tables.deregister(name)
    }

    /// Parse and plan a query
    pub fn plan(&self, sql: &str) -> Result<LogicalPlan> {
        let query = parse_query(sql)?;
        build_logical_plan_with(&self.tables, &query, &self.config.planner_options())
    }

    /// Build the operator tree for a query without running it
    pub fn prepare(&self, sql: &str, mode: ExecutionMode) -> Result<Box<dyn Operator>> {
        let plan = self.plan(sql)?;
        build_physical_plan_with(&self.tables, &plan, mode, &self.config.planner_options())
    }

    /// Run a query with the configured mode
    pub fn query(&self, sql: &str) -> Result<Rows> {
        self.query_with_mode(sql, self.config.mode)
    }

    /// Run a query with an explicit mode
    pub fn query_with_mode(&self, sql: &str, mode: ExecutionMode) -> Result<Rows> {
        let mut root = self.prepare(sql, mode)?;
        let fields = root.schema().to_vec();
        let rows = Self::collect(root.as_mut())?;
        tracing::debug!(%mode, rows = rows.len(), "query finished");
        Ok(Rows::new(fields, rows))
    }

    /// Logical plan of a query, rendered as text
    pub fn explain(&self, sql: &str) -> Result<String> {
        Ok(self.plan(sql)?.to_string())
    }

    /// Open, drain and close an operator
    pub fn collect(op: &mut dyn Operator) -> Result<Vec<Row>> {
        operator::collect(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataType, Error, Schema, Value};
    use crate::row;
    use crate::storage::MemoryTable;

    fn engine(config: EngineConfig) -> Engine {
        let schema = Schema::builder()
            .field("foo", DataType::Double)
            .field("bar", DataType::Double)
            .build()
            .unwrap();
        let table = MemoryTable::new("t", schema, vec![row![1.0, 2.0], row![2.0, 4.0]]).unwrap();
        let engine = Engine::with_config(config);
        engine.register_table(Arc::new(table));
        engine
    }

    #[test]
    fn test_query_uses_configured_mode() {
        for mode in ExecutionMode::ALL {
            let engine = engine(EngineConfig::default().with_mode(mode));
            let rows = engine.query("SELECT SUM(foo) FROM t").unwrap();
            assert_eq!(rows.get(0).unwrap()[0], Value::double(3.0));
        }
    }

    #[test]
    fn test_explain() {
        let engine = engine(EngineConfig::default());
        let text = engine.explain("SELECT SUM(foo) AS s FROM t").unwrap();
        assert_eq!(
            text,
            "-> Project: SUM(foo) AS s\n  -> Aggregate: SUM(foo)\n    -> Scan: t [foo DOUBLE]"
        );
    }

    #[test]
    fn test_deregister() {
        let engine = engine(EngineConfig::default());
        assert!(engine.deregister_table("t").is_some());
        assert_eq!(
            engine.query("SELECT foo FROM t").unwrap_err(),
            Error::UnknownTable("t".to_string())
        );
    }

    #[test]
    fn test_clones_share_tables() {
        let engine = engine(EngineConfig::default());
        let other = engine.clone();
        other.deregister_table("t");
        assert!(!engine.tables().contains("t"));
    }
}
