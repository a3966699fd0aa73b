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

//! Table registry

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::table::Table;
use crate::core::{Error, Result};

/// Name to table mapping.
///
/// Shareable across threads; planning takes a read lock only for the
/// duration of a lookup.
#[derive(Default)]
pub struct TableRegistry {
    tables: RwLock<FxHashMap<String, Arc<dyn Table>>>,
}

impl TableRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table under `name`, returning the table it replaced
    pub fn register(
        &self,
        name: impl Into<String>,
        table: Arc<dyn Table>,
    ) -> Option<Arc<dyn Table>> {
        let name = name.into();
        tracing::debug!(table = %name, columns = table.schema().len(), "registering table");
        self.tables.write().insert(name, table)
    }

    /// Remove a table
    pub fn deregister(&self, name: &str) -> Option<Arc<dyn Table>> {
        self.tables.write().remove(name)
    }

    /// Look up a table by name
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Table>> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    /// Returns true if a table is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    /// Registered table names, sorted
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataType, Schema};
    use crate::storage::MemoryTable;

    fn table(name: &str) -> Arc<dyn Table> {
        let schema = Schema::builder()
            .field("foo", DataType::Double)
            .build()
            .unwrap();
        Arc::new(MemoryTable::empty(name, schema))
    }

    #[test]
    fn test_register_lookup_deregister() {
        let registry = TableRegistry::new();
        assert!(registry.register("a", table("a")).is_none());
        assert!(registry.register("b", table("b")).is_none());
        assert_eq!(registry.table_names(), vec!["a", "b"]);

        assert_eq!(registry.lookup("a").unwrap().name(), "a");
        assert!(registry.deregister("a").is_some());
        assert_eq!(
            registry.lookup("a").err(),
            Some(Error::UnknownTable("a".to_string()))
        );
        assert!(registry.deregister("a").is_none());
    }

    #[test]
    fn test_register_replaces() {
        let registry = TableRegistry::new();
        registry.register("t", table("first"));
        let old = registry.register("t", table("second")).unwrap();
        assert_eq!(old.name(), "first");
        assert_eq!(registry.lookup("t").unwrap().name(), "second");
    }
}
