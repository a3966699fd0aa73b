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

//! Function Registry
//!
//! Maps aggregate names to their implementations. Lookup is
//! case-insensitive.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::aggregate::{AvgFunction, CountFunction, MaxFunction, MinFunction, SumFunction};
use super::AggregateFunction;

/// Global function registry instance
static GLOBAL_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

/// Get the global function registry
#[inline]
pub fn global_registry() -> &'static FunctionRegistry {
    GLOBAL_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Registry of aggregate functions
pub struct FunctionRegistry {
    aggregate_functions: RwLock<FxHashMap<String, Arc<dyn AggregateFunction>>>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Create a registry with all built-in aggregates
    pub fn new() -> Self {
        let registry = Self {
            aggregate_functions: RwLock::new(FxHashMap::default()),
        };

        registry.register_aggregate(Arc::new(SumFunction));
        registry.register_aggregate(Arc::new(CountFunction));
        registry.register_aggregate(Arc::new(MinFunction));
        registry.register_aggregate(Arc::new(MaxFunction));
        registry.register_aggregate(Arc::new(AvgFunction));

        registry
    }

    /// Register an aggregate, replacing any function of the same name
    pub fn register_aggregate(&self, function: Arc<dyn AggregateFunction>) {
        let name = function.name().to_ascii_uppercase();
        self.aggregate_functions.write().insert(name, function);
    }

    /// Look up an aggregate by name
    pub fn get_aggregate(&self, name: &str) -> Option<Arc<dyn AggregateFunction>> {
        self.aggregate_functions
            .read()
            .get(&name.to_ascii_uppercase())
            .cloned()
    }

    /// Returns true if `name` is a registered aggregate
    pub fn is_aggregate(&self, name: &str) -> bool {
        self.aggregate_functions
            .read()
            .contains_key(&name.to_ascii_uppercase())
    }

    /// Registered aggregate names, sorted
    pub fn aggregate_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.aggregate_functions.read().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_aggregates() {
        let registry = global_registry();
        assert_eq!(
            registry.aggregate_names(),
            vec!["AVG", "COUNT", "MAX", "MIN", "SUM"]
        );
        assert!(registry.is_aggregate("sum"));
        assert_eq!(registry.get_aggregate("Sum").unwrap().name(), "SUM");
        assert!(registry.get_aggregate("MEDIAN").is_none());
    }
}
