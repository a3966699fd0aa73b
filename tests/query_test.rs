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

//! End-to-end query tests
//!
//! Every query runs under all three execution modes and must return the
//! same rows.

use std::sync::Arc;

use queryengine::{row, DataType, Engine, ExecutionMode, MemoryTable, Row, Schema, Value};

fn engine_with(name: &str, schema: Schema, rows: Vec<Row>) -> Engine {
    let engine = Engine::new();
    let table = MemoryTable::new(name, schema, rows).expect("Failed to create table");
    engine.register_table(Arc::new(table));
    engine
}

/// Runs `sql` in every mode, asserting identical results
fn query_all(engine: &Engine, sql: &str) -> Vec<Row> {
    let mut results = ExecutionMode::ALL.iter().map(|&mode| {
        engine
            .query_with_mode(sql, mode)
            .unwrap_or_else(|e| panic!("{} failed under {}: {}", sql, mode, e))
            .into_rows()
    });
    let first = results.next().expect("at least one mode");
    for (other, mode) in results.zip(ExecutionMode::ALL.iter().skip(1)) {
        assert_eq!(first, other, "{} differs under {}", sql, mode);
    }
    first
}

fn sales() -> Engine {
    let schema = Schema::builder()
        .field("id", DataType::Integer)
        .field("product", DataType::Text)
        .field("category", DataType::Text)
        .field("amount", DataType::Double)
        .field("qty", DataType::Integer)
        .build()
        .unwrap();
    engine_with(
        "sales",
        schema,
        vec![
            row![1i64, "Laptop", "Electronics", 1200.0, 2i64],
            row![2i64, "Smartphone", "Electronics", 800.0, 5i64],
            row![3i64, "Chair", "Furniture", 150.0, 4i64],
            row![4i64, "Table", "Furniture", 450.0, None::<i64>],
            row![5i64, "Shirt", "Clothing", 35.0, 10i64],
            row![6i64, "Jeans", None::<&str>, None::<f64>, 3i64],
        ],
    )
}

#[test]
fn test_simple_sum_scenario() {
    let schema = Schema::builder()
        .field("foo", DataType::Double)
        .build()
        .unwrap();
    let engine = engine_with("table", schema, vec![row![0.0], row![1.0], row![2.0]]);
    assert_eq!(query_all(&engine, "SELECT SUM(foo) FROM table"), vec![row![3.0]]);
}

#[test]
fn test_sum_expression_scenario() {
    let schema = Schema::builder()
        .field("foo", DataType::Double)
        .field("bar", DataType::Double)
        .build()
        .unwrap();
    let engine = engine_with("table", schema, vec![row![1.0, 2.0], row![3.0, 4.0]]);
    assert_eq!(
        query_all(&engine, "SELECT foo + 10*bar FROM table"),
        vec![row![21.0], row![43.0]]
    );
    assert_eq!(
        query_all(&engine, "SELECT SUM(foo + 10*bar) FROM table"),
        vec![row![64.0]]
    );
}

#[test]
fn test_sum_exactness_and_empty_input() {
    let schema = Schema::builder()
        .field("v", DataType::Double)
        .field("n", DataType::Integer)
        .build()
        .unwrap();
    let engine = engine_with(
        "t",
        schema.clone(),
        vec![row![1.0, 1i64], row![2.0, 2i64], row![3.0, 3i64]],
    );
    assert_eq!(
        query_all(&engine, "SELECT SUM(v), SUM(n) FROM t"),
        vec![row![6.0, 6i64]]
    );

    let empty = engine_with("t", schema, vec![]);
    assert_eq!(
        query_all(&empty, "SELECT SUM(v), SUM(n), COUNT(*), AVG(v), MIN(n) FROM t"),
        vec![row![None::<f64>, None::<i64>, 0i64, None::<f64>, None::<i64>]]
    );
}

#[test]
fn test_group_by_multiple_columns() {
    let schema = Schema::builder()
        .field("foo", DataType::Text)
        .field("bar", DataType::Text)
        .field("num", DataType::Double)
        .build()
        .unwrap();
    let engine = engine_with(
        "table",
        schema,
        vec![
            row!["a", "A", 1.0],
            row!["a", "B", 2.0],
            row!["a", "B", 3.0],
            row!["b", "B", 4.0],
            row!["b", "B", None::<f64>],
            row!["c", None::<&str>, None::<f64>],
        ],
    );
    let rows = query_all(&engine, "SELECT bar, SUM(num), COUNT(num), foo FROM table");
    assert_eq!(
        rows,
        vec![
            row!["A", 1.0, 1i64, "a"],
            row!["B", 5.0, 2i64, "a"],
            row!["B", 4.0, 1i64, "b"],
            row![None::<&str>, None::<f64>, 0i64, "c"],
        ]
    );
}

#[test]
fn test_sum_of_only_nulls_is_null() {
    let schema = Schema::builder()
        .field("foo", DataType::Text)
        .field("num", DataType::Double)
        .field("n", DataType::Integer)
        .build()
        .unwrap();
    let engine = engine_with(
        "table",
        schema,
        vec![
            row!["c", None::<f64>, None::<i64>],
            row!["d", 0.0, 0i64],
        ],
    );
    assert_eq!(
        query_all(&engine, "SELECT foo, SUM(num), SUM(n) FROM table"),
        vec![
            row!["c", None::<f64>, None::<i64>],
            row!["d", 0.0, 0i64],
        ]
    );
    assert_eq!(
        query_all(&engine, "SELECT SUM(num) + 1 FROM table WHERE foo = 'c'"),
        vec![row![None::<f64>]]
    );
}

#[test]
fn test_count_star_and_where() {
    let engine = sales();
    assert_eq!(query_all(&engine, "SELECT COUNT(*) FROM sales"), vec![row![6i64]]);
    assert_eq!(
        query_all(&engine, "SELECT COUNT(*) FROM sales WHERE amount > 400"),
        vec![row![3i64]]
    );
    assert_eq!(
        query_all(&engine, "SELECT COUNT(category) FROM sales"),
        vec![row![5i64]]
    );
}

#[test]
fn test_filter_with_null_predicate_drops_row() {
    let engine = sales();
    // qty is NULL for Table, so the predicate is NULL and the row is dropped
    let rows = query_all(&engine, "SELECT product FROM sales WHERE qty < 5 OR qty > 5");
    assert_eq!(rows, vec![row!["Laptop"], row!["Chair"], row!["Shirt"], row!["Jeans"]]);
}

#[test]
fn test_grouped_aggregates_with_order_by() {
    let engine = sales();
    let rows = query_all(
        &engine,
        "SELECT category, SUM(amount) AS total, MAX(qty), AVG(amount) FROM sales ORDER BY 2",
    );
    assert_eq!(
        rows,
        vec![
            row![None::<&str>, None::<f64>, 3i64, None::<f64>],
            row!["Clothing", 35.0, 10i64, 35.0],
            row!["Furniture", 600.0, 4i64, 300.0],
            row!["Electronics", 2000.0, 5i64, 1000.0],
        ]
    );
}

#[test]
fn test_order_by_text_nulls_first() {
    let engine = sales();
    let rows = query_all(&engine, "SELECT category, id FROM sales ORDER BY 1");
    let ids: Vec<Value> = rows.iter().map(|r| r[1].clone()).collect();
    assert_eq!(
        ids,
        vec![
            Value::integer(6),
            Value::integer(5),
            Value::integer(1),
            Value::integer(2),
            Value::integer(3),
            Value::integer(4),
        ]
    );
}

#[test]
fn test_projection_arithmetic_and_if() {
    let engine = sales();
    let rows = query_all(
        &engine,
        "SELECT id, amount * qty, IF(qty >= 4, 'bulk', 'single') FROM sales WHERE id <= 4",
    );
    assert_eq!(
        rows,
        vec![
            row![1i64, 2400.0, "single"],
            row![2i64, 4000.0, "bulk"],
            row![3i64, 600.0, "bulk"],
            row![4i64, None::<f64>, None::<&str>],
        ]
    );
}

#[test]
fn test_expression_over_aggregates() {
    let engine = sales();
    let rows = query_all(
        &engine,
        "SELECT SUM(amount) / COUNT(amount), MAX(amount) - MIN(amount) FROM sales",
    );
    assert_eq!(rows, vec![row![527.0, 1165.0]]);
}

#[test]
fn test_result_columns() {
    let engine = sales();
    let rows = engine
        .query("SELECT category, SUM(amount) AS total, COUNT(*) FROM sales")
        .expect("Failed to query");
    assert_eq!(rows.columns(), vec!["category", "total", "COUNT(*)"]);
    assert_eq!(rows.fields()[1].data_type, DataType::Double);
    assert_eq!(rows.fields()[2].data_type, DataType::Integer);
    assert_eq!(rows.value(0, "total"), Some(&Value::double(2000.0)));
}

#[test]
fn test_integer_edge_cases() {
    let schema = Schema::builder()
        .field("a", DataType::Integer)
        .field("b", DataType::Integer)
        .build()
        .unwrap();
    let engine = engine_with(
        "t",
        schema,
        vec![row![7i64, 2i64], row![7i64, 0i64], row![i64::MAX, 1i64]],
    );
    assert_eq!(
        query_all(&engine, "SELECT a / b, a % b, a + b FROM t"),
        vec![
            row![3i64, 1i64, 9i64],
            row![None::<i64>, None::<i64>, 7i64],
            row![i64::MAX, 0i64, i64::MIN],
        ]
    );
}

#[test]
fn test_explain_shows_pruned_scan() {
    let engine = sales();
    let plan = engine
        .explain("SELECT category, SUM(amount) FROM sales WHERE qty > 2 ORDER BY 2")
        .expect("Failed to explain");
    assert_eq!(
        plan,
        "-> OrderBy: SUM(amount) ASC\n\
         \x20 -> Aggregate: SUM(amount) GROUP BY category\n\
         \x20   -> Filter: (qty > 2)\n\
         \x20     -> Scan: sales [category TEXT, amount DOUBLE, qty INTEGER]"
    );
}
