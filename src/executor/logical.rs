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

//! Logical query plans
//!
//! A logical plan is an immutable tree describing what to compute. Every
//! column reference in a node's expressions is a position in its input's
//! output row.

use std::fmt;

use super::expr::Expr;
use crate::core::{DataType, Field};

/// One aggregate computed by an Aggregate node
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateCall {
    /// Canonical function name (SUM, COUNT, ...)
    pub function: String,
    /// Argument, evaluated against the aggregate's input rows
    pub arg: Expr,
    /// Result type
    pub data_type: DataType,
}

impl fmt::Display for AggregateCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.function, self.arg)
    }
}

/// Logical plan node
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalPlan {
    /// Reads `fields` (a pruned, reordered subset of the table) from `table`
    Scan { table: String, fields: Vec<Field> },

    /// Keeps rows whose predicate is TRUE
    Filter {
        input: Box<LogicalPlan>,
        predicate: Expr,
    },

    /// One expression per output column
    Project {
        input: Box<LogicalPlan>,
        exprs: Vec<Expr>,
        names: Vec<String>,
    },

    /// Output row is `[group keys..., aggregates...]`
    Aggregate {
        input: Box<LogicalPlan>,
        group_by: Vec<Expr>,
        aggregates: Vec<AggregateCall>,
    },

    /// Stable ascending sort on one 0-based column, NULLs first
    OrderBy {
        input: Box<LogicalPlan>,
        column: usize,
    },
}

impl LogicalPlan {
    /// Columns produced by this node
    pub fn output_fields(&self) -> Vec<Field> {
        match self {
            LogicalPlan::Scan { fields, .. } => fields.clone(),
            LogicalPlan::Filter { input, .. } | LogicalPlan::OrderBy { input, .. } => {
                input.output_fields()
            }
            LogicalPlan::Project { exprs, names, .. } => names
                .iter()
                .zip(exprs)
                .map(|(name, expr)| Field::new(name.clone(), expr.data_type()))
                .collect(),
            LogicalPlan::Aggregate {
                group_by,
                aggregates,
                ..
            } => {
                let keys = group_by.iter().enumerate().map(|(i, expr)| match expr {
                    Expr::Column { name, data_type, .. } => Field::new(name.clone(), *data_type),
                    other => Field::new(format!("_{}", i), other.data_type()),
                });
                let aggs = aggregates
                    .iter()
                    .map(|call| Field::new(call.to_string(), call.data_type));
                keys.chain(aggs).collect()
            }
        }
    }

    /// Input node, None for a scan
    pub fn input(&self) -> Option<&LogicalPlan> {
        match self {
            LogicalPlan::Scan { .. } => None,
            LogicalPlan::Filter { input, .. }
            | LogicalPlan::Project { input, .. }
            | LogicalPlan::Aggregate { input, .. }
            | LogicalPlan::OrderBy { input, .. } => Some(input),
        }
    }

    /// Name of the scanned table
    pub fn table(&self) -> &str {
        match self {
            LogicalPlan::Scan { table, .. } => table,
            other => other.input().map_or("", |input| input.table()),
        }
    }

    /// Short node name
    pub fn name(&self) -> &'static str {
        match self {
            LogicalPlan::Scan { .. } => "Scan",
            LogicalPlan::Filter { .. } => "Filter",
            LogicalPlan::Project { .. } => "Project",
            LogicalPlan::Aggregate { .. } => "Aggregate",
            LogicalPlan::OrderBy { .. } => "OrderBy",
        }
    }

    fn explain(&self, lines: &mut Vec<String>, indent: usize) {
        let prefix = "  ".repeat(indent);
        let detail = match self {
            LogicalPlan::Scan { table, fields } => {
                let columns: Vec<String> = fields
                    .iter()
                    .map(|f| format!("{} {}", f.name, f.data_type))
                    .collect();
                format!("{} [{}]", table, columns.join(", "))
            }
            LogicalPlan::Filter { predicate, .. } => predicate.to_string(),
            LogicalPlan::Project { exprs, names, .. } => {
                let columns: Vec<String> = exprs
                    .iter()
                    .zip(names)
                    .map(|(expr, name)| {
                        let rendered = expr.to_string();
                        if rendered == *name {
                            rendered
                        } else {
                            format!("{} AS {}", rendered, name)
                        }
                    })
                    .collect();
                columns.join(", ")
            }
            LogicalPlan::Aggregate {
                group_by,
                aggregates,
                ..
            } => {
                let keys: Vec<String> = group_by.iter().map(|e| e.to_string()).collect();
                let calls: Vec<String> = aggregates.iter().map(|a| a.to_string()).collect();
                if keys.is_empty() {
                    calls.join(", ")
                } else {
                    format!("{} GROUP BY {}", calls.join(", "), keys.join(", "))
                }
            }
            LogicalPlan::OrderBy { input, column } => {
                let name = input
                    .output_fields()
                    .get(*column)
                    .map(|f| f.name.clone())
                    .unwrap_or_else(|| format!("#{}", column));
                format!("{} ASC", name)
            }
        };
        lines.push(format!("{}-> {}: {}", prefix, self.name(), detail));
        if let Some(input) = self.input() {
            input.explain(lines, indent + 1);
        }
    }
}

impl fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        self.explain(&mut lines, 0);
        write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::expr::{ArithmeticOp, CompareOp};

    fn scan() -> LogicalPlan {
        LogicalPlan::Scan {
            table: "t".to_string(),
            fields: vec![
                Field::new("foo", DataType::Double),
                Field::new("bar", DataType::Integer),
            ],
        }
    }

    #[test]
    fn test_output_fields() {
        let foo = Expr::column(0, "foo", DataType::Double);
        let bar = Expr::column(1, "bar", DataType::Integer);
        let agg = LogicalPlan::Aggregate {
            input: Box::new(scan()),
            group_by: vec![bar.clone()],
            aggregates: vec![AggregateCall {
                function: "SUM".to_string(),
                arg: foo,
                data_type: DataType::Double,
            }],
        };
        let fields = agg.output_fields();
        assert_eq!(fields[0], Field::new("bar", DataType::Integer));
        assert_eq!(fields[1], Field::new("SUM(foo)", DataType::Double));

        let project = LogicalPlan::Project {
            input: Box::new(agg),
            exprs: vec![Expr::arithmetic(
                ArithmeticOp::Mul,
                Expr::column(0, "bar", DataType::Integer),
                Expr::literal(2i64),
            )],
            names: vec!["double_bar".to_string()],
        };
        assert_eq!(
            project.output_fields(),
            vec![Field::new("double_bar", DataType::Integer)]
        );
        assert_eq!(project.table(), "t");
    }

    #[test]
    fn test_explain_rendering() {
        let plan = LogicalPlan::OrderBy {
            input: Box::new(LogicalPlan::Filter {
                input: Box::new(scan()),
                predicate: Expr::compare(
                    CompareOp::Gt,
                    Expr::column(1, "bar", DataType::Integer),
                    Expr::literal(0i64),
                ),
            }),
            column: 0,
        };
        assert_eq!(
            plan.to_string(),
            "-> OrderBy: foo ASC\n  -> Filter: (bar > 0)\n    -> Scan: t [foo DOUBLE, bar INTEGER]"
        );
    }
}
