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

//! Query planner
//!
//! Planning runs in two stages:
//!
//! 1. [`build_logical_plan`] resolves a parsed [`Query`] against the table
//!    registry: name resolution, type checking, aggregate rewriting and the
//!    optional sort. Every planning error surfaces here or in stage 2,
//!    before any row is produced.
//! 2. [`build_physical_plan`] lowers the logical tree into operators,
//!    compiling every expression with one strategy for the whole tree.
//!
//! ```text
//! SELECT bar, SUM(foo) FROM t WHERE foo > 0 ORDER BY 2
//!
//! -> OrderBy: SUM(foo) ASC
//!   -> Aggregate: SUM(foo) GROUP BY bar
//!     -> Filter: (foo > 0.0)
//!       -> Scan: t [bar INTEGER, foo DOUBLE]
//! ```

use super::expr::Expr;
use super::expression::{
    BytecodeCompiler, ClosureCompiler, ExecutionMode, ExpressionCompiler, Interpreter,
};
use super::logical::{AggregateCall, LogicalPlan};
use super::operator::Operator;
use super::operators::{AggregateOperator, FilterOperator, OrderByOperator, ProjectOperator};
use super::resolve::{Clause, Resolver};
use crate::core::{Error, Result};
use crate::functions::{global_registry, AccumulatorFactory};
use crate::parser::Query;
use crate::storage::TableRegistry;

/// Planner switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerOptions {
    /// Drop projections that pass their input through unchanged
    pub prune_projections: bool,
    /// Run the bytecode peephole pass
    pub peephole: bool,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            prune_projections: true,
            peephole: true,
        }
    }
}

/// Build the logical plan for a query with default options
pub fn build_logical_plan(tables: &TableRegistry, query: &Query) -> Result<LogicalPlan> {
    build_logical_plan_with(tables, query, &PlannerOptions::default())
}

/// Build the logical plan for a query
pub fn build_logical_plan_with(
    tables: &TableRegistry,
    query: &Query,
    options: &PlannerOptions,
) -> Result<LogicalPlan> {
    let table = tables.lookup(&query.from)?;
    let mut resolver = Resolver::new(table.schema(), global_registry());

    let mut exprs = Vec::with_capacity(query.select.len());
    let mut names = Vec::with_capacity(query.select.len());
    for item in &query.select {
        exprs.push(resolver.resolve(&item.expr, Clause::Select)?);
        names.push(item.output_name());
    }
    let predicate = query
        .filter
        .as_ref()
        .map(|filter| resolver.resolve_predicate(filter, Clause::Where))
        .transpose()?;

    let mut plan = LogicalPlan::Scan {
        table: query.from.clone(),
        fields: resolver.into_fields(),
    };
    if let Some(predicate) = predicate {
        plan = LogicalPlan::Filter {
            input: Box::new(plan),
            predicate,
        };
    }

    let output_width = exprs.len();
    plan = if exprs.iter().any(|e| e.aggregate_count() > 0) {
        rewrite_aggregates(plan, exprs, names)?
    } else {
        LogicalPlan::Project {
            input: Box::new(plan),
            exprs,
            names,
        }
    };

    if let Some(ordinal) = query.order_by {
        if ordinal == 0 || ordinal > output_width {
            return Err(Error::InvalidArgument(format!(
                "ORDER BY position {} is not in select list (1..={})",
                ordinal, output_width
            )));
        }
        plan = LogicalPlan::OrderBy {
            input: Box::new(plan),
            column: ordinal - 1,
        };
    }

    if options.prune_projections {
        plan = prune_identity_projections(plan);
    }

    tracing::debug!(table = %query.from, plan = %plan, "built logical plan");
    Ok(plan)
}

/// Split a select list containing aggregates into Aggregate + Project.
///
/// Select items that read columns but contain no aggregate become group
/// keys. Aggregate calls are computed by the Aggregate node and the select
/// list is rewritten to read the Aggregate's output columns.
fn rewrite_aggregates(
    input: LogicalPlan,
    exprs: Vec<Expr>,
    names: Vec<String>,
) -> Result<LogicalPlan> {
    let mut group_by: Vec<Expr> = Vec::new();
    for expr in &exprs {
        if expr.aggregate_count() == 0 && expr.references_columns() && !group_by.contains(expr) {
            group_by.push(expr.clone());
        }
    }

    let mut aggregates: Vec<AggregateCall> = Vec::new();
    let projected = exprs
        .iter()
        .map(|e| rewrite_output(e, &group_by, &mut aggregates))
        .collect::<Result<Vec<_>>>()?;

    tracing::trace!(
        keys = group_by.len(),
        aggregates = aggregates.len(),
        "rewrote aggregates"
    );

    Ok(LogicalPlan::Project {
        input: Box::new(LogicalPlan::Aggregate {
            input: Box::new(input),
            group_by,
            aggregates,
        }),
        exprs: projected,
        names,
    })
}

fn rewrite_output(
    expr: &Expr,
    group_by: &[Expr],
    aggregates: &mut Vec<AggregateCall>,
) -> Result<Expr> {
    if let Some(index) = group_by.iter().position(|key| key == expr) {
        let name = match expr {
            Expr::Column { name, .. } => name.clone(),
            other => other.to_string(),
        };
        return Ok(Expr::column(index, name, expr.data_type()));
    }

    match expr {
        Expr::Aggregate {
            name,
            arg,
            data_type,
        } => {
            let call = AggregateCall {
                function: name.clone(),
                arg: (**arg).clone(),
                data_type: *data_type,
            };
            let slot = match aggregates.iter().position(|c| *c == call) {
                Some(slot) => slot,
                None => {
                    aggregates.push(call);
                    aggregates.len() - 1
                }
            };
            Ok(Expr::column(
                group_by.len() + slot,
                aggregates[slot].to_string(),
                *data_type,
            ))
        }
        Expr::Column { name, .. } => Err(Error::InvalidAggregate(format!(
            "column '{}' must be a group key or used inside an aggregate",
            name
        ))),
        other => other.try_map_children(|child| rewrite_output(child, group_by, aggregates)),
    }
}

fn prune_identity_projections(plan: LogicalPlan) -> LogicalPlan {
    match plan {
        LogicalPlan::Scan { .. } => plan,
        LogicalPlan::Filter { input, predicate } => LogicalPlan::Filter {
            input: Box::new(prune_identity_projections(*input)),
            predicate,
        },
        LogicalPlan::Aggregate {
            input,
            group_by,
            aggregates,
        } => LogicalPlan::Aggregate {
            input: Box::new(prune_identity_projections(*input)),
            group_by,
            aggregates,
        },
        LogicalPlan::OrderBy { input, column } => LogicalPlan::OrderBy {
            input: Box::new(prune_identity_projections(*input)),
            column,
        },
        LogicalPlan::Project {
            input,
            exprs,
            names,
        } => {
            let input = prune_identity_projections(*input);
            let fields = input.output_fields();
            let identity = exprs.len() == fields.len()
                && exprs.iter().zip(&names).zip(&fields).enumerate().all(
                    |(i, ((expr, name), field))| {
                        matches!(expr, Expr::Column { index, .. } if *index == i)
                            && *name == field.name
                    },
                );
            if identity {
                input
            } else {
                LogicalPlan::Project {
                    input: Box::new(input),
                    exprs,
                    names,
                }
            }
        }
    }
}

/// Lower a logical plan with the default compiler for `mode`
pub fn build_physical_plan(
    tables: &TableRegistry,
    plan: &LogicalPlan,
    mode: ExecutionMode,
) -> Result<Box<dyn Operator>> {
    build_physical_plan_with(tables, plan, mode, &PlannerOptions::default())
}

/// Lower a logical plan, dispatching once on the evaluation strategy
pub fn build_physical_plan_with(
    tables: &TableRegistry,
    plan: &LogicalPlan,
    mode: ExecutionMode,
    options: &PlannerOptions,
) -> Result<Box<dyn Operator>> {
    tracing::debug!(%mode, root = plan.name(), "building physical plan");
    match mode {
        ExecutionMode::Interpreter => lower(tables, plan, &Interpreter),
        ExecutionMode::ClosureCompiler => lower(tables, plan, &ClosureCompiler),
        ExecutionMode::BytecodeCompiler => lower(
            tables,
            plan,
            &BytecodeCompiler::new().with_peephole(options.peephole),
        ),
    }
}

/// Lower a logical plan, compiling every expression with `compiler`
pub fn lower<C: ExpressionCompiler>(
    tables: &TableRegistry,
    plan: &LogicalPlan,
    compiler: &C,
) -> Result<Box<dyn Operator>> {
    match plan {
        LogicalPlan::Scan { table, fields } => {
            let source = tables.lookup(table)?;
            let names: Vec<String> = fields.iter().map(|f| f.name.clone()).collect();
            let scan = source.scan(Some(&names))?;
            if scan.schema() != fields.as_slice() {
                return Err(Error::TypeMismatch(format!(
                    "table '{}' no longer matches the planned schema",
                    table
                )));
            }
            Ok(scan)
        }
        LogicalPlan::Filter { input, predicate } => {
            let child = lower(tables, input, compiler)?;
            let predicate = compiler.compile(predicate)?;
            Ok(Box::new(FilterOperator::new(child, predicate)))
        }
        LogicalPlan::Project { input, exprs, .. } => {
            let child = lower(tables, input, compiler)?;
            let exprs = compiler.compile_all(exprs)?;
            Ok(Box::new(ProjectOperator::new(
                child,
                exprs,
                plan.output_fields(),
            )))
        }
        LogicalPlan::Aggregate {
            input,
            group_by,
            aggregates,
        } => {
            let child = lower(tables, input, compiler)?;
            let keys = compiler.compile_all(group_by)?;
            let mut args = Vec::with_capacity(aggregates.len());
            let mut factories = Vec::with_capacity(aggregates.len());
            for call in aggregates {
                factories.push(accumulator_factory(call)?);
                args.push(compiler.compile(&call.arg)?);
            }
            Ok(Box::new(AggregateOperator::new(
                child,
                keys,
                args,
                factories,
                plan.output_fields(),
            )))
        }
        LogicalPlan::OrderBy { input, column } => {
            let child = lower(tables, input, compiler)?;
            Ok(Box::new(OrderByOperator::new(child, *column)))
        }
    }
}

fn accumulator_factory(call: &AggregateCall) -> Result<AccumulatorFactory> {
    let input = call.arg.data_type();
    let function = global_registry()
        .get_aggregate(&call.function)
        .ok_or_else(|| Error::UnsupportedAggregate(call.function.clone()))?;
    if !function.supports(input) {
        return Err(Error::UnsupportedAggregate(format!(
            "{}({})",
            call.function, input
        )));
    }
    Ok(AccumulatorFactory::new(function, input))
}
