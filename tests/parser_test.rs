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

//! Parser Tests
//!
//! Exercises the public parsing entry point with the query shapes the
//! engine accepts.

use queryengine::parser::{parse_query, AstExpr, BinaryOperator, UnaryOperator};
use queryengine::Error;

#[test]
fn test_parse_scenario_queries() {
    let query = parse_query("SELECT SUM(foo) FROM table").expect("Failed to parse");
    assert_eq!(query.from, "table");
    assert_eq!(query.select.len(), 1);
    assert_eq!(
        query.select[0].expr,
        AstExpr::function("SUM", vec![AstExpr::identifier("foo")])
    );
    assert_eq!(query.select[0].output_name(), "SUM(foo)");

    let query = parse_query("SELECT SUM(foo + 10*bar) FROM table").expect("Failed to parse");
    assert_eq!(query.to_string(), "SELECT SUM(foo + (10 * bar)) FROM table");
}

#[test]
fn test_keywords_are_case_insensitive() {
    let upper =
        parse_query("SELECT foo FROM t WHERE foo > 1 ORDER BY 1 ASC").expect("Failed to parse");
    let lower =
        parse_query("select foo from t where foo > 1 order by 1 asc").expect("Failed to parse");
    assert_eq!(upper, lower);
    assert_eq!(upper.order_by, Some(1));
}

#[test]
fn test_aliases() {
    let query = parse_query("SELECT foo AS a, bar b, baz FROM t").expect("Failed to parse");
    let names: Vec<String> = query.select.iter().map(|s| s.output_name()).collect();
    assert_eq!(names, vec!["a", "b", "baz"]);
}

#[test]
fn test_unary_and_logical_operators() {
    let query = parse_query("SELECT -foo, NOT a OR b FROM t").expect("Failed to parse");
    assert_eq!(
        query.select[0].expr,
        AstExpr::unary(UnaryOperator::Minus, AstExpr::identifier("foo"))
    );
    assert_eq!(
        query.select[1].expr,
        AstExpr::binary(
            BinaryOperator::Or,
            AstExpr::unary(UnaryOperator::Not, AstExpr::identifier("a")),
            AstExpr::identifier("b"),
        )
    );
}

#[test]
fn test_literals() {
    let query =
        parse_query("SELECT 1, 2.5, 'it''s', TRUE, false FROM t").expect("Failed to parse");
    let exprs: Vec<&AstExpr> = query.select.iter().map(|s| &s.expr).collect();
    assert_eq!(
        exprs,
        vec![
            &AstExpr::IntegerLiteral(1),
            &AstExpr::FloatLiteral(2.5),
            &AstExpr::StringLiteral("it's".to_string()),
            &AstExpr::BooleanLiteral(true),
            &AstExpr::BooleanLiteral(false),
        ]
    );
}

#[test]
fn test_comments_and_trailing_semicolon() {
    let query =
        parse_query("-- totals\nSELECT COUNT(*) FROM t; -- done").expect("Failed to parse");
    assert_eq!(
        query.select[0].expr,
        AstExpr::function("COUNT", vec![AstExpr::Wildcard])
    );
}

#[test]
fn test_parse_errors_report_offsets() {
    let cases = [
        ("SELECT FROM t", 7),
        ("SELECT foo t", 12),
        ("SELECT foo FROM t WHERE", 23),
        ("SELECT foo FROM t ORDER 1", 24),
        ("SELECT foo FROM t extra", 18),
        ("SELECT (foo FROM t", 12),
        ("SELECT 'open FROM t", 7),
        ("SELECT foo ! bar FROM t", 11),
        ("SELECT IF(a, b) FROM t", 7),
    ];
    for (sql, offset) in cases {
        match parse_query(sql) {
            Err(Error::Parse { position, .. }) => assert_eq!(position, offset, "{}", sql),
            other => panic!("{} should fail to parse, got {:?}", sql, other),
        }
    }
}

#[test]
fn test_error_messages() {
    let err = parse_query("SELECT foo FROM t WHERE").unwrap_err();
    assert_eq!(
        err.to_string(),
        "parse error at offset 23: expected expression, found end of input"
    );
    let err = parse_query("SELECT foo FROM t ORDER 1").unwrap_err();
    assert_eq!(
        err.to_string(),
        "parse error at offset 24: expected BY, found '1'"
    );
}
