//! SQL emission - walks the query metamodel and writes dialect text.
//!
//! Layout follows one rule: a clause keyword sits at the current indent and
//! its elements one level deeper. Subqueries open a new level inside their
//! parentheses. With `pretty = false` every break becomes a single space
//! (none just inside parentheses).
//!
//! ```text
//! SELECT
//!     "root"."col1" AS "col1"
//! FROM
//!     (
//!         SELECT
//!             "root".col1 AS "col1"
//!         FROM
//!             test_schema.test_table AS "root"
//!         LIMIT 10
//!     ) AS "root"
//! LIMIT 20
//! ```

use tracing::debug;

use super::dialect::helpers::{binary, call, cast};
use super::dialect::{Dialect, SqlDialect};
use super::expr::{
    ArithmeticOp, ComparisonOp, LogicalOp, NamePart, SortItem, SqlExpr, SqlLiteral, Window,
    WindowFrame, WindowFrameBound, WindowFrameMode,
};
use super::query::{JoinKind, QuerySpecification, Relation, SingleColumn};
use super::token::{Token, TokenStream};
use crate::config::FrameToSqlConfig;
use crate::error::FrameResult;

/// Render a query specification as SQL text.
pub fn to_sql_string(spec: &QuerySpecification, config: &FrameToSqlConfig) -> FrameResult<String> {
    let emitter = SqlEmitter::new(config);
    let sql = emitter.query(spec, 0)?.serialize(config.dialect);
    debug!(dialect = %config.dialect, pretty = config.pretty, "emitted sql query");
    Ok(sql)
}

/// Render a single expression as SQL text.
pub fn expr_to_sql_string(expr: &SqlExpr, dialect: Dialect) -> FrameResult<String> {
    let emitter = SqlEmitter {
        dialect,
        pretty: false,
    };
    Ok(emitter.expr(expr)?.serialize(dialect))
}

struct SqlEmitter {
    dialect: Dialect,
    pretty: bool,
}

impl SqlEmitter {
    fn new(config: &FrameToSqlConfig) -> Self {
        Self {
            dialect: config.dialect,
            pretty: config.pretty,
        }
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Break to `indent + n` levels, or a space when compact.
    fn sep(&self, indent: usize, n: usize) -> TokenStream {
        let mut ts = TokenStream::new();
        if self.pretty {
            ts.newline().indent(indent + n);
        } else {
            ts.space();
        }
        ts
    }

    /// Break just inside parentheses; nothing when compact.
    fn paren_sep(&self, indent: usize, n: usize) -> TokenStream {
        let mut ts = TokenStream::new();
        if self.pretty {
            ts.newline().indent(indent + n);
        }
        ts
    }

    // =========================================================================
    // Queries
    // =========================================================================

    fn query(&self, spec: &QuerySpecification, indent: usize) -> FrameResult<TokenStream> {
        let dialect = self.dialect;
        let mut ts = TokenStream::new();

        ts.push(Token::Select);
        if let Some(top) = dialect.top_clause(spec.limit, spec.offset) {
            ts.space().append(&top);
        }
        if spec.select.distinct {
            ts.space().push(Token::Distinct);
        }
        for (i, item) in spec.select.items.iter().enumerate() {
            if i > 0 {
                ts.comma();
            }
            ts.append(&self.sep(indent, 1)).append(&self.select_item(item)?);
        }

        if !spec.from.is_empty() {
            ts.append(&self.sep(indent, 0)).push(Token::From);
            for (i, relation) in spec.from.iter().enumerate() {
                if i > 0 {
                    ts.comma();
                }
                ts.append(&self.sep(indent, 1))
                    .append(&self.relation(relation, indent + 1)?);
            }
        }

        if let Some(predicate) = &spec.where_clause {
            ts.append(&self.sep(indent, 0))
                .push(Token::Where)
                .append(&self.sep(indent, 1))
                .append(&self.expr(predicate)?);
        }

        if !spec.group_by.is_empty() {
            ts.append(&self.sep(indent, 0)).push(Token::GroupBy);
            for (i, key) in spec.group_by.iter().enumerate() {
                if i > 0 {
                    ts.comma();
                }
                ts.append(&self.sep(indent, 1)).append(&self.expr(key)?);
            }
        }

        if let Some(predicate) = &spec.having {
            ts.append(&self.sep(indent, 0))
                .push(Token::Having)
                .append(&self.sep(indent, 1))
                .append(&self.expr(predicate)?);
        }

        if !spec.order_by.is_empty() {
            ts.append(&self.sep(indent, 0)).push(Token::OrderBy);
            for (i, item) in spec.order_by.iter().enumerate() {
                if i > 0 {
                    ts.comma();
                }
                ts.append(&self.sep(indent, 1)).append(&self.sort_item(item)?);
            }
        } else if spec.offset.is_some() && dialect.requires_order_by_for_offset() {
            ts.append(&self.sep(indent, 0))
                .push(Token::OrderBy)
                .append(&self.sep(indent, 1))
                .push(Token::Raw("(SELECT NULL)".into()));
        }

        for clause in dialect.limit_clauses(spec.limit, spec.offset) {
            ts.append(&self.sep(indent, 0)).append(&clause);
        }

        Ok(ts)
    }

    fn select_item(&self, item: &SingleColumn) -> FrameResult<TokenStream> {
        let mut ts = self.expr(&item.expression)?;
        ts.space()
            .push(Token::As)
            .space()
            .push(Token::Ident(item.alias.clone()));
        Ok(ts)
    }

    fn sort_item(&self, item: &SortItem) -> FrameResult<TokenStream> {
        let mut ts = self.expr(&item.key)?;
        if item.descending {
            ts.space().push(Token::Desc);
        }
        Ok(ts)
    }

    /// `( <inner> )` where `inner` was rendered one level deeper.
    fn parenthesized(&self, inner: &TokenStream, indent: usize) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.lparen()
            .append(&self.paren_sep(indent, 1))
            .append(inner)
            .append(&self.paren_sep(indent, 0))
            .rparen();
        ts
    }

    fn relation(&self, relation: &Relation, indent: usize) -> FrameResult<TokenStream> {
        Ok(match relation {
            Relation::Table(parts) => {
                let mut ts = TokenStream::new();
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        ts.push(Token::Dot);
                    }
                    ts.push(Token::Name(part.clone()));
                }
                ts
            }
            Relation::TableFunction(expr) => self.expr(expr)?,
            Relation::Subquery(spec) => self.parenthesized(&self.query(spec, indent + 1)?, indent),
            Relation::RawQuery(sql) => {
                self.parenthesized(&TokenStream::from(Token::Raw(sql.clone())), indent)
            }
            Relation::Union { left, right } => {
                let left = self.parenthesized(&self.query(left, indent + 2)?, indent + 1);
                let right = self.parenthesized(&self.query(right, indent + 2)?, indent + 1);
                let mut inner = TokenStream::new();
                inner
                    .append(&left)
                    .append(&self.sep(indent, 1))
                    .push(Token::Union)
                    .space()
                    .push(Token::All)
                    .append(&self.sep(indent, 1))
                    .append(&right);
                self.parenthesized(&inner, indent)
            }
            Relation::Aliased { relation, alias } => {
                let mut ts = self.relation(relation, indent)?;
                ts.space()
                    .push(Token::As)
                    .space()
                    .push(Token::Ident(alias.clone()));
                ts
            }
            Relation::Join {
                kind,
                left,
                right,
                criteria,
            } => {
                let mut ts = self.relation(left, indent)?;
                ts.append(&self.sep(indent, 0));
                match kind {
                    JoinKind::Inner => ts.push(Token::Inner),
                    JoinKind::LeftOuter => ts.push(Token::Left).space().push(Token::Outer),
                    JoinKind::RightOuter => ts.push(Token::Right).space().push(Token::Outer),
                    JoinKind::FullOuter => ts.push(Token::Full).space().push(Token::Outer),
                    JoinKind::Cross => ts.push(Token::Cross),
                };
                ts.space().push(Token::Join);
                ts.append(&self.sep(indent, 0))
                    .append(&self.relation(right, indent)?);
                if let Some(criteria) = criteria {
                    ts.append(&self.sep(indent, 0))
                        .push(Token::On)
                        .space()
                        .append(&self.expr(criteria)?);
                }
                ts
            }
        })
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn expr(&self, expr: &SqlExpr) -> FrameResult<TokenStream> {
        let dialect = self.dialect;
        Ok(match expr {
            SqlExpr::Literal(lit) => TokenStream::from(literal(lit)),

            SqlExpr::QualifiedName(parts) => {
                let mut ts = TokenStream::new();
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        ts.push(Token::Dot);
                    }
                    ts.push(match part {
                        NamePart::Quoted(name) => Token::Ident(name.clone()),
                        NamePart::Plain(name) => Token::Name(name.clone()),
                    });
                }
                ts
            }

            SqlExpr::Comparison { op, left, right } => {
                let op = match op {
                    ComparisonOp::Eq => Token::Eq,
                    ComparisonOp::Ne => Token::Ne,
                    ComparisonOp::Lt => Token::Lt,
                    ComparisonOp::Lte => Token::Lte,
                    ComparisonOp::Gt => Token::Gt,
                    ComparisonOp::Gte => Token::Gte,
                };
                binary(self.expr(left)?, op, self.expr(right)?)
            }

            SqlExpr::Logical { op, left, right } => {
                let op = match op {
                    LogicalOp::And => Token::And,
                    LogicalOp::Or => Token::Or,
                };
                binary(self.expr(left)?, op, self.expr(right)?)
            }

            SqlExpr::Not(inner) => {
                let rendered = self.expr(inner)?;
                let mut ts = TokenStream::new();
                ts.push(Token::Not);
                if renders_parenthesized(inner) {
                    ts.append(&rendered);
                } else {
                    ts.lparen().append(&rendered).rparen();
                }
                ts
            }

            SqlExpr::Arithmetic { op, left, right } => {
                let (l, r) = (self.expr(left)?, self.expr(right)?);
                match op {
                    ArithmeticOp::Add => binary(l, Token::Plus, r),
                    ArithmeticOp::Sub => binary(l, Token::Minus, r),
                    ArithmeticOp::Mul => binary(l, Token::Mul, r),
                    ArithmeticOp::Div => binary(l, Token::Div, r),
                    ArithmeticOp::Mod => dialect.modulo(l, r),
                }
            }

            SqlExpr::Negative(inner) => match inner.as_ref() {
                SqlExpr::Literal(SqlLiteral::Integer(n)) => TokenStream::from(Token::LitInt(-n)),
                SqlExpr::Literal(SqlLiteral::Double(f)) => TokenStream::from(Token::LitFloat(-f)),
                other => binary(TokenStream::from(Token::LitInt(0)), Token::Minus, self.expr(other)?),
            },

            SqlExpr::Case {
                when_clauses,
                else_clause,
            } => {
                let mut ts = TokenStream::new();
                ts.push(Token::Case);
                for (condition, result) in when_clauses {
                    ts.space()
                        .push(Token::When)
                        .space()
                        .append(&self.expr(condition)?)
                        .space()
                        .push(Token::Then)
                        .space()
                        .append(&self.expr(result)?);
                }
                if let Some(else_clause) = else_clause {
                    ts.space()
                        .push(Token::Else)
                        .space()
                        .append(&self.expr(else_clause)?);
                }
                ts.space().push(Token::End);
                ts
            }

            SqlExpr::Cast { expr, target } => cast(self.expr(expr)?, &dialect.cast_type(target)),

            SqlExpr::IsNull { expr, negated } => {
                let mut ts = TokenStream::new();
                ts.lparen()
                    .append(&self.expr(expr)?)
                    .space()
                    .push(if *negated {
                        Token::IsNotNull
                    } else {
                        Token::IsNull
                    })
                    .rparen();
                ts
            }

            SqlExpr::Like { value, pattern } => binary(
                self.expr(value)?,
                Token::Like,
                TokenStream::from(Token::LitString(pattern.clone())),
            ),

            SqlExpr::FunctionCall {
                name,
                args,
                distinct,
            } => {
                let args = args
                    .iter()
                    .map(|a| self.expr(a))
                    .collect::<FrameResult<Vec<_>>>()?;
                if *distinct {
                    let mut ts = TokenStream::new();
                    ts.push(Token::FunctionName(name.clone()))
                        .lparen()
                        .push(Token::Distinct)
                        .space();
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            ts.comma().space();
                        }
                        ts.append(arg);
                    }
                    ts.rparen();
                    ts
                } else {
                    call(name, args)
                }
            }

            SqlExpr::StringPosition { haystack, needle } => {
                dialect.string_position(self.expr(haystack)?, self.expr(needle)?)
            }
            SqlExpr::DateTrunc { unit, value } => dialect.date_trunc(*unit, self.expr(value)?),
            SqlExpr::DatePart { field, value } => dialect.date_part(*field, self.expr(value)?),
            SqlExpr::CurrentDate => dialect.current_date(),
            SqlExpr::CurrentTimestamp => dialect.current_timestamp(),
            SqlExpr::DateDiff { unit, start, end } => {
                dialect.date_diff(*unit, self.expr(start)?, self.expr(end)?)?
            }
            SqlExpr::DateAdd {
                unit,
                amount,
                value,
            } => dialect.date_add(*unit, self.expr(amount)?, self.expr(value)?)?,
            SqlExpr::TimeBucket { unit, size, value } => {
                dialect.time_bucket(*unit, *size, self.expr(value)?)?
            }
            SqlExpr::Interval { amount, unit } => dialect.interval_literal(*amount, *unit)?,

            SqlExpr::Window { nested, window } => {
                let mut ts = self.expr(nested)?;
                ts.space()
                    .push(Token::Over)
                    .space()
                    .append(&self.window(window)?);
                ts
            }
        })
    }

    fn window(&self, window: &Window) -> FrameResult<TokenStream> {
        let mut clauses: Vec<TokenStream> = Vec::new();

        if !window.partitions.is_empty() {
            let mut ts = TokenStream::new();
            ts.push(Token::PartitionBy).space();
            for (i, key) in window.partitions.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&self.expr(key)?);
            }
            clauses.push(ts);
        }

        if !window.order_by.is_empty() {
            let mut ts = TokenStream::new();
            ts.push(Token::OrderBy).space();
            for (i, item) in window.order_by.iter().enumerate() {
                if i > 0 {
                    ts.comma().space();
                }
                ts.append(&self.sort_item(item)?);
            }
            clauses.push(ts);
        }

        if let Some(frame) = &window.frame {
            clauses.push(self.window_frame(frame)?);
        }

        let mut ts = TokenStream::new();
        ts.lparen();
        for (i, clause) in clauses.iter().enumerate() {
            if i > 0 {
                ts.space();
            }
            ts.append(clause);
        }
        ts.rparen();
        Ok(ts)
    }

    fn window_frame(&self, frame: &WindowFrame) -> FrameResult<TokenStream> {
        let mut ts = TokenStream::new();
        ts.push(match frame.mode {
            WindowFrameMode::Rows => Token::Rows,
            WindowFrameMode::Range => Token::Range,
        });
        ts.space()
            .push(Token::Between)
            .space()
            .append(&self.frame_bound(&frame.start)?)
            .space()
            .push(Token::And)
            .space()
            .append(&self.frame_bound(&frame.end)?);
        Ok(ts)
    }

    fn frame_bound(&self, bound: &WindowFrameBound) -> FrameResult<TokenStream> {
        let mut ts = TokenStream::new();
        match bound {
            WindowFrameBound::UnboundedPreceding => {
                ts.push(Token::Unbounded).space().push(Token::Preceding);
            }
            WindowFrameBound::UnboundedFollowing => {
                ts.push(Token::Unbounded).space().push(Token::Following);
            }
            WindowFrameBound::CurrentRow => {
                ts.push(Token::CurrentRow);
            }
            WindowFrameBound::Preceding(offset) => {
                ts.append(&self.expr(offset)?).space().push(Token::Preceding);
            }
            WindowFrameBound::Following(offset) => {
                ts.append(&self.expr(offset)?).space().push(Token::Following);
            }
        }
        Ok(ts)
    }
}

fn literal(lit: &SqlLiteral) -> Token {
    match lit {
        SqlLiteral::Integer(n) => Token::LitInt(*n),
        SqlLiteral::Double(f) => Token::LitFloat(*f),
        SqlLiteral::String(s) => Token::LitString(s.clone()),
        SqlLiteral::Boolean(b) => Token::LitBool(*b),
        SqlLiteral::Null => Token::LitNull,
    }
}

/// Expressions the emitter already wraps in parentheses.
fn renders_parenthesized(expr: &SqlExpr) -> bool {
    matches!(
        expr,
        SqlExpr::Comparison { .. }
            | SqlExpr::Logical { .. }
            | SqlExpr::IsNull { .. }
            | SqlExpr::Like { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::DurationUnit;
    use crate::sql::expr::{DatePartField, DateTruncUnit};
    use crate::sql::test_utils::assert_parses;
    use crate::tds::PrimitiveType;

    fn table_spec() -> QuerySpecification {
        QuerySpecification::select_from(
            vec![
                SingleColumn::new("col1", SqlExpr::source_column("root", "col1")),
                SingleColumn::new("col2", SqlExpr::source_column("root", "col2")),
            ],
            Relation::Table(vec!["test_schema".into(), "test_table".into()]).aliased("root"),
        )
    }

    fn wrapped(inner: QuerySpecification) -> QuerySpecification {
        let items = inner
            .column_names()
            .iter()
            .map(|c| SingleColumn::new(*c, SqlExpr::projected_column("root", c)))
            .collect();
        QuerySpecification::select_from(items, Relation::subquery(inner).aliased("root"))
    }

    fn compact(spec: &QuerySpecification) -> String {
        to_sql_string(spec, &FrameToSqlConfig::compact()).unwrap()
    }

    fn compact_tsql(spec: &QuerySpecification) -> String {
        to_sql_string(spec, &FrameToSqlConfig::new(Dialect::TSql, false)).unwrap()
    }

    fn expr_sql(expr: SqlExpr) -> String {
        expr_to_sql_string(&expr, Dialect::Postgres).unwrap()
    }

    fn col(name: &str) -> SqlExpr {
        SqlExpr::source_column("root", name)
    }

    #[test]
    fn test_simple_select_with_limit() {
        let mut spec = table_spec();
        spec.limit = Some(10);
        let sql = compact(&spec);
        assert_eq!(
            sql,
            "SELECT \"root\".col1 AS \"col1\", \"root\".col2 AS \"col2\" \
             FROM test_schema.test_table AS \"root\" LIMIT 10"
        );
        assert_parses(&sql, Dialect::Postgres);
    }

    #[test]
    fn test_nested_limit_pretty() {
        let mut inner = table_spec();
        inner.limit = Some(10);
        let mut outer = wrapped(inner);
        outer.limit = Some(20);

        let sql = to_sql_string(&outer, &FrameToSqlConfig::default()).unwrap();
        insta::assert_snapshot!(sql, @r###"
        SELECT
            "root"."col1" AS "col1",
            "root"."col2" AS "col2"
        FROM
            (
                SELECT
                    "root".col1 AS "col1",
                    "root".col2 AS "col2"
                FROM
                    test_schema.test_table AS "root"
                LIMIT 10
            ) AS "root"
        LIMIT 20
        "###);
        assert_parses(&sql, Dialect::Postgres);
    }

    #[test]
    fn test_nested_limit_compact() {
        let mut inner = table_spec();
        inner.limit = Some(10);
        let mut outer = wrapped(inner);
        outer.limit = Some(20);
        assert_eq!(
            compact(&outer),
            "SELECT \"root\".\"col1\" AS \"col1\", \"root\".\"col2\" AS \"col2\" FROM \
             (SELECT \"root\".col1 AS \"col1\", \"root\".col2 AS \"col2\" \
             FROM test_schema.test_table AS \"root\" LIMIT 10) AS \"root\" LIMIT 20"
        );
    }

    #[test]
    fn test_where_group_by_order_by() {
        let mut spec = QuerySpecification::select_from(
            vec![
                SingleColumn::new("col1", col("col1")),
                SingleColumn::new(
                    "Count",
                    SqlExpr::function("COUNT", vec![col("col2")]),
                ),
            ],
            Relation::Table(vec!["test_schema".into(), "test_table".into()]).aliased("root"),
        );
        spec.add_where(SqlExpr::comparison(
            ComparisonOp::Gt,
            col("col1"),
            SqlExpr::integer(10),
        ));
        spec.group_by = vec![col("col1")];
        spec.order_by = vec![SortItem::desc(SqlExpr::projected_column("root", "Count"))];

        let sql = compact(&spec);
        assert_eq!(
            sql,
            "SELECT \"root\".col1 AS \"col1\", COUNT(\"root\".col2) AS \"Count\" \
             FROM test_schema.test_table AS \"root\" WHERE (\"root\".col1 > 10) \
             GROUP BY \"root\".col1 ORDER BY \"root\".\"Count\" DESC"
        );
        assert_parses(&sql, Dialect::Postgres);
    }

    #[test]
    fn test_distinct_offset() {
        let mut spec = table_spec();
        spec.select.distinct = true;
        spec.offset = Some(5);
        spec.limit = Some(3);
        let sql = compact(&spec);
        assert!(sql.starts_with("SELECT DISTINCT \"root\".col1"));
        assert!(sql.ends_with("LIMIT 3 OFFSET 5"));
        assert_parses(&sql, Dialect::Postgres);
    }

    #[test]
    fn test_tsql_top() {
        let mut spec = table_spec();
        spec.limit = Some(10);
        let sql = compact_tsql(&spec);
        assert_eq!(
            sql,
            "SELECT TOP 10 [root].col1 AS [col1], [root].col2 AS [col2] \
             FROM test_schema.test_table AS [root]"
        );
        assert_parses(&sql, Dialect::TSql);
    }

    #[test]
    fn test_tsql_nested_top_keeps_both_limits() {
        let mut inner = table_spec();
        inner.limit = Some(10);
        let mut outer = wrapped(inner);
        outer.limit = Some(20);
        let sql = compact_tsql(&outer);
        assert!(sql.starts_with("SELECT TOP 20 [root].[col1]"));
        assert!(sql.contains("(SELECT TOP 10 [root].col1"));
        assert_parses(&sql, Dialect::TSql);
    }

    #[test]
    fn test_tsql_offset_without_order() {
        let mut spec = table_spec();
        spec.offset = Some(2);
        spec.limit = Some(3);
        let sql = compact_tsql(&spec);
        assert!(sql.ends_with(
            "ORDER BY (SELECT NULL) OFFSET 2 ROWS FETCH NEXT 3 ROWS ONLY"
        ));
        assert_parses(&sql, Dialect::TSql);
    }

    #[test]
    fn test_join() {
        let left = table_spec();
        let right = QuerySpecification::select_from(
            vec![
                SingleColumn::new("col3", SqlExpr::source_column("root", "col3")),
                SingleColumn::new("col4", SqlExpr::source_column("root", "col4")),
            ],
            Relation::Table(vec!["test_schema".into(), "test_table2".into()]).aliased("root"),
        );
        let join = Relation::Join {
            kind: JoinKind::LeftOuter,
            left: Box::new(Relation::subquery(left).aliased("left")),
            right: Box::new(Relation::subquery(right).aliased("right")),
            criteria: Some(SqlExpr::comparison(
                ComparisonOp::Eq,
                SqlExpr::projected_column("left", "col2"),
                SqlExpr::projected_column("right", "col4"),
            )),
        };
        let spec = QuerySpecification::select_from(
            ["col1", "col2"]
                .iter()
                .map(|c| SingleColumn::new(*c, SqlExpr::projected_column("left", c)))
                .chain(
                    ["col3", "col4"]
                        .iter()
                        .map(|c| SingleColumn::new(*c, SqlExpr::projected_column("right", c))),
                )
                .collect(),
            join,
        );
        let sql = compact(&spec);
        assert!(sql.contains(
            ") AS \"left\" LEFT OUTER JOIN (SELECT \"root\".col3 AS \"col3\""
        ));
        assert!(sql.ends_with(") AS \"right\" ON (\"left\".\"col2\" = \"right\".\"col4\")"));
        assert_parses(&sql, Dialect::Postgres);
    }

    #[test]
    fn test_union_all() {
        let union = Relation::Union {
            left: Box::new(table_spec()),
            right: Box::new(table_spec()),
        };
        let spec = QuerySpecification::select_from(
            vec![SingleColumn::new("col1", SqlExpr::projected_column("root", "col1"))],
            union.aliased("root"),
        );
        let sql = compact(&spec);
        assert!(sql.contains("FROM ((SELECT"));
        assert!(sql.contains(") UNION ALL (SELECT"));
        assert_parses(&sql, Dialect::Postgres);
    }

    #[test]
    fn test_literals_and_operators() {
        assert_eq!(expr_sql(SqlExpr::string("it's")), "'it''s'");
        assert_eq!(expr_sql(SqlExpr::null()), "NULL");
        assert_eq!(
            expr_sql(SqlExpr::Negative(Box::new(SqlExpr::integer(5)))),
            "-5"
        );
        assert_eq!(
            expr_sql(SqlExpr::Negative(Box::new(col("a")))),
            "(0 - \"root\".a)"
        );
        assert_eq!(
            expr_sql(SqlExpr::arithmetic(ArithmeticOp::Mod, col("a"), SqlExpr::integer(3))),
            "MOD(\"root\".a, 3)"
        );
        assert_eq!(
            expr_to_sql_string(
                &SqlExpr::arithmetic(ArithmeticOp::Mod, col("a"), SqlExpr::integer(3)),
                Dialect::TSql
            )
            .unwrap(),
            "([root].a % 3)"
        );
    }

    #[test]
    fn test_not_parenthesization() {
        let cmp = SqlExpr::comparison(ComparisonOp::Lt, col("a"), SqlExpr::integer(1));
        assert_eq!(expr_sql(SqlExpr::Not(Box::new(cmp))), "NOT(\"root\".a < 1)");
        assert_eq!(
            expr_sql(SqlExpr::Not(Box::new(col("flag")))),
            "NOT(\"root\".flag)"
        );
    }

    #[test]
    fn test_case_cast_like() {
        let case = SqlExpr::Case {
            when_clauses: vec![(col("a").is_null(), SqlExpr::integer(0))],
            else_clause: Some(Box::new(col("a"))),
        };
        assert_eq!(
            expr_sql(case),
            "CASE WHEN (\"root\".a IS NULL) THEN 0 ELSE \"root\".a END"
        );
        assert_eq!(
            expr_sql(col("Age").cast(PrimitiveType::BigInt)),
            "CAST(\"root\".Age AS BIGINT)"
        );
        assert_eq!(
            expr_sql(SqlExpr::Like {
                value: Box::new(col("col2")),
                pattern: "A%".into()
            }),
            "(\"root\".col2 LIKE 'A%')"
        );
    }

    #[test]
    fn test_distinct_function() {
        let count = SqlExpr::FunctionCall {
            name: "COUNT".into(),
            args: vec![col("a")],
            distinct: true,
        };
        assert_eq!(expr_sql(count), "COUNT(DISTINCT \"root\".a)");
    }

    #[test]
    fn test_window() {
        let window = Window {
            partitions: vec![col("dept"), col("team")],
            order_by: vec![SortItem::desc(col("salary"))],
            frame: Some(WindowFrame {
                mode: WindowFrameMode::Rows,
                start: WindowFrameBound::UnboundedPreceding,
                end: WindowFrameBound::CurrentRow,
            }),
        };
        assert_eq!(
            expr_sql(SqlExpr::function("SUM", vec![col("salary")]).over(window)),
            "SUM(\"root\".salary) OVER (PARTITION BY \"root\".dept, \"root\".team \
             ORDER BY \"root\".salary DESC ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW)"
        );
        assert_eq!(
            expr_sql(SqlExpr::function("row_number", vec![]).over(Window::default())),
            "row_number() OVER ()"
        );
    }

    #[test]
    fn test_range_frame_interval() {
        let window = Window {
            partitions: vec![],
            order_by: vec![SortItem::asc(col("d"))],
            frame: Some(WindowFrame {
                mode: WindowFrameMode::Range,
                start: WindowFrameBound::Preceding(SqlExpr::Interval {
                    amount: 1,
                    unit: DurationUnit::Days,
                }),
                end: WindowFrameBound::CurrentRow,
            }),
        };
        assert_eq!(
            expr_sql(SqlExpr::function("SUM", vec![col("v")]).over(window.clone())),
            "SUM(\"root\".v) OVER (ORDER BY \"root\".d \
             RANGE BETWEEN INTERVAL '1 DAY' PRECEDING AND CURRENT ROW)"
        );
        assert!(expr_to_sql_string(
            &SqlExpr::function("SUM", vec![col("v")]).over(window),
            Dialect::TSql
        )
        .is_err());
    }

    #[test]
    fn test_date_nodes() {
        assert_eq!(
            expr_sql(SqlExpr::DateTrunc {
                unit: DateTruncUnit::Month,
                value: Box::new(col("d"))
            }),
            "DATE_TRUNC('month', \"root\".d)"
        );
        assert_eq!(
            expr_sql(SqlExpr::DatePart {
                field: DatePartField::Year,
                value: Box::new(col("d"))
            }),
            "DATE_PART('year', \"root\".d)"
        );
        assert_eq!(expr_sql(SqlExpr::CurrentDate), "CURRENT_DATE");
        let err = expr_to_sql_string(
            &SqlExpr::DateDiff {
                unit: DurationUnit::Nanoseconds,
                start: Box::new(col("a")),
                end: Box::new(col("b")),
            },
            Dialect::Postgres,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported DATE DIFF unit: NANOSECONDS");
    }
}
