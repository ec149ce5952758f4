//! Aggregates over a collection of mapped values.
//!
//! An aggregation is written as two lambdas: a map `row -> Expr` and an
//! aggregate `collection -> Expr`. The map result is wrapped in a
//! [`Collection`]; the aggregate methods on it build
//! [`ExprKind::Aggregate`] nodes whose operand is the mapped expression.
//! In Pure the operand is written as the collection variable `$c`.

use super::{Expr, ExprKind};
use crate::error::{FrameError, FrameResult};
use crate::tds::PrimitiveType;

/// Pure variable bound to the collection in an aggregate lambda.
pub const COLLECTION_VAR: &str = "c";

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateOp {
    Count,
    DistinctCount,
    Average,
    Max,
    Min,
    Sum,
    StdDevSample,
    StdDevPopulation,
    VarianceSample,
    VariancePopulation,
    JoinStrings(String),
}

impl AggregateOp {
    pub fn pure_name(&self) -> &'static str {
        match self {
            AggregateOp::Count | AggregateOp::DistinctCount => "count",
            AggregateOp::Average => "average",
            AggregateOp::Max => "max",
            AggregateOp::Min => "min",
            AggregateOp::Sum => "sum",
            AggregateOp::StdDevSample => "stdDevSample",
            AggregateOp::StdDevPopulation => "stdDevPopulation",
            AggregateOp::VarianceSample => "varianceSample",
            AggregateOp::VariancePopulation => "variancePopulation",
            AggregateOp::JoinStrings(_) => "joinStrings",
        }
    }

    pub fn sql_name(&self) -> &'static str {
        match self {
            AggregateOp::Count | AggregateOp::DistinctCount => "COUNT",
            AggregateOp::Average => "AVG",
            AggregateOp::Max => "MAX",
            AggregateOp::Min => "MIN",
            AggregateOp::Sum => "SUM",
            AggregateOp::StdDevSample => "STDDEV_SAMP",
            AggregateOp::StdDevPopulation => "STDDEV_POP",
            AggregateOp::VarianceSample => "VAR_SAMP",
            AggregateOp::VariancePopulation => "VAR_POP",
            AggregateOp::JoinStrings(_) => "STRING_AGG",
        }
    }
}

/// The collection of values a map lambda produced, one per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    nested: Expr,
}

impl Collection {
    pub fn new(nested: impl Into<Expr>) -> Self {
        Self {
            nested: nested.into(),
        }
    }

    pub fn nested(&self) -> &Expr {
        &self.nested
    }

    fn aggregate(&self, op: AggregateOp, ty: PrimitiveType) -> Expr {
        Expr::new(
            ExprKind::Aggregate {
                op,
                operand: Box::new(self.nested.clone()),
            },
            ty,
            false,
        )
    }

    fn require(&self, op: &str, accepted: fn(&PrimitiveType) -> bool, expected: &str) -> FrameResult<()> {
        if accepted(&self.nested.ty()) {
            return Ok(());
        }
        Err(FrameError::type_error(format!(
            "'{}' can only be applied to a collection of {} values. Got collection of {} values",
            op,
            expected,
            self.nested.ty()
        )))
    }

    pub fn count(&self) -> Expr {
        self.aggregate(AggregateOp::Count, PrimitiveType::Integer)
    }

    pub fn distinct_count(&self) -> Expr {
        self.aggregate(AggregateOp::DistinctCount, PrimitiveType::Integer)
    }

    pub fn average(&self) -> FrameResult<Expr> {
        self.require("average", PrimitiveType::is_numeric, "Number")?;
        Ok(self.aggregate(AggregateOp::Average, PrimitiveType::Float))
    }

    /// Same type as the collection for numbers, strings and strict dates;
    /// `Date` for other dates.
    pub fn max(&self) -> FrameResult<Expr> {
        let ty = self.ordered_result("max")?;
        Ok(self.aggregate(AggregateOp::Max, ty))
    }

    pub fn min(&self) -> FrameResult<Expr> {
        let ty = self.ordered_result("min")?;
        Ok(self.aggregate(AggregateOp::Min, ty))
    }

    pub fn sum(&self) -> FrameResult<Expr> {
        self.require("sum", PrimitiveType::is_numeric, "Number")?;
        Ok(self.aggregate(AggregateOp::Sum, self.nested.ty().core()))
    }

    pub fn std_dev_sample(&self) -> FrameResult<Expr> {
        self.require("std_dev_sample", PrimitiveType::is_numeric, "Number")?;
        Ok(self.aggregate(AggregateOp::StdDevSample, PrimitiveType::Number))
    }

    pub fn std_dev_population(&self) -> FrameResult<Expr> {
        self.require("std_dev_population", PrimitiveType::is_numeric, "Number")?;
        Ok(self.aggregate(AggregateOp::StdDevPopulation, PrimitiveType::Number))
    }

    pub fn variance_sample(&self) -> FrameResult<Expr> {
        self.require("variance_sample", PrimitiveType::is_numeric, "Number")?;
        Ok(self.aggregate(AggregateOp::VarianceSample, PrimitiveType::Number))
    }

    pub fn variance_population(&self) -> FrameResult<Expr> {
        self.require("variance_population", PrimitiveType::is_numeric, "Number")?;
        Ok(self.aggregate(AggregateOp::VariancePopulation, PrimitiveType::Number))
    }

    /// Concatenate the values with `separator` between them.
    pub fn join_strings(&self, separator: &str) -> FrameResult<Expr> {
        self.require("join", PrimitiveType::is_string, "String")?;
        Ok(self.aggregate(
            AggregateOp::JoinStrings(separator.to_string()),
            PrimitiveType::String,
        ))
    }

    fn ordered_result(&self, op: &str) -> FrameResult<PrimitiveType> {
        let ty = self.nested.ty();
        if ty.is_numeric() || ty.is_string() {
            Ok(ty.core())
        } else if ty.core() == PrimitiveType::StrictDate {
            Ok(PrimitiveType::StrictDate)
        } else if ty.is_date() {
            Ok(PrimitiveType::Date)
        } else {
            Err(FrameError::type_error(format!(
                "'{op}' can only be applied to a collection of Number, String or Date values. \
                 Got collection of {ty} values"
            )))
        }
    }
}
