//! Query metamodel: query specifications, select lists and relations.
//!
//! Every frame lowers to one [`QuerySpecification`]. Applied functions
//! either edit the incoming spec in place or nest it as a subquery (see
//! `frame::compose`).

use super::expr::{SqlExpr, SortItem};

// =============================================================================
// Select
// =============================================================================

/// A select-list item. The alias is the output column name, unquoted.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleColumn {
    pub alias: String,
    pub expression: SqlExpr,
}

impl SingleColumn {
    pub fn new(alias: impl Into<String>, expression: SqlExpr) -> Self {
        Self {
            alias: alias.into(),
            expression,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Select {
    pub distinct: bool,
    pub items: Vec<SingleColumn>,
}

impl Select {
    /// The item aliased `name`, if any.
    pub fn item(&self, name: &str) -> Option<&SingleColumn> {
        self.items.iter().find(|i| i.alias == name)
    }
}

// =============================================================================
// Relations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
}

/// A `FROM` element.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    /// `schema.table`
    Table(Vec<String>),
    /// A set-returning function call, e.g. `CSV('...')`
    TableFunction(SqlExpr),
    /// `( SELECT ... )`
    Subquery(Box<QuerySpecification>),
    /// `( <text> )` for a query the caller wrote by hand
    RawQuery(String),
    /// `( (left) UNION ALL (right) )`
    Union {
        left: Box<QuerySpecification>,
        right: Box<QuerySpecification>,
    },
    /// `relation AS "alias"`
    Aliased {
        relation: Box<Relation>,
        alias: String,
    },
    Join {
        kind: JoinKind,
        left: Box<Relation>,
        right: Box<Relation>,
        criteria: Option<SqlExpr>,
    },
}

impl Relation {
    pub fn aliased(self, alias: impl Into<String>) -> Self {
        Relation::Aliased {
            relation: Box::new(self),
            alias: alias.into(),
        }
    }

    pub fn subquery(spec: QuerySpecification) -> Self {
        Relation::Subquery(Box::new(spec))
    }
}

// =============================================================================
// Query Specification
// =============================================================================

/// A single `SELECT` block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuerySpecification {
    pub select: Select,
    pub from: Vec<Relation>,
    pub where_clause: Option<SqlExpr>,
    pub group_by: Vec<SqlExpr>,
    pub having: Option<SqlExpr>,
    pub order_by: Vec<SortItem>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl QuerySpecification {
    /// `SELECT items FROM relation`.
    pub fn select_from(items: Vec<SingleColumn>, relation: Relation) -> Self {
        Self {
            select: Select {
                distinct: false,
                items,
            },
            from: vec![relation],
            ..Self::default()
        }
    }

    /// Output column names, in select-list order.
    pub fn column_names(&self) -> Vec<&str> {
        self.select.items.iter().map(|i| i.alias.as_str()).collect()
    }

    pub fn has_limit_or_offset(&self) -> bool {
        self.limit.is_some() || self.offset.is_some()
    }

    /// AND a predicate into the `WHERE` clause.
    pub fn add_where(&mut self, predicate: SqlExpr) {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
    }
}
