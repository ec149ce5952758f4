//! Input frames: the leaves of the DAG.

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use super::compose::ROOT_ALIAS;
use super::TdsFrame;
use crate::config::FrameToPureConfig;
use crate::error::{FrameError, FrameResult};
use crate::execution::LegendClient;
use crate::sql::{QuerySpecification, Relation, SingleColumn, SqlExpr};
use crate::tds::{tds_columns_from_json, PrimitiveType, TdsColumn};

/// A leaf of the frame DAG.
#[derive(Clone)]
pub enum InputFrame {
    /// A database table, for SQL and Pure generation only.
    TableSpec {
        path: Vec<String>,
        columns: Vec<TdsColumn>,
    },
    /// Inline CSV data, for SQL and Pure generation only.
    Csv {
        text: String,
        columns: Vec<TdsColumn>,
    },
    /// A SQL query run by an execution server.
    Executable {
        query: String,
        client: Arc<dyn LegendClient>,
        columns: Vec<TdsColumn>,
    },
}

impl fmt::Debug for InputFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFrame::TableSpec { path, columns } => f
                .debug_struct("TableSpec")
                .field("path", path)
                .field("columns", columns)
                .finish(),
            InputFrame::Csv { columns, .. } => {
                f.debug_struct("Csv").field("columns", columns).finish()
            }
            InputFrame::Executable { query, columns, .. } => f
                .debug_struct("Executable")
                .field("query", query)
                .field("columns", columns)
                .finish(),
        }
    }
}

impl InputFrame {
    pub fn columns(&self) -> &[TdsColumn] {
        match self {
            InputFrame::TableSpec { columns, .. }
            | InputFrame::Csv { columns, .. }
            | InputFrame::Executable { columns, .. } => columns,
        }
    }

    pub fn is_executable(&self) -> bool {
        matches!(self, InputFrame::Executable { .. })
    }

    /// The client of an executable input.
    pub fn client(&self) -> Option<&Arc<dyn LegendClient>> {
        match self {
            InputFrame::Executable { client, .. } => Some(client),
            _ => None,
        }
    }

    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            InputFrame::TableSpec { path, .. } => format!("Table({})", path.join(".")),
            InputFrame::Csv { .. } => "CSV".to_string(),
            InputFrame::Executable { .. } => "SQL query".to_string(),
        }
    }

    pub(crate) fn to_sql(&self) -> FrameResult<QuerySpecification> {
        let (relation, column): (Relation, fn(&str, &str) -> SqlExpr) = match self {
            InputFrame::TableSpec { path, .. } => {
                (Relation::Table(path.clone()), SqlExpr::source_column)
            }
            InputFrame::Csv { text, .. } => (
                Relation::TableFunction(SqlExpr::function("CSV", vec![SqlExpr::string(text.clone())])),
                SqlExpr::projected_column,
            ),
            InputFrame::Executable { query, .. } => {
                (Relation::RawQuery(query.clone()), SqlExpr::projected_column)
            }
        };
        let items = self
            .columns()
            .iter()
            .map(|c| SingleColumn::new(c.name(), column(ROOT_ALIAS, c.name())))
            .collect();
        Ok(QuerySpecification::select_from(
            items,
            relation.aliased(ROOT_ALIAS),
        ))
    }

    pub(crate) fn to_pure(&self, _config: &FrameToPureConfig) -> String {
        match self {
            InputFrame::TableSpec { path, .. } => format!("#Table({})#", path.join(".")),
            InputFrame::Csv { text, .. } => format!("#TDS\n{text}#"),
            InputFrame::Executable { query, .. } => format!("#SQL{{{query}}}#"),
        }
    }
}

// =============================================================================
// Constructors
// =============================================================================

impl TdsFrame {
    /// A table, e.g. `["test_schema", "test_table"]`, with declared columns.
    pub fn table<I, S>(path: I, columns: Vec<TdsColumn>) -> FrameResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path: Vec<String> = path.into_iter().map(Into::into).collect();
        if path.is_empty() || path.iter().any(|p| p.is_empty()) {
            return Err(FrameError::validation(format!(
                "Table path should be a non-empty list of non-empty names. Got: {path:?}"
            )));
        }
        TdsFrame::from_input(InputFrame::TableSpec { path, columns })
    }

    /// Inline CSV data; column types are inferred from the values.
    pub fn from_csv(text: impl Into<String>) -> FrameResult<Self> {
        let text = text.into();
        let columns = infer_csv_columns(&text)?;
        debug!(columns = columns.len(), "inferred csv columns");
        TdsFrame::from_input(InputFrame::Csv { text, columns })
    }

    /// A SQL query run by `client`; the schema is fetched from the server.
    pub async fn executable(
        query: impl Into<String>,
        client: Arc<dyn LegendClient>,
    ) -> FrameResult<Self> {
        let query = query.into();
        let schema = client.get_sql_string_schema(&query).await?;
        let columns = tds_columns_from_json(&schema)?;
        Self::executable_with_columns(query, client, columns)
    }

    /// A SQL query run by `client`, with a known schema.
    pub fn executable_with_columns(
        query: impl Into<String>,
        client: Arc<dyn LegendClient>,
        columns: Vec<TdsColumn>,
    ) -> FrameResult<Self> {
        TdsFrame::from_input(InputFrame::Executable {
            query: query.into(),
            client,
            columns,
        })
    }
}

// =============================================================================
// CSV Type Inference
// =============================================================================

/// Infer one column per header field, in header order.
///
/// A column takes the first type every non-empty value parses as:
/// Boolean, Integer, Float, StrictDate (`%Y-%m-%d`), DateTime
/// (`%Y-%m-%d %H:%M:%S`, or a mix of both date forms), else String.
fn infer_csv_columns(text: &str) -> FrameResult<Vec<TdsColumn>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(FrameError::validation("CSV input should have a header row"));
    }

    let mut values: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (i, field) in record.iter().enumerate().take(headers.len()) {
            let field = field.trim();
            if !field.is_empty() {
                values[i].push(field.to_string());
            }
        }
    }

    Ok(headers
        .into_iter()
        .zip(values)
        .map(|(name, vals)| TdsColumn::primitive(name, infer_type(&vals)))
        .collect())
}

fn infer_type(values: &[String]) -> PrimitiveType {
    if values.is_empty() {
        return PrimitiveType::String;
    }
    let all = |f: fn(&str) -> bool| values.iter().all(|v| f(v));
    if all(|v| v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("false")) {
        PrimitiveType::Boolean
    } else if all(|v| v.parse::<i64>().is_ok()) {
        PrimitiveType::Integer
    } else if all(|v| v.parse::<f64>().is_ok()) {
        PrimitiveType::Float
    } else if all(is_strict_date) {
        PrimitiveType::StrictDate
    } else if all(|v| is_strict_date(v) || is_datetime(v)) {
        PrimitiveType::DateTime
    } else {
        PrimitiveType::String
    }
}

fn is_strict_date(v: &str) -> bool {
    NaiveDate::parse_from_str(v, "%Y-%m-%d").is_ok()
}

fn is_datetime(v: &str) -> bool {
    NaiveDateTime::parse_from_str(v, "%Y-%m-%d %H:%M:%S").is_ok()
}
