//! Result handlers: turn the byte stream of an executed frame into a
//! value.

use std::path::PathBuf;

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::client::ByteStream;
use crate::error::{FrameError, FrameResult};
use crate::frame::TdsFrame;

#[async_trait]
pub trait ResultHandler: Send + Sync {
    type Output: Send;

    async fn handle_result(&self, frame: &TdsFrame, result: ByteStream) -> FrameResult<Self::Output>;
}

async fn collect_bytes(result: ByteStream) -> FrameResult<Vec<u8>> {
    result
        .try_fold(Vec::new(), |mut acc, chunk| async move {
            acc.extend_from_slice(&chunk);
            Ok::<_, FrameError>(acc)
        })
        .await
}

/// The whole response as UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringResultHandler;

#[async_trait]
impl ResultHandler for StringResultHandler {
    type Output = String;

    async fn handle_result(&self, _frame: &TdsFrame, result: ByteStream) -> FrameResult<String> {
        let bytes = collect_bytes(result).await?;
        String::from_utf8(bytes)
            .map_err(|e| FrameError::execution(format!("Result is not valid UTF-8: {e}")))
    }
}

// =============================================================================
// Tables
// =============================================================================

/// Rows of an executed frame, one JSON value per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl ResultTable {
    /// Values of the column named `name`, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&serde_json::Value>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().filter_map(|row| row.get(index)).collect())
    }
}

#[derive(Deserialize)]
struct ResultEnvelope {
    result: RawResult,
}

#[derive(Deserialize)]
struct RawResult {
    columns: Vec<String>,
    rows: Vec<RawRow>,
}

#[derive(Deserialize)]
struct RawRow {
    values: Vec<serde_json::Value>,
}

/// Parses `{"result": {"columns": [..], "rows": [{"values": [..]}, ..]}}`
/// into a [`ResultTable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TableResultHandler;

#[async_trait]
impl ResultHandler for TableResultHandler {
    type Output = ResultTable;

    async fn handle_result(&self, frame: &TdsFrame, result: ByteStream) -> FrameResult<ResultTable> {
        let bytes = collect_bytes(result).await?;
        let envelope: ResultEnvelope = serde_json::from_slice(&bytes)?;
        let RawResult { columns, rows } = envelope.result;
        if columns.len() != frame.columns().len() {
            return Err(FrameError::execution(format!(
                "Result has {} columns but the frame declares {}",
                columns.len(),
                frame.columns().len()
            )));
        }
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                if row.values.len() != columns.len() {
                    return Err(FrameError::execution(format!(
                        "Result row {} has {} values, expected {}",
                        i,
                        row.values.len(),
                        columns.len()
                    )));
                }
                Ok(row.values)
            })
            .collect::<FrameResult<Vec<_>>>()?;
        debug!(rows = rows.len(), "parsed result table");
        Ok(ResultTable { columns, rows })
    }
}

// =============================================================================
// Files
// =============================================================================

/// Writes the raw response to a file as it arrives.
#[derive(Debug, Clone)]
pub struct JsonFileResultHandler {
    path: PathBuf,
}

impl JsonFileResultHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ResultHandler for JsonFileResultHandler {
    type Output = ();

    async fn handle_result(&self, _frame: &TdsFrame, mut result: ByteStream) -> FrameResult<()> {
        let mut file = tokio::fs::File::create(&self.path).await?;
        let mut written = 0usize;
        while let Some(chunk) = result.try_next().await? {
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;
        debug!(path = %self.path.display(), bytes = written, "wrote result file");
        Ok(())
    }
}
