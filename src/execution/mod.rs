//! Running frames on an execution server.
//!
//! A frame is executable when every input it reaches is an executable
//! input and they all share one client. The frame's SQL (default config)
//! is submitted to that client and the response stream is handed to a
//! [`ResultHandler`].

mod client;
mod handler;

pub use client::{ByteStream, HttpLegendClient, LegendClient};
pub use handler::{
    JsonFileResultHandler, ResultHandler, ResultTable, StringResultHandler, TableResultHandler,
};

use std::sync::Arc;

use tracing::debug;

use crate::config::FrameToSqlConfig;
use crate::error::{FrameError, FrameResult};
use crate::frame::TdsFrame;

fn same_client(a: &Arc<dyn LegendClient>, b: &Arc<dyn LegendClient>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

impl TdsFrame {
    /// The one client shared by every input of this frame.
    pub fn execution_client(&self) -> FrameResult<Arc<dyn LegendClient>> {
        let inputs = self.input_frames();
        let non_executable: Vec<String> = inputs
            .iter()
            .filter(|i| !i.is_executable())
            .map(|i| i.describe())
            .collect();
        if !non_executable.is_empty() {
            return Err(FrameError::execution(format!(
                "Cannot execute frame as its built on top of non-executable input frames: [{}]",
                non_executable.join(", ")
            )));
        }

        let mut clients: Vec<&Arc<dyn LegendClient>> = Vec::new();
        for client in inputs.iter().filter_map(|i| i.client()) {
            if !clients.iter().any(|c| same_client(c, client)) {
                clients.push(client);
            }
        }
        match clients.as_slice() {
            [client] => Ok(Arc::clone(client)),
            [] => Err(FrameError::execution(
                "Cannot execute frame without an executable input frame",
            )),
            many => {
                let names: Vec<String> = many.iter().map(|c| c.describe()).collect();
                Err(FrameError::execution(format!(
                    "Found tds frames with multiple legend_clients (which is not supported): [{}]",
                    names.join(", ")
                )))
            }
        }
    }

    /// Run the frame and pass the response to `handler`.
    pub async fn execute_frame<H>(&self, handler: &H, chunk_size: Option<u32>) -> FrameResult<H::Output>
    where
        H: ResultHandler + ?Sized,
    {
        let client = self.execution_client()?;
        let sql = self.to_sql_query(&FrameToSqlConfig::default())?;
        debug!(client = %client.describe(), "executing frame");
        let result = client.execute_sql_string(&sql, chunk_size).await?;
        handler.handle_result(self, result).await
    }

    /// Run the frame and return the raw response text.
    pub async fn execute_frame_to_string(&self, chunk_size: Option<u32>) -> FrameResult<String> {
        self.execute_frame(&StringResultHandler, chunk_size).await
    }
}
