//! Execution server clients.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{FrameError, FrameResult};

/// The response body of an executed query, chunk by chunk. Dropping the
/// stream abandons the rest of the response.
pub type ByteStream = BoxStream<'static, FrameResult<Bytes>>;

/// A server that runs SQL over the inputs of executable frames.
#[async_trait]
pub trait LegendClient: Send + Sync {
    /// Submit `sql` and stream back the JSON-framed result.
    async fn execute_sql_string(&self, sql: &str, chunk_size: Option<u32>) -> FrameResult<ByteStream>;

    /// The schema JSON of the result `sql` would produce.
    async fn get_sql_string_schema(&self, sql: &str) -> FrameResult<String>;

    /// Short description for error messages.
    fn describe(&self) -> String {
        "LegendClient".to_string()
    }
}

// =============================================================================
// HTTP Client
// =============================================================================

const EXECUTION_PATH: &str = "api/sql/v1/execution";
const RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// [`LegendClient`] over HTTP(S).
///
/// Requests that fail with a 500 to 504 status, or that cannot connect,
/// are retried up to `retry_count` times.
#[derive(Debug, Clone)]
pub struct HttpLegendClient {
    base_url: Url,
    retry_count: u32,
    http: reqwest::Client,
}

impl HttpLegendClient {
    pub fn new(
        host: &str,
        port: u16,
        secure: bool,
        path_prefix: Option<&str>,
        retry_count: u32,
    ) -> FrameResult<Self> {
        if retry_count < 1 {
            return Err(FrameError::validation(format!(
                "Retry count should be a number greater than 1. Got {retry_count}"
            )));
        }
        let scheme = if secure { "https" } else { "http" };
        let prefix = match path_prefix.map(|p| p.trim_matches('/')) {
            Some(p) if !p.is_empty() => format!("/{p}"),
            _ => String::new(),
        };
        let base_url = Url::parse(&format!("{scheme}://{host}:{port}{prefix}/"))?;
        Ok(Self {
            base_url,
            retry_count,
            http: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>/api/sql/v1/execution/<operation>`
    pub(crate) fn endpoint(&self, operation: &str, chunk_size: Option<u32>) -> FrameResult<Url> {
        let mut url = self.base_url.join(&format!("{EXECUTION_PATH}/{operation}"))?;
        if let Some(n) = chunk_size {
            url.query_pairs_mut().append_pair("chunkSize", &n.to_string());
        }
        Ok(url)
    }

    async fn post_sql(&self, url: Url, sql: &str) -> FrameResult<reqwest::Response> {
        let mut attempt = 0;
        loop {
            let sent = self
                .http
                .post(url.clone())
                .header(CONTENT_TYPE, "text/plain")
                .body(sql.to_string())
                .send()
                .await;
            let retryable = match &sent {
                Ok(response) => is_retryable(response.status()),
                Err(e) => e.is_connect() || e.is_timeout(),
            };
            if retryable && attempt < self.retry_count {
                attempt += 1;
                warn!(
                    url = %url,
                    attempt,
                    retry_count = self.retry_count,
                    "request failed, retrying"
                );
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                continue;
            }

            let response = sent?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(FrameError::execution(format!(
                    "API call {} failed with error: \n{}\nStatus: {}",
                    url,
                    body.replace("\\n", "\n").replace("\\t", "\t"),
                    status
                )));
            }
            debug!(url = %url, status = %response.status(), "request succeeded");
            return Ok(response);
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    (500..=504).contains(&status.as_u16())
}

#[async_trait]
impl LegendClient for HttpLegendClient {
    async fn execute_sql_string(&self, sql: &str, chunk_size: Option<u32>) -> FrameResult<ByteStream> {
        let url = self.endpoint("executeQueryString", chunk_size)?;
        info!(url = %url, chunk_size, "submitting query to execution server");
        let response = self.post_sql(url, sql).await?;
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(FrameError::from))
            .boxed())
    }

    async fn get_sql_string_schema(&self, sql: &str) -> FrameResult<String> {
        let url = self.endpoint("getSchemaFromQueryString", None)?;
        debug!(url = %url, "fetching query schema");
        let response = self.post_sql(url, sql).await?;
        Ok(response.text().await?)
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HttpLegendClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HttpLegendClient({})", self.base_url)
    }
}
