//! Executing frames over HTTP against a scripted local server.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use frameql::prelude::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

type Requests = Arc<Mutex<Vec<String>>>;

/// Serve one canned `(status, body)` reply per connection, in order, and
/// record each request as text.
async fn serve(replies: Vec<(u16, &'static str)>) -> (u16, Requests) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let requests: Requests = Arc::default();
    let recorded = requests.clone();
    tokio::spawn(async move {
        for (status, body) in replies {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            recorded.lock().unwrap().push(request);
            let response = format!(
                "HTTP/1.1 {status} Scripted\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
    });
    (port, requests)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn client(port: u16, retry_count: u32) -> Arc<dyn LegendClient> {
    Arc::new(HttpLegendClient::new("127.0.0.1", port, false, Some("/engine/"), retry_count).unwrap())
}

const SCHEMA: &str = r#"{"columns":[
    {"_type":"primitiveSchemaColumn","name":"id","type":"Integer"},
    {"_type":"primitiveSchemaColumn","name":"city","type":"String"}
]}"#;

const RESULT: &str =
    r#"{"result":{"columns":["city","n"],"rows":[{"values":["Leeds",2]},{"values":["York",1]}]}}"#;

#[tokio::test]
async fn test_schema_then_grouped_query() {
    let (port, requests) = serve(vec![(200, SCHEMA), (200, RESULT)]).await;
    let frame = TdsFrame::executable("SELECT * FROM customers", client(port, 1))
        .await
        .unwrap();
    assert_eq!(frame.column_names(), vec!["id", "city"]);

    let grouped = frame
        .group_by(
            &["city"],
            vec![AggregateSpec::new("n", |r| r.get("id"), |c| Ok(c.count()))],
        )
        .unwrap();
    let table = grouped.execute_frame(&TableResultHandler, Some(50)).await.unwrap();
    assert_eq!(table.columns, vec!["city", "n"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(
        table.column("n").unwrap(),
        vec![&serde_json::json!(2), &serde_json::json!(1)]
    );

    let requests = requests.lock().unwrap();
    assert!(requests[0].starts_with(
        "POST /engine/api/sql/v1/execution/getSchemaFromQueryString HTTP/1.1"
    ));
    assert!(requests[0].ends_with("SELECT * FROM customers"));
    assert!(requests[1].starts_with(
        "POST /engine/api/sql/v1/execution/executeQueryString?chunkSize=50 HTTP/1.1"
    ));
    assert!(requests[1].contains("SELECT * FROM customers"));
    assert!(requests[1].contains("GROUP BY"));
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let (port, requests) = serve(vec![(503, "busy"), (502, "busy"), (200, "done")]).await;
    let frame = TdsFrame::executable_with_columns(
        "SELECT 1 AS one",
        client(port, 2),
        vec![TdsColumn::integer("one")],
    )
    .unwrap();
    assert_eq!(frame.execute_frame_to_string(None).await.unwrap(), "done");
    assert_eq!(requests.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let (port, requests) = serve(vec![(400, r#"{"message":"bad\nquery"}"#)]).await;
    let frame = TdsFrame::executable_with_columns(
        "SELECT nope",
        client(port, 3),
        vec![TdsColumn::integer("nope")],
    )
    .unwrap();
    let err = frame.execute_frame_to_string(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Execution);
    let message = err.to_string();
    assert!(message.starts_with("API call http://127.0.0.1:"));
    assert!(message.contains("failed with error: \n{\"message\":\"bad\nquery\"}"));
    assert!(message.ends_with("Status: 400 Bad Request"));
    assert_eq!(requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_retries_exhausted() {
    let (port, requests) = serve(vec![(500, "down"), (500, "down")]).await;
    let frame = TdsFrame::executable_with_columns(
        "SELECT 1 AS one",
        client(port, 1),
        vec![TdsColumn::integer("one")],
    )
    .unwrap();
    let err = frame.execute_frame_to_string(None).await.unwrap_err();
    assert!(err.to_string().ends_with("Status: 500 Internal Server Error"));
    assert_eq!(requests.lock().unwrap().len(), 2);
}

// =============================================================================
// Custom Handlers
// =============================================================================

/// Counts result rows without keeping them.
struct RowCounter;

#[async_trait]
impl ResultHandler for RowCounter {
    type Output = usize;

    async fn handle_result(
        &self,
        frame: &TdsFrame,
        result: frameql::execution::ByteStream,
    ) -> FrameResult<usize> {
        let table = TableResultHandler.handle_result(frame, result).await?;
        Ok(table.rows.len())
    }
}

#[tokio::test]
async fn test_custom_result_handler() {
    let (port, _) = serve(vec![(200, RESULT)]).await;
    let frame = TdsFrame::executable_with_columns(
        "SELECT city, n FROM counts",
        client(port, 1),
        vec![TdsColumn::string("city"), TdsColumn::integer("n")],
    )
    .unwrap()
    .sort(&["n"], &["desc"])
    .unwrap();
    assert_eq!(frame.execute_frame(&RowCounter, None).await.unwrap(), 2);
}

#[tokio::test]
async fn test_frames_over_different_servers() {
    let left = TdsFrame::executable_with_columns(
        "SELECT 1 AS a",
        client(1, 1),
        vec![TdsColumn::integer("a")],
    )
    .unwrap();
    let right = TdsFrame::executable_with_columns(
        "SELECT 1 AS b",
        client(1, 1),
        vec![TdsColumn::integer("b")],
    )
    .unwrap();
    let err = left
        .cross_join(&right)
        .unwrap()
        .execute_frame_to_string(None)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Found tds frames with multiple legend_clients (which is not supported): \
         [HttpLegendClient(http://127.0.0.1:1/engine/), HttpLegendClient(http://127.0.0.1:1/engine/)]"
    );
}
