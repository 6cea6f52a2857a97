use liaison::{Error, Executor};

use serde_json::{Map, Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task;

use std::time::Duration;

// Answers exactly one request with the canned reply and hands back the
// request body the executor actually sent.
async fn host(reply: Value) -> (String, task::JoinHandle<Value>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();

    let served = task::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let mut buffer = Vec::new();
        let mut chunk = [0u8; 1024];

        let header_end = loop {
            let read = stream.read(&mut chunk).await.unwrap();
            assert!(read > 0, "connection closed before the request completed");

            buffer.extend_from_slice(&chunk[..read]);

            if let Some(position) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
                break position + 4;
            }
        };

        let length = std::str::from_utf8(&buffer[..header_end])
            .unwrap()
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;

                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())?
            })
            .unwrap_or(0);

        while buffer.len() < header_end + length {
            let read = stream.read(&mut chunk).await.unwrap();
            assert!(read > 0, "connection closed before the request completed");

            buffer.extend_from_slice(&chunk[..read]);
        }

        let request: Value =
            serde_json::from_slice(&buffer[header_end..header_end + length]).unwrap();

        let body = serde_json::to_string(&reply).unwrap();
        let response = format!(
            "HTTP/1.1 200 OK\r\n\
             content-type: application/json\r\n\
             content-length: {length}\r\n\
             connection: close\r\n\r\n\
             {body}",
            length = body.len(),
        );

        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();

        request
    });

    (format!("http://{address}/mcp"), served)
}

fn arguments(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("arguments must be an object"),
    }
}

#[tokio::test]
async fn results_pass_through_unmodified() {
    let user = json!({ "user_id": "user_123", "status": "active", "role": "user" });

    let (endpoint, served) = host(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": user.clone(),
    }))
    .await;

    let executor = Executor::new(endpoint).unwrap();

    let result = executor
        .execute("get_user_info", arguments(json!({ "user_id": "user_123" })))
        .await
        .unwrap();

    assert_eq!(result, user);

    let request = served.await.unwrap();

    assert_eq!(request["method"], "tools/call");
    assert_eq!(request["params"]["name"], "get_user_info");
    assert_eq!(request["params"]["arguments"], json!({ "user_id": "user_123" }));
}

#[tokio::test]
async fn error_replies_surface_as_protocol_errors() {
    let (endpoint, served) = host(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": { "code": -32602, "message": "unknown tool: frobnicate" },
    }))
    .await;

    let executor = Executor::new(endpoint).unwrap();

    let error = executor
        .execute("frobnicate", Map::new())
        .await
        .unwrap_err();

    match error {
        Error::Protocol { code, message } => {
            assert_eq!(code, -32602);
            assert_eq!(message, "unknown tool: frobnicate");
        }
        Error::Transport(error) => panic!("expected a protocol error, got: {error}"),
    }

    let _ = served.await.unwrap();
}

#[tokio::test]
async fn refused_connections_surface_as_transport_errors() {
    let endpoint = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        format!("http://{address}/mcp", address = listener.local_addr().unwrap())
    };

    let executor = Executor::new(endpoint).unwrap();

    let error = executor.execute("add", Map::new()).await.unwrap_err();

    assert!(matches!(error, Error::Transport(_)));
}

#[tokio::test]
async fn timeouts_abort_stalled_calls() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{address}/mcp", address = listener.local_addr().unwrap());

    let stall = task::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();

        std::future::pending::<()>().await;
    });

    let executor = Executor::new(endpoint)
        .unwrap()
        .timeout(Duration::from_millis(100));

    let error = executor.execute("add", Map::new()).await.unwrap_err();

    assert!(matches!(error, Error::Transport(_)));

    stall.abort();
}

#[tokio::test]
async fn listings_decode_from_the_catalog() {
    let (endpoint, served) = host(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "tools": [
                {
                    "name": "add",
                    "description": "Add two numbers",
                    "inputSchema": { "type": "object", "properties": {}, "required": [] },
                },
                { "name": "bare", "inputSchema": {} },
            ],
        },
    }))
    .await;

    let executor = Executor::new(endpoint).unwrap();

    let tools = executor.list_tools().await.unwrap();

    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0].name, "add");
    assert_eq!(tools[0].description, "Add two numbers");
    assert_eq!(tools[0].input_schema["type"], "object");
    assert_eq!(tools[1].description, "");

    let request = served.await.unwrap();

    assert_eq!(request["method"], "tools/list");
}
