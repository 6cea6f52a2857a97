//! A deliberately small tool host for the other demos to talk to.
//!
//! Serves `add` and `get_user_info` over JSON-RPC on a single POST
//! endpoint, advertising schemas derived from their signatures.

use liaison::schema::{self, Parameter, Signature, Type};
use liaison::tool::{Function, Tool};

use anyhow::bail;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let address = env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:8000".to_owned());

    let listener = TcpListener::bind(&address).await?;

    println!("Serving tools on http://{address}/mcp");

    loop {
        let (stream, _) = listener.accept().await?;

        tokio::spawn(async move {
            let _ = handle(stream).await;
        });
    }
}

fn signatures() -> Vec<Signature> {
    vec![
        Signature::new("add")
            .doc("Add two numbers\n\na: First addend\nb: Second addend")
            .parameter(Parameter::new("a", Type::Integer))
            .parameter(Parameter::new("b", Type::Integer)),
        Signature::new("get_user_info")
            .doc(
                "Get user information by user ID\n\n\
                 user_id: Unique identifier for the user",
            )
            .parameter(Parameter::new("user_id", Type::Text)),
    ]
}

fn catalog() -> Vec<Value> {
    signatures()
        .iter()
        .map(|signature| {
            let Tool::Function { function } = schema::derive(signature);

            let Function {
                name,
                description,
                parameters,
            } = function;

            json!({
                "name": name,
                "description": description,
                "inputSchema": parameters,
            })
        })
        .collect()
}

fn call(name: &str, arguments: &Value) -> Option<Value> {
    match name {
        "add" => {
            let a = arguments.get("a").and_then(Value::as_i64)?;
            let b = arguments.get("b").and_then(Value::as_i64)?;

            Some(json!(a + b))
        }
        "get_user_info" => {
            let user_id = arguments.get("user_id").and_then(Value::as_str)?;

            Some(json!({
                "user_id": user_id,
                "name": "John Doe",
                "email": "john.doe@example.com",
                "status": "active",
                "last_login": "2024-01-15T10:30:00Z",
                "role": "user",
            }))
        }
        _ => None,
    }
}

fn dispatch(request: &Value) -> Value {
    let id = request.get("id").cloned().unwrap_or(Value::Null);

    match request.get("method").and_then(Value::as_str) {
        Some("tools/list") => json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": { "tools": catalog() },
        }),
        Some("tools/call") => {
            let name = request
                .pointer("/params/name")
                .and_then(Value::as_str)
                .unwrap_or_default();

            let arguments = request
                .pointer("/params/arguments")
                .cloned()
                .unwrap_or_else(|| json!({}));

            match call(name, &arguments) {
                Some(result) => json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "result": result,
                }),
                None => json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {
                        "code": -32602,
                        "message": format!("unknown tool or invalid arguments: {name}"),
                    },
                }),
            }
        }
        _ => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32601, "message": "method not found" },
        }),
    }
}

async fn handle(mut stream: TcpStream) -> anyhow::Result<()> {
    let request = read_request(&mut stream).await?;
    let body = serde_json::to_string(&dispatch(&request))?;

    let response = format!(
        "HTTP/1.1 200 OK\r\n\
         content-type: application/json\r\n\
         content-length: {length}\r\n\
         connection: close\r\n\r\n\
         {body}",
        length = body.len(),
    );

    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;

    Ok(())
}

async fn read_request(stream: &mut TcpStream) -> anyhow::Result<Value> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let read = stream.read(&mut chunk).await?;

        if read == 0 {
            bail!("connection closed before the request completed");
        }

        buffer.extend_from_slice(&chunk[..read]);

        if let Some(position) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break position + 4;
        }
    };

    let length = std::str::from_utf8(&buffer[..header_end])?
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;

            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())?
        })
        .unwrap_or(0);

    while buffer.len() < header_end + length {
        let read = stream.read(&mut chunk).await?;

        if read == 0 {
            bail!("connection closed before the request completed");
        }

        buffer.extend_from_slice(&chunk[..read]);
    }

    Ok(serde_json::from_slice(
        &buffer[header_end..header_end + length],
    )?)
}
