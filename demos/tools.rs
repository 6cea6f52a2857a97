//! Connect to a tool host, list its tools, and call a couple of them
//! with explicit arguments. Pairs with the `server` demo.

use liaison::Executor;

use serde_json::{Map, Value, json};

use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let endpoint = env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8000/mcp".to_owned());

    let executor = Executor::new(endpoint)?;

    println!(
        "Connecting to tool host at {endpoint}",
        endpoint = executor.endpoint()
    );

    let tools = executor.list_tools().await?;

    println!("\nAvailable tools ({count}):", count = tools.len());

    for tool in &tools {
        println!(
            "- {name}: {description}",
            name = tool.name,
            description = tool.description
        );
    }

    println!("\nCalling tool: add(a=3, b=4)");
    let result = executor
        .execute("add", arguments(json!({ "a": 3, "b": 4 })))
        .await?;
    println!("Result: {result}");

    println!("\nCalling tool: get_user_info(user_id=\"user_123\")");
    let result = executor
        .execute("get_user_info", arguments(json!({ "user_id": "user_123" })))
        .await?;
    println!("Result: {result}");

    Ok(())
}

fn arguments(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
