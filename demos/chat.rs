//! The full loop: derive a schema, let a model pick a tool, execute it
//! on the tool host, and feed the result back for a final answer.
//!
//! Expects an OpenAI-compatible chat host as the first argument and the
//! `server` demo running on localhost:8000. `OPENAI_API_KEY` is attached
//! as a bearer token when set.

use liaison::schema::{self, Parameter, Signature, Type};
use liaison::{Executor, tool};

use anyhow::bail;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use std::env;

const SYSTEM_PROMPT: &str = "You are an internal operations assistant.\n\n\
    Rules:\n\
    - You may request tools when needed\n\
    - You must not guess tool results\n\
    - Tool execution is handled by the runtime";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(host) = env::args().nth(1) else {
        bail!("Chat host argument not provided!");
    };

    let model = env::args().nth(2).unwrap_or_else(|| "gpt-4o-mini".to_owned());

    let executor = Executor::new("http://localhost:8000/mcp")?;

    let signature = Signature::new("get_user_info")
        .doc(
            "Get user information by user ID\n\n\
             user_id: Unique identifier for the user",
        )
        .parameter(Parameter::new("user_id", Type::Text));

    let tools = vec![schema::derive(&signature)];

    let mut messages = vec![
        json!({ "role": "system", "content": SYSTEM_PROMPT }),
        json!({ "role": "user", "content": "Check the status of user_123" }),
    ];

    let message = complete(&host, &model, &messages, &tools).await?;

    if message.tool_calls.is_empty() {
        // The model decided no tool was needed.
        println!("{content}", content = message.content.unwrap_or_default());

        return Ok(());
    }

    messages.push(json!({
        "role": "assistant",
        "content": message.content,
        "tool_calls": message
            .tool_calls
            .iter()
            .map(|call| json!({
                "id": call.id,
                "type": "function",
                "function": {
                    "name": call.function.name,
                    "arguments": call.function.arguments,
                },
            }))
            .collect::<Vec<_>>(),
    }));

    let calls: Vec<_> = message
        .tool_calls
        .into_iter()
        .map(|call| tool::Call::Function {
            id: call.id,
            name: call.function.name,
            arguments: call.function.arguments,
        })
        .collect();

    for call in calls {
        let tool::Call::Function {
            id,
            name,
            arguments,
        } = call;

        let Ok(arguments) = serde_json::from_str::<Map<String, Value>>(&arguments) else {
            continue;
        };

        let result = executor.execute(&name, arguments).await?;

        let response = tool::Response {
            id,
            content: serde_json::to_string(&result)?,
        };

        messages.push(json!({
            "role": "tool",
            "tool_call_id": response.id,
            "content": response.content,
        }));
    }

    let message = complete(&host, &model, &messages, &tools).await?;

    println!("{content}", content = message.content.unwrap_or_default());

    Ok(())
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    id: tool::Id,
    function: Function,
}

#[derive(Debug, Deserialize)]
struct Function {
    name: String,
    arguments: String,
}

async fn complete(
    host: &str,
    model: &str,
    messages: &[Value],
    tools: &[liaison::Tool],
) -> anyhow::Result<Message> {
    let client = reqwest::Client::new();

    let mut request = client
        .post(format!(
            "{host}/v1/chat/completions",
            host = host.trim_end_matches('/')
        ))
        .json(&json!({
            "model": model,
            "messages": messages,
            "tools": tools,
            "tool_choice": "auto",
        }));

    if let Ok(key) = env::var("OPENAI_API_KEY") {
        request = request.bearer_auth(key);
    }

    #[derive(Deserialize)]
    struct Completion {
        choices: Vec<Choice>,
    }

    #[derive(Deserialize)]
    struct Choice {
        message: Message,
    }

    let mut completion: Completion = request
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    if completion.choices.is_empty() {
        bail!("chat host returned no choices");
    }

    Ok(completion.choices.remove(0).message)
}
