mod error;

pub mod schema;
pub mod tool;

pub use error::Error;
pub use schema::{Parameter, Signature, Type};
pub use tool::Tool;

use serde::Deserialize;
use serde_json::json;
use serde_json::{Map, Value};

use std::time::Duration;

pub use reqwest::IntoUrl;
pub use url::Url;

/// Invokes tools on a remote host.
///
/// Each call opens its own connection to the endpoint and releases it when
/// the call finishes, on success and on failure alike. Arguments and results
/// pass through untouched; whatever the remote tool returns is the caller's
/// to interpret. Dropping an in-flight call cancels it.
#[derive(Debug, Clone)]
pub struct Executor {
    endpoint: Url,
    timeout: Option<Duration>,
}

impl Executor {
    pub fn new(endpoint: impl IntoUrl) -> Result<Self, Error> {
        Ok(Self {
            endpoint: endpoint.into_url()?,
            timeout: None,
        })
    }

    /// Bounds every call to the given duration, connection included.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub async fn list_tools(&self) -> Result<Vec<tool::Listing>, Error> {
        #[derive(Deserialize)]
        struct Catalog {
            tools: Vec<tool::Listing>,
        }

        let catalog: Catalog = self
            .request(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/list",
            }))
            .await?;

        Ok(catalog.tools)
    }

    pub async fn execute(
        &self,
        tool: &str,
        arguments: Map<String, Value>,
    ) -> Result<Value, Error> {
        self.request(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {
                "name": tool,
                "arguments": arguments,
            },
        }))
        .await
    }

    async fn request<T>(&self, payload: &Value) -> Result<T, Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let client = reqwest::Client::new();

        let mut request = client.post(self.endpoint.clone()).json(payload);

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?.error_for_status()?;

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Reply<T> {
            Success { result: T },
            Failure { error: Refusal },
        }

        #[derive(Deserialize)]
        struct Refusal {
            code: i64,
            message: String,
        }

        match response.json().await? {
            Reply::Success { result } => Ok(result),
            Reply::Failure { error } => Err(Error::Protocol {
                code: error.code,
                message: error.message,
            }),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}
