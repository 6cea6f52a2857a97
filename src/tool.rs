use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A tool as presented to a model for function calling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Tool {
    Function { function: Function },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub description: String,
    pub parameters: Parameters,
}

/// The object schema holding a tool's parameters.
///
/// Properties keep their declaration order; `required` holds exactly the
/// parameters that are neither optional nor defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Parameters {
    Object {
        properties: IndexMap<String, Property>,
        required: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "type")]
    pub kind: Kind,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The reduced set of property types a model gets to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

/// A tool advertised by a remote host. Its schema is kept as raw JSON;
/// only the host interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// A function call requested by a model.
#[derive(Debug, Clone)]
pub enum Call {
    Function {
        id: Id,
        name: String,
        arguments: String,
    },
}

/// The result of a call, ready to feed back to the model.
#[derive(Debug, Clone)]
pub struct Response {
    pub id: Id,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Id(String);
