use crate::tool::{Function, Kind, Parameters, Property, Tool};

use indexmap::IndexMap;

/// The declared type of a tool parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Text,
    Integer,
    Float,
    Bool,
    List,
    Map,
    Null,
    Optional(Box<Type>),
    Union(Vec<Type>),
    Literal(Vec<String>),
    Custom(String),
}

impl Type {
    pub fn optional(inner: Type) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn literal<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::Literal(values.into_iter().map(Into::into).collect())
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self::Custom(name.into())
    }
}

/// One declared parameter of a tool.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    ty: Option<Type>,
    has_default: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            has_default: false,
        }
    }

    /// A parameter with no declared type. It stays out of the derived
    /// schema entirely, required list included.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            has_default: false,
        }
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }
}

/// A registered tool callable: identifier, documentation block, and its
/// parameters in declaration order.
#[derive(Debug, Clone)]
pub struct Signature {
    name: String,
    doc: String,
    parameters: Vec<Parameter>,
}

impl Signature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
            parameters: Vec::new(),
        }
    }

    pub fn doc(mut self, doc: impl AsRef<str>) -> Self {
        self.doc = doc.as_ref().to_owned();
        self
    }

    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Derives the function-calling schema of a signature.
///
/// Total over any signature: unmapped types degrade to `string` and a doc
/// block that yields nothing leaves descriptions empty. Deriving twice
/// produces identical output.
pub fn derive(signature: &Signature) -> Tool {
    let mut properties = IndexMap::new();
    let mut required = Vec::new();

    for parameter in &signature.parameters {
        let Some(ty) = &parameter.ty else {
            continue;
        };

        let (is_optional, inner) = unwrap_optional(ty);

        let mut property = match literal_values(inner) {
            Some(values) => Property {
                kind: Kind::String,
                choices: Some(values.to_vec()),
                description: None,
            },
            None => Property {
                kind: base_kind(inner),
                choices: None,
                description: None,
            },
        };

        let description = scrape(&signature.doc, &parameter.name);

        if !description.is_empty() {
            property.description = Some(description);
        }

        properties.insert(parameter.name.clone(), property);

        if !is_optional && !parameter.has_default {
            required.push(parameter.name.clone());
        }
    }

    Tool::Function {
        function: Function {
            name: signature.name.clone(),
            description: signature.doc.clone(),
            parameters: Parameters::Object {
                properties,
                required,
            },
        },
    }
}

/// Unwraps an optional declaration to its inner type.
///
/// A union counts as optional when one of its members is null; the first
/// non-null member stands in for the rest. Unions without a null member
/// are left whole and fall through the base mapping.
fn unwrap_optional(ty: &Type) -> (bool, &Type) {
    match ty {
        Type::Optional(inner) => (true, inner),
        Type::Union(members) if members.iter().any(|member| *member == Type::Null) => {
            match members.iter().find(|member| **member != Type::Null) {
                Some(inner) => (true, inner),
                None => (false, ty),
            }
        }
        _ => (false, ty),
    }
}

fn literal_values(ty: &Type) -> Option<&[String]> {
    match ty {
        Type::Literal(values) if !values.is_empty() => Some(values),
        _ => None,
    }
}

fn base_kind(ty: &Type) -> Kind {
    match ty {
        Type::Text => Kind::String,
        Type::Integer => Kind::Integer,
        Type::Float => Kind::Number,
        Type::Bool => Kind::Boolean,
        Type::List => Kind::Array,
        Type::Map => Kind::Object,
        _ => Kind::String,
    }
}

/// Pulls a parameter description out of a doc block.
///
/// The first line whose trimmed text starts with the parameter name and
/// carries a colon wins; everything after the first colon, trimmed, is the
/// description. A matching line without a colon keeps the scan going. Any
/// line starting with the name matches, related to the parameter or not.
fn scrape(doc: &str, name: &str) -> String {
    for line in doc.lines() {
        if !line.trim().starts_with(name) {
            continue;
        }

        if let Some((_, rest)) = line.split_once(':') {
            return rest.trim().to_owned();
        }
    }

    String::new()
}
