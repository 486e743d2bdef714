//! Postman collection v2.1.0 and environment documents
//!
//! The same types read a previously published collection back, so every
//! optional member has a default and a URL may arrive as a bare string.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const COLLECTION_SCHEMA: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub info: CollectionInfo,

    #[serde(default)]
    pub item: Vec<Item>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
}

impl Collection {
    /// Every request item, folders flattened, in document order
    pub fn requests(&self) -> Vec<&Item> {
        let mut out = Vec::new();
        let mut stack: Vec<&Item> = self.item.iter().rev().collect();
        while let Some(item) = stack.pop() {
            if item.request.is_some() {
                out.push(item);
            }
            if let Some(children) = &item.item {
                stack.extend(children.iter().rev());
            }
        }
        out
    }

    /// Request item with the given id, searched through all folders
    pub fn find_request(&self, id: &str) -> Option<&Item> {
        self.requests()
            .into_iter()
            .find(|item| item.id.as_deref() == Some(id))
    }

    pub fn folder(&self, name: &str) -> Option<&Item> {
        self.item
            .iter()
            .find(|item| item.item.is_some() && item.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    #[serde(rename = "_postman_id", default, skip_serializing_if = "Option::is_none")]
    pub postman_id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_schema")]
    pub schema: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

fn default_schema() -> String {
    COLLECTION_SCHEMA.to_string()
}

/// A folder (has `item`) or a request (has `request`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<Item>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,

    /// Saved responses, kept verbatim across republishing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub response: Vec<Value>,
}

impl Item {
    pub fn folder(id: String, name: &str, children: Vec<Item>) -> Self {
        Self {
            id: Some(id),
            name: name.to_string(),
            item: Some(children),
            request: None,
            response: vec![],
        }
    }

    pub fn children(&self) -> &[Item] {
        self.item.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,

    #[serde(default)]
    pub header: Vec<Header>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,

    pub url: Url,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,

    #[serde(default)]
    pub value: String,

    #[serde(rename = "type", default = "default_text")]
    pub header_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_text() -> String {
    "text".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "UrlRepr")]
pub struct Url {
    pub raw: String,

    #[serde(default)]
    pub host: Vec<String>,

    #[serde(default)]
    pub path: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<QueryParam>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variable: Vec<PathVariable>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UrlRepr {
    Raw(String),
    Full {
        #[serde(default)]
        raw: String,
        #[serde(default)]
        host: Vec<String>,
        #[serde(default)]
        path: Vec<String>,
        #[serde(default)]
        query: Vec<QueryParam>,
        #[serde(default)]
        variable: Vec<PathVariable>,
    },
}

impl From<UrlRepr> for Url {
    fn from(repr: UrlRepr) -> Self {
        match repr {
            UrlRepr::Raw(raw) => Url {
                raw,
                ..Default::default()
            },
            UrlRepr::Full {
                raw,
                host,
                path,
                query,
                variable,
            } => Url {
                raw,
                host,
                path,
                query,
                variable,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParam {
    pub key: String,

    #[serde(default)]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathVariable {
    pub key: String,

    #[serde(default)]
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub mode: String,

    #[serde(default)]
    pub raw: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl Body {
    /// Raw JSON body
    pub fn json(raw: String) -> Self {
        Self {
            mode: "raw".to_string(),
            raw,
            options: Some(serde_json::json!({"raw": {"language": "json"}})),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auth {
    #[serde(rename = "type")]
    pub auth_type: String,

    #[serde(default)]
    pub apikey: Vec<AuthAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthAttribute {
    pub key: String,

    pub value: String,

    #[serde(rename = "type", default = "default_string")]
    pub attribute_type: String,
}

fn default_string() -> String {
    "string".to_string()
}

impl AuthAttribute {
    pub fn string(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            attribute_type: default_string(),
        }
    }
}

/// Postman environment document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub values: Vec<EnvironmentValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentValue {
    pub key: String,

    #[serde(default)]
    pub value: String,

    #[serde(rename = "type", default = "default_env_type")]
    pub value_type: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_env_type() -> String {
    "default".to_string()
}

fn default_enabled() -> bool {
    true
}
