//! Service-wide documentation settings

use crate::ApiHeader;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Description of the documented service as a whole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    pub service_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub api_server_url: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub env_variable: Vec<EnvironmentDefinition>,
    #[serde(default)]
    pub headers: Vec<ApiHeader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<ApiAuth>,
}

fn default_version() -> String {
    "v1.0".to_string()
}

impl ServiceDefinition {
    pub fn new(service_id: &str) -> Self {
        Self {
            service_id: service_id.to_string(),
            name: String::new(),
            introduction: String::new(),
            api_server_url: String::new(),
            version: default_version(),
            env_variable: vec![],
            headers: vec![],
            auth: None,
        }
    }

    /// Display name, falling back to the service id
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.service_id
        } else {
            &self.name
        }
    }

    /// Auth descriptor when it is the header token scheme
    pub fn token_auth(&self) -> Option<&ApiAuth> {
        self.auth.as_ref().filter(|a| a.is_token())
    }
}

/// Header-based API authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAuth {
    #[serde(rename = "type", default = "default_auth_type")]
    pub auth_type: String,
    pub header_key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub description: String,
}

fn default_auth_type() -> String {
    "token".to_string()
}

impl ApiAuth {
    pub fn is_token(&self) -> bool {
        self.auth_type == "token"
    }
}

/// One named variable set, published as a Postman environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postman_uid: Option<String>,
    #[serde(default)]
    pub variables: Vec<EnvironmentVariable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// Merges endpoint headers with the service's common headers
///
/// The result is keyed by header name in first-seen order. Endpoint headers
/// come first and win on collision.
pub fn merge_headers(endpoint: &[ApiHeader], common: &[ApiHeader]) -> Vec<ApiHeader> {
    let mut merged: IndexMap<String, ApiHeader> = IndexMap::new();
    for header in endpoint.iter().chain(common) {
        merged
            .entry(header.name.clone())
            .or_insert_with(|| header.clone());
    }
    merged.into_values().collect()
}
