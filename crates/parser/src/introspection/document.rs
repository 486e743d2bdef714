//! JSON facts file

use super::{EndpointFacts, ExceptionFacts, IntrospectionProvider, TypeFacts};
use indexmap::IndexMap;
use restmeta_common::{GeneratorError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFacts {
    #[serde(default)]
    endpoints: Vec<EndpointFacts>,
    #[serde(default)]
    types: Vec<TypeFacts>,
    #[serde(default)]
    exceptions: Vec<ExceptionFacts>,
    #[serde(default)]
    error_response: Option<String>,
}

/// Facts loaded from a JSON document
///
/// ```json
/// {
///   "endpoints": [ { "handler": "...", "methodName": "...", ... } ],
///   "types": [ { "classPath": "...", "members": [ ... ] } ],
///   "exceptions": [ { "name": "UserNotFoundException", "codes": [ ... ] } ],
///   "errorResponse": "com.example.ErrorResponse"
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FactsDocument {
    endpoints: Vec<EndpointFacts>,
    types: IndexMap<String, TypeFacts>,
    exceptions: Vec<ExceptionFacts>,
    error_response: Option<String>,
}

impl FactsDocument {
    /// Load facts from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            GeneratorError::Parse(format!(
                "Failed to read facts file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_json(&content)
    }

    /// Parse facts from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawFacts = serde_json::from_str(json)
            .map_err(|e| GeneratorError::Parse(format!("Failed to parse facts JSON: {}", e)))?;

        let types = raw
            .types
            .into_iter()
            .map(|t| (t.class_path.clone(), t))
            .collect();

        Ok(Self {
            endpoints: raw.endpoints,
            types,
            exceptions: raw.exceptions,
            error_response: raw.error_response,
        })
    }

    /// Number of endpoints and types in the document
    pub fn counts(&self) -> (usize, usize) {
        (self.endpoints.len(), self.types.len())
    }
}

impl IntrospectionProvider for FactsDocument {
    fn endpoints(&self) -> Result<Vec<EndpointFacts>> {
        Ok(self.endpoints.clone())
    }

    fn type_facts(&self, class_path: &str) -> Result<TypeFacts> {
        self.types.get(class_path).cloned().ok_or_else(|| {
            GeneratorError::Resolution(format!("No facts for type {}", class_path))
        })
    }

    fn exceptions(&self) -> Result<Vec<ExceptionFacts>> {
        Ok(self.exceptions.clone())
    }

    fn error_response_type(&self) -> Option<String> {
        self.error_response.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_facts() {
        let doc = FactsDocument::from_json(
            r#"{
                "endpoints": [{
                    "handler": "com.example.UserController",
                    "methodName": "getUser",
                    "httpMethod": "GET",
                    "path": "/users/{id}",
                    "returnType": "com.example.UserDto"
                }],
                "types": [{"classPath": "com.example.UserDto"}]
            }"#,
        )
        .unwrap();

        assert_eq!(doc.counts(), (1, 1));
        assert!(doc.type_facts("com.example.UserDto").is_ok());
        assert!(matches!(
            doc.type_facts("com.example.Missing"),
            Err(GeneratorError::Resolution(_))
        ));
        assert_eq!(doc.error_response_type(), None);
    }

    #[test]
    fn test_void_return_default() {
        let doc = FactsDocument::from_json(
            r#"{"endpoints": [{"handler": "h", "methodName": "m", "httpMethod": "DELETE"}]}"#,
        )
        .unwrap();
        let endpoints = doc.endpoints().unwrap();
        assert_eq!(endpoints[0].return_type.path, "void");
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            FactsDocument::from_json("{ not json"),
            Err(GeneratorError::Parse(_))
        ));
    }
}
