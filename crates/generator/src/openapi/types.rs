//! OpenAPI 3.0 document types
//!
//! Only the parts of the format the renderer emits are modeled. Maps are
//! ordered so the rendered document is stable across runs.

use indexmap::IndexMap;
use restmeta_common::PrimitiveSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// OpenAPI document root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version (always "3.0.3")
    pub openapi: String,

    /// API metadata
    pub info: Info,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,

    /// Group names in first-seen order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,

    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,

    #[serde(default)]
    pub components: Components,
}

impl OpenApiDocument {
    /// Operation registered for a path and HTTP method
    pub fn operation(&self, path: &str, method: &str) -> Option<&Operation> {
        let item = self.paths.get(path)?;
        match method.to_ascii_lowercase().as_str() {
            "get" => item.get.as_ref(),
            "post" => item.post.as_ref(),
            "put" => item.put.as_ref(),
            "patch" => item.patch.as_ref(),
            "delete" => item.delete.as_ref(),
            "head" => item.head.as_ref(),
            "options" => item.options.as_ref(),
            _ => None,
        }
    }
}

/// API information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,

    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Server information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// Operations registered under one path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
}

impl PathItem {
    /// Slot for an HTTP method, `None` for methods OpenAPI does not model
    pub fn slot_mut(&mut self, method: &str) -> Option<&mut Option<Operation>> {
        match method.to_ascii_lowercase().as_str() {
            "get" => Some(&mut self.get),
            "post" => Some(&mut self.post),
            "put" => Some(&mut self.put),
            "patch" => Some(&mut self.patch),
            "delete" => Some(&mut self.delete),
            "head" => Some(&mut self.head),
            "options" => Some(&mut self.options),
            _ => None,
        }
    }
}

/// HTTP operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub summary: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(rename = "operationId")]
    pub operation_id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    #[serde(
        rename = "requestBody",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub request_body: Option<RequestBody>,

    /// Keyed by status code
    #[serde(default)]
    pub responses: IndexMap<String, Response>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<IndexMap<String, Vec<String>>>,
}

/// Parameter definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    /// Location: query, header, path
    #[serde(rename = "in")]
    pub location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    pub schema: SchemaOrRef,
}

/// Request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub content: IndexMap<String, MediaType>,

    #[serde(default)]
    pub required: bool,
}

/// Response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

/// Media type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: SchemaOrRef,
}

impl MediaType {
    /// `application/json` content map holding one schema
    pub fn json(schema: SchemaOrRef) -> IndexMap<String, MediaType> {
        let mut content = IndexMap::new();
        content.insert("application/json".to_string(), MediaType { schema });
        content
    }
}

/// Schema or reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    /// Reference to a component schema
    Reference {
        #[serde(rename = "$ref")]
        ref_path: String,
    },

    /// Inline schema
    Schema(Box<Schema>),
}

impl SchemaOrRef {
    /// Reference to `#/components/schemas/{name}`
    pub fn component(name: &str) -> Self {
        SchemaOrRef::Reference {
            ref_path: format!("#/components/schemas/{}", name),
        }
    }

    pub fn inline(schema: Schema) -> Self {
        SchemaOrRef::Schema(Box::new(schema))
    }

    /// The `$ref` target, if this is a reference
    pub fn ref_path(&self) -> Option<&str> {
        match self {
            SchemaOrRef::Reference { ref_path } => Some(ref_path),
            SchemaOrRef::Schema(_) => None,
        }
    }

    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            SchemaOrRef::Schema(schema) => Some(schema),
            SchemaOrRef::Reference { .. } => None,
        }
    }
}

/// Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Type: string, number, integer, boolean, array, object
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,

    /// Format (e.g., int32, int64, date-time)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Array element schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaOrRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Schema {
    pub fn of_type(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Default::default()
        }
    }

    /// Inline schema for a primitive table entry
    pub fn primitive(primitive: PrimitiveSchema) -> Self {
        Self {
            schema_type: Some(primitive.schema_type.to_string()),
            format: primitive.format.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn typed(schema_type: &str, format: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            format: Some(format.to_string()),
            ..Default::default()
        }
    }

    pub fn array(items: SchemaOrRef) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    /// String schema restricted to the given constants
    pub fn string_enum<I, S>(constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema_type: Some("string".to_string()),
            enum_values: constants
                .into_iter()
                .map(|c| Value::String(c.into()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        if !description.is_empty() {
            self.description = Some(description.to_string());
        }
        self
    }
}

/// Reusable components
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,

    #[serde(
        rename = "securitySchemes",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

/// Header API key security scheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,

    #[serde(rename = "in")]
    pub location: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reference_serializes_as_ref() {
        let value = serde_json::to_value(SchemaOrRef::component("UserDto")).unwrap();
        assert_eq!(value, json!({"$ref": "#/components/schemas/UserDto"}));
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let value = serde_json::to_value(Schema::typed("integer", "int64")).unwrap();
        assert_eq!(value, json!({"type": "integer", "format": "int64"}));
    }

    #[test]
    fn test_path_item_slots() {
        let mut item = PathItem::default();
        assert!(item.slot_mut("GET").is_some());
        assert!(item.slot_mut("delete").is_some());
        assert!(item.slot_mut("TRACE").is_none());
    }
}
