//! Common types and utilities for restmeta
//!
//! This crate contains the intermediate representation shared by the parser,
//! generator and CLI: endpoint and model definitions, service configuration,
//! the primitive type table and the error type used across the workspace.

pub mod config;
pub mod conventions;
pub mod id;
pub mod model;
pub mod primitives;
pub mod service;

pub use config::ServiceConfig;
pub use conventions::TypeConventions;
pub use id::stable_id;
pub use model::{
    ApiDefinition, ApiField, ApiHeader, ApiModelDefinition, ApiParameter, ErrorCodeEntry,
    ErrorGroupDefinition, FieldKind, ModelKind, PagingType, ParameterKind, ReturnShape,
};
pub use primitives::{PrimitiveSchema, PrimitiveTable};
pub use service::{
    merge_headers, ApiAuth, EnvironmentDefinition, EnvironmentVariable, ServiceDefinition,
};

use thiserror::Error;

/// Errors that can occur while extracting or rendering API metadata
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Generation error: {0}")]
    Generation(String),

    /// An endpoint or model type could not be resolved from its facts
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// Two distinct types would share one `$ref` schema name
    #[error("Schema name '{name}' is claimed by both {first} and {second}")]
    SchemaNameCollision {
        name: String,
        first: String,
        second: String,
    },

    /// Two endpoints render to the same path and HTTP method
    #[error("Duplicate operation {method} {path} (endpoints {first} and {second})")]
    DuplicateOperation {
        method: String,
        path: String,
        first: String,
        second: String,
    },

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for restmeta operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Returns the simple name of a fully qualified path
///
/// Nested type separators (`$`) are kept; callers that need a schema-safe
/// name should use [`schema_name`].
pub fn simple_name(class_path: &str) -> &str {
    class_path.rsplit('.').next().unwrap_or(class_path)
}

/// Schema-safe simple name: last path segment with `$` replaced by `_`
pub fn schema_name(class_path: &str) -> String {
    simple_name(class_path).replace('$', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        assert_eq!(simple_name("com.example.dto.UserDto"), "UserDto");
        assert_eq!(simple_name("UserDto"), "UserDto");
        assert_eq!(simple_name("com.example.Outer$Inner"), "Outer$Inner");
    }

    #[test]
    fn test_schema_name_normalizes_nested_types() {
        assert_eq!(schema_name("com.example.Outer$Inner"), "Outer_Inner");
        assert_eq!(schema_name("java.lang.String"), "String");
    }

    #[test]
    fn test_collision_error_message() {
        let err = GeneratorError::SchemaNameCollision {
            name: "UserDto".to_string(),
            first: "a.UserDto".to_string(),
            second: "b.UserDto".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Schema name 'UserDto' is claimed by both a.UserDto and b.UserDto"
        );
    }
}
