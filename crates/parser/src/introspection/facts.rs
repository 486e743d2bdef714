//! Raw facts about handlers and types
//!
//! These mirror what a static-analysis or reflection pass can observe about
//! annotated handler methods, with no interpretation applied yet.

use super::TypeRef;
use serde::{Deserialize, Serialize};

/// One handler method bound to an HTTP route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointFacts {
    /// Qualified name of the declaring handler class
    pub handler: String,
    /// Class-level route prefix
    #[serde(default)]
    pub handler_path: String,
    /// Group id; defaults to the handler name
    #[serde(default)]
    pub group_id: Option<String>,
    pub method_name: String,
    /// Name given on the route mapping itself
    #[serde(default)]
    pub mapping_name: Option<String>,
    pub http_method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub parameters: Vec<ParameterFacts>,
    #[serde(default = "void_type")]
    pub return_type: TypeRef,
    #[serde(default)]
    pub comment: CommentFacts,
    /// Simple names of the declared thrown exceptions
    #[serde(default)]
    pub throws: Vec<String>,
}

fn void_type() -> TypeRef {
    TypeRef::named("void")
}

/// One declared method parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterFacts {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub is_enum: bool,
    #[serde(default)]
    pub binding: Binding,
}

/// How a parameter is bound to the request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Binding {
    #[serde(rename_all = "camelCase")]
    Path {
        #[serde(default)]
        name: Option<String>,
        #[serde(default = "yes")]
        required: bool,
    },
    #[serde(rename_all = "camelCase")]
    Query {
        #[serde(default)]
        name: Option<String>,
        #[serde(default = "yes")]
        required: bool,
        #[serde(default)]
        default_value: Option<String>,
    },
    Body,
    #[serde(rename_all = "camelCase")]
    Header {
        #[serde(default)]
        name: Option<String>,
        #[serde(default = "yes")]
        required: bool,
        #[serde(default)]
        default_value: Option<String>,
    },
    /// Members of the parameter type become individual query parameters
    QueryObject,
    /// Custom pagination object with declared defaults
    PageDefaults {
        #[serde(default)]
        page: u32,
        #[serde(default = "default_page_size")]
        size: u32,
        #[serde(default)]
        offset: u32,
        #[serde(default)]
        column: Option<String>,
        #[serde(default)]
        direction: Option<String>,
    },
    /// No binding annotation; treated as a query parameter
    #[default]
    Unbound,
}

fn yes() -> bool {
    true
}

fn default_page_size() -> u32 {
    10
}

/// Structured doc comment of a method or type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentFacts {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<CommentTag>,
}

impl CommentFacts {
    /// First non-empty line of the description
    pub fn first_line(&self) -> Option<&str> {
        self.description
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
    }
}

/// One `@tag name value` entry of a doc comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentTag {
    pub tag: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl CommentTag {
    pub fn name_str(&self) -> &str {
        self.name.as_deref().map(str::trim).unwrap_or_default()
    }

    pub fn value_str(&self) -> &str {
        self.value.as_deref().map(str::trim).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Object,
    Enum,
}

/// Declared shape of one referenced type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeFacts {
    pub class_path: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub superclass: Option<String>,
    /// Own members only; inherited members come from the superclass facts
    #[serde(default)]
    pub members: Vec<MemberFacts>,
    #[serde(default)]
    pub constants: Vec<ConstantFacts>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberFacts {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub is_enum: bool,
    #[serde(default)]
    pub required: bool,
    /// Excluded from serialization by the service
    #[serde(default)]
    pub ignored: bool,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantFacts {
    pub name: String,
    #[serde(default)]
    pub comment: String,
}

/// One exception type and the error codes it carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionFacts {
    /// Simple class name, e.g. `UserNotFoundException`
    pub name: String,
    /// Status code declared on the exception
    #[serde(default)]
    pub status: Option<u16>,
    /// Status constant name declared on the exception, e.g. `NOT_FOUND`
    #[serde(default)]
    pub status_name: Option<String>,
    /// Parent exception simple name, consulted for the known-status table
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub codes: Vec<ErrorCodeFacts>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCodeFacts {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub message_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_defaults() {
        let param: ParameterFacts = serde_json::from_str(
            r#"{"name": "id", "type": "java.lang.Long", "binding": {"kind": "path"}}"#,
        )
        .unwrap();
        assert_eq!(
            param.binding,
            Binding::Path {
                name: None,
                required: true
            }
        );

        let unbound: ParameterFacts =
            serde_json::from_str(r#"{"name": "q", "type": "java.lang.String"}"#).unwrap();
        assert_eq!(unbound.binding, Binding::Unbound);
    }

    #[test]
    fn test_page_defaults_binding() {
        let param: ParameterFacts = serde_json::from_str(
            r#"{
                "name": "page",
                "type": "one.axim.framework.core.data.XPageNation",
                "binding": {"kind": "pageDefaults", "size": 30, "column": "id", "direction": "DESC"}
            }"#,
        )
        .unwrap();
        match param.binding {
            Binding::PageDefaults { page, size, offset, column, .. } => {
                assert_eq!((page, size, offset), (0, 30, 0));
                assert_eq!(column.as_deref(), Some("id"));
            }
            other => panic!("unexpected binding {:?}", other),
        }
    }

    #[test]
    fn test_comment_first_line() {
        let comment = CommentFacts {
            description: "\n  Find a user\nby id".to_string(),
            tags: vec![],
        };
        assert_eq!(comment.first_line(), Some("Find a user"));
    }
}
