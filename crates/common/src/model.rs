//! Intermediate representation of endpoints and models
//!
//! These types are written to disk verbatim as the per-endpoint and per-model
//! documents, so their serialized names follow the camelCase document format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a result set is wrapped into pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagingType {
    /// `org.springframework.data.domain.Page`
    Spring,
    /// `one.axim.framework.core.data.XPage`
    Xpage,
}

impl PagingType {
    /// Prefix used for synthesized wrapper schema names
    pub fn schema_prefix(&self) -> &'static str {
        match self {
            PagingType::Spring => "SpringPage",
            PagingType::Xpage => "XPage",
        }
    }
}

/// Classification of an endpoint's return value after envelope peeling
///
/// A return is either plain, a sequence of content, or a page of content.
/// Keeping this as one value makes "array and paged at once" unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "ReturnShapeFlags", into = "ReturnShapeFlags")]
pub enum ReturnShape {
    #[default]
    Plain,
    Array,
    Paged(PagingType),
}

/// Document form of [`ReturnShape`]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReturnShapeFlags {
    #[serde(rename = "isArrayReturn", default)]
    pub is_array_return: bool,
    #[serde(rename = "isPaging", default)]
    pub is_paging: bool,
    #[serde(
        rename = "pagingType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub paging_type: Option<PagingType>,
}

impl From<ReturnShapeFlags> for ReturnShape {
    fn from(flags: ReturnShapeFlags) -> Self {
        if flags.is_paging {
            ReturnShape::Paged(flags.paging_type.unwrap_or(PagingType::Spring))
        } else if flags.is_array_return {
            ReturnShape::Array
        } else {
            ReturnShape::Plain
        }
    }
}

impl From<ReturnShape> for ReturnShapeFlags {
    fn from(shape: ReturnShape) -> Self {
        match shape {
            ReturnShape::Plain => ReturnShapeFlags::default(),
            ReturnShape::Array => ReturnShapeFlags {
                is_array_return: true,
                ..Default::default()
            },
            ReturnShape::Paged(paging_type) => ReturnShapeFlags {
                is_array_return: false,
                is_paging: true,
                paging_type: Some(paging_type),
            },
        }
    }
}

/// Where a request parameter is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParameterKind {
    Path,
    Query,
    Body,
}

/// One documented HTTP endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDefinition {
    /// Stable id derived from url mapping, name and method
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub description: String,
    pub group: String,
    #[serde(default)]
    pub group_id: String,
    pub method: String,
    pub url_mapping: String,
    #[serde(default)]
    pub parameters: Vec<ApiParameter>,
    #[serde(default)]
    pub headers: Vec<ApiHeader>,
    /// Content type after peeling; `None` for void endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_class: Option<String>,
    #[serde(default)]
    pub return_description: String,
    #[serde(flatten)]
    pub return_shape: ReturnShape,
    #[serde(rename = "isNeedsSession", default)]
    pub needs_session: bool,
    #[serde(default)]
    pub response_status: BTreeMap<String, String>,
    #[serde(default)]
    pub errors: Vec<ErrorGroupDefinition>,
}

impl ApiDefinition {
    pub fn is_array_return(&self) -> bool {
        self.return_shape == ReturnShape::Array
    }

    pub fn is_paging(&self) -> bool {
        matches!(self.return_shape, ReturnShape::Paged(_))
    }

    pub fn paging_type(&self) -> Option<PagingType> {
        match self.return_shape {
            ReturnShape::Paged(paging_type) => Some(paging_type),
            _ => None,
        }
    }

    /// Parameters bound to the given location, in declaration order
    pub fn parameters_of(&self, kind: ParameterKind) -> impl Iterator<Item = &ApiParameter> {
        self.parameters
            .iter()
            .filter(move |p| p.parameter_kind == kind)
    }

    /// The request body parameter, if any
    pub fn body_parameter(&self) -> Option<&ApiParameter> {
        self.parameters_of(ParameterKind::Body).next()
    }
}

/// One request parameter of an endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiParameter {
    pub name: String,
    /// Primitive simple name, `Object` or `Enum`
    #[serde(rename = "type")]
    pub type_name: String,
    pub class_path: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "isOptional", default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    pub parameter_kind: ParameterKind,
    #[serde(rename = "isEnum", default)]
    pub is_enum: bool,
    /// Sequence of `class_path` values rather than a single one
    #[serde(rename = "isArray", default)]
    pub is_array: bool,
}

/// One request header of an endpoint or of the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHeader {
    pub name: String,
    #[serde(rename = "type", default = "default_header_type")]
    pub type_name: String,
    #[serde(default = "default_header_class_path")]
    pub class_path: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "isOptional", default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

fn default_header_type() -> String {
    "String".to_string()
}

fn default_header_class_path() -> String {
    "java.lang.String".to_string()
}

impl ApiHeader {
    /// A required string header with the given description
    pub fn string(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: default_header_type(),
            class_path: default_header_class_path(),
            description: description.to_string(),
            optional: false,
            default_value: None,
        }
    }
}

/// Whether a model document describes a composite or an enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    Object,
    Enum,
}

/// Classification of one model field
///
/// Serialized as `Object`, `Array`, `Enum`, or the primitive's simple name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    Primitive(String),
    Object,
    Array,
    Enum,
}

impl FieldKind {
    /// True for kinds that reference another model document
    pub fn is_reference(&self) -> bool {
        !matches!(self, FieldKind::Primitive(_))
    }

    pub fn label(&self) -> &str {
        match self {
            FieldKind::Primitive(name) => name,
            FieldKind::Object => "Object",
            FieldKind::Array => "Array",
            FieldKind::Enum => "Enum",
        }
    }
}

impl From<String> for FieldKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Object" => FieldKind::Object,
            "Array" => FieldKind::Array,
            "Enum" => FieldKind::Enum,
            _ => FieldKind::Primitive(value),
        }
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Primitive(name) => name,
            other => other.label().to_string(),
        }
    }
}

/// One materialized Object or Enum type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiModelDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ModelKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<ApiField>,
}

impl ApiModelDefinition {
    pub fn is_enum(&self) -> bool {
        self.kind == ModelKind::Enum
    }

    /// Constant names of an enum model, in declaration order
    pub fn constant_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// One member of a model, or one constant of an enum model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Declared type; the element type for arrays and pages
    pub class_path: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "isOptional", default = "default_true")]
    pub optional: bool,
    /// Set when the field is a page of `class_path` values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging_type: Option<PagingType>,
}

fn default_true() -> bool {
    true
}

/// Error codes raised by one exception type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorGroupDefinition {
    pub group: String,
    pub exception: String,
    pub status: u16,
    #[serde(default)]
    pub codes: Vec<ErrorCodeEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCodeEntry {
    pub code: String,
    pub name: String,
    pub message_key: String,
    pub message: String,
}
