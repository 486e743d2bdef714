//! Example payload synthesis
//!
//! Builds JSON example bodies from model documents. Scalars render as a
//! placeholder naming their declared class path, enums as the `A | B`
//! listing of their constants, and arrays as a single element list.

use crate::ModelMap;
use restmeta_common::{
    ApiDefinition, ApiField, ApiParameter, FieldKind, PagingType, ReturnShape, TypeConventions,
};
use serde_json::{Map, Value};
use tracing::debug;

const LONG: &str = "java.lang.Long";
const INTEGER: &str = "java.lang.Integer";
const BOOLEAN: &str = "java.lang.Boolean";
const STRING: &str = "java.lang.String";

/// Synthesizes example bodies from the resolved model set
pub struct ExampleSynthesizer<'a> {
    models: &'a ModelMap,
    conventions: &'a TypeConventions,
}

impl<'a> ExampleSynthesizer<'a> {
    pub fn new(models: &'a ModelMap, conventions: &'a TypeConventions) -> Self {
        Self {
            models,
            conventions,
        }
    }

    /// Example value for one type
    ///
    /// A type that is already being synthesized further up the current path
    /// renders as `{}`, so self-referencing models terminate.
    pub fn value_for(&self, class_path: &str) -> Value {
        self.value_in(class_path, &mut Vec::new())
    }

    /// Example value of a request parameter, a one element list for sequences
    pub fn parameter_value(&self, param: &ApiParameter) -> Value {
        let value = self.value_for(&param.class_path);
        if param.is_array {
            Value::Array(vec![value])
        } else {
            value
        }
    }

    /// Example response body of an endpoint, `None` for void endpoints
    pub fn response_body(&self, def: &ApiDefinition) -> Option<Value> {
        let class_path = def.return_class.as_deref()?;
        Some(self.shaped(def.return_shape, class_path))
    }

    /// Example value for a content type wrapped in a return shape
    pub fn shaped(&self, shape: ReturnShape, class_path: &str) -> Value {
        let content = self.value_for(class_path);
        match shape {
            ReturnShape::Plain => content,
            ReturnShape::Array => Value::Array(vec![content]),
            ReturnShape::Paged(paging_type) => page_wrapper(paging_type, content),
        }
    }

    fn value_in(&self, class_path: &str, in_progress: &mut Vec<String>) -> Value {
        if self.conventions.is_scalar(class_path) {
            return placeholder(class_path);
        }
        if let Some(value) = self.carrier_value(class_path) {
            return value;
        }

        let Some(model) = self.models.get(class_path) else {
            debug!(class_path = %class_path, "no model for example, using empty object");
            return Value::Object(Map::new());
        };

        if model.is_enum() {
            return Value::String(model.constant_names().join(" | "));
        }

        if in_progress.iter().any(|p| p == class_path) {
            return Value::Object(Map::new());
        }

        in_progress.push(class_path.to_string());
        let mut object = Map::new();
        for field in &model.fields {
            object.insert(field.name.clone(), self.field_value(field, in_progress));
        }
        in_progress.pop();

        Value::Object(object)
    }

    fn field_value(&self, field: &ApiField, in_progress: &mut Vec<String>) -> Value {
        if let Some(paging_type) = field.paging_type {
            return page_wrapper(paging_type, self.value_in(&field.class_path, in_progress));
        }
        match field.kind {
            FieldKind::Primitive(_) => placeholder(&field.class_path),
            FieldKind::Array => Value::Array(vec![self.value_in(&field.class_path, in_progress)]),
            FieldKind::Object | FieldKind::Enum => self.value_in(&field.class_path, in_progress),
        }
    }

    fn carrier_value(&self, class_path: &str) -> Option<Value> {
        let conventions = self.conventions;
        if class_path == conventions.sort {
            Some(sort_value())
        } else if class_path == conventions.xorder {
            Some(order_value())
        } else if class_path == conventions.pageable {
            Some(object(vec![
                ("page", placeholder(INTEGER)),
                ("size", placeholder(INTEGER)),
                ("sort", sort_value()),
            ]))
        } else if class_path == conventions.xpage_nation {
            Some(object(vec![
                ("page", placeholder(INTEGER)),
                ("size", placeholder(INTEGER)),
                ("offset", placeholder(INTEGER)),
                ("sort", placeholder(STRING)),
                ("orders", Value::Array(vec![order_value()])),
            ]))
        } else {
            None
        }
    }
}

fn placeholder(class_path: &str) -> Value {
    Value::String(class_path.to_string())
}

fn object(entries: Vec<(&str, Value)>) -> Value {
    Value::Object(
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect(),
    )
}

fn sort_value() -> Value {
    object(vec![
        ("sorted", placeholder(BOOLEAN)),
        ("unsorted", placeholder(BOOLEAN)),
        ("empty", placeholder(BOOLEAN)),
    ])
}

fn order_value() -> Value {
    object(vec![("column", placeholder(STRING)), ("direction", placeholder(STRING))])
}

/// Page wrapper fields with type placeholders around the content list
fn page_wrapper(paging_type: PagingType, content: Value) -> Value {
    match paging_type {
        PagingType::Spring => object(vec![
            ("content", Value::Array(vec![content])),
            ("totalElements", placeholder(LONG)),
            ("totalPages", placeholder(INTEGER)),
            ("size", placeholder(INTEGER)),
            ("number", placeholder(INTEGER)),
            ("numberOfElements", placeholder(INTEGER)),
            ("first", placeholder(BOOLEAN)),
            ("last", placeholder(BOOLEAN)),
            ("empty", placeholder(BOOLEAN)),
            ("sort", sort_value()),
        ]),
        PagingType::Xpage => object(vec![
            ("page", placeholder(INTEGER)),
            ("size", placeholder(INTEGER)),
            ("offset", placeholder(INTEGER)),
            ("hasNext", placeholder(BOOLEAN)),
            ("totalCount", placeholder(LONG)),
            ("sort", placeholder(STRING)),
            ("orders", Value::Array(vec![order_value()])),
            ("pageRows", Value::Array(vec![content])),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restmeta_common::{ApiModelDefinition, ModelKind, ParameterKind};
    use serde_json::json;

    fn field(name: &str, kind: FieldKind, class_path: &str) -> ApiField {
        ApiField {
            name: name.to_string(),
            kind,
            class_path: class_path.to_string(),
            description: String::new(),
            optional: true,
            paging_type: None,
        }
    }

    fn models() -> ModelMap {
        let mut models = ModelMap::new();
        models.insert(
            "com.example.Node".to_string(),
            ApiModelDefinition {
                name: "Node".to_string(),
                kind: ModelKind::Object,
                description: String::new(),
                fields: vec![
                    field("id", FieldKind::Primitive("Long".into()), "java.lang.Long"),
                    field("state", FieldKind::Enum, "com.example.State"),
                    field("parent", FieldKind::Object, "com.example.Node"),
                    field("children", FieldKind::Array, "com.example.Node"),
                ],
            },
        );
        models.insert(
            "com.example.State".to_string(),
            ApiModelDefinition {
                name: "State".to_string(),
                kind: ModelKind::Enum,
                description: String::new(),
                fields: vec![
                    field("OPEN", FieldKind::Primitive("String".into()), "java.lang.String"),
                    field("CLOSED", FieldKind::Primitive("String".into()), "java.lang.String"),
                ],
            },
        );
        models
    }

    #[test]
    fn test_self_reference_renders_empty_object() {
        let models = models();
        let conventions = TypeConventions::default();
        let synthesizer = ExampleSynthesizer::new(&models, &conventions);

        assert_eq!(
            synthesizer.value_for("com.example.Node"),
            json!({
                "id": "java.lang.Long",
                "state": "OPEN | CLOSED",
                "parent": {},
                "children": [{}]
            })
        );
    }

    #[test]
    fn test_spring_page_wraps_content() {
        let models = models();
        let conventions = TypeConventions::default();
        let synthesizer = ExampleSynthesizer::new(&models, &conventions);
        let value = synthesizer.shaped(ReturnShape::Paged(PagingType::Spring), "com.example.State");

        assert_eq!(value["content"], json!(["OPEN | CLOSED"]));
        assert_eq!(value["totalElements"], json!("java.lang.Long"));
        assert_eq!(value["sort"]["sorted"], json!("java.lang.Boolean"));
        assert_eq!(value["size"], json!("java.lang.Integer"));
    }

    #[test]
    fn test_xpage_and_array_shapes() {
        let models = models();
        let conventions = TypeConventions::default();
        let synthesizer = ExampleSynthesizer::new(&models, &conventions);

        let page = synthesizer.shaped(ReturnShape::Paged(PagingType::Xpage), "java.lang.String");
        assert_eq!(page["pageRows"], json!(["java.lang.String"]));
        assert_eq!(page["orders"][0]["column"], json!("java.lang.String"));

        let list = synthesizer.shaped(ReturnShape::Array, "java.lang.Integer");
        assert_eq!(list, json!(["java.lang.Integer"]));
    }

    #[test]
    fn test_unknown_model_is_empty_object() {
        let models = ModelMap::new();
        let conventions = TypeConventions::default();
        let synthesizer = ExampleSynthesizer::new(&models, &conventions);
        assert_eq!(synthesizer.value_for("com.example.Missing"), json!({}));
    }

    #[test]
    fn test_page_and_sort_fields_inline() {
        let mut models = models();
        let conventions = TypeConventions::default();
        let mut rows = field("rows", FieldKind::Object, "com.example.State");
        rows.paging_type = Some(PagingType::Xpage);
        models.insert(
            "com.example.Report".to_string(),
            ApiModelDefinition {
                name: "Report".to_string(),
                kind: ModelKind::Object,
                description: String::new(),
                fields: vec![field("sort", FieldKind::Object, &conventions.sort), rows],
            },
        );
        let synthesizer = ExampleSynthesizer::new(&models, &conventions);
        let value = synthesizer.value_for("com.example.Report");

        assert_eq!(value["sort"]["unsorted"], json!("java.lang.Boolean"));
        assert_eq!(value["rows"]["pageRows"], json!(["OPEN | CLOSED"]));
        assert_eq!(value["rows"]["totalCount"], json!("java.lang.Long"));
    }

    #[test]
    fn test_sequence_parameter_is_single_element_list() {
        let models = models();
        let conventions = TypeConventions::default();
        let synthesizer = ExampleSynthesizer::new(&models, &conventions);
        let param = ApiParameter {
            name: "states".to_string(),
            type_name: "Array".to_string(),
            class_path: "com.example.State".to_string(),
            description: String::new(),
            optional: false,
            default_value: None,
            parameter_kind: ParameterKind::Body,
            is_enum: false,
            is_array: true,
        };

        assert_eq!(synthesizer.parameter_value(&param), json!(["OPEN | CLOSED"]));
    }
}
