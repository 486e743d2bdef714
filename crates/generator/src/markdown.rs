//! Markdown request descriptions
//!
//! Postman shows a request's description next to the request, so each item
//! carries tables of its path and query parameters and of the request and
//! response models.

use crate::templates;
use crate::ModelMap;
use indexmap::IndexSet;
use restmeta_common::{
    simple_name, ApiDefinition, ApiModelDefinition, ApiParameter, FieldKind, GeneratorError, ParameterKind,
    Result, TypeConventions,
};
use serde::Serialize;
use tera::{Context, Tera};

#[derive(Debug, Serialize)]
struct ParameterRow {
    name: String,
    type_name: String,
    required: bool,
    default_value: String,
    description: String,
}

#[derive(Debug, Serialize)]
struct FieldRow {
    name: String,
    type_name: String,
    required: bool,
    description: String,
}

/// Renders the markdown description of an endpoint
pub struct DescriptionRenderer<'a> {
    tera: Tera,
    models: &'a ModelMap,
    conventions: &'a TypeConventions,
}

impl<'a> DescriptionRenderer<'a> {
    pub fn new(models: &'a ModelMap, conventions: &'a TypeConventions) -> Result<Self> {
        Ok(Self {
            tera: templates::load_templates()?,
            models,
            conventions,
        })
    }

    pub fn describe(&self, def: &ApiDefinition) -> Result<String> {
        let mut out = String::new();
        if !def.description.trim().is_empty() {
            out.push_str(def.description.trim());
            out.push_str("\n\n");
        }

        let path_rows: Vec<ParameterRow> = def
            .parameters_of(ParameterKind::Path)
            .map(|p| ParameterRow {
                name: p.name.clone(),
                type_name: display_type(p),
                required: true,
                default_value: String::new(),
                description: p.description.clone(),
            })
            .collect();
        if !path_rows.is_empty() {
            out.push_str(&self.parameter_table("Path Parameters", &path_rows)?);
        }

        let mut query_rows = Vec::new();
        for param in def.parameters_of(ParameterKind::Query) {
            if param.class_path == self.conventions.xpage_nation {
                query_rows.push(page_row("size", "10", "Page size"));
                query_rows.push(page_row("page", "1", "Page number"));
                continue;
            }
            query_rows.push(ParameterRow {
                name: param.name.clone(),
                type_name: display_type(param),
                required: !param.optional,
                default_value: param.default_value.clone().unwrap_or_default(),
                description: param.description.clone(),
            });
        }
        if !query_rows.is_empty() {
            out.push_str(&self.parameter_table("Query Parameters", &query_rows)?);
        }

        if let Some(body) = def.body_parameter() {
            for model in self.model_closure(&body.class_path) {
                out.push_str(&self.model_table("Request", model)?);
            }
        }

        if let Some(return_class) = def.return_class.as_deref() {
            for model in self.model_closure(return_class) {
                out.push_str(&self.model_table("Response", model)?);
            }
        }

        Ok(out)
    }

    fn parameter_table(&self, title: &str, rows: &[ParameterRow]) -> Result<String> {
        let mut context = Context::new();
        context.insert("title", title);
        context.insert("rows", rows);
        self.render("parameters.md", &context)
    }

    fn model_table(&self, title: &str, model: &ApiModelDefinition) -> Result<String> {
        let rows: Vec<FieldRow> = model
            .fields
            .iter()
            .map(|f| FieldRow {
                name: f.name.clone(),
                type_name: match (&f.kind, f.paging_type) {
                    (_, Some(paging_type)) => {
                        format!("{}<{}>", paging_type.schema_prefix(), simple_name(&f.class_path))
                    }
                    (FieldKind::Primitive(name), None) => name.clone(),
                    (FieldKind::Object, None) => simple_name(&f.class_path).to_string(),
                    (FieldKind::Array, None) => format!("List<{}>", simple_name(&f.class_path)),
                    (FieldKind::Enum, None) => "Enum".to_string(),
                },
                required: !f.optional,
                description: self.field_description(&f.kind, &f.class_path, &f.description),
            })
            .collect();

        let mut context = Context::new();
        context.insert("title", title);
        context.insert("name", &model.name);
        context.insert("description", &model.description);
        context.insert("rows", &rows);
        self.render("model.md", &context)
    }

    fn render(&self, template: &str, context: &Context) -> Result<String> {
        self.tera
            .render(template, context)
            .map_err(|e| {
                GeneratorError::Template(format!("Failed to render {}: {:?}", template, e))
            })
    }

    /// Enum fields list their constants after the description
    fn field_description(&self, kind: &FieldKind, class_path: &str, description: &str) -> String {
        match (kind, self.models.get(class_path)) {
            (FieldKind::Enum, Some(model)) => {
                let listing = model.constant_names().join(" | ");
                if description.is_empty() {
                    format!("( {} )", listing)
                } else {
                    format!("{} ( {} )", description, listing)
                }
            }
            _ => description.to_string(),
        }
    }

    /// Object models reachable from a root, root first, each once
    fn model_closure(&self, root: &str) -> Vec<&'a ApiModelDefinition> {
        let models = self.models;
        let mut seen: IndexSet<&str> = IndexSet::new();
        let mut queue = vec![root.to_string()];
        let mut out = Vec::new();

        while !queue.is_empty() {
            let class_path = queue.remove(0);
            let Some((key, model)) = models.get_key_value(class_path.as_str()) else {
                continue;
            };
            if model.is_enum() || !seen.insert(key.as_str()) {
                continue;
            }
            for field in &model.fields {
                if matches!(field.kind, FieldKind::Object | FieldKind::Array) {
                    queue.push(field.class_path.clone());
                }
            }
            out.push(model);
        }
        out
    }
}

fn page_row(name: &str, default_value: &str, description: &str) -> ParameterRow {
    ParameterRow {
        name: name.to_string(),
        type_name: "Integer".to_string(),
        required: false,
        default_value: default_value.to_string(),
        description: description.to_string(),
    }
}

fn display_type(param: &ApiParameter) -> String {
    if param.is_array {
        format!("List<{}>", simple_name(&param.class_path))
    } else if param.type_name == "Object" {
        simple_name(&param.class_path).to_string()
    } else {
        param.type_name.clone()
    }
}
