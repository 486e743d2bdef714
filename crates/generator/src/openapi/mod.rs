//! OpenAPI 3.0.3 rendering
//!
//! Turns endpoint definitions and the resolved model set into one OpenAPI
//! document. Page wrappers are synthesized per content type, and every
//! reachable model becomes a component schema.

mod components;
pub mod types;

pub use types::*;

use crate::ModelMap;
use components::ComponentSchemas;
use indexmap::{IndexMap, IndexSet};
use restmeta_common::{
    merge_headers, ApiDefinition, ApiParameter, GeneratorError, ParameterKind, PrimitiveTable,
    Result, ReturnShape, ServiceDefinition, TypeConventions,
};
use serde_json::Value;
use tracing::{debug, info};

pub const OPENAPI_VERSION: &str = "3.0.3";

/// Name of the header API key security scheme
pub const API_KEY_SCHEME: &str = "ApiKeyAuth";

/// Renders an [`OpenApiDocument`]
pub struct OpenApiRenderer<'a> {
    service: &'a ServiceDefinition,
    conventions: &'a TypeConventions,
    models: &'a ModelMap,
    primitives: PrimitiveTable,
}

impl<'a> OpenApiRenderer<'a> {
    pub fn new(
        service: &'a ServiceDefinition,
        conventions: &'a TypeConventions,
        models: &'a ModelMap,
    ) -> Self {
        Self {
            service,
            conventions,
            models,
            primitives: PrimitiveTable,
        }
    }

    /// Render the document for a set of endpoints
    ///
    /// Fails when two endpoints map to the same path and method, or when two
    /// distinct types would share one component schema name.
    pub fn render<'d, I>(&self, definitions: I) -> Result<OpenApiDocument>
    where
        I: IntoIterator<Item = &'d ApiDefinition>,
    {
        let mut components = ComponentSchemas::new(self.models, self.conventions);
        let mut paths: IndexMap<String, PathItem> = IndexMap::new();
        let mut owners: IndexMap<(String, String), String> = IndexMap::new();
        let mut tags: IndexSet<String> = IndexSet::new();

        for def in definitions {
            let path = format!("/{}{}", self.service.version, def.url_mapping);
            let method = def.method.to_ascii_lowercase();

            if let Some(first) = owners.get(&(path.clone(), method.clone())) {
                return Err(GeneratorError::DuplicateOperation {
                    method: def.method.clone(),
                    path,
                    first: first.clone(),
                    second: def.name.clone(),
                });
            }

            let operation = self.operation(def, &mut components)?;
            let slot = paths.entry(path.clone()).or_default().slot_mut(&method).ok_or_else(|| {
                GeneratorError::Generation(format!(
                    "Unsupported HTTP method '{}' for {}",
                    def.method, path
                ))
            })?;
            *slot = Some(operation);

            debug!(path = %path, method = %method, "rendered operation");
            owners.insert((path, method), def.name.clone());
            tags.insert(def.group.clone());
        }

        let mut security_schemes = IndexMap::new();
        if let Some(auth) = self.service.token_auth() {
            security_schemes.insert(
                API_KEY_SCHEME.to_string(),
                SecurityScheme {
                    scheme_type: "apiKey".to_string(),
                    location: "header".to_string(),
                    name: auth.header_key.clone(),
                    description: non_empty(&auth.description),
                },
            );
        }

        let document = OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info {
                title: self.service.display_name().to_string(),
                version: self.service.version.clone(),
                description: non_empty(&self.service.introduction),
            },
            servers: non_empty(&self.service.api_server_url)
                .map(|url| vec![Server { url, description: None }])
                .unwrap_or_default(),
            tags: tags.into_iter().map(|name| Tag { name }).collect(),
            paths,
            components: Components {
                schemas: components.finish()?,
                security_schemes,
            },
        };

        info!(
            paths = document.paths.len(),
            schemas = document.components.schemas.len(),
            "rendered OpenAPI document"
        );
        Ok(document)
    }

    fn operation(
        &self,
        def: &ApiDefinition,
        components: &mut ComponentSchemas<'_>,
    ) -> Result<Operation> {
        let mut parameters = Vec::new();

        for param in def.parameters_of(ParameterKind::Path) {
            parameters.push(Parameter {
                name: param.name.clone(),
                location: "path".to_string(),
                description: non_empty(&param.description),
                required: true,
                schema: self.parameter_schema(param, components)?,
            });
        }

        for param in def.parameters_of(ParameterKind::Query) {
            if param.class_path == self.conventions.xpage_nation {
                parameters.extend(page_nation_parameters());
                continue;
            }
            parameters.push(Parameter {
                name: param.name.clone(),
                location: "query".to_string(),
                description: non_empty(&param.description),
                required: !param.optional,
                schema: self.parameter_schema(param, components)?,
            });
        }

        for header in merge_headers(&def.headers, &self.service.headers) {
            let mut schema = Schema::of_type("string");
            schema.default = header.default_value.clone().map(Value::String);
            parameters.push(Parameter {
                name: header.name.clone(),
                location: "header".to_string(),
                description: non_empty(&header.description),
                required: !header.optional,
                schema: SchemaOrRef::inline(schema),
            });
        }

        let request_body = match def.body_parameter() {
            Some(body) => {
                let content = components.content(&body.class_path)?;
                Some(RequestBody {
                    description: non_empty(&body.description),
                    content: MediaType::json(listed(content, body.is_array)),
                    required: true,
                })
            }
            None => None,
        };

        let mut responses = IndexMap::new();
        for (code, description) in &def.response_status {
            let content = match (&def.return_class, code.starts_with('2')) {
                (Some(class_path), true) => {
                    MediaType::json(self.return_schema(def.return_shape, class_path, components)?)
                }
                _ => IndexMap::new(),
            };
            responses.insert(
                code.clone(),
                Response {
                    description: description.clone(),
                    content,
                },
            );
        }

        let security = if def.needs_session && self.service.token_auth().is_some() {
            let mut requirement = IndexMap::new();
            requirement.insert(API_KEY_SCHEME.to_string(), Vec::new());
            vec![requirement]
        } else {
            Vec::new()
        };

        Ok(Operation {
            summary: def.name.clone(),
            description: def.description.clone(),
            tags: vec![def.group.clone()],
            operation_id: def.id.clone(),
            parameters,
            request_body,
            responses,
            security,
        })
    }

    fn return_schema(
        &self,
        shape: ReturnShape,
        class_path: &str,
        components: &mut ComponentSchemas<'_>,
    ) -> Result<SchemaOrRef> {
        match shape {
            ReturnShape::Plain => components.content(class_path),
            ReturnShape::Array => Ok(SchemaOrRef::inline(Schema::array(
                components.content(class_path)?,
            ))),
            ReturnShape::Paged(paging_type) => components.wrapper(paging_type, class_path),
        }
    }

    /// Schema of a path or query parameter, an array of it for sequences
    fn parameter_schema(
        &self,
        param: &ApiParameter,
        components: &mut ComponentSchemas<'_>,
    ) -> Result<SchemaOrRef> {
        let schema = self.element_schema(param, components)?;
        Ok(listed(schema, param.is_array))
    }

    fn element_schema(
        &self,
        param: &ApiParameter,
        components: &mut ComponentSchemas<'_>,
    ) -> Result<SchemaOrRef> {
        if param.is_enum {
            // Listed inline, but the enum still gets its own component
            components.reference(&param.class_path)?;
            let constants = self
                .models
                .get(&param.class_path)
                .map(|m| m.constant_names())
                .unwrap_or_default();
            let mut schema = Schema::string_enum(constants);
            schema.default = param.default_value.clone().map(Value::String);
            return Ok(SchemaOrRef::inline(schema));
        }

        if !self.conventions.is_scalar(&param.class_path) {
            return components.content(&param.class_path);
        }

        let mut schema = Schema::primitive(self.primitives.schema_for(&param.class_path));
        schema.default = param
            .default_value
            .as_deref()
            .map(|v| typed_default(schema.schema_type.as_deref(), v));
        Ok(SchemaOrRef::inline(schema))
    }
}

/// Fixed `size`/`page` parameters standing in for an `XPageNation` argument
fn page_nation_parameters() -> Vec<Parameter> {
    [("size", "Page size", 10), ("page", "Page number", 1)]
        .into_iter()
        .map(|(name, description, default)| {
            let mut schema = Schema::typed("integer", "int32");
            schema.default = Some(Value::from(default));
            Parameter {
                name: name.to_string(),
                location: "query".to_string(),
                description: Some(description.to_string()),
                required: false,
                schema: SchemaOrRef::inline(schema),
            }
        })
        .collect()
}

fn listed(schema: SchemaOrRef, is_array: bool) -> SchemaOrRef {
    if is_array {
        SchemaOrRef::inline(Schema::array(schema))
    } else {
        schema
    }
}

/// Default value typed after the schema, text when it does not parse
fn typed_default(schema_type: Option<&str>, value: &str) -> Value {
    let parsed = match schema_type {
        Some("integer") => value.parse::<i64>().ok().map(Value::from),
        Some("number") => value.parse::<f64>().ok().map(Value::from),
        Some("boolean") => value.parse::<bool>().ok().map(Value::from),
        _ => None,
    };
    parsed.unwrap_or_else(|| Value::String(value.to_string()))
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
