//! Component schema collection
//!
//! Schemas are added the first time something references them. Every schema
//! name is owned by exactly one class path (or one wrapper of a class path);
//! a second owner for the same name is an error rather than an overwrite.
//! Paging and sort carriers never get a component of their own.

use super::types::{Schema, SchemaOrRef};
use crate::ModelMap;
use indexmap::IndexMap;
use restmeta_common::{
    schema_name, simple_name, ApiModelDefinition, FieldKind, GeneratorError, PagingType,
    PrimitiveTable, Result, TypeConventions,
};
use tracing::{debug, warn};

pub(crate) struct ComponentSchemas<'a> {
    models: &'a ModelMap,
    conventions: &'a TypeConventions,
    primitives: PrimitiveTable,
    owners: IndexMap<String, String>,
    schemas: IndexMap<String, Schema>,
    pending: Vec<String>,
}

impl<'a> ComponentSchemas<'a> {
    pub fn new(models: &'a ModelMap, conventions: &'a TypeConventions) -> Self {
        Self {
            models,
            conventions,
            primitives: PrimitiveTable,
            owners: IndexMap::new(),
            schemas: IndexMap::new(),
            pending: Vec::new(),
        }
    }

    /// `$ref` to the model schema of a class path, queuing it on first use
    pub fn reference(&mut self, class_path: &str) -> Result<SchemaOrRef> {
        let name = schema_name(class_path);
        if self.claim(&name, class_path)? {
            self.pending.push(class_path.to_string());
        }
        Ok(SchemaOrRef::component(&name))
    }

    /// Inline schema for scalars and carriers, `$ref` for everything else
    pub fn content(&mut self, class_path: &str) -> Result<SchemaOrRef> {
        if self.conventions.is_scalar(class_path) {
            Ok(SchemaOrRef::inline(Schema::primitive(
                self.primitives.schema_for(class_path),
            )))
        } else if let Some(schema) = self.carrier_schema(class_path) {
            Ok(SchemaOrRef::inline(schema))
        } else {
            self.reference(class_path)
        }
    }

    /// Fixed shape of a request or sort carrier
    fn carrier_schema(&self, class_path: &str) -> Option<Schema> {
        let conventions = self.conventions;
        if class_path == conventions.sort {
            Some(sort_schema())
        } else if class_path == conventions.xorder {
            Some(order_schema())
        } else if class_path == conventions.pageable {
            Some(object(vec![
                ("page", int32()),
                ("size", int32()),
                ("sort", SchemaOrRef::inline(sort_schema())),
            ]))
        } else if class_path == conventions.xpage_nation {
            Some(object(vec![
                ("page", int32()),
                ("size", int32()),
                ("offset", int32()),
                ("sort", string()),
                ("orders", SchemaOrRef::inline(Schema::array(SchemaOrRef::inline(order_schema())))),
            ]))
        } else {
            None
        }
    }

    /// `$ref` to the page wrapper of a content type, synthesized on first use
    pub fn wrapper(&mut self, paging_type: PagingType, class_path: &str) -> Result<SchemaOrRef> {
        let name = format!("{}_{}", paging_type.schema_prefix(), schema_name(class_path));
        let owner = format!("{}<{}>", paging_type.schema_prefix(), class_path);

        if self.claim(&name, &owner)? {
            let content = self.content(class_path)?;
            let schema = match paging_type {
                PagingType::Spring => spring_page_schema(content, simple_name(class_path)),
                PagingType::Xpage => xpage_schema(content, simple_name(class_path)),
            };
            debug!(schema = %name, "synthesized page wrapper");
            self.schemas.insert(name.clone(), schema);
        }
        Ok(SchemaOrRef::component(&name))
    }

    /// Materialize every queued model, following field references
    pub fn finish(mut self) -> Result<IndexMap<String, Schema>> {
        let models = self.models;
        while let Some(class_path) = self.pending.pop() {
            let name = schema_name(&class_path);
            let schema = match models.get(&class_path) {
                Some(model) => self.model_schema(model)?,
                None => {
                    warn!(class_path = %class_path, "no model document for referenced type");
                    Schema::of_type("object")
                }
            };
            self.schemas.insert(name, schema);
        }

        self.schemas.sort_keys();
        Ok(self.schemas)
    }

    fn claim(&mut self, name: &str, owner: &str) -> Result<bool> {
        match self.owners.get(name) {
            Some(existing) if existing == owner => Ok(false),
            Some(existing) => Err(GeneratorError::SchemaNameCollision {
                name: name.to_string(),
                first: existing.clone(),
                second: owner.to_string(),
            }),
            None => {
                self.owners.insert(name.to_string(), owner.to_string());
                Ok(true)
            }
        }
    }

    fn model_schema(&mut self, model: &ApiModelDefinition) -> Result<Schema> {
        if model.is_enum() {
            return Ok(
                Schema::string_enum(model.constant_names()).with_description(&model.description)
            );
        }

        let mut schema = Schema::of_type("object").with_description(&model.description);
        for field in &model.fields {
            let property = match &field.kind {
                FieldKind::Primitive(_) => SchemaOrRef::inline(
                    Schema::primitive(self.primitives.schema_for(&field.class_path))
                        .with_description(&field.description),
                ),
                FieldKind::Array => {
                    let items = self.content(&field.class_path)?;
                    SchemaOrRef::inline(Schema::array(items).with_description(&field.description))
                }
                FieldKind::Object | FieldKind::Enum => {
                    let target = match field.paging_type {
                        Some(paging_type) => self.wrapper(paging_type, &field.class_path)?,
                        None => self.content(&field.class_path)?,
                    };
                    described(target, &field.description)
                }
            };
            if !field.optional {
                schema.required.push(field.name.clone());
            }
            schema.properties.insert(field.name.clone(), property);
        }
        Ok(schema)
    }
}

fn described(target: SchemaOrRef, description: &str) -> SchemaOrRef {
    if description.is_empty() {
        return target;
    }
    match target {
        SchemaOrRef::Schema(schema) => {
            SchemaOrRef::inline((*schema).with_description(description))
        }
        reference => SchemaOrRef::inline(Schema {
            description: Some(description.to_string()),
            all_of: vec![reference],
            ..Default::default()
        }),
    }
}

fn int32() -> SchemaOrRef {
    SchemaOrRef::inline(Schema::typed("integer", "int32"))
}

fn int64() -> SchemaOrRef {
    SchemaOrRef::inline(Schema::typed("integer", "int64"))
}

fn boolean() -> SchemaOrRef {
    SchemaOrRef::inline(Schema::of_type("boolean"))
}

fn string() -> SchemaOrRef {
    SchemaOrRef::inline(Schema::of_type("string"))
}

fn object(properties: Vec<(&str, SchemaOrRef)>) -> Schema {
    let mut schema = Schema::of_type("object");
    for (name, property) in properties {
        schema.properties.insert(name.to_string(), property);
    }
    schema
}

fn sort_schema() -> Schema {
    object(vec![
        ("sorted", boolean()),
        ("unsorted", boolean()),
        ("empty", boolean()),
    ])
}

fn order_schema() -> Schema {
    object(vec![("column", string()), ("direction", string())])
}

/// `org.springframework.data.domain.Page` of `content`
pub(crate) fn spring_page_schema(content: SchemaOrRef, label: &str) -> Schema {
    object(vec![
        ("content", SchemaOrRef::inline(Schema::array(content))),
        ("totalElements", int64()),
        ("totalPages", int32()),
        ("size", int32()),
        ("number", int32()),
        ("numberOfElements", int32()),
        ("first", boolean()),
        ("last", boolean()),
        ("empty", boolean()),
        ("sort", SchemaOrRef::inline(sort_schema())),
    ])
    .with_description(&format!("Page of {}", label))
}

/// `XPage` of `content`
pub(crate) fn xpage_schema(content: SchemaOrRef, label: &str) -> Schema {
    object(vec![
        ("page", int32()),
        ("size", int32()),
        ("offset", int32()),
        ("hasNext", boolean()),
        ("totalCount", int64()),
        ("sort", string()),
        ("orders", SchemaOrRef::inline(Schema::array(SchemaOrRef::inline(order_schema())))),
        ("pageRows", SchemaOrRef::inline(Schema::array(content))),
    ])
    .with_description(&format!("XPage of {}", label))
}
