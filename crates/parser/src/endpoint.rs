//! Endpoint normalization
//!
//! Turns one handler method's [`EndpointFacts`] into an [`ApiDefinition`]:
//! envelope peeling of the return type, parameter classification, doc
//! comment tags, header merge, error links and the stable id.

use crate::error_catalog::ErrorCatalog;
use crate::introspection::{
    Binding, CommentTag, EndpointFacts, IntrospectionProvider, ParameterFacts, TypeRef,
};
use crate::resolver::declared_members;
use crate::type_mapper::TypeMapper;
use indexmap::IndexMap;
use restmeta_common::{
    merge_headers, simple_name, stable_id, ApiDefinition, ApiHeader, ApiParameter, ErrorGroupDefinition,
    FieldKind, GeneratorError, ParameterKind, Result, ReturnShape, ServiceDefinition,
    TypeConventions,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Group assigned to endpoints without a `@group` tag
pub const DEFAULT_GROUP: &str = "Ungrouped";

/// Outcome of peeling a declared return type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnResolution {
    /// Content type; `None` when the endpoint returns nothing
    pub content: Option<String>,
    pub shape: ReturnShape,
    /// An unresolved type variable was met and its erasure kept
    pub ambiguous: bool,
}

/// An endpoint that could not be normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEndpoint {
    pub handler: String,
    pub method_name: String,
    pub reason: String,
}

/// Result of normalizing every endpoint of a run
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    /// Definitions per declaring handler, in discovery order
    pub groups: IndexMap<String, Vec<ApiDefinition>>,
    /// Every model class path reachable from a parameter or return type
    pub references: BTreeSet<String>,
    pub skipped: Vec<SkippedEndpoint>,
}

impl BuildOutput {
    /// All definitions, handler by handler
    pub fn definitions(&self) -> impl Iterator<Item = &ApiDefinition> {
        self.groups.values().flatten()
    }

    pub fn endpoint_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Converts endpoint facts into API definitions
pub struct EndpointModelBuilder<'a> {
    provider: &'a dyn IntrospectionProvider,
    service: &'a ServiceDefinition,
    mapper: TypeMapper<'a>,
    errors: Option<&'a ErrorCatalog>,
}

impl<'a> EndpointModelBuilder<'a> {
    pub fn new(
        provider: &'a dyn IntrospectionProvider,
        service: &'a ServiceDefinition,
        conventions: &'a TypeConventions,
    ) -> Self {
        Self {
            provider,
            service,
            mapper: TypeMapper::new(conventions),
            errors: None,
        }
    }

    /// Link endpoints to the groups of this catalog
    pub fn with_errors(mut self, errors: &'a ErrorCatalog) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Normalize every endpoint the provider knows about
    ///
    /// Only a failure to list endpoints is returned as an error. An endpoint
    /// that fails to normalize is logged and recorded in
    /// [`BuildOutput::skipped`].
    pub fn build_all(&self) -> Result<BuildOutput> {
        let mut output = BuildOutput::default();

        for facts in self.provider.endpoints()? {
            let mut references = BTreeSet::new();
            match self.build(&facts, &mut references) {
                Ok(definition) => {
                    debug!(
                        handler = %facts.handler,
                        method = %definition.method,
                        url = %definition.url_mapping,
                        "normalized endpoint"
                    );
                    output.references.append(&mut references);
                    output
                        .groups
                        .entry(facts.handler.clone())
                        .or_default()
                        .push(definition);
                }
                Err(e) => {
                    warn!(
                        handler = %facts.handler,
                        method = %facts.method_name,
                        error = %e,
                        "skipping endpoint"
                    );
                    output.skipped.push(SkippedEndpoint {
                        handler: facts.handler.clone(),
                        method_name: facts.method_name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            endpoints = output.endpoint_count(),
            handlers = output.groups.len(),
            references = output.references.len(),
            skipped = output.skipped.len(),
            "built endpoint definitions"
        );
        Ok(output)
    }

    /// Normalize one endpoint, adding reachable models to `references`
    pub fn build(
        &self,
        facts: &EndpointFacts,
        references: &mut BTreeSet<String>,
    ) -> Result<ApiDefinition> {
        let method = facts.http_method.trim().to_uppercase();
        if method.is_empty() {
            return Err(GeneratorError::Resolution(format!(
                "{}#{} has no HTTP method",
                facts.handler, facts.method_name
            )));
        }

        let url_mapping = join_url(&facts.handler_path, &facts.path);
        let name = facts
            .mapping_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .or_else(|| facts.comment.first_line())
            .unwrap_or(facts.method_name.as_str())
            .to_string();

        let mut parameters: IndexMap<String, ApiParameter> = IndexMap::new();
        let mut headers: IndexMap<String, ApiHeader> = IndexMap::new();
        for param in &facts.parameters {
            self.classify_parameter(param, &mut parameters, &mut headers, references)?;
        }

        let mut tags = TagSummary::default();
        for tag in &facts.comment.tags {
            self.apply_tag(tag, &mut parameters, &mut headers, &mut tags);
        }
        self.link_declared_throws(&facts.throws, &mut tags);

        let resolution = self.resolve_return(&facts.return_type);
        if resolution.ambiguous {
            warn!(
                handler = %facts.handler,
                method = %facts.method_name,
                return_type = %facts.return_type,
                kept = resolution.content.as_deref().unwrap_or("void"),
                "unresolved type variable in return type, keeping erasure"
            );
        }
        if let Some(content) = &resolution.content {
            if self.mapper.is_model(content) {
                references.insert(content.clone());
            }
        }

        let mut response_status = tags.response_status;
        if !tags.has_response_tag {
            response_status.insert("200".to_string(), "Success".to_string());
        }
        for error in &tags.errors {
            response_status.insert(error.status.to_string(), error.group.clone());
        }

        let endpoint_headers: Vec<ApiHeader> = headers.into_values().collect();

        Ok(ApiDefinition {
            id: stable_id(&[url_mapping.as_str(), name.as_str(), method.as_str()]),
            name,
            class_name: tags.class_name,
            description: facts.comment.description.trim().to_string(),
            group: tags.group.unwrap_or_else(|| DEFAULT_GROUP.to_string()),
            group_id: facts
                .group_id
                .clone()
                .unwrap_or_else(|| facts.handler.clone()),
            method,
            url_mapping,
            parameters: parameters.into_values().collect(),
            headers: merge_headers(&endpoint_headers, &self.service.headers),
            return_class: resolution.content,
            return_description: tags.return_description,
            return_shape: resolution.shape,
            needs_session: tags.needs_session,
            response_status,
            errors: tags.errors,
        })
    }

    /// Peel envelopes off a declared return type
    ///
    /// Single-argument wrappers are unwrapped until a sequence container,
    /// a Spring page or an XPage is reached; their argument is the content.
    /// Anything else that is reached is plain content.
    ///
    /// # Examples
    /// ```
    /// use restmeta_common::{PagingType, ReturnShape, ServiceDefinition, TypeConventions};
    /// use restmeta_parser::introspection::{FactsDocument, TypeRef};
    /// use restmeta_parser::EndpointModelBuilder;
    ///
    /// let facts = FactsDocument::from_json("{}").unwrap();
    /// let service = ServiceDefinition::new("users");
    /// let conventions = TypeConventions::default();
    /// let builder = EndpointModelBuilder::new(&facts, &service, &conventions);
    ///
    /// let declared = TypeRef::parse(
    ///     "com.example.ApiResult<org.springframework.data.domain.Page<com.example.UserDto>>",
    /// )
    /// .unwrap();
    /// let resolved = builder.resolve_return(&declared);
    ///
    /// assert_eq!(resolved.shape, ReturnShape::Paged(PagingType::Spring));
    /// assert_eq!(resolved.content.as_deref(), Some("com.example.UserDto"));
    /// ```
    pub fn resolve_return(&self, declared: &TypeRef) -> ReturnResolution {
        let conventions = self.mapper.conventions();
        let mut last_known = self.mapper.erased_name(declared);
        let mut current = declared;

        loop {
            if current.variable {
                return ReturnResolution {
                    content: Some(current.bound.clone().unwrap_or(last_known)),
                    shape: ReturnShape::Plain,
                    ambiguous: true,
                };
            }

            let path = current.path.as_str();
            if conventions.is_void(path) {
                return ReturnResolution {
                    content: None,
                    shape: ReturnShape::Plain,
                    ambiguous: false,
                };
            }
            last_known = path.to_string();

            if let Some(element) = current.array_element() {
                return ReturnResolution {
                    content: Some(element.path),
                    shape: ReturnShape::Array,
                    ambiguous: false,
                };
            }

            let terminal = if conventions.is_sequence(path) {
                Some(ReturnShape::Array)
            } else {
                conventions.paging_type(path).map(ReturnShape::Paged)
            };

            if let Some(shape) = terminal {
                let (content, ambiguous) = match current.args.first() {
                    Some(arg) if arg.variable => {
                        (arg.bound.clone().unwrap_or(last_known), true)
                    }
                    Some(arg) => (self.mapper.erased_name(arg), false),
                    None => (conventions.root_type.clone(), false),
                };
                return ReturnResolution {
                    content: Some(content),
                    shape,
                    ambiguous,
                };
            }

            match current.args.as_slice() {
                [inner] => current = inner,
                _ => {
                    return ReturnResolution {
                        content: Some(path.to_string()),
                        shape: ReturnShape::Plain,
                        ambiguous: false,
                    };
                }
            }
        }
    }

    fn classify_parameter(
        &self,
        param: &ParameterFacts,
        parameters: &mut IndexMap<String, ApiParameter>,
        headers: &mut IndexMap<String, ApiHeader>,
        references: &mut BTreeSet<String>,
    ) -> Result<()> {
        let conventions = self.mapper.conventions();
        let class_path = self.mapper.erased_name(&param.type_ref);

        if class_path == conventions.pageable {
            for p in pageable_parameters() {
                parameters.insert(p.name.clone(), p);
            }
            return Ok(());
        }

        let type_name = self.mapper.parameter_label(&param.type_ref, param.is_enum);

        match &param.binding {
            Binding::Header {
                name,
                required,
                default_value,
            } => {
                headers.insert(
                    param.name.clone(),
                    ApiHeader {
                        name: name.clone().unwrap_or_else(|| param.name.clone()),
                        type_name,
                        class_path,
                        description: String::new(),
                        optional: !required,
                        default_value: default_value.clone().filter(|v| !v.is_empty()),
                    },
                );
                return Ok(());
            }
            Binding::PageDefaults {
                page,
                size,
                offset,
                column,
                direction,
            } => {
                let sort_default = column.as_ref().map(|c| match direction {
                    Some(d) => format!("{},{}", c, d),
                    None => c.clone(),
                });
                let offset_default = (*offset != 0).then(|| offset.to_string());
                for p in [
                    paging_parameter("page", "int", "Page number", Some(page.to_string())),
                    paging_parameter("size", "int", "Page size", Some(size.to_string())),
                    paging_parameter("offset", "int", "size * page == offset", offset_default),
                    paging_parameter("sort", "String", "Sort column and direction", sort_default),
                ] {
                    parameters.insert(p.name.clone(), p);
                }
                return Ok(());
            }
            Binding::QueryObject => {
                return self.expand_query_object(&class_path, parameters, references);
            }
            _ => {}
        }

        if let Some(reference) = self.mapper.model_reference(&param.type_ref, param.is_enum) {
            references.insert(reference);
        }

        let (element, is_array) = self.element_of(&param.type_ref, param.is_enum, class_path);
        let (parameter_kind, name, optional, default_value) = match &param.binding {
            Binding::Path { name, required } => (
                ParameterKind::Path,
                name.clone().filter(|n| !n.is_empty()),
                !required,
                None,
            ),
            Binding::Query {
                name,
                required,
                default_value,
            } => (
                ParameterKind::Query,
                name.clone().filter(|n| !n.is_empty()),
                !required,
                default_value.clone().filter(|v| !v.is_empty()),
            ),
            Binding::Body => (ParameterKind::Body, None, false, None),
            _ => (ParameterKind::Query, None, false, None),
        };

        parameters.insert(
            param.name.clone(),
            ApiParameter {
                name: name.unwrap_or_else(|| param.name.clone()),
                type_name,
                class_path: element,
                description: String::new(),
                optional,
                default_value,
                parameter_kind,
                is_enum: param.is_enum,
                is_array,
            },
        );
        Ok(())
    }

    /// Element type of a sequence parameter, or the erased type itself
    fn element_of(&self, type_ref: &TypeRef, is_enum: bool, erased: String) -> (String, bool) {
        match self.mapper.field_kind(type_ref, is_enum) {
            (FieldKind::Array, element) => (element, true),
            _ => (erased, false),
        }
    }

    fn expand_query_object(
        &self,
        class_path: &str,
        parameters: &mut IndexMap<String, ApiParameter>,
        references: &mut BTreeSet<String>,
    ) -> Result<()> {
        let members = declared_members(self.provider, self.mapper.conventions(), class_path)?;
        for member in members {
            if let Some(reference) = self.mapper.model_reference(&member.type_ref, member.is_enum) {
                references.insert(reference);
            }
            let (class_path, is_array) = self.element_of(
                &member.type_ref,
                member.is_enum,
                self.mapper.erased_name(&member.type_ref),
            );
            parameters.insert(
                member.name.clone(),
                ApiParameter {
                    name: member.name.clone(),
                    type_name: self.mapper.parameter_label(&member.type_ref, member.is_enum),
                    class_path,
                    description: member.comment.trim().to_string(),
                    optional: !member.required,
                    default_value: None,
                    parameter_kind: ParameterKind::Query,
                    is_enum: member.is_enum,
                    is_array,
                },
            );
        }
        Ok(())
    }

    fn apply_tag(
        &self,
        tag: &CommentTag,
        parameters: &mut IndexMap<String, ApiParameter>,
        headers: &mut IndexMap<String, ApiHeader>,
        summary: &mut TagSummary,
    ) {
        match tag.tag.as_str() {
            "param" => {
                let name = tag.name_str();
                let mut description = tag.value_str().to_string();
                if let Some(parameter) = parameters.get_mut(name) {
                    if parameter.is_enum {
                        if let Some(listing) = self.enum_listing(&parameter.class_path) {
                            description.push_str(&listing);
                        }
                    }
                    parameter.description = description;
                } else if let Some(header) = headers.get_mut(name) {
                    header.description = description;
                }
            }
            "return" => summary.return_description = tag.value_str().to_string(),
            "response" => {
                let code = tag.name_str();
                if !code.is_empty() {
                    summary.has_response_tag = true;
                    summary
                        .response_status
                        .insert(code.to_string(), tag.value_str().to_string());
                }
            }
            "group" => {
                let group = tag.value_str();
                if !group.is_empty() {
                    summary.group = Some(group.to_string());
                }
            }
            "auth" => {
                if tag.value_str() == "true" {
                    summary.needs_session = true;
                }
            }
            "header" => {
                let name = tag.name_str();
                if !name.is_empty() {
                    let mut header = ApiHeader::string(name, tag.value_str());
                    header.default_value = Some(String::new());
                    headers.insert(name.to_string(), header);
                }
            }
            "className" => summary.class_name = tag.value_str().to_string(),
            "error" | "throws" => self.link_error(tag.name_str(), summary),
            other => debug!(tag = other, "ignoring comment tag"),
        }
    }

    fn link_declared_throws(&self, throws: &[String], summary: &mut TagSummary) {
        for exception in throws {
            self.link_error(simple_name(exception), summary);
        }
    }

    fn link_error(&self, exception: &str, summary: &mut TagSummary) {
        let Some(group) = self.errors.and_then(|catalog| catalog.get(exception)) else {
            return;
        };
        if !summary.errors.iter().any(|e| e.exception == group.exception) {
            summary.errors.push(group.clone());
        }
    }

    /// ` ( A | B )` listing of an enum's constants
    fn enum_listing(&self, class_path: &str) -> Option<String> {
        match self.provider.type_facts(class_path) {
            Ok(facts) => {
                let names: Vec<&str> = facts
                    .constants
                    .iter()
                    .map(|c| c.name.as_str())
                    .filter(|n| !crate::resolver::is_synthetic_constant(n))
                    .collect();
                Some(format!(" ( {} )", names.join(" | ")))
            }
            Err(e) => {
                warn!(class_path, error = %e, "enum constants unavailable for parameter description");
                None
            }
        }
    }
}

#[derive(Default)]
struct TagSummary {
    return_description: String,
    response_status: BTreeMap<String, String>,
    has_response_tag: bool,
    group: Option<String>,
    class_name: String,
    needs_session: bool,
    errors: Vec<ErrorGroupDefinition>,
}

/// Handler prefix plus method path, always starting with `/`
fn join_url(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim().trim_end_matches('/');
    let path = path.trim();
    let mut url = String::with_capacity(prefix.len() + path.len() + 2);
    if !prefix.is_empty() {
        if !prefix.starts_with('/') {
            url.push('/');
        }
        url.push_str(prefix);
    }
    if !path.is_empty() {
        if !path.starts_with('/') {
            url.push('/');
        }
        url.push_str(path);
    }
    if url.is_empty() {
        url.push('/');
    }
    url
}

fn paging_parameter(
    name: &str,
    type_name: &str,
    description: &str,
    default_value: Option<String>,
) -> ApiParameter {
    let class_path = if type_name == "int" {
        "java.lang.Integer"
    } else {
        "java.lang.String"
    };
    ApiParameter {
        name: name.to_string(),
        type_name: type_name.to_string(),
        class_path: class_path.to_string(),
        description: description.to_string(),
        optional: true,
        default_value,
        parameter_kind: ParameterKind::Query,
        is_enum: false,
        is_array: false,
    }
}

/// `page`, `size` and `sort` parameters standing in for a Spring `Pageable`
fn pageable_parameters() -> [ApiParameter; 3] {
    [
        paging_parameter("page", "int", "Page number (0-based)", Some("0".to_string())),
        paging_parameter("size", "int", "Page size", Some("20".to_string())),
        paging_parameter(
            "sort",
            "String",
            "Sort criteria (e.g. property,asc|desc)",
            None,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspection::FactsDocument;
    use restmeta_common::PagingType;

    fn resolve(text: &str) -> ReturnResolution {
        let facts = FactsDocument::from_json("{}").unwrap();
        let service = ServiceDefinition::new("svc");
        let conventions = TypeConventions::default();
        let builder = EndpointModelBuilder::new(&facts, &service, &conventions);
        builder.resolve_return(&TypeRef::parse(text).unwrap())
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("/users/", "/{id}"), "/users/{id}");
        assert_eq!(join_url("users", "{id}"), "/users/{id}");
        assert_eq!(join_url("", "/health"), "/health");
        assert_eq!(join_url("/users", ""), "/users");
        assert_eq!(join_url("", ""), "/");
    }

    #[test]
    fn test_resolve_plain_and_void() {
        let plain = resolve("com.example.UserDto");
        assert_eq!(plain.content.as_deref(), Some("com.example.UserDto"));
        assert_eq!(plain.shape, ReturnShape::Plain);

        assert_eq!(resolve("void").content, None);
        assert_eq!(
            resolve("org.springframework.http.ResponseEntity<java.lang.Void>").content,
            None
        );
    }

    #[test]
    fn test_resolve_triple_wrapped_xpage() {
        let resolved = resolve(
            "org.springframework.http.ResponseEntity<com.example.ApiResult<one.axim.framework.core.data.XPage<com.example.OrderDto>>>",
        );
        assert_eq!(resolved.shape, ReturnShape::Paged(PagingType::Xpage));
        assert_eq!(resolved.content.as_deref(), Some("com.example.OrderDto"));
        assert!(!resolved.ambiguous);
    }

    #[test]
    fn test_resolve_arrays() {
        let list = resolve("org.springframework.http.ResponseEntity<java.util.List<com.example.UserDto>>");
        assert_eq!(list.shape, ReturnShape::Array);
        assert_eq!(list.content.as_deref(), Some("com.example.UserDto"));

        let array = resolve("com.example.UserDto[]");
        assert_eq!(array.shape, ReturnShape::Array);
        assert_eq!(array.content.as_deref(), Some("com.example.UserDto"));
    }

    #[test]
    fn test_resolve_type_variable_keeps_erasure() {
        let resolved = resolve("com.example.ApiResult<T>");
        assert!(resolved.ambiguous);
        assert_eq!(resolved.shape, ReturnShape::Plain);
        assert_eq!(resolved.content.as_deref(), Some("com.example.ApiResult"));

        let list = resolve("java.util.List<T>");
        assert!(list.ambiguous);
        assert_eq!(list.shape, ReturnShape::Array);
        assert_eq!(list.content.as_deref(), Some("java.util.List"));
    }

    #[test]
    fn test_resolve_stops_at_multi_argument_types() {
        let resolved = resolve("java.util.Map<java.lang.String, com.example.UserDto>");
        assert_eq!(resolved.content.as_deref(), Some("java.util.Map"));
        assert_eq!(resolved.shape, ReturnShape::Plain);
    }
}
