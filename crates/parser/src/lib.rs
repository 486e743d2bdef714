//! Endpoint and model extraction for restmeta
//!
//! This crate turns raw handler introspection facts into the intermediate
//! representation (`ApiDefinition`, `ApiModelDefinition`) that the renderers
//! consume.
//!
//! ## Pipeline
//!
//! - [`introspection`] supplies facts through the [`IntrospectionProvider`] trait
//! - [`EndpointModelBuilder`] normalizes each endpoint and collects the model
//!   class paths it reaches
//! - [`ModelGraphResolver`] materializes those class paths, following member
//!   references with one run-scoped visited set
//! - [`ErrorCatalog`] groups exception error codes so endpoints can link them

pub mod endpoint;
pub mod error_catalog;
pub mod introspection;
pub mod resolver;
mod type_mapper;

pub use endpoint::{BuildOutput, EndpointModelBuilder, ReturnResolution, SkippedEndpoint};
pub use error_catalog::{derive_group_name, ErrorCatalog};
pub use introspection::{FactsDocument, IntrospectionProvider, TypeRef};
pub use resolver::{ModelGraphResolver, ModelRegistry};
pub use type_mapper::TypeMapper;

use restmeta_common::{Result, ServiceConfig};

/// Everything extracted from one set of facts
#[derive(Debug, Clone)]
pub struct Extraction {
    pub endpoints: BuildOutput,
    pub models: ModelRegistry,
    pub errors: ErrorCatalog,
    /// Model of the error response body, if the service declares one
    pub error_response: Option<restmeta_common::ApiModelDefinition>,
}

/// Run endpoint normalization, error cataloging and model resolution
///
/// Only a failure to list endpoints or exceptions aborts extraction; every
/// other failure is logged and skipped at endpoint or model granularity.
pub fn extract(provider: &dyn IntrospectionProvider, config: &ServiceConfig) -> Result<Extraction> {
    let errors = ErrorCatalog::build(&provider.exceptions()?, &config.messages);

    let endpoints = EndpointModelBuilder::new(provider, &config.service, &config.conventions)
        .with_errors(&errors)
        .build_all()?;

    let resolver = ModelGraphResolver::new(provider, &config.conventions)
        .with_base_packages(&config.base_packages);
    let mut models = resolver.resolve_all(&endpoints.references);

    let error_response = provider.error_response_type().and_then(|class_path| {
        resolver.resolve_into(&class_path, &mut models);
        models.get(&class_path).cloned()
    });

    Ok(Extraction {
        endpoints,
        models,
        errors,
        error_response,
    })
}
