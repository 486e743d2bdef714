//! Document rendering for restmeta
//!
//! This crate turns the extracted intermediate representation into the
//! published artifacts:
//! - per-endpoint, per-model and error documents ([`DocumentStore`])
//! - an OpenAPI 3.0.3 document ([`OpenApiRenderer`])
//! - a Postman v2.1.0 collection and environments ([`PostmanRenderer`]),
//!   optionally published through a [`PostmanClient`]
//! - a consolidated spec bundle ([`BundleAssembler`])
//!
//! [`Pipeline`] runs all of it for one service.

pub mod bundle;
pub mod example;
mod markdown;
pub mod openapi;
pub mod pipeline;
pub mod postman;
pub mod store;
mod templates;

pub use bundle::{BundleAssembler, SpecBundle};
pub use example::ExampleSynthesizer;
pub use markdown::DescriptionRenderer;
pub use openapi::{OpenApiDocument, OpenApiRenderer};
pub use pipeline::{Pipeline, RunReport, Stage};
pub use postman::{
    Collection, Environment, PostmanClient, PostmanPublisher, PostmanRenderer, PublishReport,
    RemoteEntry,
};
pub use store::DocumentStore;

use indexmap::IndexMap;
use restmeta_common::ApiModelDefinition;

/// Resolved models keyed by class path
pub type ModelMap = IndexMap<String, ApiModelDefinition>;
