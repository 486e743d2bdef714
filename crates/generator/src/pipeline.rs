//! End-to-end generation run
//!
//! Extraction failures abort the run. After that every stage runs even when
//! an earlier one failed, and within a stage a document that cannot be
//! written is skipped without stopping the others. The [`RunReport`] says
//! which stages did not finish.

use crate::bundle::BundleAssembler;
use crate::openapi::OpenApiRenderer;
use crate::postman::{Collection, PostmanRenderer};
use crate::store::{write_json, DocumentStore};
use crate::ModelMap;
use restmeta_common::{
    ApiDefinition, ApiModelDefinition, ErrorGroupDefinition, Result, ServiceConfig,
};
use restmeta_parser::introspection::IntrospectionProvider;
use restmeta_parser::{extract, Extraction};
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Service,
    Endpoints,
    Models,
    Errors,
    OpenApi,
    Postman,
    Bundle,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Service => "service",
            Stage::Endpoints => "endpoints",
            Stage::Models => "models",
            Stage::Errors => "errors",
            Stage::OpenApi => "openapi",
            Stage::Postman => "postman",
            Stage::Bundle => "bundle",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of one [`Pipeline::run`]
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub endpoints: usize,
    pub skipped_endpoints: usize,
    pub models: usize,
    pub unresolved_models: usize,
    pub error_groups: usize,
    pub completed: Vec<Stage>,
    pub failures: Vec<(Stage, String)>,
    pub written: Vec<PathBuf>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, stage: Stage, result: Result<Vec<PathBuf>>) {
        match result {
            Ok(paths) => {
                info!(stage = %stage, documents = paths.len(), "stage complete");
                self.written.extend(paths);
                self.completed.push(stage);
            }
            Err(e) => {
                warn!(stage = %stage, error = %e, "stage failed");
                self.failures.push((stage, e.to_string()));
            }
        }
    }

    /// Record a stage made of independent documents
    ///
    /// Every result is consumed; each failure is one entry in `failures`.
    fn record_each<I>(&mut self, stage: Stage, results: I)
    where
        I: IntoIterator<Item = Result<PathBuf>>,
    {
        let mut written = 0usize;
        let mut failed = 0usize;
        for result in results {
            match result {
                Ok(path) => {
                    self.written.push(path);
                    written += 1;
                }
                Err(e) => {
                    warn!(stage = %stage, error = %e, "document skipped");
                    self.failures.push((stage, e.to_string()));
                    failed += 1;
                }
            }
        }

        if failed == 0 {
            info!(stage = %stage, documents = written, "stage complete");
            self.completed.push(stage);
        } else {
            warn!(stage = %stage, documents = written, skipped = failed, "stage incomplete");
        }
    }
}

/// Extracts, renders and writes every document for one service
pub struct Pipeline<'a> {
    config: &'a ServiceConfig,
    store: &'a DocumentStore,
    previous: Option<&'a Collection>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a ServiceConfig, store: &'a DocumentStore) -> Self {
        Self {
            config,
            store,
            previous: None,
        }
    }

    /// Merge user edits from a previously published collection
    pub fn with_previous_collection(mut self, previous: &'a Collection) -> Self {
        self.previous = Some(previous);
        self
    }

    pub fn run(&self, provider: &dyn IntrospectionProvider) -> Result<RunReport> {
        let Extraction {
            endpoints,
            models,
            errors,
            error_response,
        } = extract(provider, self.config)?;

        let mut report = RunReport {
            endpoints: endpoints.endpoint_count(),
            skipped_endpoints: endpoints.skipped.len(),
            models: models.len(),
            unresolved_models: models.failures().len(),
            error_groups: errors.groups().count(),
            ..Default::default()
        };

        let models: ModelMap = models.into_models();
        let definitions: Vec<ApiDefinition> = endpoints.definitions().cloned().collect();
        let service = &self.config.service;

        report.record(
            Stage::Service,
            self.store
                .clear_generated()
                .and_then(|_| self.store.write_service(service))
                .map(|path| vec![path]),
        );

        report.record_each(
            Stage::Endpoints,
            endpoints
                .groups
                .iter()
                .map(|(handler, defs)| self.store.write_endpoints(handler, defs)),
        );

        report.record_each(
            Stage::Models,
            models
                .iter()
                .map(|(class_path, model)| self.store.write_model(class_path, model)),
        );

        report.record_each(
            Stage::Errors,
            self.write_errors(&errors.to_vec(), error_response.as_ref()),
        );

        report.record(Stage::OpenApi, self.write_openapi(&definitions, &models));

        report.record_each(Stage::Postman, self.write_postman(&definitions, &models));

        report.record(
            Stage::Bundle,
            BundleAssembler::new(self.store)
                .write(service)
                .map(|path| vec![path]),
        );

        info!(
            endpoints = report.endpoints,
            models = report.models,
            failed_stages = report.failures.len(),
            "generation run finished"
        );
        Ok(report)
    }

    fn write_errors(
        &self,
        errors: &[ErrorGroupDefinition],
        error_response: Option<&ApiModelDefinition>,
    ) -> Vec<Result<PathBuf>> {
        let mut results = vec![self.store.write_errors(errors)];
        if let Some(model) = error_response {
            results.push(self.store.write_error_response(model));
        }
        results
    }

    fn write_openapi(
        &self,
        definitions: &[ApiDefinition],
        models: &ModelMap,
    ) -> Result<Vec<PathBuf>> {
        let renderer = OpenApiRenderer::new(&self.config.service, &self.config.conventions, models);
        let document = renderer.render(definitions)?;
        let path = self.store.openapi_path();
        write_json(&path, &document)?;
        Ok(vec![path])
    }

    /// The collection, then one result per environment document
    fn write_postman(
        &self,
        definitions: &[ApiDefinition],
        models: &ModelMap,
    ) -> Vec<Result<PathBuf>> {
        let renderer =
            match PostmanRenderer::new(&self.config.service, &self.config.conventions, models) {
                Ok(renderer) => renderer,
                Err(e) => return vec![Err(e)],
            };

        let collection_path = self.store.collection_path();
        let mut results = vec![renderer
            .render(definitions, self.previous)
            .and_then(|collection| write_json(&collection_path, &collection))
            .map(|_| collection_path)];

        for environment in renderer.environments() {
            let path = self.store.environment_path(&environment.name);
            results.push(write_json(&path, &environment).map(|_| path));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restmeta_common::GeneratorError;
    use std::cell::Cell;

    #[test]
    fn test_failed_document_does_not_stop_later_ones() {
        let attempted = Cell::new(0);
        let results = ["a.json", "b.json", "c.json"].into_iter().map(|name| {
            attempted.set(attempted.get() + 1);
            if name == "a.json" {
                Err(GeneratorError::Generation("disk full".to_string()))
            } else {
                Ok(PathBuf::from(name))
            }
        });

        let mut report = RunReport::default();
        report.record_each(Stage::Models, results);

        assert_eq!(attempted.get(), 3);
        assert_eq!(report.written, vec![PathBuf::from("b.json"), PathBuf::from("c.json")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, Stage::Models);
        assert!(report.completed.is_empty());
    }

    #[test]
    fn test_stage_completes_when_every_document_is_written() {
        let mut report = RunReport::default();
        report.record_each(Stage::Endpoints, vec![Ok(PathBuf::from("api/a.json"))]);

        assert!(report.is_success());
        assert_eq!(report.completed, vec![Stage::Endpoints]);
    }
}
