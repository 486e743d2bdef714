//! Consolidated spec bundle
//!
//! The bundle is assembled from the documents already written to the store,
//! not from in-memory state, so it always reflects what is on disk.

use crate::store::{write_json, DocumentStore};
use crate::ModelMap;
use restmeta_common::{
    ApiAuth, ApiDefinition, ApiHeader, ApiModelDefinition, ErrorGroupDefinition, Result,
    ServiceDefinition,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Service summary carried in the bundle; environments are left out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleService {
    pub service_id: String,
    pub name: String,
    pub api_server_url: String,
    pub version: String,
    pub introduction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<ApiAuth>,
    #[serde(default)]
    pub headers: Vec<ApiHeader>,
}

impl From<&ServiceDefinition> for BundleService {
    fn from(service: &ServiceDefinition) -> Self {
        Self {
            service_id: service.service_id.clone(),
            name: service.name.clone(),
            api_server_url: service.api_server_url.clone(),
            version: service.version.clone(),
            introduction: service.introduction.clone(),
            auth: service.auth.clone(),
            headers: service.headers.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecBundle {
    pub service: BundleService,
    pub apis: Vec<ApiDefinition>,
    /// Keyed by class path
    pub models: ModelMap,
    pub errors: Vec<ErrorGroupDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_response: Option<ApiModelDefinition>,
}

pub struct BundleAssembler<'a> {
    store: &'a DocumentStore,
}

impl<'a> BundleAssembler<'a> {
    pub fn new(store: &'a DocumentStore) -> Self {
        Self { store }
    }

    /// Re-read the written documents into one bundle
    pub fn assemble(&self, service: &ServiceDefinition) -> SpecBundle {
        SpecBundle {
            service: BundleService::from(service),
            apis: self.store.read_endpoints(),
            models: self.store.read_models(),
            errors: self.store.read_errors(),
            error_response: self.store.read_error_response(),
        }
    }

    /// Assemble and write `spec-bundle.json`
    pub fn write(&self, service: &ServiceDefinition) -> Result<PathBuf> {
        let bundle = self.assemble(service);
        let path = self.store.bundle_path();
        write_json(&path, &bundle)?;

        info!(
            apis = bundle.apis.len(),
            models = bundle.models.len(),
            errors = bundle.errors.len(),
            path = %path.display(),
            "wrote spec bundle"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restmeta_common::{EnvironmentDefinition, ErrorCodeEntry, ModelKind};
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_bundle_from_written_documents() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path());

        let mut service = ServiceDefinition::new("user-api");
        service.env_variable = vec![EnvironmentDefinition {
            name: "dev".to_string(),
            postman_uid: None,
            variables: vec![],
        }];
        store
            .write_model(
                "com.example.Status",
                &ApiModelDefinition {
                    name: "Status".to_string(),
                    kind: ModelKind::Enum,
                    description: String::new(),
                    fields: vec![],
                },
            )
            .unwrap();
        store
            .write_errors(&[ErrorGroupDefinition {
                group: "Auth".to_string(),
                exception: "AuthException".to_string(),
                status: 401,
                codes: vec![ErrorCodeEntry {
                    code: "A001".to_string(),
                    name: "EXPIRED".to_string(),
                    message_key: "auth.expired".to_string(),
                    message: "Token expired".to_string(),
                }],
            }])
            .unwrap();

        let path = BundleAssembler::new(&store).write(&service).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(value["service"]["serviceId"], json!("user-api"));
        assert!(value["service"].get("envVariable").is_none());
        assert_eq!(value["apis"], json!([]));
        assert_eq!(value["models"]["com.example.Status"]["type"], json!("Enum"));
        assert_eq!(value["errors"][0]["codes"][0]["messageKey"], json!("auth.expired"));
        assert!(value.get("errorResponse").is_none());
    }
}
