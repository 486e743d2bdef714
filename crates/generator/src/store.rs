//! On-disk document layout
//!
//! ```text
//! {output}/
//!   {serviceId}.json
//!   api/{handler}.json
//!   model/{classPath}.json
//!   error/errors.json
//!   error/error-response.json
//!   openapi.json
//!   postman/collection.json
//!   postman/env-{name}.json    (name reduced to [A-Za-z0-9._-])
//!   spec-bundle.json
//! ```

use crate::ModelMap;
use restmeta_common::{
    ApiDefinition, ApiModelDefinition, ErrorGroupDefinition, GeneratorError, Result,
    ServiceDefinition,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const API_DIR: &str = "api";
pub const MODEL_DIR: &str = "model";
pub const ERROR_DIR: &str = "error";
pub const POSTMAN_DIR: &str = "postman";
pub const OPENAPI_FILE: &str = "openapi.json";
pub const BUNDLE_FILE: &str = "spec-bundle.json";

/// Reads and writes the generated documents under one output directory
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove endpoint and model documents left by an earlier run
    pub fn clear_generated(&self) -> Result<()> {
        for dir in [API_DIR, MODEL_DIR] {
            let path = self.root.join(dir);
            if path.exists() {
                fs::remove_dir_all(&path).map_err(|e| {
                    GeneratorError::Generation(format!("Failed to clear {}: {}", path.display(), e))
                })?;
            }
        }
        Ok(())
    }

    pub fn service_path(&self, service_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", service_id))
    }

    pub fn endpoints_path(&self, handler: &str) -> PathBuf {
        self.root.join(API_DIR).join(format!("{}.json", handler))
    }

    pub fn model_path(&self, class_path: &str) -> PathBuf {
        self.root.join(MODEL_DIR).join(format!("{}.json", class_path))
    }

    pub fn errors_path(&self) -> PathBuf {
        self.root.join(ERROR_DIR).join("errors.json")
    }

    pub fn error_response_path(&self) -> PathBuf {
        self.root.join(ERROR_DIR).join("error-response.json")
    }

    pub fn openapi_path(&self) -> PathBuf {
        self.root.join(OPENAPI_FILE)
    }

    pub fn collection_path(&self) -> PathBuf {
        self.root.join(POSTMAN_DIR).join("collection.json")
    }

    /// Characters other than ASCII alphanumerics, `.`, `-` and `_` in the
    /// environment name become `_`, so the file stays under `postman/`
    pub fn environment_path(&self, name: &str) -> PathBuf {
        let file_name: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root
            .join(POSTMAN_DIR)
            .join(format!("env-{}.json", file_name))
    }

    pub fn bundle_path(&self) -> PathBuf {
        self.root.join(BUNDLE_FILE)
    }

    pub fn write_service(&self, service: &ServiceDefinition) -> Result<PathBuf> {
        let path = self.service_path(&service.service_id);
        write_json(&path, service)?;
        Ok(path)
    }

    pub fn write_endpoints(&self, handler: &str, definitions: &[ApiDefinition]) -> Result<PathBuf> {
        let path = self.endpoints_path(handler);
        write_json(&path, &definitions)?;
        Ok(path)
    }

    pub fn write_model(&self, class_path: &str, model: &ApiModelDefinition) -> Result<PathBuf> {
        let path = self.model_path(class_path);
        write_json(&path, model)?;
        Ok(path)
    }

    pub fn write_errors(&self, errors: &[ErrorGroupDefinition]) -> Result<PathBuf> {
        let path = self.errors_path();
        write_json(&path, &errors)?;
        Ok(path)
    }

    pub fn write_error_response(&self, model: &ApiModelDefinition) -> Result<PathBuf> {
        let path = self.error_response_path();
        write_json(&path, model)?;
        Ok(path)
    }

    /// Every endpoint document, handler files in name order
    ///
    /// Unreadable files are skipped with a warning.
    pub fn read_endpoints(&self) -> Vec<ApiDefinition> {
        json_files(&self.root.join(API_DIR))
            .into_iter()
            .filter_map(|path| read_or_warn::<Vec<ApiDefinition>>(&path))
            .flatten()
            .collect()
    }

    /// Every model document keyed by class path (the file stem)
    ///
    /// Unreadable files are skipped with a warning.
    pub fn read_models(&self) -> ModelMap {
        json_files(&self.root.join(MODEL_DIR))
            .into_iter()
            .filter_map(|path| {
                let class_path = path.file_stem()?.to_string_lossy().into_owned();
                let model = read_or_warn::<ApiModelDefinition>(&path)?;
                Some((class_path, model))
            })
            .collect()
    }

    /// The error catalog; empty when it was never written or cannot be read
    pub fn read_errors(&self) -> Vec<ErrorGroupDefinition> {
        let path = self.errors_path();
        if !path.exists() {
            return Vec::new();
        }
        read_or_warn(&path).unwrap_or_default()
    }

    pub fn read_error_response(&self) -> Option<ApiModelDefinition> {
        let path = self.error_response_path();
        if !path.exists() {
            return None;
        }
        read_or_warn(&path)
    }
}

/// Pretty-printed JSON with a trailing newline, parent directories created
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            GeneratorError::Generation(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text).map_err(|e| {
        GeneratorError::Generation(format!("Failed to write {}: {}", path.display(), e))
    })?;

    debug!(path = %path.display(), "wrote document");
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|e| {
        GeneratorError::Parse(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&text).map_err(|e| {
        GeneratorError::Parse(format!("Failed to parse {}: {}", path.display(), e))
    })
}

fn read_or_warn<T: DeserializeOwned>(path: &Path) -> Option<T> {
    match read_json(path) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping unreadable document");
            None
        }
    }
}

/// `.json` files directly under `dir`, sorted by file name
fn json_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "no documents to read");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use restmeta_common::{ApiField, FieldKind, ModelKind};
    use tempfile::TempDir;

    fn model(name: &str) -> ApiModelDefinition {
        ApiModelDefinition {
            name: name.to_string(),
            kind: ModelKind::Object,
            description: String::new(),
            fields: vec![ApiField {
                name: "id".to_string(),
                kind: FieldKind::Primitive("Long".to_string()),
                class_path: "java.lang.Long".to_string(),
                description: String::new(),
                optional: false,
                paging_type: None,
            }],
        }
    }

    #[test]
    fn test_layout() {
        let store = DocumentStore::new("/out");

        assert_eq!(store.service_path("user-api"), PathBuf::from("/out/user-api.json"));
        assert_eq!(
            store.model_path("com.example.UserDto"),
            PathBuf::from("/out/model/com.example.UserDto.json")
        );
        assert_eq!(
            store.environment_path("dev"),
            PathBuf::from("/out/postman/env-dev.json")
        );
        assert_eq!(
            store.environment_path("../../etc/qa stage"),
            PathBuf::from("/out/postman/env-.._.._etc_qa_stage.json")
        );
        assert_eq!(store.bundle_path(), PathBuf::from("/out/spec-bundle.json"));
    }

    #[test]
    fn test_models_read_back_by_class_path() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path());

        store.write_model("com.example.UserDto", &model("UserDto")).unwrap();
        store.write_model("com.example.OrderDto", &model("OrderDto")).unwrap();

        let models = store.read_models();
        let keys: Vec<&str> = models.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["com.example.OrderDto", "com.example.UserDto"]);
        assert_eq!(models["com.example.UserDto"], model("UserDto"));
    }

    #[test]
    fn test_unreadable_documents_are_skipped() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path());

        store.write_model("com.example.UserDto", &model("UserDto")).unwrap();
        fs::write(store.model_path("com.example.Broken"), "{ not json").unwrap();
        fs::write(dir.path().join(MODEL_DIR).join("notes.txt"), "ignored").unwrap();

        let models = store.read_models();
        assert_eq!(models.len(), 1);
        assert!(models.contains_key("com.example.UserDto"));
    }

    #[test]
    fn test_missing_documents_read_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path());

        assert!(store.read_endpoints().is_empty());
        assert!(store.read_models().is_empty());
        assert!(store.read_errors().is_empty());
        assert!(store.read_error_response().is_none());
    }

    #[test]
    fn test_clear_generated() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::new(dir.path());

        store.write_model("com.example.UserDto", &model("UserDto")).unwrap();
        store.write_errors(&[]).unwrap();
        store.clear_generated().unwrap();

        assert!(store.read_models().is_empty());
        assert!(store.errors_path().exists());
    }
}
