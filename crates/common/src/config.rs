//! Service configuration loading from YAML files
//!
//! A single YAML file describes the documented service, any overrides of the
//! recognized type names, and the message table used to resolve error codes.

use crate::{GeneratorError, Result, ServiceDefinition, TypeConventions};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root structure of a restmeta configuration file
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Service identity, auth, common headers and environments
    pub service: ServiceDefinition,
    /// Overrides of the recognized container and paging type names
    #[serde(default)]
    pub conventions: TypeConventions,
    /// Only types under these packages are materialized as models
    #[serde(default)]
    pub base_packages: Vec<String>,
    /// Message key to message text, used for error code entries
    #[serde(default)]
    pub messages: IndexMap<String, String>,
}

impl ServiceConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GeneratorError::Parse(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_yaml(&content).map_err(|e| {
            GeneratorError::Parse(format!("Failed to parse config YAML from {:?}: {}", path, e))
        })
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ServiceConfig = serde_yaml::from_str(yaml)?;
        if config.service.service_id.trim().is_empty() {
            return Err(GeneratorError::Parse(
                "service.serviceId must not be empty".to_string(),
            ));
        }
        Ok(config)
    }

    /// Configuration with only a service id and every default applied
    pub fn for_service(service_id: &str) -> Self {
        Self {
            service: ServiceDefinition::new(service_id),
            conventions: TypeConventions::default(),
            base_packages: vec![],
            messages: IndexMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
service:
  serviceId: user-api
  name: User API
  apiServerUrl: https://api.example.com
  introduction: Users and their orders
  auth:
    type: token
    headerKey: Access-Token
    value: "{{accessToken}}"
  headers:
    - name: Accept-Language
      description: Response locale
      defaultValue: en
  envVariable:
    - name: dev
      variables:
        - name: host
          value: https://dev.example.com
basePackages:
  - com.example
messages:
  user.not.found: User does not exist
"#;

    #[test]
    fn test_parse_config() {
        let config = ServiceConfig::from_yaml(SAMPLE).unwrap();

        assert_eq!(config.service.service_id, "user-api");
        assert_eq!(config.service.version, "v1.0");
        assert_eq!(config.service.headers[0].type_name, "String");
        assert_eq!(config.service.env_variable[0].variables.len(), 1);
        assert_eq!(config.base_packages, vec!["com.example".to_string()]);
        assert_eq!(
            config.messages.get("user.not.found").map(String::as_str),
            Some("User does not exist")
        );
        assert_eq!(
            config.conventions.pageable,
            "org.springframework.data.domain.Pageable"
        );
    }

    #[test]
    fn test_empty_service_id_rejected() {
        let result = ServiceConfig::from_yaml("service:\n  serviceId: \"\"\n");
        assert!(matches!(result, Err(GeneratorError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = ServiceConfig::load(file.path()).unwrap();
        assert_eq!(config.service.display_name(), "User API");
    }
}
