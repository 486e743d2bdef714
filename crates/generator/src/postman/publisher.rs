//! Publishing a collection and its environments through a [`PostmanClient`]

use super::renderer::PostmanRenderer;
use super::types::{Collection, Environment};
use restmeta_common::{ApiDefinition, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// A collection or environment known to the remote side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

/// Remote store of collections and environments
#[cfg_attr(test, mockall::automock)]
pub trait PostmanClient {
    fn find_collection(&self, name: &str) -> Result<Option<RemoteEntry>>;

    fn fetch_collection(&self, uid: &str) -> Result<Collection>;

    /// Create a collection, returning its uid
    fn create_collection(&self, collection: &Collection) -> Result<String>;

    fn replace_collection(&self, uid: &str, collection: &Collection) -> Result<()>;

    fn find_environment(&self, name: &str) -> Result<Option<RemoteEntry>>;

    /// Create an environment, returning its uid
    fn create_environment(&self, environment: &Environment) -> Result<String>;

    fn replace_environment(&self, uid: &str, environment: &Environment) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishAction {
    Created,
    Replaced,
}

impl fmt::Display for PublishAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishAction::Created => write!(f, "created"),
            PublishAction::Replaced => write!(f, "replaced"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub name: String,
    pub uid: String,
    pub action: PublishAction,
}

/// What a publish run did, and what it could not do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub collection: Option<PublishOutcome>,
    pub environments: Vec<PublishOutcome>,
    pub failures: Vec<String>,
}

impl PublishReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, message: String) {
        warn!("{}", message);
        self.failures.push(message);
    }
}

/// Finds, merges, and replaces or creates the published documents
pub struct PostmanPublisher<'r, 'a> {
    client: &'r dyn PostmanClient,
    renderer: &'r PostmanRenderer<'a>,
}

impl<'r, 'a> PostmanPublisher<'r, 'a> {
    pub fn new(client: &'r dyn PostmanClient, renderer: &'r PostmanRenderer<'a>) -> Self {
        Self { client, renderer }
    }

    /// Publish the collection, then every environment
    ///
    /// Remote failures are recorded in the report and never stop the run.
    pub fn publish(&self, name: &str, definitions: &[ApiDefinition]) -> PublishReport {
        let mut report = PublishReport::default();

        match self.publish_collection(name, definitions) {
            Ok(outcome) => {
                info!(uid = %outcome.uid, action = %outcome.action, "published collection");
                report.collection = Some(outcome);
            }
            Err(e) => report.fail(format!("collection '{}': {}", name, e)),
        }

        for environment in self.renderer.environments() {
            let env_name = environment.name.clone();
            match self.publish_environment(environment) {
                Ok(outcome) => {
                    info!(name = %outcome.name, action = %outcome.action, "published environment");
                    report.environments.push(outcome);
                }
                Err(e) => report.fail(format!("environment '{}': {}", env_name, e)),
            }
        }

        report
    }

    fn publish_collection(
        &self,
        name: &str,
        definitions: &[ApiDefinition],
    ) -> Result<PublishOutcome> {
        let existing = self.client.find_collection(name)?;

        let previous = match &existing {
            Some(entry) => match self.client.fetch_collection(&entry.uid) {
                Ok(collection) => Some(collection),
                Err(e) => {
                    warn!(
                        uid = %entry.uid,
                        error = %e,
                        "could not fetch previous collection, publishing without merge"
                    );
                    None
                }
            },
            None => None,
        };

        let mut collection = self.renderer.render(definitions, previous.as_ref())?;

        match existing {
            Some(entry) => {
                if let Some(id) = entry.id {
                    collection.info.postman_id = Some(id);
                }
                self.client.replace_collection(&entry.uid, &collection)?;
                Ok(PublishOutcome {
                    name: name.to_string(),
                    uid: entry.uid,
                    action: PublishAction::Replaced,
                })
            }
            None => {
                let uid = self.client.create_collection(&collection)?;
                Ok(PublishOutcome {
                    name: name.to_string(),
                    uid,
                    action: PublishAction::Created,
                })
            }
        }
    }

    fn publish_environment(&self, environment: Environment) -> Result<PublishOutcome> {
        let remote_uid = match self.client.find_environment(&environment.name) {
            Ok(found) => found.map(|entry| entry.uid).or_else(|| environment.id.clone()),
            Err(e) => match &environment.id {
                Some(uid) => {
                    warn!(
                        name = %environment.name,
                        error = %e,
                        "environment lookup failed, using configured uid"
                    );
                    Some(uid.clone())
                }
                None => return Err(e),
            },
        };

        let (uid, action) = match remote_uid {
            Some(uid) => {
                self.client.replace_environment(&uid, &environment)?;
                (uid, PublishAction::Replaced)
            }
            None => (
                self.client.create_environment(&environment)?,
                PublishAction::Created,
            ),
        };

        Ok(PublishOutcome {
            name: environment.name,
            uid,
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelMap;
    use restmeta_common::{
        EnvironmentDefinition, EnvironmentVariable, GeneratorError, ReturnShape,
        ServiceDefinition, TypeConventions,
    };
    use std::collections::BTreeMap;

    fn definition() -> ApiDefinition {
        ApiDefinition {
            id: restmeta_common::stable_id(&["/users", "List users", "GET"]),
            name: "List users".to_string(),
            class_name: String::new(),
            description: String::new(),
            group: "Users".to_string(),
            group_id: String::new(),
            method: "GET".to_string(),
            url_mapping: "/users".to_string(),
            parameters: vec![],
            headers: vec![],
            return_class: None,
            return_description: String::new(),
            return_shape: ReturnShape::Plain,
            needs_session: false,
            response_status: BTreeMap::from([("200".to_string(), "Success".to_string())]),
            errors: vec![],
        }
    }

    fn service() -> ServiceDefinition {
        let mut service = ServiceDefinition::new("user-api");
        service.name = "User API".to_string();
        service.env_variable = vec![
            EnvironmentDefinition {
                name: "dev".to_string(),
                postman_uid: None,
                variables: vec![EnvironmentVariable {
                    name: "host".to_string(),
                    value: "https://dev.example.com".to_string(),
                }],
            },
            EnvironmentDefinition {
                name: "prod".to_string(),
                postman_uid: Some("env-prod".to_string()),
                variables: vec![],
            },
        ];
        service
    }

    #[test]
    fn test_existing_collection_is_merged_and_replaced() {
        let service = service();
        let conventions = TypeConventions::default();
        let models = ModelMap::new();
        let renderer = PostmanRenderer::new(&service, &conventions, &models).unwrap();
        let defs = vec![definition()];

        let mut previous = renderer.render(&defs, None).unwrap();
        let saved = serde_json::json!({"name": "saved"});
        previous.item[0].item.as_mut().unwrap()[0].response = vec![saved];

        let mut client = MockPostmanClient::new();
        client
            .expect_find_collection()
            .withf(|name| name == "User API")
            .times(1)
            .returning(|_| {
                Ok(Some(RemoteEntry {
                    uid: "col-1".to_string(),
                    id: Some("pm-1".to_string()),
                    name: "User API".to_string(),
                }))
            });
        client
            .expect_fetch_collection()
            .withf(|uid| uid == "col-1")
            .times(1)
            .returning(move |_| Ok(previous.clone()));
        client
            .expect_replace_collection()
            .withf(|uid, collection| {
                uid == "col-1"
                    && collection.info.postman_id.as_deref() == Some("pm-1")
                    && collection.item[0].children()[0].response[0]["name"] == "saved"
            })
            .times(1)
            .returning(|_, _| Ok(()));
        client.expect_create_collection().never();
        client
            .expect_find_environment()
            .returning(|_| Ok(None));
        client
            .expect_create_environment()
            .withf(|env| env.name == "dev")
            .times(1)
            .returning(|_| Ok("env-dev".to_string()));
        client
            .expect_replace_environment()
            .withf(|uid, env| uid == "env-prod" && env.name == "prod")
            .times(1)
            .returning(|_, _| Ok(()));

        let publisher = PostmanPublisher::new(&client, &renderer);
        let report = publisher.publish("User API", &defs);

        assert!(report.is_success());
        let collection = report.collection.unwrap();
        assert_eq!(collection.action, PublishAction::Replaced);
        assert_eq!(collection.uid, "col-1");
        assert_eq!(report.environments.len(), 2);
        assert_eq!(report.environments[0].action, PublishAction::Created);
        assert_eq!(report.environments[1].action, PublishAction::Replaced);
    }

    #[test]
    fn test_remote_failures_are_reported_and_run_continues() {
        let service = service();
        let conventions = TypeConventions::default();
        let models = ModelMap::new();
        let renderer = PostmanRenderer::new(&service, &conventions, &models).unwrap();
        let defs = vec![definition()];

        let mut client = MockPostmanClient::new();
        client
            .expect_find_collection()
            .returning(|_| Ok(None));
        client
            .expect_create_collection()
            .times(1)
            .returning(|_| Err(GeneratorError::Remote("503 Service Unavailable".to_string())));
        client
            .expect_find_environment()
            .returning(|_| Err(GeneratorError::Remote("timeout".to_string())));
        client.expect_create_environment().never();
        client
            .expect_replace_environment()
            .times(1)
            .returning(|_, _| Ok(()));

        let publisher = PostmanPublisher::new(&client, &renderer);
        let report = publisher.publish("User API", &defs);

        assert!(!report.is_success());
        assert!(report.collection.is_none());
        assert_eq!(report.failures.len(), 2);
        assert!(report.failures[0].contains("503"));
        assert!(report.failures[1].contains("dev"));
        assert_eq!(report.environments.len(), 1);
        assert_eq!(report.environments[0].name, "prod");
    }
}
