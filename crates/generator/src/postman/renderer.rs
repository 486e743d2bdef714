//! Collection and environment rendering

use super::merge::merge_request;
use super::types::*;
use crate::example::ExampleSynthesizer;
use crate::markdown::DescriptionRenderer;
use crate::ModelMap;
use indexmap::IndexMap;
use regex::Regex;
use restmeta_common::{
    merge_headers, stable_id, ApiDefinition, GeneratorError, ParameterKind, Result,
    ServiceDefinition, TypeConventions,
};
use serde_json::{json, Value};
use tracing::{debug, info};

/// Host used in request URLs when the service has no server URL
pub const DEFAULT_HOST: &str = "{{host}}";

pub const SUCCESS_RESPONSE_NAME: &str = "success response";

/// Renders a Postman collection, merging in a previously published one
pub struct PostmanRenderer<'a> {
    service: &'a ServiceDefinition,
    conventions: &'a TypeConventions,
    examples: ExampleSynthesizer<'a>,
    descriptions: DescriptionRenderer<'a>,
    path_variable: Regex,
}

impl<'a> PostmanRenderer<'a> {
    pub fn new(
        service: &'a ServiceDefinition,
        conventions: &'a TypeConventions,
        models: &'a ModelMap,
    ) -> Result<Self> {
        let path_variable = Regex::new(r"\{([^/{}]+)\}").map_err(|e| {
            GeneratorError::Generation(format!("Invalid path variable pattern: {}", e))
        })?;

        Ok(Self {
            service,
            conventions,
            examples: ExampleSynthesizer::new(models, conventions),
            descriptions: DescriptionRenderer::new(models, conventions)?,
            path_variable,
        })
    }

    /// Render the collection
    ///
    /// Items whose id exists in `previous` keep its header, query, path
    /// variable and body values, and its saved responses.
    pub fn render<'d, I>(&self, definitions: I, previous: Option<&Collection>) -> Result<Collection>
    where
        I: IntoIterator<Item = &'d ApiDefinition>,
    {
        let saved: IndexMap<&str, &Item> = previous
            .map(|c| {
                c.requests()
                    .into_iter()
                    .filter_map(|item| item.id.as_deref().map(|id| (id, item)))
                    .collect()
            })
            .unwrap_or_default();

        let mut groups: IndexMap<&str, Vec<Item>> = IndexMap::new();
        let mut merged = 0usize;

        for def in definitions {
            let old = saved.get(def.id.as_str()).copied();
            if old.is_some() {
                merged += 1;
            }
            let item = self.item(def, old)?;
            groups.entry(def.group.as_str()).or_default().push(item);
        }

        let folders: Vec<Item> = groups
            .into_iter()
            .map(|(group, items)| {
                Item::folder(
                    stable_id(&[self.service.service_id.as_str(), group]),
                    group,
                    items,
                )
            })
            .collect();

        info!(
            folders = folders.len(),
            merged = merged,
            "rendered Postman collection"
        );

        Ok(Collection {
            info: CollectionInfo {
                postman_id: previous.and_then(|c| c.info.postman_id.clone()),
                name: self.service.display_name().to_string(),
                description: self.service.introduction.clone(),
                schema: COLLECTION_SCHEMA.to_string(),
                version: Some(self.service.version.clone()),
            },
            item: folders,
            auth: self.auth(),
        })
    }

    /// One environment document per configured variable set
    pub fn environments(&self) -> Vec<Environment> {
        self.service
            .env_variable
            .iter()
            .map(|env| Environment {
                id: env.postman_uid.clone(),
                name: env.name.clone(),
                values: env
                    .variables
                    .iter()
                    .map(|v| EnvironmentValue {
                        key: v.name.clone(),
                        value: v.value.clone(),
                        value_type: "default".to_string(),
                        enabled: true,
                    })
                    .collect(),
            })
            .collect()
    }

    fn auth(&self) -> Option<Auth> {
        self.service.token_auth().map(|auth| Auth {
            auth_type: "apikey".to_string(),
            apikey: vec![
                AuthAttribute::string("key", &auth.header_key),
                AuthAttribute::string("value", &auth.value),
            ],
        })
    }

    fn item(&self, def: &ApiDefinition, previous: Option<&Item>) -> Result<Item> {
        let mut request = self.request(def)?;
        if let Some(old_request) = previous.and_then(|p| p.request.as_ref()) {
            merge_request(&mut request, old_request);
            debug!(id = %def.id, "merged previous request values");
        }

        let response = match previous {
            Some(old) => old.response.clone(),
            None => vec![self.success_response(def, &request)?],
        };

        Ok(Item {
            id: Some(def.id.clone()),
            name: def.name.clone(),
            item: None,
            request: Some(request),
            response,
        })
    }

    fn request(&self, def: &ApiDefinition) -> Result<Request> {
        let header = merge_headers(&def.headers, &self.service.headers)
            .into_iter()
            .map(|h| Header {
                key: h.name,
                value: h.default_value.unwrap_or_default(),
                header_type: "text".to_string(),
                description: non_empty(&h.description),
            })
            .collect();

        let body = match def.body_parameter() {
            Some(param) => {
                let example = self.examples.parameter_value(param);
                Some(Body::json(serde_json::to_string_pretty(&example)?))
            }
            None => None,
        };

        Ok(Request {
            method: def.method.to_ascii_uppercase(),
            header,
            body,
            url: self.url(def),
            description: non_empty(&self.descriptions.describe(def)?),
        })
    }

    fn url(&self, def: &ApiDefinition) -> Url {
        let host = if self.service.api_server_url.is_empty() {
            DEFAULT_HOST.to_string()
        } else {
            self.service.api_server_url.trim_end_matches('/').to_string()
        };
        let mapping = self.replace_path(&def.url_mapping);

        let mut path = vec![self.service.version.clone()];
        path.extend(
            mapping
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string),
        );

        let mut query = Vec::new();
        for param in def.parameters_of(ParameterKind::Query) {
            if param.class_path == self.conventions.xpage_nation {
                query.push(query_param("size", "10", "Page size"));
                query.push(query_param("page", "1", "Page number"));
                continue;
            }
            query.push(QueryParam {
                key: param.name.clone(),
                value: param.default_value.clone(),
                description: non_empty(&param.description),
                disabled: false,
            });
        }

        let variable = def
            .parameters_of(ParameterKind::Path)
            .map(|param| PathVariable {
                key: param.name.clone(),
                value: String::new(),
                description: non_empty(&param.description),
            })
            .collect();

        Url {
            raw: format!("{}/{}{}", host, self.service.version, mapping),
            host: vec![host],
            path,
            query,
            variable,
        }
    }

    /// `{name}` placeholders in Postman's `:name` form
    pub fn replace_path(&self, url_mapping: &str) -> String {
        self.path_variable
            .replace_all(url_mapping, ":$1")
            .into_owned()
    }

    fn success_response(&self, def: &ApiDefinition, request: &Request) -> Result<Value> {
        let (code, status) = def
            .response_status
            .iter()
            .find(|(code, _)| code.starts_with('2'))
            .or_else(|| def.response_status.iter().next())
            .map(|(code, status)| (code.as_str(), status.as_str()))
            .unwrap_or(("200", "Success"));

        let body = match self.examples.response_body(def) {
            Some(value) => serde_json::to_string_pretty(&value)?,
            None => String::new(),
        };

        Ok(json!({
            "name": SUCCESS_RESPONSE_NAME,
            "originalRequest": request,
            "status": status,
            "code": code.parse::<u16>().unwrap_or(200),
            "_postman_previewlanguage": "json",
            "header": [{"key": "Content-Type", "value": "application/json"}],
            "body": body,
        }))
    }
}

fn query_param(key: &str, value: &str, description: &str) -> QueryParam {
    QueryParam {
        key: key.to_string(),
        value: Some(value.to_string()),
        description: Some(description.to_string()),
        disabled: false,
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restmeta_common::{
        ApiAuth, ApiHeader, ApiParameter, EnvironmentDefinition, EnvironmentVariable,
        ReturnShape,
    };
    use std::collections::BTreeMap;

    fn definition(method: &str, url: &str, name: &str, group: &str) -> ApiDefinition {
        ApiDefinition {
            id: stable_id(&[url, name, method]),
            name: name.to_string(),
            class_name: String::new(),
            description: String::new(),
            group: group.to_string(),
            group_id: String::new(),
            method: method.to_string(),
            url_mapping: url.to_string(),
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

    fn path_param(name: &str) -> ApiParameter {
        ApiParameter {
            name: name.to_string(),
            type_name: "Long".to_string(),
            class_path: "java.lang.Long".to_string(),
            description: String::new(),
            optional: false,
            default_value: None,
            parameter_kind: ParameterKind::Path,
            is_enum: false,
            is_array: false,
        }
    }

    #[test]
    fn test_folders_and_ids() {
        let service = ServiceDefinition::new("user-api");
        let conventions = TypeConventions::default();
        let models = ModelMap::new();
        let renderer = PostmanRenderer::new(&service, &conventions, &models).unwrap();

        let a = definition("GET", "/users", "List users", "Users");
        let b = definition("GET", "/orders", "List orders", "Orders");
        let c = definition("POST", "/users", "Create user", "Users");
        let collection = renderer.render([&a, &b, &c], None).unwrap();

        let names: Vec<&str> = collection.item.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Users", "Orders"]);
        assert_eq!(
            collection.item[0].id.as_deref(),
            Some(stable_id(&["user-api", "Users"]).as_str())
        );
        assert_eq!(collection.item[0].children().len(), 2);
        assert_eq!(collection.item[0].children()[1].id.as_deref(), Some(c.id.as_str()));
        assert_eq!(collection.info.name, "user-api");
        assert!(collection.auth.is_none());
    }

    #[test]
    fn test_url_with_path_variables() {
        let mut service = ServiceDefinition::new("user-api");
        service.api_server_url = "https://api.example.com/".to_string();
        let conventions = TypeConventions::default();
        let models = ModelMap::new();
        let renderer = PostmanRenderer::new(&service, &conventions, &models).unwrap();

        let mut def = definition("GET", "/users/{id}/orders/{orderId}", "Get order", "Orders");
        def.parameters = vec![path_param("id"), path_param("orderId")];
        let collection = renderer.render([&def], None).unwrap();
        let url = &collection.item[0].children()[0].request.as_ref().unwrap().url;

        assert_eq!(url.raw, "https://api.example.com/v1.0/users/:id/orders/:orderId");
        assert_eq!(url.host, vec!["https://api.example.com".to_string()]);
        assert_eq!(url.path, vec!["v1.0", "users", ":id", "orders", ":orderId"]);
        let keys: Vec<&str> = url.variable.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(keys, vec!["id", "orderId"]);
    }

    #[test]
    fn test_generated_success_response() {
        let service = ServiceDefinition::new("user-api");
        let conventions = TypeConventions::default();
        let models = ModelMap::new();
        let renderer = PostmanRenderer::new(&service, &conventions, &models).unwrap();

        let mut def = definition("POST", "/users", "Create user", "Users");
        def.response_status = BTreeMap::from([
            ("201".to_string(), "Created".to_string()),
            ("401".to_string(), "Auth".to_string()),
        ]);
        def.return_class = Some("java.lang.Long".to_string());
        let collection = renderer.render([&def], None).unwrap();
        let item = &collection.item[0].children()[0];

        assert_eq!(item.response.len(), 1);
        assert_eq!(item.response[0]["name"], json!(SUCCESS_RESPONSE_NAME));
        assert_eq!(item.response[0]["code"], json!(201));
        assert_eq!(item.response[0]["status"], json!("Created"));
        assert_eq!(item.response[0]["body"], json!("\"java.lang.Long\""));
        assert_eq!(item.response[0]["originalRequest"]["method"], json!("POST"));
    }

    #[test]
    fn test_auth_headers_and_environments() {
        let mut service = ServiceDefinition::new("user-api");
        service.auth = Some(ApiAuth {
            auth_type: "token".to_string(),
            header_key: "Access-Token".to_string(),
            value: "{{accessToken}}".to_string(),
            description: String::new(),
        });
        let mut locale = ApiHeader::string("Accept-Language", "Response locale");
        locale.default_value = Some("en".to_string());
        service.headers = vec![locale];
        service.env_variable = vec![EnvironmentDefinition {
            name: "dev".to_string(),
            postman_uid: None,
            variables: vec![EnvironmentVariable {
                name: "host".to_string(),
                value: "https://dev.example.com".to_string(),
            }],
        }];
        let conventions = TypeConventions::default();
        let models = ModelMap::new();
        let renderer = PostmanRenderer::new(&service, &conventions, &models).unwrap();

        let def = definition("GET", "/users", "List users", "Users");
        let collection = renderer.render([&def], None).unwrap();

        let auth = collection.auth.unwrap();
        assert_eq!(auth.auth_type, "apikey");
        assert_eq!(auth.apikey[0].key, "key");
        assert_eq!(auth.apikey[0].value, "Access-Token");
        assert_eq!(auth.apikey[1].value, "{{accessToken}}");

        let request = collection.item[0].children()[0].request.as_ref().unwrap();
        assert_eq!(request.header[0].key, "Accept-Language");
        assert_eq!(request.header[0].value, "en");

        let environments = renderer.environments();
        assert_eq!(environments.len(), 1);
        assert_eq!(
            serde_json::to_value(&environments[0]).unwrap(),
            json!({
                "name": "dev",
                "values": [
                    {
                        "key": "host",
                        "value": "https://dev.example.com",
                        "type": "default",
                        "enabled": true
                    }
                ]
            })
        );
    }
}
