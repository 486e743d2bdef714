//! Carrying user edits across republishing
//!
//! A regenerated request takes the previously published value for every
//! header, query parameter, path variable and top level body field that still
//! exists under the same key. New keys keep their generated defaults and keys
//! that disappeared are dropped.

use super::types::Request;
use serde_json::Value;
use tracing::warn;

/// Copy matching leaf values from `previous` into `generated`
pub fn merge_request(generated: &mut Request, previous: &Request) {
    for header in &mut generated.header {
        if let Some(old) = previous.header.iter().find(|h| h.key == header.key) {
            header.value = old.value.clone();
        }
    }

    for query in &mut generated.url.query {
        if let Some(old) = previous.url.query.iter().find(|q| q.key == query.key) {
            query.value = old.value.clone();
        }
    }

    for variable in &mut generated.url.variable {
        if let Some(old) = previous.url.variable.iter().find(|v| v.key == variable.key) {
            variable.value = old.value.clone();
        }
    }

    if let (Some(body), Some(old_body)) = (generated.body.as_mut(), previous.body.as_ref()) {
        if let Some(merged) = merge_body(&body.raw, &old_body.raw) {
            body.raw = merged;
        }
    }
}

/// Merge top level fields of two JSON object bodies
///
/// Returns `None` when either side is not a JSON object, in which case the
/// generated body stays as it is.
pub fn merge_body(generated: &str, previous: &str) -> Option<String> {
    let mut fresh = match serde_json::from_str::<Value>(generated) {
        Ok(Value::Object(map)) => map,
        _ => return None,
    };
    let old = match serde_json::from_str::<Value>(previous) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return None,
        Err(e) => {
            warn!(error = %e, "previous request body is not JSON, keeping generated body");
            return None;
        }
    };

    for (key, value) in old {
        if let Some(slot) = fresh.get_mut(&key) {
            *slot = value;
        }
    }

    serde_json::to_string_pretty(&Value::Object(fresh)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postman::types::{Body, Header, PathVariable, QueryParam, Url};
    use serde_json::json;

    fn header(key: &str, value: &str) -> Header {
        Header {
            key: key.to_string(),
            value: value.to_string(),
            header_type: "text".to_string(),
            description: None,
        }
    }

    fn request(headers: Vec<Header>, query: Vec<(&str, &str)>, body: Option<&str>) -> Request {
        Request {
            method: "POST".to_string(),
            header: headers,
            body: body.map(|raw| Body::json(raw.to_string())),
            url: Url {
                raw: "{{host}}/v1.0/users/:id".to_string(),
                host: vec!["{{host}}".to_string()],
                path: vec!["v1.0".to_string(), "users".to_string(), ":id".to_string()],
                query: query
                    .into_iter()
                    .map(|(k, v)| QueryParam {
                        key: k.to_string(),
                        value: Some(v.to_string()),
                        description: None,
                        disabled: false,
                    })
                    .collect(),
                variable: vec![PathVariable {
                    key: "id".to_string(),
                    value: String::new(),
                    description: None,
                }],
            },
            description: None,
        }
    }

    #[test]
    fn test_user_values_survive_and_new_keys_keep_defaults() {
        let mut previous = request(
            vec![header("Authorization", "Bearer abc"), header("X-Old", "gone")],
            vec![("page", "7")],
            Some(r#"{"name": "Alice", "legacy": true}"#),
        );
        previous.url.variable[0].value = "42".to_string();

        let mut generated = request(
            vec![header("Authorization", ""), header("X-Trace", "default")],
            vec![("page", "0"), ("size", "20")],
            Some(r#"{"name": "java.lang.String", "email": "java.lang.String"}"#),
        );

        merge_request(&mut generated, &previous);

        assert_eq!(generated.header[0].value, "Bearer abc");
        assert_eq!(generated.header[1].value, "default");
        assert_eq!(generated.header.len(), 2);
        assert_eq!(generated.url.query[0].value.as_deref(), Some("7"));
        assert_eq!(generated.url.query[1].value.as_deref(), Some("20"));
        assert_eq!(generated.url.variable[0].value, "42");

        let body: Value = serde_json::from_str(&generated.body.unwrap().raw).unwrap();
        assert_eq!(body, json!({"name": "Alice", "email": "java.lang.String"}));
    }

    #[test]
    fn test_non_object_bodies_are_not_merged() {
        assert_eq!(merge_body("[1, 2]", r#"{"a": 1}"#), None);
        assert_eq!(merge_body(r#"{"a": 1}"#, "not json"), None);
        assert_eq!(merge_body(r#"{"a": 1}"#, "[3]"), None);
    }
}
