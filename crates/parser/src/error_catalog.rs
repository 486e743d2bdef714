//! Error code catalog
//!
//! Builds one [`ErrorGroupDefinition`] per exception type that carries error
//! codes. Endpoints link to these groups through `@error`/`@throws` tags and
//! their declared `throws` clause.

use crate::introspection::ExceptionFacts;
use indexmap::IndexMap;
use restmeta_common::{ErrorCodeEntry, ErrorGroupDefinition};
use tracing::debug;

/// Fallback status for exceptions with no known or declared status
pub const DEFAULT_ERROR_STATUS: u16 = 500;

/// Status of the framework exceptions every service inherits
fn known_exception_status(simple_name: &str) -> Option<u16> {
    match simple_name {
        "UnAuthorizedException" => Some(401),
        "NotFoundException" => Some(404),
        "InvalidRequestParameterException" => Some(400),
        "UnavailableServerException" => Some(504),
        "UnknownServerException" => Some(500),
        _ => None,
    }
}

/// Numeric value of an `HttpStatus` constant name
fn http_status_by_name(name: &str) -> Option<u16> {
    match name {
        "OK" => Some(200),
        "CREATED" => Some(201),
        "NO_CONTENT" => Some(204),
        "BAD_REQUEST" => Some(400),
        "UNAUTHORIZED" => Some(401),
        "FORBIDDEN" => Some(403),
        "NOT_FOUND" => Some(404),
        "METHOD_NOT_ALLOWED" => Some(405),
        "CONFLICT" => Some(409),
        "UNPROCESSABLE_ENTITY" => Some(422),
        "INTERNAL_SERVER_ERROR" => Some(500),
        "BAD_GATEWAY" => Some(502),
        "SERVICE_UNAVAILABLE" => Some(503),
        "GATEWAY_TIMEOUT" => Some(504),
        _ => None,
    }
}

/// Human readable group name: `UserNotFoundException` → `User Not Found`
pub fn derive_group_name(exception: &str) -> String {
    let base = exception.strip_suffix("Exception").unwrap_or(exception);
    let mut out = String::with_capacity(base.len() + 4);
    let mut prev_upper = true;
    for c in base.chars() {
        if c.is_uppercase() && !prev_upper {
            out.push(' ');
        }
        prev_upper = c.is_uppercase();
        out.push(c);
    }
    out
}

/// Error groups keyed by exception simple name
#[derive(Debug, Clone, Default)]
pub struct ErrorCatalog {
    groups: IndexMap<String, ErrorGroupDefinition>,
}

impl ErrorCatalog {
    /// Build the catalog, resolving message keys against `messages`
    ///
    /// Exceptions without codes are left out. Groups are ordered by
    /// exception name.
    pub fn build(exceptions: &[ExceptionFacts], messages: &IndexMap<String, String>) -> Self {
        let mut groups: Vec<ErrorGroupDefinition> = exceptions
            .iter()
            .filter(|e| !e.codes.is_empty())
            .map(|e| {
                let codes = e
                    .codes
                    .iter()
                    .map(|c| ErrorCodeEntry {
                        code: c.code.clone(),
                        name: c.name.clone(),
                        message_key: c.message_key.clone(),
                        message: messages
                            .get(&c.message_key)
                            .cloned()
                            .unwrap_or_else(|| c.message_key.clone()),
                    })
                    .collect();

                ErrorGroupDefinition {
                    group: derive_group_name(&e.name),
                    exception: e.name.clone(),
                    status: Self::resolve_status(e),
                    codes,
                }
            })
            .collect();

        groups.sort_by(|a, b| a.exception.cmp(&b.exception));
        debug!(groups = groups.len(), "built error catalog");

        Self {
            groups: groups
                .into_iter()
                .map(|g| (g.exception.clone(), g))
                .collect(),
        }
    }

    /// Status lookup order: known framework exception, declared status
    /// constant, declared status code, known parent exception, 500
    pub fn resolve_status(exception: &ExceptionFacts) -> u16 {
        known_exception_status(&exception.name)
            .or_else(|| {
                exception
                    .status_name
                    .as_deref()
                    .and_then(http_status_by_name)
            })
            .or(exception.status)
            .or_else(|| {
                exception
                    .superclass
                    .as_deref()
                    .and_then(known_exception_status)
            })
            .unwrap_or(DEFAULT_ERROR_STATUS)
    }

    pub fn get(&self, exception: &str) -> Option<&ErrorGroupDefinition> {
        self.groups.get(exception)
    }

    pub fn groups(&self) -> impl Iterator<Item = &ErrorGroupDefinition> {
        self.groups.values()
    }

    pub fn to_vec(&self) -> Vec<ErrorGroupDefinition> {
        self.groups.values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
