//! Postman collection v2.1.0 rendering and publishing
//!
//! Requests are grouped into one folder per endpoint group. Republishing
//! carries the user's edited values forward from the previous collection,
//! keyed by the endpoint's stable id.

pub mod merge;
mod publisher;
mod renderer;
pub mod types;

pub use publisher::{
    PostmanClient, PostmanPublisher, PublishAction, PublishOutcome, PublishReport, RemoteEntry,
};
pub use renderer::{PostmanRenderer, DEFAULT_HOST, SUCCESS_RESPONSE_NAME};
pub use types::{Collection, Environment};

#[cfg(test)]
pub use publisher::MockPostmanClient;
