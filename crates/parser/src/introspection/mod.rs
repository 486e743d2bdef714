//! Introspection facts and the provider seam
//!
//! Anything that can observe handler methods and their types (a source
//! parser, a bytecode reader, a reflection pass) plugs in through
//! [`IntrospectionProvider`]. [`FactsDocument`] is the JSON-backed provider.

mod document;
mod facts;
mod type_ref;

pub use document::FactsDocument;
pub use facts::{
    Binding, CommentFacts, CommentTag, ConstantFacts, EndpointFacts, ErrorCodeFacts,
    ExceptionFacts, MemberFacts, ParameterFacts, TypeFacts, TypeKind,
};
pub use type_ref::TypeRef;

use restmeta_common::Result;

/// Source of endpoint and type facts
#[cfg_attr(test, mockall::automock)]
pub trait IntrospectionProvider {
    /// Every handler method that is bound to a route
    fn endpoints(&self) -> Result<Vec<EndpointFacts>>;

    /// Declared shape of one type
    fn type_facts(&self, class_path: &str) -> Result<TypeFacts>;

    /// Exception types that carry error codes
    fn exceptions(&self) -> Result<Vec<ExceptionFacts>> {
        Ok(Vec::new())
    }

    /// Type of the body returned with every error response, if the service has one
    fn error_response_type(&self) -> Option<String> {
        None
    }
}
