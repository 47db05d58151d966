//! Dotted-path catalog of service definitions.
//!
//! Service names are dotted paths like `"S3"` or `"DynamoDB.DocumentClient"`.
//! The catalog is an explicit recursive tree: a node may carry a definition,
//! child nodes, or both, so `"DynamoDB"` can be a constructible service and
//! simultaneously the namespace holding `"DocumentClient"`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::backend::ServiceBackend;
use crate::error::MockError;

/// A registered service: the binding between a service name and the wrapped
/// library's client for that name.
#[derive(Clone)]
pub struct ServiceDefinition {
    pub(crate) backend: Arc<dyn ServiceBackend>,
}

impl ServiceDefinition {
    pub fn new(backend: Arc<dyn ServiceBackend>) -> Self {
        Self { backend }
    }
}

impl fmt::Debug for ServiceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDefinition").finish_non_exhaustive()
    }
}

/// One node of the catalog tree.
#[derive(Default)]
pub(crate) struct CatalogNode {
    definition: Option<ServiceDefinition>,
    children: HashMap<String, CatalogNode>,
}

impl CatalogNode {
    /// Assigns a definition at the given path, creating intermediate
    /// namespace nodes as needed.
    pub(crate) fn insert(&mut self, segments: &[&str], definition: ServiceDefinition) {
        match segments.split_first() {
            None => self.definition = Some(definition),
            Some((head, rest)) => self
                .children
                .entry((*head).to_string())
                .or_default()
                .insert(rest, definition),
        }
    }

    /// Looks up the definition at the given path, if any.
    pub(crate) fn resolve(&self, segments: &[&str]) -> Option<&ServiceDefinition> {
        match segments.split_first() {
            None => self.definition.as_ref(),
            Some((head, rest)) => self.children.get(*head)?.resolve(rest),
        }
    }
}

/// Splits a dotted service name into path segments, rejecting empty names
/// and empty segments.
pub(crate) fn split_path(service: &str) -> Result<Vec<&str>, MockError> {
    if service.is_empty() {
        return Err(MockError::Configuration(
            "service name must not be empty".to_string(),
        ));
    }

    let segments: Vec<&str> = service.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(MockError::Configuration(format!(
            "malformed service name: {service}"
        )));
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::create_mock_service_backend;
    use assert_matches::assert_matches;

    fn definition() -> ServiceDefinition {
        ServiceDefinition::new(Arc::new(create_mock_service_backend(&["noop"])))
    }

    #[test]
    fn resolves_top_level_and_nested_paths() {
        let mut root = CatalogNode::default();
        root.insert(&["S3"], definition());
        root.insert(&["DynamoDB", "DocumentClient"], definition());

        assert!(root.resolve(&["S3"]).is_some());
        assert!(root.resolve(&["DynamoDB", "DocumentClient"]).is_some());

        // "DynamoDB" is only a namespace here, not a service
        assert!(root.resolve(&["DynamoDB"]).is_none());
        assert!(root.resolve(&["SQS"]).is_none());
    }

    #[test]
    fn a_node_can_be_both_service_and_namespace() {
        let mut root = CatalogNode::default();
        root.insert(&["DynamoDB"], definition());
        root.insert(&["DynamoDB", "DocumentClient"], definition());

        assert!(root.resolve(&["DynamoDB"]).is_some());
        assert!(root.resolve(&["DynamoDB", "DocumentClient"]).is_some());
    }

    #[test]
    fn split_path_rejects_malformed_names() {
        assert_eq!(split_path("DynamoDB.DocumentClient").unwrap().len(), 2);

        assert_matches!(split_path(""), Err(MockError::Configuration(_)));
        assert_matches!(split_path("DynamoDB."), Err(MockError::Configuration(_)));
        assert_matches!(split_path(".S3"), Err(MockError::Configuration(_)));
    }
}
