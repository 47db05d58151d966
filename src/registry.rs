//! The client registry: lazy construction, interception, reset.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde_json::Value;

use crate::backend::ServiceBackend;
use crate::catalog::{split_path, CatalogNode, ServiceDefinition};
use crate::client::MockClient;
use crate::error::MockError;
use crate::outcome::Outcome;
use crate::request::PageQueue;
use crate::spy::{SpyBehavior, SpyHandle};

/// Registry of mocked service clients.
///
/// Service definitions registered via [`MockSdk::register`] play the role of
/// the wrapped library's exported constructors; they survive resets. Client
/// instances are created lazily, cached as singletons per service name, and
/// discarded only by [`MockSdk::reset_all`].
pub struct MockSdk {
    catalog: Mutex<CatalogNode>,
    clients: Mutex<HashMap<String, Arc<MockClient>>>,
}

impl fmt::Debug for MockSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockSdk")
            .field("active_clients", &self.clients.lock().len())
            .finish_non_exhaustive()
    }
}

impl Default for MockSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSdk {
    pub fn new() -> Self {
        Self {
            catalog: Mutex::new(CatalogNode::default()),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a service definition at a dotted path, e.g. `"S3"` or
    /// `"DynamoDB.DocumentClient"`.
    pub fn register(
        &self,
        service: &str,
        backend: Arc<dyn ServiceBackend>,
    ) -> Result<(), MockError> {
        let segments = split_path(service)?;
        self.catalog
            .lock()
            .insert(&segments, ServiceDefinition::new(backend));
        tracing::debug!(service, "registered service definition");
        Ok(())
    }

    /// Returns the client instance for a service, creating and caching it on
    /// first access, and records `config` as a constructor call.
    pub fn client(&self, service: &str, config: Value) -> Result<Arc<MockClient>, MockError> {
        let client = self.get_or_create(service)?;
        client.record_construction(config);
        Ok(client)
    }

    /// Installs a plain interception on a method.
    ///
    /// The returned handle records calls; until configured via
    /// [`SpyHandle::returning`], invocations pass through to the backend.
    /// Fails if the method does not exist or is already intercepted.
    pub fn spy(&self, service: &str, method: &str) -> Result<SpyHandle, MockError> {
        self.get_or_create(service)?
            .install_spy(method, SpyBehavior::Passthrough)
    }

    /// Installs an interception whose invocations complete asynchronously
    /// with the given outcome. `Outcome::default()` is the empty success
    /// payload; an error outcome rejects instead of resolving.
    pub fn spy_promise(
        &self,
        service: &str,
        method: &str,
        response: impl Into<Outcome>,
    ) -> Result<SpyHandle, MockError> {
        self.get_or_create(service)?
            .install_spy(method, SpyBehavior::Promise(response.into()))
    }

    /// Installs an interception whose invocations serve the given pages,
    /// strictly in order, one per advancement.
    pub fn spy_each_page(
        &self,
        service: &str,
        method: &str,
        pages: Vec<Outcome>,
    ) -> Result<SpyHandle, MockError> {
        self.get_or_create(service)?
            .install_spy(method, SpyBehavior::Pages(Arc::new(PageQueue::new(pages))))
    }

    /// Discards every cached client instance, and with it all interception
    /// state and recorded calls. Registered service definitions remain, so a
    /// client constructed afterwards is a pristine instance.
    pub fn reset_all(&self) {
        let mut clients = self.clients.lock();
        for service in clients.keys() {
            tracing::debug!(%service, "discarding mocked client");
        }
        clients.clear();
    }

    /// Whether the named method on the named service is currently
    /// intercepted.
    ///
    /// Fails with [`MockError::UnknownService`] when no definition is
    /// registered under the name, so a typo in an assertion does not read
    /// as "not mocked".
    pub fn is_mocked(&self, service: &str, method: &str) -> Result<bool, MockError> {
        self.ensure_registered(service)?;
        Ok(self
            .clients
            .lock()
            .get(service)
            .map(|client| client.is_mocked(method))
            .unwrap_or(false))
    }

    /// The constructor configs recorded for a service since the last reset.
    ///
    /// Fails with [`MockError::UnknownService`] when no definition is
    /// registered under the name.
    pub fn constructor_calls(&self, service: &str) -> Result<Vec<Value>, MockError> {
        self.ensure_registered(service)?;
        Ok(self
            .clients
            .lock()
            .get(service)
            .map(|client| client.constructor_calls())
            .unwrap_or_default())
    }

    /// The service names with a live client instance, sorted.
    pub fn active_services(&self) -> Vec<String> {
        let mut services: Vec<String> = self.clients.lock().keys().cloned().collect();
        services.sort();
        services
    }

    fn ensure_registered(&self, service: &str) -> Result<(), MockError> {
        let segments = split_path(service)?;
        if self.catalog.lock().resolve(&segments).is_none() {
            return Err(MockError::UnknownService(service.to_string()));
        }
        Ok(())
    }

    fn get_or_create(&self, service: &str) -> Result<Arc<MockClient>, MockError> {
        let mut clients = self.clients.lock();
        if let Some(existing) = clients.get(service) {
            return Ok(Arc::clone(existing));
        }

        let segments = split_path(service)?;
        let catalog = self.catalog.lock();
        let definition = catalog
            .resolve(&segments)
            .ok_or_else(|| MockError::UnknownService(service.to_string()))?;

        let client = Arc::new(MockClient::new(service, definition));
        tracing::debug!(service, instance_id = client.instance_id(), "created client instance");

        clients.insert(service.to_string(), Arc::clone(&client));
        Ok(client)
    }
}

// Process-global registry, for tests that want a drop-in shared instance.
// Deliberate, bounded global state: initialized empty, populated lazily on
// first access, cleared only by an explicit `reset_all`.
static GLOBAL: Lazy<MockSdk> = Lazy::new(MockSdk::new);

/// The process-global registry.
pub fn global() -> &'static MockSdk {
    &GLOBAL
}
