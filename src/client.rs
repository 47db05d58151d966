//! The cached client instance for one service name.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::backend::ServiceBackend;
use crate::catalog::ServiceDefinition;
use crate::error::MockError;
use crate::request::MockRequest;
use crate::spy::{SpyBehavior, SpyHandle, SpyState};

/// One lazily-created client instance.
///
/// Exactly one instance exists per service name between resets; repeated
/// construction through the registry returns the same instance (observable
/// via [`MockClient::instance_id`]) and never re-creates it. The instance
/// owns the interception table for its methods.
pub struct MockClient {
    service: String,
    instance_id: String,
    backend: Arc<dyn ServiceBackend>,
    methods: Vec<String>,
    spies: Mutex<HashMap<String, Arc<SpyState>>>,
    constructor_calls: Mutex<Vec<Value>>,
}

impl fmt::Debug for MockClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockClient")
            .field("service", &self.service)
            .field("instance_id", &self.instance_id)
            .field("mocked_methods", &self.spies.lock().len())
            .finish_non_exhaustive()
    }
}

impl MockClient {
    pub(crate) fn new(service: &str, definition: &ServiceDefinition) -> Self {
        let backend = Arc::clone(&definition.backend);
        let methods = backend.methods();

        Self {
            service: service.to_string(),
            instance_id: format!("client-{}", uuid::Uuid::new_v4()),
            backend,
            methods,
            spies: Mutex::new(HashMap::new()),
            constructor_calls: Mutex::new(Vec::new()),
        }
    }

    /// The dotted service name this instance was created for.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Unique id of this instance; changes across resets.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Whether the named method is currently intercepted.
    pub fn is_mocked(&self, method: &str) -> bool {
        self.spies.lock().contains_key(method)
    }

    /// The configs passed to every construction of this client, in order.
    pub fn constructor_calls(&self) -> Vec<Value> {
        self.constructor_calls.lock().clone()
    }

    pub(crate) fn record_construction(&self, config: Value) {
        self.constructor_calls.lock().push(config);
    }

    pub(crate) fn install_spy(
        &self,
        method: &str,
        behavior: SpyBehavior,
    ) -> Result<SpyHandle, MockError> {
        if !self.has_method(method) {
            return Err(MockError::NoSuchMethod {
                service: self.service.clone(),
                method: method.to_string(),
            });
        }

        let mut spies = self.spies.lock();
        if spies.contains_key(method) {
            return Err(MockError::AlreadyMocked {
                service: self.service.clone(),
                method: method.to_string(),
            });
        }

        let state = SpyState::new(&self.service, method, behavior);
        spies.insert(method.to_string(), Arc::clone(&state));
        tracing::debug!(service = %self.service, method, "installed method interception");

        Ok(SpyHandle { state })
    }

    /// Invokes a method, producing the emulated request object.
    ///
    /// Intercepted methods record the call and produce the configured
    /// behavior; everything else passes through to the backend.
    pub fn request(&self, method: &str, input: Value) -> Result<MockRequest, MockError> {
        if !self.has_method(method) {
            return Err(MockError::NoSuchMethod {
                service: self.service.clone(),
                method: method.to_string(),
            });
        }

        let spy = self.spies.lock().get(method).cloned();
        let Some(state) = spy else {
            return Ok(MockRequest::passthrough(
                &self.service,
                method,
                input,
                Arc::clone(&self.backend),
            ));
        };

        state.record(input.clone());

        // Snapshot the behavior first: the lock must not be held while a
        // user-supplied closure runs, since it may call back into this
        // client.
        let behavior = state.behavior.lock().clone();
        let request = match behavior {
            SpyBehavior::Passthrough => MockRequest::passthrough(
                &self.service,
                method,
                input,
                Arc::clone(&self.backend),
            ),
            SpyBehavior::Returning(f) => MockRequest::canned(&self.service, method, f(input)),
            SpyBehavior::Promise(outcome) => MockRequest::canned(&self.service, method, outcome),
            SpyBehavior::Pages(queue) => MockRequest::paginated(&self.service, method, queue),
        };

        Ok(request)
    }

    fn has_method(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == method)
    }
}
