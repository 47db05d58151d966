//! Per-method interception records and the handles tests hold on them.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::outcome::Outcome;
use crate::request::PageQueue;

/// What an intercepted method does when invoked.
#[derive(Clone)]
pub(crate) enum SpyBehavior {
    /// Record the call, then dispatch to the backend as if un-intercepted.
    Passthrough,
    /// Compute an outcome from the call input.
    Returning(Arc<dyn Fn(Value) -> Outcome + Send + Sync>),
    /// Always complete with this outcome.
    Promise(Outcome),
    /// Serve pages from this queue.
    Pages(Arc<PageQueue>),
}

/// Shared state of one interception: the recorded call inputs and the
/// configured behavior. Held both by the owning client and by the
/// [`SpyHandle`] given to the test.
pub(crate) struct SpyState {
    pub(crate) service: String,
    pub(crate) method: String,
    pub(crate) calls: Mutex<Vec<Value>>,
    pub(crate) behavior: Mutex<SpyBehavior>,
}

impl SpyState {
    pub(crate) fn new(service: &str, method: &str, behavior: SpyBehavior) -> Arc<Self> {
        Arc::new(Self {
            service: service.to_string(),
            method: method.to_string(),
            calls: Mutex::new(Vec::new()),
            behavior: Mutex::new(behavior),
        })
    }

    pub(crate) fn record(&self, input: Value) {
        self.calls.lock().push(input);
    }
}

/// Handle to a single interception, returned by the registry's spy
/// operations.
///
/// The handle observes recorded calls and can replace the interception's
/// behavior with a custom implementation. It stays valid until the next
/// reset discards the owning client.
#[derive(Clone)]
pub struct SpyHandle {
    pub(crate) state: Arc<SpyState>,
}

impl fmt::Debug for SpyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpyHandle")
            .field("service", &self.state.service)
            .field("method", &self.state.method)
            .field("call_count", &self.call_count())
            .finish()
    }
}

impl SpyHandle {
    /// The inputs of every recorded invocation, in call order.
    pub fn calls(&self) -> Vec<Value> {
        self.state.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.calls.lock().len()
    }

    /// Whether any recorded invocation was made with exactly this input.
    pub fn called_with(&self, expected: &Value) -> bool {
        self.state.calls.lock().iter().any(|input| input == expected)
    }

    /// Replaces the interception's behavior with a custom implementation
    /// computing an outcome from each call's input.
    pub fn returning<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Outcome + Send + Sync + 'static,
    {
        *self.state.behavior.lock() = SpyBehavior::Returning(Arc::new(f));
        self
    }
}
