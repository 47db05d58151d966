//! Emulated request objects returned by client method invocations.
//!
//! A [`MockRequest`] stands in for the wrapped SDK's request object. Its
//! completion is always deferred to a later scheduler tick: awaiting
//! [`MockRequest::promise`] or [`Pager::next_page`] yields to the runtime
//! before delivering a result, so callers observe asynchronous completion
//! even though no I/O happens.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::task::yield_now;

use crate::backend::ServiceBackend;
use crate::error::{MockError, RemoteError};
use crate::outcome::Outcome;

/// Ordered queue of canned pages for one paginated interception.
///
/// The cursor advances on every delivery, including error entries: pulling
/// again after an error observes the entry that follows it.
pub(crate) struct PageQueue {
    pages: Vec<Outcome>,
    cursor: Mutex<usize>,
}

impl PageQueue {
    pub(crate) fn new(pages: Vec<Outcome>) -> Self {
        Self {
            pages,
            cursor: Mutex::new(0),
        }
    }

    /// The next page, or `None` once the queue is exhausted.
    pub(crate) fn pop(&self) -> Option<Outcome> {
        let mut cursor = self.cursor.lock();
        let page = self.pages.get(*cursor).cloned();
        if page.is_some() {
            *cursor += 1;
        }
        page
    }
}

/// Consumer decision after each delivered page: keep iterating or stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    Continue,
    Stop,
}

enum RequestKind {
    Canned(Outcome),
    Paginated(Arc<PageQueue>),
    Passthrough {
        backend: Arc<dyn ServiceBackend>,
        input: Value,
    },
}

/// An in-flight emulated request.
pub struct MockRequest {
    service: String,
    method: String,
    kind: RequestKind,
}

impl fmt::Debug for MockRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockRequest")
            .field("service", &self.service)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

impl MockRequest {
    pub(crate) fn canned(service: &str, method: &str, outcome: Outcome) -> Self {
        Self {
            service: service.to_string(),
            method: method.to_string(),
            kind: RequestKind::Canned(outcome),
        }
    }

    pub(crate) fn paginated(service: &str, method: &str, queue: Arc<PageQueue>) -> Self {
        Self {
            service: service.to_string(),
            method: method.to_string(),
            kind: RequestKind::Paginated(queue),
        }
    }

    pub(crate) fn passthrough(
        service: &str,
        method: &str,
        input: Value,
        backend: Arc<dyn ServiceBackend>,
    ) -> Self {
        Self {
            service: service.to_string(),
            method: method.to_string(),
            kind: RequestKind::Passthrough { backend, input },
        }
    }

    /// Completes the request on a later scheduler tick, never synchronously.
    ///
    /// Resolves with the canned payload, rejects with the canned
    /// [`RemoteError`], or dispatches to the backend when the method was
    /// never intercepted.
    pub async fn promise(self) -> Result<Value, RemoteError> {
        yield_now().await;

        match self.kind {
            RequestKind::Canned(outcome) => outcome.into_result(),
            RequestKind::Passthrough { backend, input } => {
                tracing::trace!(service = %self.service, method = %self.method,
                    "dispatching un-intercepted call to backend");
                backend.send(&self.method, input).await
            }
            RequestKind::Paginated(_) => Err(RemoteError::with_code(
                format!(
                    "{}.{} is mocked for page iteration, not promise completion",
                    self.service, self.method
                ),
                "MockMisuse",
            )),
        }
    }

    /// Converts a paginated request into its pull-based pager.
    pub fn into_pager(self) -> Result<Pager, MockError> {
        match self.kind {
            RequestKind::Paginated(queue) => Ok(Pager {
                service: self.service,
                method: self.method,
                queue,
            }),
            _ => Err(MockError::Configuration(format!(
                "{}.{} is not mocked for page iteration",
                self.service, self.method
            ))),
        }
    }

    /// Drives page iteration with a callback, one page per delivery.
    ///
    /// The callback receives `Ok(Some(page))` for each page, `Ok(None)` once
    /// the queue is exhausted, or `Err` for an error entry. Returning
    /// [`PageControl::Stop`] ends iteration early; an error or the
    /// completion signal always ends it.
    pub async fn each_page<F>(self, mut callback: F) -> Result<(), MockError>
    where
        F: FnMut(Result<Option<Value>, RemoteError>) -> PageControl,
    {
        let mut pager = self.into_pager()?;

        loop {
            match pager.next_page().await {
                Ok(Some(page)) => {
                    if callback(Ok(Some(page))) == PageControl::Stop {
                        return Ok(());
                    }
                }
                Ok(None) => {
                    callback(Ok(None));
                    return Ok(());
                }
                Err(err) => {
                    callback(Err(err));
                    return Ok(());
                }
            }
        }
    }
}

/// Pull-based page iteration over a canned page queue.
///
/// Each call to [`Pager::next_page`] advances the queue by exactly one
/// entry. Pages come back strictly in configured order; none is delivered
/// twice or skipped as long as the consumer keeps pulling.
pub struct Pager {
    service: String,
    method: String,
    queue: Arc<PageQueue>,
}

impl fmt::Debug for Pager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("service", &self.service)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

impl Pager {
    /// Delivers the next page on a later scheduler tick.
    ///
    /// `Ok(None)` signals completion. An `Err` delivers the canned error
    /// entry; the queue position still advances, so pulling again observes
    /// the entry after the error.
    pub async fn next_page(&mut self) -> Result<Option<Value>, RemoteError> {
        yield_now().await;

        match self.queue.pop() {
            None => Ok(None),
            Some(Outcome::Data(page)) => Ok(Some(page)),
            Some(Outcome::Error(err)) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use futures::FutureExt;
    use serde_json::json;

    #[tokio::test]
    async fn canned_request_resolves_with_its_payload() {
        let request = MockRequest::canned("S3", "getObject", Outcome::Data(json!({"Body": "foo"})));
        assert_eq!(request.promise().await.unwrap(), json!({"Body": "foo"}));
    }

    #[tokio::test]
    async fn canned_request_rejects_with_its_error() {
        let request = MockRequest::canned("S3", "getObject", Outcome::error("foo"));
        assert_eq!(request.promise().await.unwrap_err().message, "foo");
    }

    #[tokio::test]
    async fn completion_is_never_synchronous() {
        let request = MockRequest::canned("S3", "getObject", Outcome::default());

        // The first poll must yield rather than resolve.
        assert!(request.promise().now_or_never().is_none());
    }

    #[tokio::test]
    async fn page_delivery_is_never_synchronous() {
        let queue = Arc::new(PageQueue::new(vec![Outcome::Data(json!({"n": 1}))]));
        let mut pager = MockRequest::paginated("S3", "listObjectsV2", queue)
            .into_pager()
            .unwrap();

        // The first poll must yield rather than deliver.
        assert!(pager.next_page().now_or_never().is_none());

        // The abandoned poll consumed nothing; the page is still queued.
        assert_eq!(pager.next_page().await.unwrap(), Some(json!({"n": 1})));
    }

    #[tokio::test]
    async fn pages_are_delivered_in_order_then_completion() {
        let queue = Arc::new(PageQueue::new(vec![
            Outcome::Data(json!({"n": 1})),
            Outcome::Data(json!({"n": 2})),
        ]));
        let mut pager = MockRequest::paginated("S3", "listObjectsV2", queue)
            .into_pager()
            .unwrap();

        assert_eq!(pager.next_page().await.unwrap(), Some(json!({"n": 1})));
        assert_eq!(pager.next_page().await.unwrap(), Some(json!({"n": 2})));
        assert_eq!(pager.next_page().await.unwrap(), None);
        // Completion is sticky once the queue is exhausted.
        assert_eq!(pager.next_page().await.unwrap(), None);
    }

    #[tokio::test]
    async fn cursor_advances_past_an_error_entry() {
        let queue = Arc::new(PageQueue::new(vec![
            Outcome::error("boom"),
            Outcome::Data(json!({"n": 2})),
        ]));
        let mut pager = MockRequest::paginated("S3", "listObjectsV2", queue)
            .into_pager()
            .unwrap();

        assert_eq!(pager.next_page().await.unwrap_err().message, "boom");
        // The position advanced even though the consumer saw an error.
        assert_eq!(pager.next_page().await.unwrap(), Some(json!({"n": 2})));
    }

    #[tokio::test]
    async fn each_page_stops_when_the_consumer_says_so() {
        let queue = Arc::new(PageQueue::new(vec![
            Outcome::Data(json!({"n": 1})),
            Outcome::Data(json!({"n": 2})),
        ]));
        let request = MockRequest::paginated("S3", "listObjectsV2", queue);

        let mut seen = Vec::new();
        request
            .each_page(|page| {
                seen.push(page.unwrap());
                PageControl::Stop
            })
            .await
            .unwrap();

        // Only the first page was delivered; nothing was skipped or repeated.
        assert_eq!(seen, vec![Some(json!({"n": 1}))]);
    }

    #[tokio::test]
    async fn each_page_ends_on_an_error_entry() {
        let queue = Arc::new(PageQueue::new(vec![
            Outcome::Data(json!({"n": 1})),
            Outcome::error("foo"),
            Outcome::Data(json!({"n": 3})),
        ]));
        let request = MockRequest::paginated("S3", "listObjectsV2", queue);

        let mut pages = Vec::new();
        let mut failure = None;
        request
            .each_page(|page| match page {
                Ok(data) => {
                    pages.push(data);
                    PageControl::Continue
                }
                Err(err) => {
                    failure = Some(err);
                    PageControl::Continue
                }
            })
            .await
            .unwrap();

        assert_eq!(pages, vec![Some(json!({"n": 1}))]);
        assert_eq!(failure.unwrap().message, "foo");
    }

    #[tokio::test]
    async fn page_iteration_on_a_promise_mock_is_a_configuration_error() {
        let request = MockRequest::canned("S3", "getObject", Outcome::default());
        assert_matches!(request.into_pager(), Err(MockError::Configuration(_)));
    }

    #[tokio::test]
    async fn promise_on_a_paginated_mock_is_rejected() {
        let queue = Arc::new(PageQueue::new(vec![]));
        let request = MockRequest::paginated("S3", "listObjectsV2", queue);

        let err = request.promise().await.unwrap_err();
        assert_eq!(err.code.as_deref(), Some("MockMisuse"));
    }
}
