//! Scripted in-memory transport.
//!
//! Responses are sticky: a scripted `(method, uri)` answers every matching
//! call until it is re-scripted. Unscripted calls fall back to the per-method
//! default, then to an empty 404.

use super::{Method, Response, Transport, TransportError, TransportResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One call observed by [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: Method,
    pub uri: String,
    pub body: Option<Vec<u8>>,
}

impl RecordedCall {
    pub fn body_str(&self) -> Option<&str> {
        self.body
            .as_deref()
            .and_then(|body| std::str::from_utf8(body).ok())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    routes: HashMap<(Method, String), Response>,
    defaults: HashMap<Method, Response>,
    failures: HashMap<(Method, String), String>,
    calls: Vec<RecordedCall>,
}

/// Cloneable handle; clones share the same script and call log.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the response for one method and URI.
    pub fn respond(&self, method: Method, uri: &str, status: u16, body: impl Into<Vec<u8>>) {
        let mut state = self.state.borrow_mut();
        state.failures.remove(&(method, uri.to_string()));
        state
            .routes
            .insert((method, uri.to_string()), Response::new(status, body));
    }

    /// Scripts the response for every otherwise unscripted call of `method`.
    pub fn respond_any(&self, method: Method, status: u16, body: impl Into<Vec<u8>>) {
        self.state
            .borrow_mut()
            .defaults
            .insert(method, Response::new(status, body));
    }

    /// Makes one method and URI fail before any status is produced.
    pub fn fail(&self, method: Method, uri: &str, message: &str) {
        self.state
            .borrow_mut()
            .failures
            .insert((method, uri.to_string()), message.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.borrow().calls.clone()
    }

    pub fn count(&self, method: Method) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| call.method == method)
            .count()
    }

    pub fn count_uri(&self, method: Method, uri: &str) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| call.method == method && call.uri == uri)
            .count()
    }

    /// Returns the body of the most recent call with `method`.
    pub fn last_body(&self, method: Method) -> Option<Vec<u8>> {
        self.state
            .borrow()
            .calls
            .iter()
            .rev()
            .find(|call| call.method == method)
            .and_then(|call| call.body.clone())
    }

    fn dispatch(&self, method: Method, uri: &str, body: Option<&[u8]>) -> TransportResult<Response> {
        let mut state = self.state.borrow_mut();
        state.calls.push(RecordedCall {
            method,
            uri: uri.to_string(),
            body: body.map(<[u8]>::to_vec),
        });

        let key = (method, uri.to_string());
        if let Some(message) = state.failures.get(&key) {
            return Err(TransportError {
                method,
                uri: uri.to_string(),
                message: message.clone(),
            });
        }

        let response = state
            .routes
            .get(&key)
            .or_else(|| state.defaults.get(&method))
            .cloned()
            .unwrap_or_else(|| Response::new(404, Vec::new()));
        Ok(response)
    }
}

impl Transport for MemoryTransport {
    fn get(&self, uri: &str) -> TransportResult<Response> {
        self.dispatch(Method::Get, uri, None)
    }

    fn post(&self, uri: &str, body: &[u8]) -> TransportResult<Response> {
        self.dispatch(Method::Post, uri, Some(body))
    }

    fn put(&self, uri: &str, body: &[u8]) -> TransportResult<Response> {
        self.dispatch(Method::Put, uri, Some(body))
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryTransport;
    use crate::transport::{Method, Transport};

    #[test]
    fn unscripted_calls_return_not_found_and_are_recorded() {
        let transport = MemoryTransport::new();
        let response = transport.get("http://lims/api/v2/artifacts/a1").unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(transport.count(Method::Get), 1);
    }

    #[test]
    fn route_wins_over_method_default() {
        let transport = MemoryTransport::new();
        transport.respond_any(Method::Post, 201, "default");
        transport.respond(Method::Post, "http://lims/x", 200, "routed");

        let routed = transport.post("http://lims/x", b"a").unwrap();
        let fallback = transport.post("http://lims/y", b"b").unwrap();

        assert_eq!(routed.body, b"routed");
        assert_eq!(fallback.status, 201);
        assert_eq!(transport.last_body(Method::Post).unwrap(), b"b");
    }

    #[test]
    fn scripted_failure_surfaces_as_transport_error() {
        let transport = MemoryTransport::new();
        transport.fail(Method::Put, "http://lims/x", "connection reset");

        let err = transport.put("http://lims/x", b"").unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
