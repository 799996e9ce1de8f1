//! Transport collaborator contract.
//!
//! # Responsibility
//! - Describe the byte-level HTTP surface the mapper depends on.
//! - Keep XML (de)serialization out of the collaborator.
//!
//! # Invariants
//! - A `Response` is returned for every status; only I/O failures are `Err`.
//! - Calls are blocking; timeouts and cancellation belong to implementors.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;

pub use memory::{MemoryTransport, RecordedCall};

pub type TransportResult<T> = Result<T, TransportError>;

/// HTTP verb issued by the mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

/// Status plus raw body of one round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure that prevented a status from being received at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub method: Method,
    pub uri: String,
    pub message: String,
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} failed: {}",
            self.method.as_str(),
            self.uri,
            self.message
        )
    }
}

impl Error for TransportError {}

/// Authenticated HTTP collaborator.
///
/// Implementations are expected to attach credentials and any headers the
/// server needs; the mapper only hands over URIs and XML bytes.
pub trait Transport {
    fn get(&self, uri: &str) -> TransportResult<Response>;
    fn post(&self, uri: &str, body: &[u8]) -> TransportResult<Response>;
    fn put(&self, uri: &str, body: &[u8]) -> TransportResult<Response>;
}
