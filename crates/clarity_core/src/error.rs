//! Error taxonomy shared by every mapper layer.
//!
//! # Responsibility
//! - Give callers one error type for fetch, save, parse and field access.
//! - Keep transport failures distinct from HTTP status failures.
//!
//! # Invariants
//! - Lazy-load failures surface at the triggering field access, never as `None`.
//! - Nothing in this crate retries; the error is returned as-is.

use crate::model::kind::EntityKind;
use crate::transport::TransportError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ClarityResult<T> = Result<T, ClarityError>;

/// Error for every fallible mapper operation.
#[derive(Debug)]
pub enum ClarityError {
    /// Remote resource is absent (HTTP 404).
    NotFound { uri: String },
    /// Any non-2xx status other than 404.
    ServerError {
        uri: String,
        status: u16,
        message: Option<String>,
    },
    /// XML text does not parse to the declared field type.
    ValueConversion {
        field: String,
        raw: String,
        expected: &'static str,
    },
    /// Root tag has no registered entity kind.
    UnsupportedEntityKind {
        namespace: Option<String>,
        tag: String,
    },
    /// Required element or attribute is missing, or the bytes are not XML.
    MalformedDocument(String),
    /// Collaborator failed before producing a status.
    Transport(TransportError),
    UnknownField { kind: EntityKind, field: String },
    FieldType {
        field: String,
        expected: &'static str,
    },
    ReadOnlyField { field: String },
    InvalidArgument(String),
    /// The owning session was dropped while an entity handle survived it.
    SessionClosed,
}

impl Display for ClarityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { uri } => write!(f, "resource not found: {uri}"),
            Self::ServerError {
                uri,
                status,
                message,
            } => match message {
                Some(message) => write!(f, "server returned {status} for {uri}: {message}"),
                None => write!(f, "server returned {status} for {uri}"),
            },
            Self::ValueConversion {
                field,
                raw,
                expected,
            } => write!(f, "field `{field}` holds `{raw}`, expected {expected}"),
            Self::UnsupportedEntityKind { namespace, tag } => match namespace {
                Some(namespace) => write!(f, "no entity kind for root `{{{namespace}}}{tag}`"),
                None => write!(f, "no entity kind for root `{tag}`"),
            },
            Self::MalformedDocument(message) => write!(f, "malformed document: {message}"),
            Self::Transport(err) => write!(f, "{err}"),
            Self::UnknownField { kind, field } => {
                write!(f, "{} has no field `{field}`", kind.name())
            }
            Self::FieldType { field, expected } => {
                write!(f, "field `{field}` expects a {expected} value")
            }
            Self::ReadOnlyField { field } => write!(f, "field `{field}` is read-only"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::SessionClosed => write!(f, "session was dropped"),
        }
    }
}

impl Error for ClarityError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TransportError> for ClarityError {
    fn from(value: TransportError) -> Self {
        Self::Transport(value)
    }
}

impl From<roxmltree::Error> for ClarityError {
    fn from(value: roxmltree::Error) -> Self {
        Self::MalformedDocument(value.to_string())
    }
}

impl ClarityError {
    pub(crate) fn missing(what: impl Into<String>) -> Self {
        Self::MalformedDocument(what.into())
    }

    pub(crate) fn conversion(field: &str, raw: &str, expected: &'static str) -> Self {
        Self::ValueConversion {
            field: field.to_string(),
            raw: raw.to_string(),
            expected,
        }
    }
}
