//! Error types for the `domain` layer.
use events::{Error as FabricError, ErrorKind as FabricErrorKind};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. Ex. `domain` is dependent on `events`, and `web` is dependent on `domain`,
/// but `web` never inspects `events::Error` directly. The `error_kind`s are used
/// by `web` to return appropriate HTTP status codes and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Request(RequestErrorKind),
    Config,
    Other(String),
}

/// Problems with what the caller asked for. These are terminal: the same request
/// keeps failing until the caller changes it or its credentials.
#[derive(Debug, PartialEq)]
pub enum RequestErrorKind {
    /// Authenticated, but not allowed to act on the target.
    Forbidden(String),
    /// A required field is empty or otherwise unusable.
    Invalid(String),
    /// No usable credential was presented.
    Unauthenticated,
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    /// The real-time fabric could not be reached or refused the call.
    Fabric,
    Other(String),
}

impl Error {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::request(RequestErrorKind::Forbidden(reason.into()))
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::request(RequestErrorKind::Invalid(reason.into()))
    }

    pub fn unauthenticated() -> Self {
        Self::request(RequestErrorKind::Unauthenticated)
    }

    fn request(kind: RequestErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Request(kind)),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `events` (fabric) layer to the `domain` layer.
impl From<FabricError> for Error {
    fn from(err: FabricError) -> Self {
        let error_kind = match err.error_kind {
            FabricErrorKind::Unavailable => DomainErrorKind::External(ExternalErrorKind::Fabric),
            FabricErrorKind::Serialization => DomainErrorKind::Internal(InternalErrorKind::Other(
                "Failed to encode event envelope".to_string(),
            )),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

// Any token that fails to decode or validate is treated as no credential at all.
impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Request(
                RequestErrorKind::Unauthenticated,
            )),
        }
    }
}
