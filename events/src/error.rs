//! Error types for the `events` crate.
//!
//! Follows the same pattern as `domain::error` with a root Error struct and an error kind enum.

use std::error::Error as StdError;
use std::fmt;

/// Failure reported by a `SessionRegistry` implementation.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Categories of fabric failures.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// The envelope could not be encoded for the wire.
    Serialization,
    /// The fabric cannot be reached or is no longer accepting work.
    Unavailable,
}

impl Error {
    pub fn unavailable() -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::Unavailable,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Fabric Error: {:?}: {source}", self.error_kind),
            None => write!(f, "Fabric Error: {:?}", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Serialization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_error_maps_to_serialization_kind() {
        let serde_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: Error = serde_err.into();
        assert_eq!(err.error_kind, ErrorKind::Serialization);
        assert!(err.source().is_some());
    }

    #[test]
    fn unavailable_has_no_source() {
        let err = Error::unavailable();
        assert_eq!(err.error_kind, ErrorKind::Unavailable);
        assert_eq!(err.to_string(), "Fabric Error: Unavailable");
    }
}
