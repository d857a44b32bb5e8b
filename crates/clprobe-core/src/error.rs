//! Error types for driver calls.
//!
//! Every wrapper in this crate fails in one of two ways: the caller handed in
//! something unusable (a null handle, an empty device list, a string that
//! cannot cross the FFI boundary), or the native call itself reported a
//! non-success status.

use crate::status::Status;
use thiserror::Error;

/// Errors produced by the driver-call wrappers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClError {
    /// An argument was rejected before any native call was made.
    #[error("Invalid argument: {what}")]
    InvalidArgument {
        /// Description of the rejected argument
        what: String,
    },

    /// A native call returned a non-success status.
    #[error("{call} failed with error code {status}")]
    Runtime {
        /// Name of the native entry point
        call: &'static str,
        /// Status it returned
        status: Status,
    },
}

impl ClError {
    /// Create an InvalidArgument error for a null handle of the given kind.
    pub fn null_handle(kind: &str) -> Self {
        Self::InvalidArgument {
            what: format!("{kind} handle is null"),
        }
    }

    /// Create an InvalidArgument error with a custom description.
    pub fn invalid_argument<S: Into<String>>(what: S) -> Self {
        Self::InvalidArgument { what: what.into() }
    }

    /// Create a Runtime error for a failed native call.
    pub fn runtime(call: &'static str, status: Status) -> Self {
        Self::Runtime { call, status }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, Self::Runtime { .. })
    }

    /// Native status carried by a Runtime error.
    pub fn status(&self) -> Option<Status> {
        match self {
            Self::Runtime { status, .. } => Some(*status),
            Self::InvalidArgument { .. } => None,
        }
    }
}

/// Result type alias for driver-call wrappers.
pub type Result<T> = std::result::Result<T, ClError>;

/// Translates a raw driver result into a wrapper result.
pub(crate) trait StatusExt<T> {
    fn or_runtime(self, call: &'static str) -> Result<T>;
}

impl<T> StatusExt<T> for std::result::Result<T, Status> {
    fn or_runtime(self, call: &'static str) -> Result<T> {
        self.map_err(|status| ClError::runtime(call, status))
    }
}
