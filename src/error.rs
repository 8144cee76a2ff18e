//! Error Types and Handling
//!
//! Every fallible operation in clusterview returns [`Result`], an alias for
//! `std::result::Result<T, ClusterViewError>`.
//!
//! The error surface mirrors the failure classes of the interaction design:
//! local validation failures (never preceded by a network call), backend
//! failures (logical or transport, treated identically by callers), and
//! session-state invariant violations.
//!
//! # Example
//!
//! ```rust
//! use clusterview::error::{ClusterViewError, Result};
//!
//! fn check_cluster_count(n: usize) -> Result<()> {
//!     if n == 0 {
//!         return Err(ClusterViewError::Validation(
//!             "cluster count must be at least 1".into(),
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_cluster_count(0).is_err());
//! ```

use thiserror::Error;

/// Error types for clusterview operations
#[must_use]
#[derive(Error, Debug)]
pub enum ClusterViewError {
    /// A local precondition failed; no request was sent to the backend.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backend reported a logical failure, or responded with a non-2xx
    /// HTTP status.
    #[error("Backend error: {message} (status: {status_code:?})")]
    Api {
        /// Server-provided failure message, empty when none was given.
        message: String,
        /// HTTP status code, when the failure happened at the HTTP layer.
        status_code: Option<u16>,
    },

    /// Transport-level failure (connection refused, timeout, DNS).
    ///
    /// Callers treat this identically to [`ClusterViewError::Api`]: log and
    /// abort the pending action, leaving prior state untouched.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A session-state invariant would have been violated.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl ClusterViewError {
    /// True when the failure came from the backend exchange rather than a
    /// local check. Backend failures of any flavor abort the pending action
    /// without touching prior state.
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            ClusterViewError::Api { .. }
                | ClusterViewError::Network(_)
                | ClusterViewError::Serialization(_)
        )
    }
}

/// Result type alias for clusterview operations
pub type Result<T> = std::result::Result<T, ClusterViewError>;
