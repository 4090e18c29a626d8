//! Result and error types for Bromine.
//!
//! Absence (a locator that matched nothing) is never an error: it is modelled
//! as an empty `Vec` or an [`Element::NotFound`](crate::Element::NotFound).
//! Only collaborator faults and verification failures travel through
//! [`BromineError`].

use thiserror::Error;

use crate::locator::LocatorStrategy;

/// Result type for Bromine operations
pub type BromineResult<T> = Result<T, BromineError>;

/// Errors that can occur in Bromine
#[derive(Debug, Error)]
pub enum BromineError {
    /// The native element no longer belongs to the page
    #[error("Stale element reference: {message}")]
    StaleElement {
        /// Error message
        message: String,
    },

    /// The browser session has been terminated
    #[error("Browser session is closed")]
    SessionClosed,

    /// Transport or protocol failure reported by the driver
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// The driver rejected a locator for one strategy
    #[error("Invalid {strategy} locator '{locator}': {message}")]
    InvalidSelector {
        /// Strategy the locator was issued with
        strategy: LocatorStrategy,
        /// Rejected locator string
        locator: String,
        /// Error message
        message: String,
    },

    /// A fail-fast verification did not hold
    #[error("{policy} failed: {message}")]
    VerifyFailed {
        /// Name of the policy that raised
        policy: String,
        /// Failure message
        message: String,
    },

    /// Aggregate failure raised once when a scope with soft failures ends
    #[error("One or more soft verify statements failed ({count})")]
    SoftVerifyFailed {
        /// Number of recorded soft failures
        count: usize,
        /// Individual failure messages in call order
        failures: Vec<String>,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms: {what}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        what: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Logging could not be initialised
    #[error("Logging error: {message}")]
    Logging {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BromineError {
    /// Errors that originate in the driver collaborator and are propagated as-is
    #[must_use]
    pub const fn is_collaborator_fault(&self) -> bool {
        matches!(
            self,
            Self::StaleElement { .. } | Self::SessionClosed | Self::Driver { .. }
        )
    }

    /// Errors raised by a verification policy
    #[must_use]
    pub const fn is_verify_failure(&self) -> bool {
        matches!(self, Self::VerifyFailed { .. } | Self::SoftVerifyFailed { .. })
    }

    /// Shorthand for an invalid selector error
    #[must_use]
    pub fn invalid_selector(
        strategy: LocatorStrategy,
        locator: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidSelector {
            strategy,
            locator: locator.into(),
            message: message.into(),
        }
    }
}
