//! Error types for lifecycle domain validation.

use thiserror::Error;

/// Errors returned while constructing lifecycle domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleDomainError {
    /// The empty-check limit must be at least one.
    #[error("max empty checks must be at least 1")]
    ZeroMaxEmptyChecks,

    /// The warning must fire strictly before the stop.
    #[error("warning check {warning_check} must be between 1 and {max_empty_checks} (exclusive)")]
    WarningCheckOutOfRange {
        /// Configured warning check.
        warning_check: u32,
        /// Configured stop threshold.
        max_empty_checks: u32,
    },

    /// A duration that drives a timer is zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// The server host is empty.
    #[error("server host must not be empty")]
    EmptyHost,

    /// The server port is empty.
    #[error("server port must not be empty")]
    EmptyPort,
}
