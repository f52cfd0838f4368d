//! Error types for kiosk operations.
//!
//! None of these errors are fatal. Every operation that returns a
//! [`KioskError`] leaves the session in a safe state: unchanged for
//! [`KioskError::NotFound`], [`KioskError::InvalidArgument`] and
//! [`KioskError::InvalidTransition`], reset to the welcome screen with an
//! empty cart for [`KioskError::InternalInconsistency`].

use kiosk_core::Screen;
use thiserror::Error;

/// Kiosk-level error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KioskError {
    /// Unknown category, item, cart line or order id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Argument outside the accepted range (negative quantity, empty-cart checkout).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Intent is not accepted on the current screen.
    #[error("Cannot {intent} from the {screen} screen")]
    InvalidTransition {
        /// Screen the session was on.
        screen: Screen,
        /// Name of the rejected intent.
        intent: &'static str,
    },

    /// Navigation invariant was violated; the session has been reset.
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),
}

impl KioskError {
    /// Whether reporting this error was preceded by a session reset.
    #[must_use]
    pub const fn reset_session(&self) -> bool {
        matches!(self, Self::InternalInconsistency(_))
    }
}

/// Result type alias for `KioskError`.
pub type Result<T> = std::result::Result<T, KioskError>;
