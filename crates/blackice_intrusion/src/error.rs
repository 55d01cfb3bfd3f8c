//! # Intrusion Error Types
//!
//! All recoverable failures of the intrusion subsystem. Handlers turn
//! these into inline `{error}` payloads via `Display`.

use thiserror::Error;

/// Errors that can occur while tracking intrusions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntrusionError {
    /// Unknown intrusion id.
    #[error("Intrusion not found")]
    NotFound,

    /// The intrusion already reached a terminal state.
    #[error("Intrusion is no longer active")]
    NotActive,

    /// One instance of this program is already running against the
    /// intrusion.
    #[error("{program} is already running against this intrusion")]
    DuplicateProgram {
        /// Display name of the rejected program.
        program: &'static str,
    },

    /// The network is inside a lockdown window; new intrusions are
    /// rejected.
    #[error("Network is in lockdown")]
    NetworkLockdown,

    /// A network-targeted program found nothing to attach to.
    #[error("No active intrusions on this network")]
    NoActiveIntrusions,
}

/// Result type for intrusion operations.
pub type IntrusionResult<T> = Result<T, IntrusionError>;
