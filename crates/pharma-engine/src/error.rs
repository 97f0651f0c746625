//! # Engine Error Types
//!
//! Error taxonomy for the session layer.
//!
//! ## Failure-mode design
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Validation/Core errors   never reach the network, draft untouched     │
//! │  SubmissionInFlight       re-entrancy guard tripped (double Enter)     │
//! │  Finalize(failure)        service rejected; draft intact for retry     │
//! │  StaleCompletion          result arrived after the session moved on    │
//! │                                                                         │
//! │  NO error kind loses cart or draft state.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::services::FinalizeFailure;
use pharma_core::CoreError;

// =============================================================================
// Engine Error
// =============================================================================

/// Errors surfaced by the billing session.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A core business-rule or validation failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A finalize attempt was issued while one is already in flight.
    /// Double-clicks and double Enter-presses land here instead of
    /// producing two submissions.
    #[error("a finalize attempt is already in flight")]
    SubmissionInFlight,

    /// A medicine selection is awaiting an interaction decision; confirm
    /// or cancel it before selecting again.
    #[error("a medicine selection is awaiting an interaction decision")]
    PendingInteractionDecision,

    /// Confirm/cancel arrived with no selection parked.
    #[error("no medicine selection is pending")]
    NoPendingSelection,

    /// A finalize result resolved after the session was already reset;
    /// the result is discarded (the invoice, if created, is safe
    /// server-side under its request id).
    #[error("finalize completion arrived for a stale session")]
    StaleCompletion,

    /// The finalization service rejected the draft.
    #[error(transparent)]
    Finalize(#[from] FinalizeFailure),

    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================
