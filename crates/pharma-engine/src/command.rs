//! # Session Commands
//!
//! The explicit command surface of the billing session. Every UI input
//! event (click, keystroke shortcut, scanner read) is translated into one
//! of these commands by the host, so the mapping from input to state
//! transition is unit-testable without a DOM or event loop.

use pharma_core::{
    CustomerInfo, InteractionConflict, LineId, LinePatch, Medicine, OverrideCredential,
    PrescriptionRecord,
};

// =============================================================================
// Command
// =============================================================================

/// A state-mutating instruction for [`crate::session::BillingSession`].
#[derive(Debug, Clone)]
pub enum Command {
    /// Append a fresh placeholder line.
    AddLine,
    /// Patch a line's qty/rate/batch/search-term atomically.
    UpdateLine { id: LineId, patch: LinePatch },
    /// Remove a line (the cart re-seeds a placeholder if it was the last).
    RemoveLine { id: LineId },
    /// Commit a catalog pick onto a line. May park the selection behind
    /// an interaction prompt instead of committing immediately.
    SelectMedicine { id: LineId, medicine: Medicine },
    /// Operator accepted the interaction warning; commit the parked
    /// selection.
    ConfirmSelection,
    /// Operator backed out; discard the parked selection.
    CancelSelection,
    SetCustomer(CustomerInfo),
    /// Bill-level discount percentage (malformed input floors to 0).
    SetDiscountPercent(f64),
    /// Bill-level VAT percentage (malformed input floors to 0).
    SetVatPercent(f64),
    SetPrescription(PrescriptionRecord),
    /// Attach an expired-stock override token + reason.
    SupplyOverride(OverrideCredential),
    ClearOverride,
    /// Abandon the current bill: clears everything and rotates the
    /// client request id.
    NewBill,
}

// =============================================================================
// Outcome
// =============================================================================

/// What a dispatched command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// Applied with nothing further to report.
    Done,
    /// `AddLine` succeeded; the new editable slot.
    LineAdded(LineId),
    /// `SelectMedicine` found conflicts against the current cart; the
    /// selection is parked until `ConfirmSelection`/`CancelSelection`.
    InteractionPrompt(Vec<InteractionConflict>),
}
