//! # Billing Session
//!
//! The session state machine and idempotent submission controller. One
//! `BillingSession` per bill; it exclusively owns the cart, the draft
//! fields, and the client request id, so no locks are needed — there is
//! no true parallelism, only interleaved async callbacks guarded by the
//! phase field and the request-id capture check.
//!
//! ## Phase Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │          SelectMedicine (conflicts)      ExpiryGate / server says      │
//! │   Idle ────────────────────────────►  AwaitingInteractionDecision      │
//! │    ▲ ◄──────── Confirm/Cancel ─────────────┘                           │
//! │    │                                                                    │
//! │    │   attempt_finalize (expired, no token)                             │
//! │    ├────────────────────────────────► AwaitingOverride                  │
//! │    │ ◄──────── SupplyOverride ─────────────┘                            │
//! │    │                                                                    │
//! │    │   attempt_finalize (gates clear)                                   │
//! │    └────────────────────────────────► Submitting ──success──► Idle      │
//! │                  (failure keeps draft, returns to prior state)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Idempotency Discipline
//! Exactly one `client_request_id` exists per session, generated at
//! session start. It is attached to every finalize attempt — reused, never
//! regenerated, across failures and retries — and rotates exactly once,
//! immediately after a successful finalize or an explicit `NewBill`. A
//! timed-out first attempt that actually succeeded server-side is
//! therefore answered on retry with the existing invoice instead of a
//! duplicate.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::command::{Command, CommandOutcome};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::search::{SearchCoordinator, SearchTicket};
use crate::services::{FinalizeFailure, FinalizeService};
use pharma_core::{
    gate, interaction, pricing, CartLineStore, ComputedLine, CustomerInfo, DraftLine,
    GateDecision, GateKind, InteractionConflict, InteractionRule, InvoiceDraft, InvoiceRef,
    LineId, Medicine, OverrideCredential, PrescriptionRecord, PricingTotals, Rate,
};

// =============================================================================
// Phase
// =============================================================================

/// Where the session is in its workflow. One field, not a pile of
/// booleans: modal flows cannot combinatorially desync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    /// A medicine selection is parked behind an interaction warning.
    AwaitingInteractionDecision,
    /// An expired line needs an override token before submission.
    AwaitingOverride,
    /// Exactly one finalize call is in flight.
    Submitting,
}

// =============================================================================
// Finalize Attempt Outcome
// =============================================================================

/// A non-error outcome of [`BillingSession::attempt_finalize`].
#[derive(Debug, Clone, PartialEq)]
pub enum FinalizeAttempt {
    /// Invoice created (or an idempotent duplicate resolved); session
    /// reset for the next bill.
    Completed(InvoiceRef),
    /// A gate other than expiry blocked the attempt. Nothing was sent.
    Blocked(GateDecision),
    /// An override token is required — detected locally (nothing sent) or
    /// by the server (draft intact). The session is in `AwaitingOverride`.
    OverrideRequired { detail: Vec<String> },
}

// =============================================================================
// Billing Session
// =============================================================================

/// The billing cart engine for one bill-editing session.
pub struct BillingSession {
    config: EngineConfig,
    cart: CartLineStore,
    customer: CustomerInfo,
    discount: Rate,
    vat: Rate,
    prescription: PrescriptionRecord,
    override_credential: Option<OverrideCredential>,
    rules: Vec<InteractionRule>,
    /// Last-known catalog snapshot: local search fallback + stock gating.
    snapshot: Vec<Medicine>,
    search: SearchCoordinator,
    phase: SessionPhase,
    /// Selection parked behind an interaction prompt.
    pending_selection: Option<PendingSelection>,
    client_request_id: String,
}

#[derive(Debug, Clone)]
struct PendingSelection {
    line_id: LineId,
    medicine: Medicine,
    conflicts: Vec<InteractionConflict>,
}

impl BillingSession {
    /// Starts a fresh session with the built-in interaction rule table.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_rules(config, interaction::default_rules())
    }

    /// Starts a fresh session with a caller-supplied rule table.
    pub fn with_rules(config: EngineConfig, rules: Vec<InteractionRule>) -> Self {
        let search = SearchCoordinator::new(config.search.min_query_len);
        let session = BillingSession {
            config,
            cart: CartLineStore::new(),
            customer: CustomerInfo::default(),
            discount: Rate::zero(),
            vat: Rate::zero(),
            prescription: PrescriptionRecord::default(),
            override_credential: None,
            rules,
            snapshot: Vec::new(),
            search,
            phase: SessionPhase::Idle,
            pending_selection: None,
            client_request_id: new_request_id(),
        };
        debug!(request_id = %session.client_request_id, "billing session started");
        session
    }

    // -------------------------------------------------------------------------
    // Reads (all derived, nothing cached)
    // -------------------------------------------------------------------------

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn cart(&self) -> &CartLineStore {
        &self.cart
    }

    pub fn client_request_id(&self) -> &str {
        &self.client_request_id
    }

    pub fn search(&mut self) -> &mut SearchCoordinator {
        &mut self.search
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &[Medicine] {
        &self.snapshot
    }

    /// Replaces the catalog snapshot (periodic refresh from the catalog
    /// collaborator).
    pub fn set_snapshot(&mut self, snapshot: Vec<Medicine>) {
        self.snapshot = snapshot;
    }

    /// The computed view of every cart line, derived on read.
    pub fn computed_lines(&self) -> Vec<ComputedLine> {
        self.cart
            .computed_lines(today(), self.config.expiry.near_window_days)
    }

    /// Bill totals, derived on read.
    pub fn totals(&self) -> PricingTotals {
        pricing::compute_totals(&self.computed_lines(), self.discount, self.vat)
    }

    /// Whole-cart interaction pass for the persistent warning banner.
    pub fn banner_conflicts(&self) -> Vec<InteractionConflict> {
        interaction::cart_conflicts(&self.cart.resolved_medicines(), &self.rules)
    }

    /// Conflicts attached to the currently parked selection, if any.
    pub fn pending_conflicts(&self) -> Option<&[InteractionConflict]> {
        self.pending_selection.as_ref().map(|p| p.conflicts.as_slice())
    }

    // -------------------------------------------------------------------------
    // Command Dispatch
    // -------------------------------------------------------------------------

    /// Applies a command to the session.
    ///
    /// While a finalize call is in flight every mutation is rejected with
    /// `SubmissionInFlight`; the draft being submitted must not shift
    /// under the request.
    pub fn dispatch(&mut self, command: Command) -> EngineResult<CommandOutcome> {
        if self.phase == SessionPhase::Submitting {
            return Err(EngineError::SubmissionInFlight);
        }

        match command {
            Command::AddLine => {
                let id = self.cart.add_line()?;
                Ok(CommandOutcome::LineAdded(id))
            }
            Command::UpdateLine { id, patch } => {
                self.cart.update_line(&id, patch)?;
                Ok(CommandOutcome::Done)
            }
            Command::RemoveLine { id } => {
                self.cart.remove_line(&id)?;
                self.search.invalidate();
                Ok(CommandOutcome::Done)
            }
            Command::SelectMedicine { id, medicine } => self.select_medicine(id, medicine),
            Command::ConfirmSelection => self.confirm_selection(),
            Command::CancelSelection => self.cancel_selection(),
            Command::SetCustomer(customer) => {
                self.customer = customer;
                Ok(CommandOutcome::Done)
            }
            Command::SetDiscountPercent(pct) => {
                self.discount = Rate::from_percent(pct);
                Ok(CommandOutcome::Done)
            }
            Command::SetVatPercent(pct) => {
                self.vat = Rate::from_percent(pct);
                Ok(CommandOutcome::Done)
            }
            Command::SetPrescription(record) => {
                self.prescription = record;
                Ok(CommandOutcome::Done)
            }
            Command::SupplyOverride(credential) => {
                pharma_core::validation::validate_override_reason(&credential.reason)
                    .map_err(pharma_core::CoreError::from)?;
                self.override_credential = Some(credential);
                if self.phase == SessionPhase::AwaitingOverride {
                    self.phase = SessionPhase::Idle;
                }
                Ok(CommandOutcome::Done)
            }
            Command::ClearOverride => {
                self.override_credential = None;
                Ok(CommandOutcome::Done)
            }
            Command::NewBill => {
                self.reset();
                Ok(CommandOutcome::Done)
            }
        }
    }

    /// Runs the single-candidate interaction pass before committing a
    /// selection. Conflicts park the selection until the operator decides.
    fn select_medicine(
        &mut self,
        id: LineId,
        medicine: Medicine,
    ) -> EngineResult<CommandOutcome> {
        if self.pending_selection.is_some() {
            return Err(EngineError::PendingInteractionDecision);
        }

        // Other lines only: replacing this line's own medicine must not
        // conflict with itself.
        let existing: Vec<&Medicine> = self
            .cart
            .lines()
            .iter()
            .filter(|l| l.id != id)
            .filter_map(|l| l.medicine.as_ref())
            .collect();

        let conflicts = interaction::find_conflicts(&medicine, &existing, &self.rules);
        if conflicts.is_empty() {
            self.cart.select_medicine(&id, medicine)?;
            self.search.invalidate();
            return Ok(CommandOutcome::Done);
        }

        warn!(
            line = %id,
            medicine = %medicine.name,
            conflicts = conflicts.len(),
            "interaction conflicts on selection, awaiting decision"
        );
        self.pending_selection = Some(PendingSelection {
            line_id: id,
            medicine,
            conflicts: conflicts.clone(),
        });
        self.phase = SessionPhase::AwaitingInteractionDecision;
        Ok(CommandOutcome::InteractionPrompt(conflicts))
    }

    fn confirm_selection(&mut self) -> EngineResult<CommandOutcome> {
        let pending = self
            .pending_selection
            .take()
            .ok_or(EngineError::NoPendingSelection)?;
        self.phase = SessionPhase::Idle;
        self.cart
            .select_medicine(&pending.line_id, pending.medicine)?;
        self.search.invalidate();
        Ok(CommandOutcome::Done)
    }

    fn cancel_selection(&mut self) -> EngineResult<CommandOutcome> {
        if self.pending_selection.take().is_none() {
            return Err(EngineError::NoPendingSelection);
        }
        self.phase = SessionPhase::Idle;
        Ok(CommandOutcome::Done)
    }

    // -------------------------------------------------------------------------
    // Search plumbing
    // -------------------------------------------------------------------------

    /// Registers keystroke input for a line; the returned ticket (if any)
    /// accompanies the dispatched request. Over-long or too-short queries
    /// yield no ticket and cancel the active search.
    pub fn note_search_input(&mut self, line_id: LineId, query: &str) -> Option<SearchTicket> {
        match pharma_core::validation::validate_search_query(query) {
            Ok(trimmed) => self.search.note_input(line_id, &trimmed),
            Err(_) => {
                self.search.invalidate();
                None
            }
        }
    }

    /// Whether a resolved search response should still be applied.
    pub fn search_is_current(&self, ticket: &SearchTicket) -> bool {
        self.search.is_current(ticket)
    }

    // -------------------------------------------------------------------------
    // Submission Controller
    // -------------------------------------------------------------------------

    /// Assembles the invoice draft from current state. Placeholder lines
    /// are skipped; resolved lines are snapshotted (name/rate frozen).
    pub fn build_draft(&self) -> InvoiceDraft {
        let computed = self.computed_lines();
        let lines: Vec<DraftLine> = computed
            .iter()
            .filter(|c| c.line.is_billable())
            .filter_map(|c| {
                c.line.medicine.as_ref().map(|medicine| DraftLine {
                    medicine_id: medicine.id.clone(),
                    name_snapshot: medicine.name.clone(),
                    batch_number: c.line.batch_number.clone(),
                    qty: c.line.qty,
                    rate: c.line.rate,
                    amount: c.amount,
                })
            })
            .collect();

        InvoiceDraft {
            client_request_id: self.client_request_id.clone(),
            customer: self.customer.clone(),
            lines,
            discount: self.discount,
            vat: self.vat,
            totals: pricing::compute_totals(&computed, self.discount, self.vat),
            prescription: self.prescription.clone(),
            override_credential: self.override_credential.clone(),
        }
    }

    /// Drives one finalize attempt through the gates and, if clear, the
    /// finalization service. See module docs for the idempotency
    /// discipline; see [`FinalizeAttempt`] for the non-error outcomes.
    pub async fn attempt_finalize(
        &mut self,
        service: &dyn FinalizeService,
    ) -> EngineResult<FinalizeAttempt> {
        if self.phase == SessionPhase::Submitting {
            return Err(EngineError::SubmissionInFlight);
        }

        // Gates first: a blocked attempt never touches the network.
        let decision = gate::evaluate(
            &self.computed_lines(),
            &self.snapshot,
            &self.prescription,
            self.override_credential.as_ref(),
        );
        if decision.blocked {
            if decision.reason == Some(GateKind::Expiry) {
                info!("finalize blocked: override token required");
                self.phase = SessionPhase::AwaitingOverride;
                return Ok(FinalizeAttempt::OverrideRequired {
                    detail: decision.detail,
                });
            }
            debug!(reason = ?decision.reason, "finalize blocked by gate");
            return Ok(FinalizeAttempt::Blocked(decision));
        }

        let draft = self.build_draft();
        let sent_request_id = self.client_request_id.clone();
        self.phase = SessionPhase::Submitting;
        info!(request_id = %sent_request_id, lines = draft.lines.len(), "submitting invoice draft");

        let result = service.finalize(&draft).await;

        // Stale-completion guard: if the session rotated its request id
        // while this call was in flight (abandoned and reset), the result
        // no longer belongs to this bill.
        if self.client_request_id != sent_request_id {
            warn!(request_id = %sent_request_id, "discarding finalize result for stale session");
            return Err(EngineError::StaleCompletion);
        }

        match result {
            Ok(invoice) => {
                info!(invoice = %invoice.invoice_number, "invoice finalized");
                self.reset();
                Ok(FinalizeAttempt::Completed(invoice))
            }
            // A duplicate for the id we hold means a previous attempt
            // (e.g. one that timed out client-side) already succeeded.
            Err(FinalizeFailure::Duplicate(invoice)) => {
                info!(invoice = %invoice.invoice_number, "duplicate resolved to existing invoice");
                self.reset();
                Ok(FinalizeAttempt::Completed(invoice))
            }
            Err(FinalizeFailure::ExpiredOverrideRequired) => {
                warn!("server requires expired-stock override, awaiting token");
                self.phase = SessionPhase::AwaitingOverride;
                Ok(FinalizeAttempt::OverrideRequired {
                    detail: vec!["Server re-validation found expired stock".to_string()],
                })
            }
            Err(failure) => {
                // Draft and request id stay exactly as they are: the
                // operator corrects and retries.
                warn!(error = %failure, "finalize failed, draft retained");
                self.phase = SessionPhase::Idle;
                Err(EngineError::Finalize(failure))
            }
        }
    }

    /// Full reset, used both by the success path and by `NewBill`: fresh
    /// cart, cleared credentials and customer, new request id, idle phase.
    fn reset(&mut self) {
        self.cart.reset();
        self.customer = CustomerInfo::default();
        self.discount = Rate::zero();
        self.vat = Rate::zero();
        self.prescription = PrescriptionRecord::default();
        self.override_credential = None;
        self.pending_selection = None;
        self.search.invalidate();
        self.phase = SessionPhase::Idle;
        self.client_request_id = new_request_id();
        debug!(request_id = %self.client_request_id, "session reset");
    }
}

/// Random + timestamp composite, unique without coordination.
fn new_request_id() -> String {
    format!("{}-{}", Utc::now().timestamp_millis(), Uuid::new_v4())
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pharma_core::{Batch, LinePatch, Money, RegulatoryClass};
    use std::sync::Mutex;

    // -------------------------------------------------------------------------
    // Fakes
    // -------------------------------------------------------------------------

    /// Scripted finalize service that records every request id it sees.
    struct FakeFinalize {
        script: Mutex<Vec<Result<InvoiceRef, FinalizeFailure>>>,
        seen_request_ids: Mutex<Vec<String>>,
    }

    impl FakeFinalize {
        fn scripted(script: Vec<Result<InvoiceRef, FinalizeFailure>>) -> Self {
            FakeFinalize {
                script: Mutex::new(script),
                seen_request_ids: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<String> {
            self.seen_request_ids.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FinalizeService for FakeFinalize {
        async fn finalize(&self, draft: &InvoiceDraft) -> Result<InvoiceRef, FinalizeFailure> {
            self.seen_request_ids
                .lock()
                .unwrap()
                .push(draft.client_request_id.clone());
            self.script
                .lock()
                .unwrap()
                .remove(0)
        }
    }

    fn invoice(n: &str) -> InvoiceRef {
        InvoiceRef {
            invoice_id: format!("id-{n}"),
            invoice_number: n.to_string(),
            grand_total: Money::from_paisa(10000),
        }
    }

    fn medicine(id: &str, generic: &str) -> Medicine {
        Medicine {
            id: id.to_string(),
            name: format!("{generic} 100mg"),
            generic_name: generic.to_string(),
            barcode: None,
            sku: None,
            rack: None,
            stock_qty: 50,
            unit_price: Money::from_paisa(5000),
            prescription_required: false,
            regulatory_class: RegulatoryClass::Otc,
            batch_number: None,
            expiry_date: None,
            batches: vec![],
        }
    }

    fn expired_medicine(id: &str) -> Medicine {
        let mut med = medicine(id, "Cetirizine");
        let yesterday = Utc::now().date_naive().pred_opt().unwrap();
        med.batches = vec![Batch {
            batch_number: "OLD-1".to_string(),
            expiry_date: Some(yesterday),
            qty: 20,
        }];
        med
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn session_with_line(med: Medicine) -> BillingSession {
        init_tracing();
        let mut session = BillingSession::new(EngineConfig::default());
        let id = session.cart().lines()[0].id.clone();
        session
            .dispatch(Command::SelectMedicine { id, medicine: med })
            .unwrap();
        session
    }

    fn token() -> OverrideCredential {
        OverrideCredential {
            token: "OVR-77".to_string(),
            reason: "pharmacist approved".to_string(),
        }
    }

    // -------------------------------------------------------------------------
    // Submission / idempotency
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_successful_finalize_resets_and_rotates_id() {
        let mut session = session_with_line(medicine("m1", "Paracetamol"));
        let before = session.client_request_id().to_string();

        let svc = FakeFinalize::scripted(vec![Ok(invoice("INV-1"))]);
        let outcome = session.attempt_finalize(&svc).await.unwrap();

        assert_eq!(outcome, FinalizeAttempt::Completed(invoice("INV-1")));
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.cart().is_effectively_empty(), "cart cleared");
        assert_ne!(
            session.client_request_id(),
            before,
            "request id rotated exactly on success"
        );
    }

    /// Failed attempts send a byte-identical request id every time; it
    /// changes only after success.
    #[tokio::test]
    async fn test_request_id_stable_across_failures() {
        let mut session = session_with_line(medicine("m1", "Paracetamol"));
        let held = session.client_request_id().to_string();

        let svc = FakeFinalize::scripted(vec![
            Err(FinalizeFailure::Transport("timeout".to_string())),
            Err(FinalizeFailure::Transport("reset by peer".to_string())),
            Ok(invoice("INV-2")),
        ]);

        assert!(session.attempt_finalize(&svc).await.is_err());
        assert!(session.attempt_finalize(&svc).await.is_err());
        assert!(session.attempt_finalize(&svc).await.is_ok());

        assert_eq!(svc.seen(), vec![held.clone(), held.clone(), held]);
        assert_ne!(session.client_request_id(), svc.seen()[0]);
    }

    /// A duplicate answer for the held request id is a benign completed
    /// outcome, not a user-facing failure.
    #[tokio::test]
    async fn test_duplicate_treated_as_success() {
        let mut session = session_with_line(medicine("m1", "Paracetamol"));
        let svc = FakeFinalize::scripted(vec![Err(FinalizeFailure::Duplicate(invoice("INV-3")))]);

        let outcome = session.attempt_finalize(&svc).await.unwrap();
        assert_eq!(outcome, FinalizeAttempt::Completed(invoice("INV-3")));
        assert!(session.cart().is_effectively_empty());
    }

    #[tokio::test]
    async fn test_failure_preserves_cart_and_draft() {
        let mut session = session_with_line(medicine("m1", "Paracetamol"));
        session.dispatch(Command::SetDiscountPercent(10.0)).unwrap();

        let svc = FakeFinalize::scripted(vec![Err(FinalizeFailure::StockInsufficient {
            medicine_id: "m1".to_string(),
            available: 1,
            requested: 5,
        })]);

        let err = session.attempt_finalize(&svc).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::Finalize(FinalizeFailure::StockInsufficient { .. })
        ));
        assert!(!session.cart().is_effectively_empty(), "no data loss");
        assert_eq!(session.build_draft().lines.len(), 1);
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    // -------------------------------------------------------------------------
    // Override flow
    // -------------------------------------------------------------------------

    /// Expired line, no token: override-required outcome with no service
    /// call; after supplying a token, the retry carries the same id.
    #[tokio::test]
    async fn test_expired_line_override_flow() {
        let mut session = session_with_line(expired_medicine("m9"));
        let held = session.client_request_id().to_string();

        let svc = FakeFinalize::scripted(vec![Ok(invoice("INV-4"))]);

        let outcome = session.attempt_finalize(&svc).await.unwrap();
        assert!(matches!(outcome, FinalizeAttempt::OverrideRequired { .. }));
        assert_eq!(session.phase(), SessionPhase::AwaitingOverride);
        assert!(svc.seen().is_empty(), "blocked attempt never hit the service");

        session.dispatch(Command::SupplyOverride(token())).unwrap();
        assert_eq!(session.phase(), SessionPhase::Idle);

        let outcome = session.attempt_finalize(&svc).await.unwrap();
        assert_eq!(outcome, FinalizeAttempt::Completed(invoice("INV-4")));
        assert_eq!(svc.seen(), vec![held], "same id as before the block");
    }

    #[tokio::test]
    async fn test_server_side_override_requirement_keeps_draft() {
        let mut session = session_with_line(medicine("m1", "Paracetamol"));
        let svc = FakeFinalize::scripted(vec![
            Err(FinalizeFailure::ExpiredOverrideRequired),
            Ok(invoice("INV-5")),
        ]);

        let outcome = session.attempt_finalize(&svc).await.unwrap();
        assert!(matches!(outcome, FinalizeAttempt::OverrideRequired { .. }));
        assert_eq!(session.phase(), SessionPhase::AwaitingOverride);

        session.dispatch(Command::SupplyOverride(token())).unwrap();
        let outcome = session.attempt_finalize(&svc).await.unwrap();
        assert_eq!(outcome, FinalizeAttempt::Completed(invoice("INV-5")));
        assert_eq!(svc.seen().len(), 2);
        assert_eq!(svc.seen()[0], svc.seen()[1], "retry reused the id");
    }

    #[tokio::test]
    async fn test_override_requires_reason() {
        let mut session = session_with_line(expired_medicine("m9"));
        let err = session
            .dispatch(Command::SupplyOverride(OverrideCredential {
                token: "OVR-1".to_string(),
                reason: "  ".to_string(),
            }))
            .unwrap_err();
        assert!(matches!(err, EngineError::Core(_)));
    }

    // -------------------------------------------------------------------------
    // Gates through the session
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_empty_cart_blocks_without_service_call() {
        let mut session = BillingSession::new(EngineConfig::default());
        let svc = FakeFinalize::scripted(vec![]);

        let outcome = session.attempt_finalize(&svc).await.unwrap();
        match outcome {
            FinalizeAttempt::Blocked(decision) => {
                assert_eq!(decision.reason, Some(GateKind::CartEmpty));
            }
            other => panic!("expected Blocked, got {other:?}"),
        }
        assert!(svc.seen().is_empty());
    }

    #[tokio::test]
    async fn test_prescription_gate_blocks() {
        let mut med = medicine("m1", "Amoxicillin");
        med.prescription_required = true;
        let mut session = session_with_line(med);
        let svc = FakeFinalize::scripted(vec![Ok(invoice("INV-6"))]);

        let outcome = session.attempt_finalize(&svc).await.unwrap();
        assert!(matches!(outcome, FinalizeAttempt::Blocked(_)));

        session
            .dispatch(Command::SetPrescription(PrescriptionRecord::Digital {
                text: "Dr. Rana".to_string(),
            }))
            .unwrap();
        let outcome = session.attempt_finalize(&svc).await.unwrap();
        assert!(matches!(outcome, FinalizeAttempt::Completed(_)));
    }

    /// A catalog refresh showing the medicine sold out blocks the attempt
    /// even though the line's frozen copy still carries stock.
    #[tokio::test]
    async fn test_refreshed_snapshot_blocks_sold_out_line() {
        let mut session = session_with_line(medicine("m1", "Paracetamol"));
        let mut sold_out = medicine("m1", "Paracetamol");
        sold_out.stock_qty = 0;
        session.set_snapshot(vec![sold_out]);

        let svc = FakeFinalize::scripted(vec![Ok(invoice("INV-7"))]);
        let outcome = session.attempt_finalize(&svc).await.unwrap();
        match outcome {
            FinalizeAttempt::Blocked(decision) => {
                assert_eq!(decision.reason, Some(GateKind::Stock));
            }
            other => panic!("expected Blocked, got {other:?}"),
        }
        assert!(svc.seen().is_empty(), "nothing sent while sold out");

        let mut restocked = medicine("m1", "Paracetamol");
        restocked.stock_qty = 5;
        session.set_snapshot(vec![restocked]);
        let outcome = session.attempt_finalize(&svc).await.unwrap();
        assert_eq!(outcome, FinalizeAttempt::Completed(invoice("INV-7")));
    }

    // -------------------------------------------------------------------------
    // Interaction flow
    // -------------------------------------------------------------------------

    #[test]
    fn test_interaction_prompt_parks_selection() {
        let mut session = session_with_line(medicine("w", "Warfarin"));
        let id = session.dispatch(Command::AddLine).unwrap();
        let CommandOutcome::LineAdded(id) = id else {
            panic!("expected LineAdded");
        };

        let outcome = session
            .dispatch(Command::SelectMedicine {
                id: id.clone(),
                medicine: medicine("a", "Aspirin"),
            })
            .unwrap();

        match outcome {
            CommandOutcome::InteractionPrompt(conflicts) => {
                assert_eq!(conflicts.len(), 1);
            }
            other => panic!("expected prompt, got {other:?}"),
        }
        assert_eq!(session.phase(), SessionPhase::AwaitingInteractionDecision);
        assert!(
            !session.cart().line(&id).unwrap().is_resolved(),
            "not committed yet"
        );

        session.dispatch(Command::ConfirmSelection).unwrap();
        assert!(session.cart().line(&id).unwrap().is_resolved());
        assert_eq!(session.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_cancel_selection_discards() {
        let mut session = session_with_line(medicine("w", "Warfarin"));
        let CommandOutcome::LineAdded(id) = session.dispatch(Command::AddLine).unwrap() else {
            panic!("expected LineAdded");
        };
        session
            .dispatch(Command::SelectMedicine {
                id: id.clone(),
                medicine: medicine("a", "Aspirin"),
            })
            .unwrap();

        session.dispatch(Command::CancelSelection).unwrap();
        assert!(!session.cart().line(&id).unwrap().is_resolved());
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.banner_conflicts().len(), 0, "only warfarin in cart");
    }

    #[test]
    fn test_clean_selection_commits_directly() {
        let mut session = BillingSession::new(EngineConfig::default());
        let id = session.cart().lines()[0].id.clone();
        let outcome = session
            .dispatch(Command::SelectMedicine {
                id,
                medicine: medicine("m1", "Paracetamol"),
            })
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Done);
    }

    #[test]
    fn test_banner_conflicts_stable() {
        let mut session = session_with_line(medicine("w", "Warfarin"));
        let CommandOutcome::LineAdded(id) = session.dispatch(Command::AddLine).unwrap() else {
            panic!("expected LineAdded");
        };
        session
            .dispatch(Command::SelectMedicine {
                id,
                medicine: medicine("a", "Aspirin"),
            })
            .unwrap();
        session.dispatch(Command::ConfirmSelection).unwrap();

        let first = session.banner_conflicts();
        let second = session.banner_conflicts();
        assert_eq!(first.len(), 1);
        assert_eq!(first, second, "no accumulation across reruns");
    }

    // -------------------------------------------------------------------------
    // Totals / draft assembly
    // -------------------------------------------------------------------------

    #[test]
    fn test_totals_derived_from_commands() {
        let mut session = session_with_line(medicine("m1", "Paracetamol"));
        let id = session.cart().lines()[0].id.clone();
        session
            .dispatch(Command::UpdateLine {
                id,
                patch: LinePatch {
                    qty: Some(2),
                    ..Default::default()
                },
            })
            .unwrap();
        session.dispatch(Command::SetDiscountPercent(10.0)).unwrap();
        session.dispatch(Command::SetVatPercent(13.0)).unwrap();

        let totals = session.totals();
        assert_eq!(totals.subtotal.paisa(), 10000);
        assert_eq!(totals.discount_amount.paisa(), 1000);
        assert_eq!(totals.taxable_amount.paisa(), 9000);
        assert_eq!(totals.tax_amount.paisa(), 1170);
        assert_eq!(totals.grand_total.paisa(), 10170);
    }

    #[test]
    fn test_draft_skips_placeholders_and_freezes_snapshots() {
        let mut session = session_with_line(medicine("m1", "Paracetamol"));
        session.dispatch(Command::AddLine).unwrap(); // empty placeholder

        let draft = session.build_draft();
        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].name_snapshot, "Paracetamol 100mg");
        assert_eq!(draft.lines[0].rate.paisa(), 5000);
        assert_eq!(draft.client_request_id, session.client_request_id());
    }

    #[test]
    fn test_new_bill_rotates_request_id() {
        let mut session = session_with_line(medicine("m1", "Paracetamol"));
        let before = session.client_request_id().to_string();

        session.dispatch(Command::NewBill).unwrap();
        assert_ne!(session.client_request_id(), before);
        assert!(session.cart().is_effectively_empty());
    }

    // -------------------------------------------------------------------------
    // Search through the session
    // -------------------------------------------------------------------------

    #[test]
    fn test_stale_search_response_not_current() {
        let mut session = BillingSession::new(EngineConfig::default());
        let line = session.cart().lines()[0].id.clone();

        let first = session.note_search_input(line.clone(), "par").unwrap();
        let second = session.note_search_input(line, "parac").unwrap();

        assert!(!session.search_is_current(&first));
        assert!(session.search_is_current(&second));
    }

    #[test]
    fn test_overlong_query_yields_no_ticket() {
        let mut session = BillingSession::new(EngineConfig::default());
        let line = session.cart().lines()[0].id.clone();
        let ticket = session.note_search_input(line.clone(), "para").unwrap();
        assert!(session.note_search_input(line, &"x".repeat(200)).is_none());
        assert!(!session.search_is_current(&ticket));
    }

    #[test]
    fn test_committing_selection_invalidates_search() {
        let mut session = BillingSession::new(EngineConfig::default());
        let line = session.cart().lines()[0].id.clone();
        let ticket = session.note_search_input(line.clone(), "par").unwrap();

        session
            .dispatch(Command::SelectMedicine {
                id: line,
                medicine: medicine("m1", "Paracetamol"),
            })
            .unwrap();
        assert!(!session.search_is_current(&ticket));
    }
}
