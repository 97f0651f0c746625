//! # Domain Types
//!
//! Core domain types for the billing cart engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Medicine     │   │    CartLine     │   │  InvoiceDraft   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, name       │   │  id (LineId)    │   │  customer       │       │
//! │  │  generic_name   │   │  medicine (opt) │   │  lines          │       │
//! │  │  batches[]      │   │  batch, qty     │   │  totals         │       │
//! │  │  stock, price   │   │  rate           │   │  request id     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Medicine is owned by the catalog collaborator; the engine holds       │
//! │  read-only copies. CartLine is the only mutable aggregate. The         │
//! │  InvoiceDraft is assembled once per finalize attempt from the cart.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Draft lines freeze the medicine name and rate at submission time, so a
//! later catalog update cannot change what an already-submitted invoice
//! says was sold.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::{Money, Rate};

// =============================================================================
// Line Identity
// =============================================================================

/// Opaque, stable identifier for a cart line.
///
/// Ids are unique for the lifetime of a billing session and never reused
/// after a line is removed (monotonic counter plus a UUID fragment).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineId(String);

impl LineId {
    /// Builds a line id from a session-scoped monotonic sequence number.
    pub fn from_seq(seq: u64) -> Self {
        LineId(format!("line-{seq}-{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Regulatory Class
// =============================================================================

/// Regulatory classification of a medicine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegulatoryClass {
    /// Over-the-counter, no prescription needed.
    #[default]
    Otc,
    /// Requires a prescription record on the bill.
    PrescriptionOnly,
    /// Controlled substance (also prescription-only).
    Controlled,
}

// =============================================================================
// Batch
// =============================================================================

/// A stock batch of a medicine.
///
/// ## Invariant
/// `qty >= 0`. Constructors and deserialization boundaries are expected to
/// clamp; the expiry resolver additionally skips non-positive batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub batch_number: String,
    /// Missing expiry means "unknown", not "never expires".
    pub expiry_date: Option<NaiveDate>,
    pub qty: i64,
}

// =============================================================================
// Medicine
// =============================================================================

/// A medicine from the catalog collaborator. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    /// Unique identifier (catalog-owned).
    pub id: String,

    /// Brand/display name shown to the operator and on the invoice.
    pub name: String,

    /// Generic name, the identity used for interaction checks.
    pub generic_name: String,

    pub barcode: Option<String>,
    pub sku: Option<String>,

    /// Physical rack/shelf location, searchable.
    pub rack: Option<String>,

    /// Last-known sellable stock across all batches.
    pub stock_qty: i64,

    /// Unit selling price.
    pub unit_price: Money,

    pub prescription_required: bool,
    pub regulatory_class: RegulatoryClass,

    /// Medicine-level batch/expiry, used when `batches` is empty.
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,

    #[serde(default)]
    pub batches: Vec<Batch>,
}

impl Medicine {
    /// Returns the medicine's explicit batches, or a single synthetic batch
    /// assembled from the medicine's own batch-number/expiry/stock fields
    /// when none are recorded.
    ///
    /// Every caller that reasons about batches goes through this so there
    /// is exactly one code path for the "no batches recorded" case.
    pub fn effective_batches(&self) -> Vec<Batch> {
        if !self.batches.is_empty() {
            return self.batches.clone();
        }
        vec![Batch {
            batch_number: self.batch_number.clone().unwrap_or_default(),
            expiry_date: self.expiry_date,
            qty: self.stock_qty.max(0),
        }]
    }

    /// Identity used for interaction matching: lower-cased trimmed generic
    /// name, falling back to the display name when the generic is empty.
    pub fn interaction_identity(&self) -> String {
        let generic = self.generic_name.trim();
        let source = if generic.is_empty() {
            self.name.trim()
        } else {
            generic
        };
        source.to_lowercase()
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One editable row of the billing cart.
///
/// A line with `medicine == None` is a placeholder editing slot: it keeps
/// the operator's in-progress search text but never contributes to totals
/// and is never submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: LineId,
    pub medicine: Option<Medicine>,
    /// The visible search text; seeded from the medicine name on selection.
    pub search_term: String,
    /// Chosen batch number ("" = use medicine-level expiry).
    pub batch_number: String,
    pub qty: i64,
    pub rate: Money,
}

impl CartLine {
    /// A fresh placeholder slot.
    pub fn placeholder(id: LineId) -> Self {
        CartLine {
            id,
            medicine: None,
            search_term: String::new(),
            batch_number: String::new(),
            qty: 1,
            rate: Money::zero(),
        }
    }

    /// True when this line has a committed medicine selection.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.medicine.is_some()
    }

    /// True when this line contributes to totals and submission.
    #[inline]
    pub fn is_billable(&self) -> bool {
        self.is_resolved() && self.qty > 0
    }

    /// Line amount: `max(qty,0) * max(rate,0)`.
    pub fn amount(&self) -> Money {
        self.rate.floor_zero().multiply_quantity(self.qty)
    }
}

// =============================================================================
// Credentials & Customer
// =============================================================================

/// Operator-supplied authorization to sell expired stock.
///
/// The engine checks presence only; authenticity and single-use
/// enforcement belong to the finalization service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideCredential {
    pub token: String,
    pub reason: String,
}

impl OverrideCredential {
    /// A credential counts only if the token is non-empty after trimming.
    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

/// Prescription evidence attached to the bill.
///
/// Image payloads are opaque to the engine (the UI layer supplies an
/// already-encoded data URI or upload reference); the engine checks
/// presence only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum PrescriptionRecord {
    /// No prescription collected.
    #[default]
    None,
    /// Scanned/photographed prescription.
    Image { data: String },
    /// Typed-in prescription text.
    Digital { text: String },
}

impl PrescriptionRecord {
    /// True when this record satisfies the prescription gate.
    pub fn is_present(&self) -> bool {
        match self {
            PrescriptionRecord::None => false,
            PrescriptionRecord::Image { data } => !data.trim().is_empty(),
            PrescriptionRecord::Digital { text } => !text.trim().is_empty(),
        }
    }
}

/// Walk-in customer details. All optional; anonymous sales are normal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

// =============================================================================
// Invoice Draft
// =============================================================================

/// A submitted line item. Uses the snapshot pattern: name and rate are
/// frozen at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftLine {
    pub medicine_id: String,
    pub name_snapshot: String,
    pub batch_number: String,
    pub qty: i64,
    pub rate: Money,
    pub amount: Money,
}

/// The aggregate handed to the bill finalization service.
///
/// ## Idempotency invariant
/// `client_request_id` is created once per billing session and reused
/// verbatim across every retry; it rotates only after a successful
/// finalize or an explicit reset. The service treats a repeated id as
/// "already done" instead of creating a duplicate invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    pub client_request_id: String,
    pub customer: CustomerInfo,
    pub lines: Vec<DraftLine>,
    pub discount: Rate,
    pub vat: Rate,
    pub totals: crate::pricing::PricingTotals,
    pub prescription: PrescriptionRecord,
    pub override_credential: Option<OverrideCredential>,
}

/// Reference to an invoice created by the finalization service. Carries
/// the server-confirmed total so the receipt shows what was actually
/// booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRef {
    pub invoice_id: String,
    pub invoice_number: String,
    pub grand_total: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
