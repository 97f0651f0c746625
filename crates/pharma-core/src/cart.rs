//! # Cart Line Store
//!
//! Owns the ordered collection of cart lines and their mutations.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  Operator Action            Store Operation        State Change        │
//! │  ───────────────            ───────────────        ────────────        │
//! │  New row            ──────► add_line()        ───► push placeholder    │
//! │  Pick suggestion    ──────► select_medicine() ───► seed rate + term    │
//! │  Edit qty/rate/batch──────► update_line()     ───► atomic line patch   │
//! │  Delete row         ──────► remove_line()     ───► remove (or reseed)  │
//! │  Read totals/status ──────► computed_lines()  ───► derive, never store │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - The store always holds at least one line (an empty placeholder), so
//!   there is a perpetual input target. Removing the last line synthesizes
//!   a fresh placeholder.
//! - Line ids are never reused within a session (monotonic counter).
//! - Every mutation replaces the whole line; no operation can partially
//!   apply. Computed fields (amount, expiry status) exist only on read,
//!   which is what keeps them from drifting out of sync with edits.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::expiry::{self, ExpiryStatus};
use crate::money::Money;
use crate::types::{CartLine, LineId, Medicine};
use crate::validation::validate_quantity;
use crate::MAX_CART_LINES;

// =============================================================================
// Computed Line
// =============================================================================

/// A cart line plus its derived fields. Recomputed on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedLine {
    pub line: CartLine,
    pub amount: Money,
    pub resolved_expiry: Option<NaiveDate>,
    pub expiry_status: ExpiryStatus,
}

// =============================================================================
// Line Patch
// =============================================================================

/// A partial update to a cart line, applied atomically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinePatch {
    pub search_term: Option<String>,
    pub batch_number: Option<String>,
    pub qty: Option<i64>,
    pub rate: Option<Money>,
}

// =============================================================================
// Cart Line Store
// =============================================================================

/// The ordered collection of cart lines for one billing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineStore {
    lines: Vec<CartLine>,
    /// Monotonic id source; never decremented, never reused.
    next_seq: u64,
}

impl CartLineStore {
    /// Creates a store holding one empty placeholder line.
    pub fn new() -> Self {
        let mut store = CartLineStore {
            lines: Vec::new(),
            next_seq: 0,
        };
        store.push_placeholder();
        store
    }

    fn push_placeholder(&mut self) -> LineId {
        self.next_seq += 1;
        let id = LineId::from_seq(self.next_seq);
        self.lines.push(CartLine::placeholder(id.clone()));
        id
    }

    /// Appends a new placeholder line and returns its id.
    pub fn add_line(&mut self) -> CoreResult<LineId> {
        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }
        Ok(self.push_placeholder())
    }

    /// Applies a patch to the line with `id`. The whole patch is validated
    /// before any field is written, so a rejected patch leaves the line
    /// untouched.
    pub fn update_line(&mut self, id: &LineId, patch: LinePatch) -> CoreResult<()> {
        if let Some(qty) = patch.qty {
            validate_quantity(qty)?;
        }

        let line = self.line_mut(id)?;
        let mut updated = line.clone();
        if let Some(term) = patch.search_term {
            updated.search_term = term;
        }
        if let Some(batch) = patch.batch_number {
            updated.batch_number = batch;
        }
        if let Some(qty) = patch.qty {
            updated.qty = qty;
        }
        if let Some(rate) = patch.rate {
            updated.rate = rate;
        }
        *line = updated;
        Ok(())
    }

    /// Commits a medicine selection onto a line: sets the medicine, seeds
    /// the rate from its unit price and the search term from its display
    /// name (keeping the visible text consistent with the selection), and
    /// defaults the batch to the FEFO-first choice.
    pub fn select_medicine(&mut self, id: &LineId, medicine: Medicine) -> CoreResult<()> {
        let default_batch = expiry::list_batch_choices(&medicine)
            .first()
            .map(|b| b.batch_number.clone())
            .unwrap_or_default();

        let line = self.line_mut(id)?;
        line.search_term = medicine.name.clone();
        line.rate = medicine.unit_price;
        line.batch_number = default_batch;
        if line.qty <= 0 {
            line.qty = 1;
        }
        line.medicine = Some(medicine);
        Ok(())
    }

    /// Removes the line with `id`. If that was the last line, a fresh
    /// placeholder is synthesized so the cart never has zero lines.
    pub fn remove_line(&mut self, id: &LineId) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| &l.id != id);
        if self.lines.len() == before {
            return Err(CoreError::LineNotFound(id.to_string()));
        }
        if self.lines.is_empty() {
            self.push_placeholder();
        }
        Ok(())
    }

    /// Clears every line, leaving one fresh placeholder. Ids continue from
    /// the same counter (no reuse across the reset).
    pub fn reset(&mut self) {
        self.lines.clear();
        self.push_placeholder();
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, id: &LineId) -> CoreResult<&CartLine> {
        self.lines
            .iter()
            .find(|l| &l.id == id)
            .ok_or_else(|| CoreError::LineNotFound(id.to_string()))
    }

    fn line_mut(&mut self, id: &LineId) -> CoreResult<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| CoreError::LineNotFound(id.to_string()))
    }

    /// Number of lines, placeholders included.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True when no line is billable (resolved medicine with qty > 0).
    pub fn is_effectively_empty(&self) -> bool {
        !self.lines.iter().any(|l| l.is_billable())
    }

    /// The medicines currently committed to the cart, for interaction and
    /// stock checks.
    pub fn resolved_medicines(&self) -> Vec<&Medicine> {
        self.lines.iter().filter_map(|l| l.medicine.as_ref()).collect()
    }

    /// Derives the computed view of every line: amount, resolved expiry,
    /// expiry classification. This is the only way to observe derived
    /// fields.
    pub fn computed_lines(&self, today: NaiveDate, near_window_days: i64) -> Vec<ComputedLine> {
        self.lines
            .iter()
            .map(|line| {
                let resolved_expiry = line
                    .medicine
                    .as_ref()
                    .and_then(|m| expiry::resolve_expiry(line, m));
                let expiry_status = if line.medicine.is_some() {
                    expiry::classify(resolved_expiry, today, near_window_days)
                } else {
                    ExpiryStatus::Unknown
                };
                ComputedLine {
                    amount: line.amount(),
                    resolved_expiry,
                    expiry_status,
                    line: line.clone(),
                }
            })
            .collect()
    }
}

impl Default for CartLineStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Test Support
// =============================================================================


// =============================================================================
// Unit Tests
// =============================================================================
