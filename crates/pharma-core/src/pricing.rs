//! # Pricing Module
//!
//! Bill-level pricing arithmetic over computed cart lines.
//!
//! ## Calculation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subtotal        = Σ line.amount          (billable lines only)        │
//! │  discount_amount = subtotal × discount%                                 │
//! │  taxable_amount  = max(subtotal − discount_amount, 0)                   │
//! │  tax_amount      = taxable_amount × vat%                                │
//! │  grand_total     = max(taxable_amount + tax_amount, 0)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pure function, no side effects, never errors. Every intermediate is
//! floored at zero so malformed input (negative quantity, negative rate,
//! NaN percentage at the `Rate` boundary) degrades to a zero contribution
//! instead of producing a negative total.

use serde::{Deserialize, Serialize};

use crate::cart::ComputedLine;
use crate::money::{Money, Rate};

// =============================================================================
// Pricing Totals
// =============================================================================

/// The derived pricing summary of a bill.
///
/// Never stored: recomputed from the cart on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTotals {
    pub subtotal: Money,
    pub discount_amount: Money,
    pub taxable_amount: Money,
    pub tax_amount: Money,
    pub grand_total: Money,
}

// =============================================================================
// Calculator
// =============================================================================

/// Computes bill totals from computed lines and bill-level rates.
///
/// Only lines with a resolved medicine and a positive quantity contribute
/// to the subtotal; placeholder slots are invisible to pricing.
pub fn compute_totals(lines: &[ComputedLine], discount: Rate, vat: Rate) -> PricingTotals {
    let subtotal: Money = lines
        .iter()
        .filter(|l| l.line.is_billable())
        .map(|l| l.amount)
        .sum();
    let subtotal = subtotal.floor_zero();

    let discount_amount = subtotal.apply_rate(discount);
    let taxable_amount = (subtotal - discount_amount).floor_zero();
    let tax_amount = taxable_amount.apply_rate(vat);
    let grand_total = (taxable_amount + tax_amount).floor_zero();

    PricingTotals {
        subtotal,
        discount_amount,
        taxable_amount,
        tax_amount,
        grand_total,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
