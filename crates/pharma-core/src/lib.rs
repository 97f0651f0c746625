//! # pharma-core: Pure Business Logic for the PharmaPOS Billing Engine
//!
//! This crate is the **heart** of the billing cart engine. It contains all
//! business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     PharmaPOS Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                       UI (out of scope)                         │   │
//! │  │   Search box ──► Cart grid ──► Finalize button ──► Invoice      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands / events                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  pharma-engine (session layer)                  │   │
//! │  │   BillingSession, SearchCoordinator, SubmissionController       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ pharma-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌────────┐  │   │
//! │  │  │ pricing │ │ expiry  │ │ ranking │ │interaction│ │  cart  │  │   │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └───────────┘ └────────┘  │   │
//! │  │  ┌─────────┐ ┌─────────┐                                       │   │
//! │  │  │  gate   │ │ money   │   NO I/O • PURE FUNCTIONS             │   │
//! │  │  └─────────┘ └─────────┘                                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Medicine, Batch, CartLine, InvoiceDraft, ...)
//! - [`money`] - Integer money and basis-point rates (no floating point!)
//! - [`pricing`] - Bill totals: subtotal, discount, VAT, grand total
//! - [`expiry`] - Batch expiry resolution, classification, FEFO ordering
//! - [`ranking`] - Three-bucket suggestion ranking
//! - [`interaction`] - Pairwise drug-interaction conflict detection
//! - [`cart`] - The cart line store and its derived view
//! - [`gate`] - Pre-submission safety gates
//! - [`validation`] - Operator input validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output; "now" is a parameter
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are paisa (i64), rates are bps
//! 4. **Derived, Not Stored**: computed fields (line amount, expiry status,
//!    totals) are recomputed on every read and never written back

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod expiry;
pub mod gate;
pub mod interaction;
pub mod money;
pub mod pricing;
pub mod ranking;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartLineStore, ComputedLine, LinePatch};
pub use error::{CoreError, CoreResult, ValidationError};
pub use expiry::ExpiryStatus;
pub use gate::{GateDecision, GateKind};
pub use interaction::{InteractionConflict, InteractionRule, Severity};
pub use money::{Money, Rate};
pub use pricing::PricingTotals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Days-until-expiry at or below which a batch counts as "near expiry".
///
/// A default, not business law: classification takes the window as a
/// parameter and the engine config can override it.
pub const NEAR_EXPIRY_WINDOW_DAYS: i64 = 30;

/// Minimum trimmed query length before suggestion ranking runs.
///
/// Shorter queries would scan far too much of the catalog to be useful.
pub const MIN_QUERY_LEN: usize = 3;

/// Default number of ranked suggestions returned.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 8;

/// Maximum lines in a single cart.
///
/// Prevents runaway carts; generous for a pharmacy counter.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity on a single line.
///
/// Catches fat-finger entries (1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum length of a catalog search query.
pub const MAX_QUERY_LEN: usize = 100;
