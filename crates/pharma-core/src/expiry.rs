//! # Expiry Module
//!
//! Resolves the effective expiry date for a cart line and classifies it.
//!
//! ## Resolution Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Line batch number matches a medicine batch (case-insensitive, trim)?  │
//! │       │yes                                │no                           │
//! │       ▼                                   ▼                             │
//! │  use that batch's expiry          use the medicine's own expiry         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Classification
//! - `Unknown` — no date available
//! - `Expired` — date is before today
//! - `Near`    — expires within the configured window (default 30 days)
//! - `Fresh`   — everything else
//!
//! The near-expiry window is a configuration value, not business law;
//! every classification call takes it as a parameter.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Batch, CartLine, Medicine};
use crate::NEAR_EXPIRY_WINDOW_DAYS;

// =============================================================================
// Expiry Status
// =============================================================================

/// Classification of a resolved expiry date relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    Near,
    Fresh,
    /// No date recorded, or the batch carries no expiry.
    Unknown,
}

impl ExpiryStatus {
    #[inline]
    pub fn is_expired(&self) -> bool {
        matches!(self, ExpiryStatus::Expired)
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolves the effective expiry date for a line against its medicine.
///
/// Batch numbers compare case-insensitively after trimming. An empty line
/// batch number, or one that matches no batch, falls back to the
/// medicine's own expiry date.
pub fn resolve_expiry(line: &CartLine, medicine: &Medicine) -> Option<NaiveDate> {
    let wanted = line.batch_number.trim();
    if !wanted.is_empty() {
        let wanted = wanted.to_lowercase();
        for batch in medicine.effective_batches() {
            if batch.batch_number.trim().to_lowercase() == wanted {
                return batch.expiry_date;
            }
        }
    }
    medicine.expiry_date
}

/// Classifies a date against `today` with a configurable near window.
pub fn classify(date: Option<NaiveDate>, today: NaiveDate, near_window_days: i64) -> ExpiryStatus {
    let Some(date) = date else {
        return ExpiryStatus::Unknown;
    };

    if date < today {
        return ExpiryStatus::Expired;
    }

    let days_until = (date - today).num_days();
    if days_until <= near_window_days {
        ExpiryStatus::Near
    } else {
        ExpiryStatus::Fresh
    }
}

/// Classifies with the default 30-day near window.
pub fn classify_default(date: Option<NaiveDate>, today: NaiveDate) -> ExpiryStatus {
    classify(date, today, NEAR_EXPIRY_WINDOW_DAYS)
}

// =============================================================================
// Batch Choices (FEFO)
// =============================================================================

/// Lists a medicine's selectable batches in FEFO order
/// (first-expired-first-out: oldest-expiring first), so the default
/// selection favors stock rotation.
///
/// Batches with no stock are excluded; undated batches sort after all
/// dated ones.
pub fn list_batch_choices(medicine: &Medicine) -> Vec<Batch> {
    let mut batches: Vec<Batch> = medicine
        .effective_batches()
        .into_iter()
        .filter(|b| b.qty > 0)
        .collect();
    batches.sort_by_key(|b| match b.expiry_date {
        Some(d) => (0u8, d),
        None => (1u8, NaiveDate::MAX),
    });
    batches
}

// =============================================================================
// Unit Tests
// =============================================================================
