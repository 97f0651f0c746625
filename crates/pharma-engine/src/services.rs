//! # Collaborator Service Traits
//!
//! The engine's network boundary. Everything past these traits is someone
//! else's problem: the engine never opens a socket itself.
//!
//! ## Collaborators
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CatalogService    prefix/substring medicine search + snapshot feed    │
//! │  FinalizeService   turns an InvoiceDraft into an invoice (or rejects)  │
//! │                                                                         │
//! │  Override-token ISSUANCE is out of scope: the engine only carries a    │
//! │  token string + reason supplied by the operator.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Traits are `async_trait` + object-safe so tests can drive the session
//! with in-memory fakes.

use async_trait::async_trait;
use thiserror::Error;

use pharma_core::{InvoiceDraft, InvoiceRef, Medicine};

// =============================================================================
// Service Errors
// =============================================================================

/// Catalog-side failures. All of them are survivable: search falls back
/// to local ranking over the last snapshot.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Structured rejection from the bill finalization service.
///
/// `Duplicate` carries the existing invoice: for a retried idempotent
/// request it is a benign outcome, not a failure.
#[derive(Debug, Clone, Error)]
pub enum FinalizeFailure {
    #[error("validation rejected: {0}")]
    Validation(String),

    #[error("insufficient stock for {medicine_id}: available {available}, requested {requested}")]
    StockInsufficient {
        medicine_id: String,
        available: i64,
        requested: i64,
    },

    /// Server-side re-validation found expired stock the client snapshot
    /// missed (or an invalid token). Re-opens the override flow.
    #[error("expired stock requires an override token")]
    ExpiredOverrideRequired,

    #[error("duplicate request, invoice {} already exists", .0.invoice_number)]
    Duplicate(InvoiceRef),

    /// Network failure or timeout. Always safe to retry verbatim: the
    /// client request id is stable, so the service deduplicates.
    #[error("transport error: {0}")]
    Transport(String),
}

// =============================================================================
// Catalog Service
// =============================================================================

/// The medicine catalog collaborator.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Remote ranked search. The engine treats the response order as a
    /// ranking oracle.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Medicine>, ServiceError>;

    /// Full snapshot of active medicines, refreshed periodically. Used
    /// for the local suggestion fallback and stock gating.
    async fn snapshot(&self) -> Result<Vec<Medicine>, ServiceError>;
}

// =============================================================================
// Finalize Service
// =============================================================================

/// The bill finalization collaborator.
///
/// ## Contract
/// A repeated `client_request_id` MUST be treated as "already done" and
/// answered with the existing invoice (either as `Ok` or as
/// `Err(Duplicate)`), never by creating a second invoice.
#[async_trait]
pub trait FinalizeService: Send + Sync {
    async fn finalize(&self, draft: &InvoiceDraft) -> Result<InvoiceRef, FinalizeFailure>;
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pharma_core::Money;

    #[test]
    fn test_failure_messages() {
        let failure = FinalizeFailure::StockInsufficient {
            medicine_id: "m1".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            failure.to_string(),
            "insufficient stock for m1: available 3, requested 5"
        );

        let dup = FinalizeFailure::Duplicate(InvoiceRef {
            invoice_id: "inv-1".to_string(),
            invoice_number: "INV-0042".to_string(),
            grand_total: Money::from_paisa(10170),
        });
        assert!(dup.to_string().contains("INV-0042"));
    }
}
