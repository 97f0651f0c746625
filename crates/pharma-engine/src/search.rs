//! # Search Coordination
//!
//! Debounced catalog search with a stale-response guard.
//!
//! ## The Race This Solves
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  t0  operator types "par"      → dispatch search #1                     │
//! │  t1  operator types "parac"    → dispatch search #2                     │
//! │  t2  search #1 resolves        → STALE, must be dropped                 │
//! │  t3  search #2 resolves        → current, apply to the active line      │
//! │                                                                         │
//! │  Every dispatched search carries a generation number; a response is    │
//! │  applied only if its generation (and target line) is still current.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On a service failure, [`fetch_suggestions`] degrades synchronously to
//! local ranking over the held catalog snapshot, so the operator is never
//! left without suggestions.

use std::time::Duration;
use tracing::{debug, warn};

use crate::services::CatalogService;
use pharma_core::{ranking, LineId, Medicine};

// =============================================================================
// Search Ticket
// =============================================================================

/// Identity of one dispatched search: which line, which query, which
/// generation. Carried alongside the request so the response can be
/// matched against the coordinator's current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub line_id: LineId,
    pub query: String,
    pub generation: u64,
}

// =============================================================================
// Coordinator
// =============================================================================

/// Tracks the currently active search per session.
///
/// Single-threaded by construction (one coordinator per session); the
/// generation counter handles interleaved async callbacks, not parallel
/// threads.
#[derive(Debug)]
pub struct SearchCoordinator {
    generation: u64,
    active: Option<SearchTicket>,
    min_query_len: usize,
}

impl SearchCoordinator {
    pub fn new(min_query_len: usize) -> Self {
        SearchCoordinator {
            generation: 0,
            active: None,
            min_query_len,
        }
    }

    /// Registers new input for a line, invalidating every earlier
    /// dispatch. Returns the ticket to attach to the outgoing request, or
    /// `None` when the trimmed query is below the minimum length (which
    /// also clears the active search).
    pub fn note_input(&mut self, line_id: LineId, query: &str) -> Option<SearchTicket> {
        self.generation += 1;
        let trimmed = query.trim();
        if trimmed.len() < self.min_query_len {
            self.active = None;
            return None;
        }
        let ticket = SearchTicket {
            line_id,
            query: trimmed.to_string(),
            generation: self.generation,
        };
        self.active = Some(ticket.clone());
        Some(ticket)
    }

    /// Is this ticket still the active search? Responses failing this
    /// check are dropped without touching session state.
    pub fn is_current(&self, ticket: &SearchTicket) -> bool {
        self.active.as_ref() == Some(ticket)
    }

    /// Drops the active search (line removed, selection committed, bill
    /// reset).
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.active = None;
    }
}

// =============================================================================
// Fetch with Fallback
// =============================================================================

/// Debounces, then queries the remote catalog; on failure, falls back to
/// local ranking over `snapshot` with the same contract.
///
/// The debounce sleep lives here so callers dispatch immediately on every
/// keystroke; superseded requests waste at most one sleep before their
/// result is discarded by the generation check.
pub async fn fetch_suggestions(
    ticket: &SearchTicket,
    service: &dyn CatalogService,
    snapshot: &[Medicine],
    debounce: Duration,
    limit: usize,
) -> Vec<Medicine> {
    tokio::time::sleep(debounce).await;

    match service.search(&ticket.query, limit).await {
        Ok(results) => {
            debug!(
                query = %ticket.query,
                count = results.len(),
                "remote catalog search"
            );
            results
        }
        Err(err) => {
            warn!(
                query = %ticket.query,
                error = %err,
                "catalog search failed, falling back to local ranking"
            );
            ranking::rank(&ticket.query, snapshot, limit)
                .into_iter()
                .cloned()
                .collect()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
