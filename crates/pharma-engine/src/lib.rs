//! # pharma-engine: Billing Session & Submission Orchestration
//!
//! The state-and-rules layer between raw UI events and the network
//! boundary. It composes the pure rules from `pharma-core` into one
//! billing session per bill, and owns the two points of asynchrony:
//!
//! 1. **Catalog search** — debounced, generation-guarded against stale
//!    responses, degrading to local ranking when the collaborator fails
//!    ([`search`]).
//! 2. **Finalize submission** — at most one in flight per session,
//!    idempotent under retries via a session-stable client request id
//!    ([`session`]).
//!
//! ## Control Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI events ──► Command ──► BillingSession::dispatch                     │
//! │                              │                                          │
//! │                              ▼ (derive on read)                         │
//! │     computed lines / totals / conflicts / gate state                    │
//! │                              │                                          │
//! │  finalize key ──► attempt_finalize ──► gates ──► FinalizeService       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`command`] - The explicit command surface
//! - [`config`] - TOML + env configuration
//! - [`error`] - Engine error taxonomy
//! - [`search`] - Debounce, staleness guard, local fallback
//! - [`services`] - Collaborator traits (`CatalogService`, `FinalizeService`)
//! - [`session`] - The session state machine and submission controller

pub mod command;
pub mod config;
pub mod error;
pub mod search;
pub mod services;
pub mod session;

pub use command::{Command, CommandOutcome};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use search::{fetch_suggestions, SearchCoordinator, SearchTicket};
pub use services::{CatalogService, FinalizeFailure, FinalizeService, ServiceError};
pub use session::{BillingSession, FinalizeAttempt, SessionPhase};
