//! # Engine Configuration
//!
//! Tunables for the billing session.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PHARMA_NEAR_EXPIRY_DAYS=45                                         │
//! │     PHARMA_SEARCH_DEBOUNCE_MS=200                                      │
//! │     PHARMA_SUGGESTION_LIMIT=10                                         │
//! │                                                                         │
//! │  2. TOML Config File (path supplied by the host application)           │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # engine.toml
//! [expiry]
//! near_window_days = 30
//!
//! [search]
//! debounce_ms = 180
//! suggestion_limit = 8
//! min_query_len = 3
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use pharma_core::{DEFAULT_SUGGESTION_LIMIT, MIN_QUERY_LEN, NEAR_EXPIRY_WINDOW_DAYS};

// =============================================================================
// Config Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpiryConfig {
    /// Days-until-expiry at or below which a line shows as near-expiry.
    pub near_window_days: i64,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        ExpiryConfig {
            near_window_days: NEAR_EXPIRY_WINDOW_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Wait this long after the last keystroke before dispatching a
    /// remote search.
    pub debounce_ms: u64,
    /// Maximum suggestions returned to the UI.
    pub suggestion_limit: usize,
    /// Trimmed queries shorter than this return no suggestions.
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            debounce_ms: 180,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            min_query_len: MIN_QUERY_LEN,
        }
    }
}

// =============================================================================
// Engine Config
// =============================================================================

/// All engine tunables. One instance per billing session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub expiry: ExpiryConfig,
    pub search: SearchConfig,
}

impl EngineConfig {
    /// Parses a TOML document. Unknown keys are ignored, missing sections
    /// fall back to defaults.
    pub fn from_toml_str(raw: &str) -> EngineResult<Self> {
        let mut config: EngineConfig =
            toml::from_str(raw).map_err(|e| EngineError::Config(e.to_string()))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads from a TOML file, falling back to defaults (plus env
    /// overrides) when the file does not exist.
    pub fn load_from_path(path: &Path) -> EngineResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no engine config file, using defaults");
            let mut config = EngineConfig::default();
            config.apply_env_overrides();
            return Ok(config);
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Applies `PHARMA_*` environment-variable overrides. Unparsable
    /// values are logged and ignored rather than failing startup.
    pub fn apply_env_overrides(&mut self) {
        if let Some(days) = read_env_parsed::<i64>("PHARMA_NEAR_EXPIRY_DAYS") {
            self.expiry.near_window_days = days;
        }
        if let Some(ms) = read_env_parsed::<u64>("PHARMA_SEARCH_DEBOUNCE_MS") {
            self.search.debounce_ms = ms;
        }
        if let Some(limit) = read_env_parsed::<usize>("PHARMA_SUGGESTION_LIMIT") {
            self.search.suggestion_limit = limit;
        }
    }

    /// The search debounce as a `Duration`.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }
}

fn read_env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, raw, "ignoring unparsable environment override");
            None
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
