//! # Suggestion Ranking
//!
//! Ranks catalog search results for a query string.
//!
//! ## Ranking Buckets
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Bucket 1: EXACT     barcode or SKU equals the query                    │
//! │  Bucket 2: PREFIX    name or generic name starts with the query         │
//! │  Bucket 3: CONTAINS  name/generic/barcode/SKU/rack contains the query   │
//! │                                                                         │
//! │  Result = bucket1 ++ bucket2 ++ bucket3, truncated to `limit`.          │
//! │  Catalog order is preserved inside each bucket, and a medicine          │
//! │  contributes at most once: "scan-exact beats starts-with beats          │
//! │  contains".                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries shorter than [`crate::MIN_QUERY_LEN`] after trimming return
//! nothing, keeping barcode scans fast and avoiding overly broad scans.
//!
//! This ranking doubles as the offline fallback when the remote catalog
//! search fails: same contract, local snapshot.

use crate::types::Medicine;
use crate::{DEFAULT_SUGGESTION_LIMIT, MIN_QUERY_LEN};

/// Ranks `catalog` against `query`, returning at most `limit` medicines.
pub fn rank<'a>(query: &str, catalog: &'a [Medicine], limit: usize) -> Vec<&'a Medicine> {
    let query = query.trim().to_lowercase();
    if query.len() < MIN_QUERY_LEN {
        return Vec::new();
    }

    let mut exact: Vec<&Medicine> = Vec::new();
    let mut prefix: Vec<&Medicine> = Vec::new();
    let mut substring: Vec<&Medicine> = Vec::new();

    for med in catalog {
        let name = med.name.to_lowercase();
        let generic = med.generic_name.to_lowercase();
        let barcode = med.barcode.as_deref().unwrap_or("").to_lowercase();
        let sku = med.sku.as_deref().unwrap_or("").to_lowercase();
        let rack = med.rack.as_deref().unwrap_or("").to_lowercase();

        if (!barcode.is_empty() && barcode == query) || (!sku.is_empty() && sku == query) {
            exact.push(med);
        } else if name.starts_with(&query) || generic.starts_with(&query) {
            prefix.push(med);
        } else if name.contains(&query)
            || generic.contains(&query)
            || barcode.contains(&query)
            || sku.contains(&query)
            || rack.contains(&query)
        {
            substring.push(med);
        }
    }

    exact
        .into_iter()
        .chain(prefix)
        .chain(substring)
        .take(limit)
        .collect()
}

/// [`rank`] with the default suggestion limit.
pub fn rank_default<'a>(query: &str, catalog: &'a [Medicine]) -> Vec<&'a Medicine> {
    rank(query, catalog, DEFAULT_SUGGESTION_LIMIT)
}

// =============================================================================
// Unit Tests
// =============================================================================
