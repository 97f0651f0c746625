//! # Drug Interaction Detection
//!
//! Pairwise interaction-conflict detection between a candidate medicine
//! and medicines already in the cart.
//!
//! ## Matching Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  identity(med) = lowercase(trim(generic_name)), fallback to name        │
//! │                                                                         │
//! │  rule { left, right } fires for (candidate, existing) when:             │
//! │    candidate contains left  AND existing contains right                 │
//! │    OR candidate contains right AND existing contains left   (mirror)    │
//! │                                                                         │
//! │  Interaction is symmetric: (Warfarin, Aspirin) ≡ (Aspirin, Warfarin).  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Conflicts are deduplicated by a composite key, so the same pair is
//! reported once even when several cart lines hold the same medicine.
//!
//! ## Two call sites
//! - whole-cart pass ([`cart_conflicts`]) for the persistent warning banner
//! - single-candidate pass ([`find_conflicts`]) at selection time, to decide
//!   whether to interrupt with a blocking confirmation

use serde::{Deserialize, Serialize};

use crate::types::Medicine;

// =============================================================================
// Rule & Conflict Types
// =============================================================================

/// Severity of an interaction conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
}

/// A pairwise interaction rule over medicine identities.
///
/// `left`/`right` are lowercase substrings matched against [identities]
/// (`Medicine::interaction_identity`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRule {
    pub left: String,
    pub right: String,
    pub severity: Severity,
    pub message: String,
}

impl InteractionRule {
    pub fn new(left: &str, right: &str, severity: Severity, message: &str) -> Self {
        InteractionRule {
            left: left.to_lowercase(),
            right: right.to_lowercase(),
            severity,
            message: message.to_string(),
        }
    }
}

/// A detected conflict between two medicines in (or entering) the cart.
///
/// Ephemeral: recomputed from current cart contents, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionConflict {
    /// Dedup identity (rule pair + rule index + the two identities).
    pub key: String,
    pub left: String,
    pub right: String,
    pub severity: Severity,
    pub message: String,
}

// =============================================================================
// Default Rules
// =============================================================================

/// A small built-in rule table covering classic dangerous pairs.
///
/// Deployments replace this with their own table; the detector takes
/// rules as a parameter everywhere.
pub fn default_rules() -> Vec<InteractionRule> {
    vec![
        InteractionRule::new(
            "warfarin",
            "aspirin",
            Severity::High,
            "Warfarin + Aspirin: major bleeding risk",
        ),
        InteractionRule::new(
            "warfarin",
            "ibuprofen",
            Severity::High,
            "Warfarin + NSAID: increased bleeding risk",
        ),
        InteractionRule::new(
            "sildenafil",
            "nitroglycerin",
            Severity::High,
            "Sildenafil + nitrates: severe hypotension",
        ),
        InteractionRule::new(
            "ciprofloxacin",
            "tizanidine",
            Severity::High,
            "Ciprofloxacin + Tizanidine: contraindicated",
        ),
        InteractionRule::new(
            "metronidazole",
            "warfarin",
            Severity::Medium,
            "Metronidazole may potentiate Warfarin",
        ),
        InteractionRule::new(
            "fluoxetine",
            "tramadol",
            Severity::Medium,
            "Fluoxetine + Tramadol: serotonin syndrome risk",
        ),
    ]
}

// =============================================================================
// Detection
// =============================================================================

/// Finds conflicts between a candidate medicine and medicines already in
/// the cart. Symmetric and deduplicated (see module docs).
pub fn find_conflicts(
    candidate: &Medicine,
    existing_in_cart: &[&Medicine],
    rules: &[InteractionRule],
) -> Vec<InteractionConflict> {
    let candidate_id = candidate.interaction_identity();
    let mut conflicts: Vec<InteractionConflict> = Vec::new();

    for existing in existing_in_cart {
        // Same medicine in two lines is a quantity problem, not an
        // interaction.
        if existing.id == candidate.id {
            continue;
        }
        let existing_id = existing.interaction_identity();

        for (idx, rule) in rules.iter().enumerate() {
            let direct = candidate_id.contains(&rule.left) && existing_id.contains(&rule.right);
            let mirror = candidate_id.contains(&rule.right) && existing_id.contains(&rule.left);
            if !(direct || mirror) {
                continue;
            }

            // Order the identity half of the key so the mirror case maps
            // onto the same key.
            let (a, b) = if candidate_id <= existing_id {
                (&candidate_id, &existing_id)
            } else {
                (&existing_id, &candidate_id)
            };
            let key = format!("{}_{}_{}_{}_{}", rule.left, rule.right, idx, a, b);

            if conflicts.iter().any(|c| c.key == key) {
                continue;
            }
            conflicts.push(InteractionConflict {
                key,
                left: candidate_id.clone(),
                right: existing_id.clone(),
                severity: rule.severity,
                message: rule.message.clone(),
            });
        }
    }

    conflicts
}

/// Whole-cart pass: unions conflicts across every ordered pair of
/// medicines currently in the cart. Running it twice on an unchanged cart
/// yields the same set.
pub fn cart_conflicts(
    medicines: &[&Medicine],
    rules: &[InteractionRule],
) -> Vec<InteractionConflict> {
    let mut all: Vec<InteractionConflict> = Vec::new();
    for (i, candidate) in medicines.iter().enumerate() {
        let rest: Vec<&Medicine> = medicines
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, m)| *m)
            .collect();
        for conflict in find_conflicts(candidate, &rest, rules) {
            if !all.iter().any(|c| c.key == conflict.key) {
                all.push(conflict);
            }
        }
    }
    all
}

// =============================================================================
// Unit Tests
// =============================================================================
