//! # Safety Gates
//!
//! Decides whether a finalize attempt may proceed, and if not, which gate
//! is blocking and what would clear it.
//!
//! ## Gate Order (fixed, short-circuiting)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. CartEmpty     no billable line                                      │
//! │  2. Stock         some line's qty exceeds last-known stock              │
//! │  3. Prescription  Rx-required medicine without a prescription record    │
//! │  4. Expiry        expired line without an override token                │
//! │                                                                         │
//! │  Only the FIRST failing gate is surfaced: the earliest problem is the   │
//! │  most actionable one for the operator.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The expiry gate checks token *presence* only. The finalization service
//! is the authority on token validity; the gate merely permits the
//! attempt.

use serde::{Deserialize, Serialize};

use crate::cart::ComputedLine;
use crate::types::{Medicine, OverrideCredential, PrescriptionRecord};

// =============================================================================
// Gate Kinds & Decision
// =============================================================================

/// The four safety gates, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    CartEmpty,
    Stock,
    Prescription,
    Expiry,
}

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateDecision {
    pub blocked: bool,
    pub reason: Option<GateKind>,
    /// Operator-facing detail lines for the blocking gate.
    pub detail: Vec<String>,
}

impl GateDecision {
    fn clear() -> Self {
        GateDecision {
            blocked: false,
            reason: None,
            detail: Vec::new(),
        }
    }

    fn blocked(reason: GateKind, detail: Vec<String>) -> Self {
        GateDecision {
            blocked: true,
            reason: Some(reason),
            detail,
        }
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Evaluates all gates against the computed cart view, the last-known
/// catalog snapshot, and the collected credentials. Short-circuits on
/// the first failing gate.
pub fn evaluate(
    lines: &[ComputedLine],
    snapshot: &[Medicine],
    prescription: &PrescriptionRecord,
    override_credential: Option<&OverrideCredential>,
) -> GateDecision {
    if let Some(decision) = check_cart_empty(lines) {
        return decision;
    }
    if let Some(decision) = check_stock(lines, snapshot) {
        return decision;
    }
    if let Some(decision) = check_prescription(lines, prescription) {
        return decision;
    }
    if let Some(decision) = check_expiry(lines, override_credential) {
        return decision;
    }
    GateDecision::clear()
}

fn check_cart_empty(lines: &[ComputedLine]) -> Option<GateDecision> {
    if lines.iter().any(|l| l.line.is_billable()) {
        return None;
    }
    Some(GateDecision::blocked(
        GateKind::CartEmpty,
        vec!["Add at least one medicine with a quantity".to_string()],
    ))
}

fn check_stock(lines: &[ComputedLine], snapshot: &[Medicine]) -> Option<GateDecision> {
    let mut detail = Vec::new();
    for computed in lines {
        let Some(medicine) = computed.line.medicine.as_ref() else {
            continue;
        };
        // The refreshed snapshot supersedes the copy frozen into the
        // line at selection time; lines whose medicine is missing from
        // the snapshot fall back to that copy.
        let available = snapshot
            .iter()
            .find(|m| m.id == medicine.id)
            .map_or(medicine.stock_qty, |m| m.stock_qty);
        if computed.line.qty > available {
            detail.push(format!(
                "{}: requested {}, in stock {}",
                medicine.name, computed.line.qty, available
            ));
        }
    }
    if detail.is_empty() {
        None
    } else {
        Some(GateDecision::blocked(GateKind::Stock, detail))
    }
}

fn check_prescription(
    lines: &[ComputedLine],
    prescription: &PrescriptionRecord,
) -> Option<GateDecision> {
    let requiring: Vec<String> = lines
        .iter()
        .filter(|l| l.line.is_billable())
        .filter_map(|l| l.line.medicine.as_ref())
        .filter(|m| m.prescription_required)
        .map(|m| m.name.clone())
        .collect();

    if requiring.is_empty() || prescription.is_present() {
        return None;
    }

    let mut detail = vec!["Prescription required for:".to_string()];
    detail.extend(requiring);
    Some(GateDecision::blocked(GateKind::Prescription, detail))
}

fn check_expiry(
    lines: &[ComputedLine],
    override_credential: Option<&OverrideCredential>,
) -> Option<GateDecision> {
    let expired: Vec<String> = lines
        .iter()
        .filter(|l| l.line.is_billable() && l.expiry_status.is_expired())
        .map(|l| {
            let name = l
                .line
                .medicine
                .as_ref()
                .map(|m| m.name.as_str())
                .unwrap_or("line");
            match l.resolved_expiry {
                Some(date) => format!("{name}: expired {date}"),
                None => format!("{name}: expired"),
            }
        })
        .collect();

    if expired.is_empty() {
        return None;
    }
    if override_credential.is_some_and(OverrideCredential::has_token) {
        return None;
    }
    Some(GateDecision::blocked(GateKind::Expiry, expired))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests_support::{computed, test_medicine};
    use crate::cart::ComputedLine;
    use crate::expiry::ExpiryStatus;
    use crate::money::Money;
    use crate::types::{CartLine, LineId};
    use chrono::NaiveDate;

    fn line_for(medicine_stock: i64, qty: i64) -> ComputedLine {
        let mut line = CartLine::placeholder(LineId::from_seq(1));
        line.medicine = Some(test_medicine("m1", Money::from_paisa(500), medicine_stock));
        line.qty = qty;
        line.rate = Money::from_paisa(500);
        computed(line)
    }

    fn expired_line() -> ComputedLine {
        let mut cl = line_for(10, 1);
        cl.resolved_expiry = NaiveDate::from_ymd_opt(2026, 8, 25);
        cl.expiry_status = ExpiryStatus::Expired;
        cl
    }

    fn rx_line() -> ComputedLine {
        let mut cl = line_for(10, 1);
        if let Some(m) = cl.line.medicine.as_mut() {
            m.prescription_required = true;
        }
        cl
    }

    fn token() -> OverrideCredential {
        OverrideCredential {
            token: "OVR-1".to_string(),
            reason: "approved".to_string(),
        }
    }

    #[test]
    fn test_empty_cart_blocks_first() {
        let decision = evaluate(&[], &[], &PrescriptionRecord::None, None);
        assert!(decision.blocked);
        assert_eq!(decision.reason, Some(GateKind::CartEmpty));
    }

    #[test]
    fn test_placeholder_only_cart_is_empty() {
        let cl = computed(CartLine::placeholder(LineId::from_seq(1)));
        let decision = evaluate(&[cl], &[], &PrescriptionRecord::None, None);
        assert_eq!(decision.reason, Some(GateKind::CartEmpty));
    }

    #[test]
    fn test_stock_gate() {
        let decision = evaluate(&[line_for(3, 5)], &[], &PrescriptionRecord::None, None);
        assert_eq!(decision.reason, Some(GateKind::Stock));
        assert!(decision.detail[0].contains("requested 5"));

        let decision = evaluate(&[line_for(5, 5)], &[], &PrescriptionRecord::None, None);
        assert!(!decision.blocked, "qty equal to stock passes");
    }

    /// The snapshot's stock wins over the copy frozen into the line.
    #[test]
    fn test_stock_gate_prefers_snapshot() {
        let lines = vec![line_for(50, 5)];

        let sold_out = test_medicine("m1", Money::from_paisa(500), 0);
        let decision = evaluate(&lines, &[sold_out], &PrescriptionRecord::None, None);
        assert_eq!(decision.reason, Some(GateKind::Stock));
        assert!(decision.detail[0].contains("in stock 0"));

        let restocked = test_medicine("m1", Money::from_paisa(500), 5);
        let decision = evaluate(&lines, &[restocked], &PrescriptionRecord::None, None);
        assert!(!decision.blocked);

        // Snapshot without this medicine: the line's copy still applies.
        let other = test_medicine("m2", Money::from_paisa(500), 0);
        let decision = evaluate(&lines, &[other], &PrescriptionRecord::None, None);
        assert!(!decision.blocked, "missing from snapshot falls back");
    }

    #[test]
    fn test_prescription_gate_modes() {
        let lines = vec![rx_line()];

        let decision = evaluate(&lines, &[], &PrescriptionRecord::None, None);
        assert_eq!(decision.reason, Some(GateKind::Prescription));

        let empty_image = PrescriptionRecord::Image {
            data: String::new(),
        };
        assert!(evaluate(&lines, &[], &empty_image, None).blocked);

        let empty_text = PrescriptionRecord::Digital {
            text: "  ".to_string(),
        };
        assert!(evaluate(&lines, &[], &empty_text, None).blocked);

        let digital = PrescriptionRecord::Digital {
            text: "Rx attached".to_string(),
        };
        assert!(!evaluate(&lines, &[], &digital, None).blocked);
    }

    #[test]
    fn test_expiry_gate_and_override() {
        let lines = vec![expired_line()];

        let decision = evaluate(&lines, &[], &PrescriptionRecord::None, None);
        assert_eq!(decision.reason, Some(GateKind::Expiry));

        let blank = OverrideCredential {
            token: "  ".to_string(),
            reason: "r".to_string(),
        };
        assert!(
            evaluate(&lines, &[], &PrescriptionRecord::None, Some(&blank)).blocked,
            "blank token does not clear the gate"
        );

        let t = token();
        assert!(!evaluate(&lines, &[], &PrescriptionRecord::None, Some(&t)).blocked);
    }

    /// Evaluation stops at the first failing gate.
    #[test]
    fn test_short_circuit_order() {
        // line fails stock AND prescription AND expiry
        let mut cl = expired_line();
        if let Some(m) = cl.line.medicine.as_mut() {
            m.prescription_required = true;
            m.stock_qty = 0;
        }
        let decision = evaluate(&[cl], &[], &PrescriptionRecord::None, None);
        assert_eq!(decision.reason, Some(GateKind::Stock), "stock surfaces first");
    }

    #[test]
    fn test_clear_cart_passes() {
        let decision = evaluate(&[line_for(10, 2)], &[], &PrescriptionRecord::None, None);
        assert!(!decision.blocked);
        assert!(decision.reason.is_none());
    }
}
