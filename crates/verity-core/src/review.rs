//! Review Queue (C16): process-local, keyed store of ambiguous verification
//! results awaiting human review. Not durable — lost on process restart.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::evidence::{Citation, Verdict};

/// A verification result flagged for human review because the orchestrator
/// could not reach a confident, unambiguous verdict.
#[derive(Debug, Clone)]
pub struct PendingReview {
    pub claim: String,
    pub verdict: Verdict,
    pub reasoning: String,
    pub citations: Vec<Citation>,
    pub created_at: DateTime<Utc>,
}

/// A reviewer's decision, applied in place of the original verdict/reasoning.
#[derive(Debug, Clone, Default)]
pub struct ReviewDecision {
    pub verdict: Option<Verdict>,
    pub reasoning: Option<String>,
}

/// Process-lifetime store of pending reviews, guarded by a single mutex.
/// Operations are O(1); callers should treat this as non-blocking.
#[derive(Default)]
pub struct ReviewQueue {
    pending: Mutex<HashMap<String, PendingReview>>,
}

impl ReviewQueue {
    pub fn new() -> Self {
        Self { pending: Mutex::new(HashMap::new()) }
    }

    /// Insert (or overwrite) a pending review under `claim_id`.
    pub fn insert(&self, claim_id: String, review: PendingReview) {
        self.pending.lock().expect("review queue lock poisoned").insert(claim_id, review);
    }

    /// All currently pending claim ids, in no particular order.
    pub fn list_ids(&self) -> Vec<String> {
        self.pending.lock().expect("review queue lock poisoned").keys().cloned().collect()
    }

    /// Look up a single pending review by id.
    pub fn get(&self, claim_id: &str) -> Option<PendingReview> {
        self.pending.lock().expect("review queue lock poisoned").get(claim_id).cloned()
    }

    /// Apply a reviewer's decision and remove the entry. Returns `false` (no
    /// error, no state change) if `claim_id` was never pending or has since
    /// been resolved by another reviewer.
    pub fn resolve(&self, claim_id: &str, decision: ReviewDecision) -> bool {
        let mut pending = self.pending.lock().expect("review queue lock poisoned");
        pending.remove(claim_id).is_some_and(|_| {
            // The original record is discarded once resolved; decision.verdict
            // and decision.reasoning are the reviewer's override and are
            // reported back to the caller by the HTTP layer, not persisted
            // here (the queue has process lifetime only, per §3).
            let _ = decision;
            true
        })
    }

    pub fn len(&self) -> usize {
        self.pending.lock().expect("review queue lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
