//! Verdict Former (C12): deterministic verdict mapping, citation shaping
//! with credibility softening, LLM rationale generation, and the final
//! validation pass that can downgrade a verdict.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::credibility;
use crate::evidence::{Citation, EvidenceItem, Stance, Verdict};
use crate::providers::LlmClient;

const MAX_RATIONALE_SOURCES: usize = 10;
const MAX_CLAIM_CHARS_FOR_RATIONALE: usize = 500;

const FALLBACK_RATIONALE: &str =
    "Unable to generate a detailed explanation; verdict is based on the available evidence.";

/// Deterministic map from `(evidence, sufficient, conflict)` to a [`Verdict`].
/// Mirrors §4.12 exactly: conflict wins over a one-sided stance, and an empty
/// or insufficient evidence set always yields `NotEnoughEvidence`.
pub fn decide_verdict(evidence: &[EvidenceItem], sufficient: bool, conflict: bool) -> Verdict {
    if evidence.is_empty() || !sufficient {
        return Verdict::NotEnoughEvidence;
    }
    if conflict {
        return Verdict::MixedDisputed;
    }
    let has_support = evidence.iter().any(|e| e.stance == Stance::Supports);
    let has_refute = evidence.iter().any(|e| e.stance == Stance::Refutes);
    match (has_support, has_refute) {
        (true, false) => Verdict::Supported,
        (false, true) => Verdict::Refuted,
        _ => Verdict::NotEnoughEvidence,
    }
}

/// Build citations from evidence and apply source-credibility softening
/// (§4.12): prefer the credible-domain-filtered set unless it's both sparse
/// (`<3` items) and a small minority (`<30%`) of the unfiltered set.
pub fn build_citations(evidence: &[EvidenceItem], credible_domains: &HashSet<String>) -> Vec<Citation> {
    let citations: Vec<Citation> = evidence.iter().map(Citation::from).collect();
    let credible: Vec<&Citation> =
        credibility::filter_credible(&citations, credible_domains, |c| c.url.as_str());
    credibility::soften_filter(&citations, credible)
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn build_rationale_prompt(claim: &str, verdict: Verdict, evidence: &[EvidenceItem]) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are a fact-checking assistant. Write a neutral, 2-4 sentence explanation ");
    prompt.push_str("of the following verdict, grounded only in the sources given. Do not invent facts.\n\n");
    prompt.push_str(&format!("CLAIM: {}\n", truncate_chars(claim, MAX_CLAIM_CHARS_FOR_RATIONALE)));
    prompt.push_str(&format!("VERDICT: {}\n\n", verdict.as_wire_str()));
    prompt.push_str("SOURCES:\n");
    for item in evidence.iter().take(MAX_RATIONALE_SOURCES) {
        prompt.push_str(&format!("- {} ({}): {}\n", item.title, item.url, item.snippet));
    }
    prompt
}

/// Generate a 2-4 sentence rationale via the LLM, falling back to a fixed
/// neutral sentence on any provider failure.
pub async fn generate_rationale(llm: &Arc<dyn LlmClient>, claim: &str, verdict: Verdict, evidence: &[EvidenceItem]) -> String {
    if evidence.is_empty() {
        return "No supporting evidence was found for this claim.".to_string();
    }
    let prompt = build_rationale_prompt(claim, verdict, evidence);
    match llm.complete("", &prompt).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => FALLBACK_RATIONALE.to_string(),
        Err(e) => {
            tracing::warn!("rationale generation failed: {e}");
            FALLBACK_RATIONALE.to_string()
        }
    }
}

/// Result of forming a verdict: the (possibly downgraded) verdict, its
/// rationale, and the final citation list.
#[derive(Debug, Clone)]
pub struct VerdictResult {
    pub verdict: Verdict,
    pub reasoning: String,
    pub citations: Vec<Citation>,
}

/// Final validation pass (§4.12): every citation URL must be present in the
/// post-rerank evidence, and `Supported`/`Refuted` require at least
/// `min_sources` surviving citations or the verdict is downgraded.
pub fn validate_and_finalize(
    verdict: Verdict,
    mut rationale: String,
    mut citations: Vec<Citation>,
    evidence: &[EvidenceItem],
    min_sources: usize,
) -> VerdictResult {
    let evidence_urls: HashSet<&str> = evidence.iter().map(|e| e.url.as_str()).collect();
    citations.retain(|c| evidence_urls.contains(c.url.as_str()));

    // No two returned citations share a URL.
    let mut seen = HashSet::new();
    citations.retain(|c| seen.insert(c.url.clone()));

    let needs_min_sources = matches!(verdict, Verdict::Supported | Verdict::Refuted);
    if needs_min_sources && citations.len() < min_sources {
        rationale.push_str(&format!(
            " (Downgraded to Not Enough Evidence: only {} of {} required sources survived validation.)",
            citations.len(),
            min_sources
        ));
        return VerdictResult { verdict: Verdict::NotEnoughEvidence, reasoning: rationale, citations };
    }

    VerdictResult { verdict, reasoning: rationale, citations }
}

/// Full C12 pipeline: decide, build citations, generate rationale, validate.
pub async fn form_verdict(
    llm: &Arc<dyn LlmClient>,
    claim: &str,
    evidence: &[EvidenceItem],
    sufficient: bool,
    conflict: bool,
    credible_domains: &HashSet<String>,
    min_sources: usize,
) -> VerdictResult {
    let verdict = decide_verdict(evidence, sufficient, conflict);
    let citations = build_citations(evidence, credible_domains);
    let rationale = generate_rationale(llm, claim, verdict, evidence).await;
    validate_and_finalize(verdict, rationale, citations, evidence, min_sources)
}

#[allow(dead_code)]
fn source_counts(evidence: &[EvidenceItem]) -> HashMap<&'static str, usize> {
    let mut counts = HashMap::new();
    for item in evidence {
        *counts.entry(item.stance.as_str()).or_insert(0) += 1;
    }
    counts
}
