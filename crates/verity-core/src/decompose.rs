//! Claim Decomposer & Verdict Aggregator (C2.5/C12.5): an optional
//! supplemental stage, disabled by default, that splits a compound claim
//! into independently-verifiable sub-claims and recombines their verdicts.
//! Reuses the tolerant bracket-scan JSON extraction the Stance Classifier
//! uses for LLM output that doesn't quite follow instructions.

use std::sync::Arc;

use crate::evidence::{Citation, Verdict};
use crate::providers::LlmClient;
use crate::verdict::VerdictResult;

const MAX_CITATIONS: usize = 25;
const MAX_RATIONALE_CHARS_PER_SUBCLAIM: usize = 300;
const MIN_FRAGMENT_CHARS: usize = 10;

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0i32;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_subclaims(text: &str) -> Option<Vec<String>> {
    let array_text = extract_json_array(text)?;
    let values = serde_json::from_str::<Vec<String>>(array_text).ok()?;
    let cleaned: Vec<String> =
        values.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
    if cleaned.len() > 1 {
        Some(cleaned)
    } else {
        None
    }
}

/// Split `claim` on sentence boundaries, " and ", and commas, discarding any
/// fragment shorter than [`MIN_FRAGMENT_CHARS`]. Used when the LLM is
/// unavailable or returns something unparseable.
fn fallback_split(claim: &str) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    for sentence in claim.split(['.', '!', '?']) {
        for piece in sentence.split(" and ") {
            for fragment in piece.split(',') {
                let trimmed = fragment.trim();
                if trimmed.chars().count() >= MIN_FRAGMENT_CHARS {
                    parts.push(trimmed.to_string());
                }
            }
        }
    }
    parts
}

fn build_decompose_prompt(claim: &str, max_subclaims: usize) -> String {
    format!(
        "You are a fact-checking assistant. Split the following CLAIM into its \
         independently-verifiable atomic sub-claims. If the claim is already atomic, \
         return an array containing just the claim itself. Return at most {max_subclaims} \
         sub-claims as a JSON array of strings, and nothing else.\n\nCLAIM: {claim}"
    )
}

/// Decompose `claim` into sub-claims when decomposition is enabled and the
/// claim is long enough to plausibly be compound. Returns `vec![claim]`
/// unchanged when disabled, too short, or decomposition yields nothing
/// usable (§4.15).
pub async fn decompose(
    llm: &Arc<dyn LlmClient>,
    claim: &str,
    enabled: bool,
    min_claim_length: usize,
    max_subclaims: usize,
) -> Vec<String> {
    if !enabled || claim.chars().count() < min_claim_length {
        return vec![claim.to_string()];
    }

    let prompt = build_decompose_prompt(claim, max_subclaims);
    let llm_result = llm.complete("", &prompt).await;

    let mut subclaims = match llm_result {
        Ok(text) => parse_subclaims(&text).unwrap_or_else(|| fallback_split(claim)),
        Err(e) => {
            tracing::warn!("claim decomposition failed: {e}");
            fallback_split(claim)
        }
    };

    if subclaims.len() <= 1 {
        return vec![claim.to_string()];
    }
    subclaims.truncate(max_subclaims);
    subclaims
}

/// Combine per-sub-claim verdicts per §4.15: any `Refuted` wins outright;
/// else any `Mixed/Disputed` wins; else all-`Supported` yields `Supported`;
/// else all-inconclusive yields `NotEnoughEvidence`; otherwise `Mixed/Disputed`.
fn combine_verdicts(verdicts: &[Verdict]) -> Verdict {
    if verdicts.iter().any(|v| *v == Verdict::Refuted) {
        return Verdict::Refuted;
    }
    if verdicts.iter().any(|v| *v == Verdict::MixedDisputed) {
        return Verdict::MixedDisputed;
    }
    if verdicts.iter().all(|v| *v == Verdict::Supported) {
        return Verdict::Supported;
    }
    let all_inconclusive =
        verdicts.iter().all(|v| matches!(v, Verdict::NotEnoughEvidence | Verdict::Unverifiable));
    if all_inconclusive {
        return Verdict::NotEnoughEvidence;
    }
    Verdict::MixedDisputed
}

fn merge_citations(results: &[VerdictResult]) -> Vec<Citation> {
    let mut seen = std::collections::HashSet::new();
    let mut merged = Vec::new();
    for result in results {
        for citation in &result.citations {
            if merged.len() >= MAX_CITATIONS {
                return merged;
            }
            if seen.insert(citation.url.clone()) {
                merged.push(citation.clone());
            }
        }
    }
    merged
}

fn build_aggregate_rationale_prompt(claim: &str, subclaims: &[String], results: &[VerdictResult]) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are a fact-checking assistant. The following compound CLAIM was split into \
        sub-claims, each independently verified. Write a single neutral 2-4 sentence explanation of \
        the combined verdict, grounded only in the sub-claim verdicts given.\n\n");
    prompt.push_str(&format!("CLAIM: {claim}\n\n"));
    for (i, (sub, result)) in subclaims.iter().zip(results.iter()).enumerate() {
        prompt.push_str(&format!(
            "Sub-claim {}: {}\nVerdict: {}\nReasoning: {}\n\n",
            i + 1,
            sub,
            result.verdict.as_wire_str(),
            truncate_chars(&result.reasoning, MAX_RATIONALE_CHARS_PER_SUBCLAIM)
        ));
    }
    prompt
}

fn fallback_aggregate_rationale(results: &[VerdictResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("Sub-claim {}: {}", i + 1, r.reasoning))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Combine sub-claim results into a single [`VerdictResult`] per §4.15.
/// `subclaims` and `sub_results` must be the same length and in the same
/// order produced by [`decompose`].
pub async fn aggregate(
    llm: &Arc<dyn LlmClient>,
    claim: &str,
    subclaims: &[String],
    sub_results: Vec<VerdictResult>,
) -> VerdictResult {
    let verdicts: Vec<Verdict> = sub_results.iter().map(|r| r.verdict).collect();
    let verdict = combine_verdicts(&verdicts);
    let citations = merge_citations(&sub_results);

    let prompt = build_aggregate_rationale_prompt(claim, subclaims, &sub_results);
    let reasoning = match llm.complete("", &prompt).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => fallback_aggregate_rationale(&sub_results),
    };

    VerdictResult { verdict, reasoning, citations }
}
