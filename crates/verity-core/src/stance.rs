//! Stance Classifier (C10): a single batched LLM call labels every evidence
//! snippet as `supports`, `refutes`, or `neutral` relative to the claim.
//! Any parse failure, short response, or provider error defaults every
//! label to `neutral` rather than propagating.

use std::sync::Arc;

use crate::evidence::{EvidenceItem, Stance};
use crate::providers::LlmClient;

const MAX_SNIPPETS: usize = 30;
const MAX_CLAIM_CHARS: usize = 500;
const MAX_SNIPPET_CHARS: usize = 400;

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn build_prompt(claim: &str, items: &[EvidenceItem]) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are a fact-checking assistant. For the following CLAIM, classify each SOURCE snippet as exactly one of: supports, refutes, neutral.\n");
    prompt.push_str("- supports: the source clearly supports or confirms the claim.\n");
    prompt.push_str("- refutes: the source clearly contradicts or debunks the claim.\n");
    prompt.push_str("- neutral: the source does not clearly support or refute, or is irrelevant.\n\n");
    prompt.push_str(&format!("CLAIM: {}\n\n", truncate_chars(claim, MAX_CLAIM_CHARS)));
    prompt.push_str("SOURCES (one per line, prefixed by index):\n");
    for (i, item) in items.iter().take(MAX_SNIPPETS).enumerate() {
        let snippet = if item.snippet.is_empty() { &item.title } else { &item.snippet };
        prompt.push_str(&format!("\n{i}: {}\n", truncate_chars(snippet, MAX_SNIPPET_CHARS)));
    }
    prompt.push_str(
        "\nRespond with a JSON array of exactly one word per source in order: only \"supports\", \"refutes\", or \"neutral\". Example: [\"neutral\", \"refutes\", \"supports\"]",
    );
    prompt
}

/// Extract the first balanced `[...]` substring, tolerating markdown code
/// fences around the JSON array.
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

fn parse_stances(text: &str, expected_len: usize) -> Vec<Stance> {
    let Some(array_text) = extract_json_array(text) else {
        return vec![Stance::Neutral; expected_len];
    };
    let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(array_text) else {
        return vec![Stance::Neutral; expected_len];
    };
    let mut out: Vec<Stance> = values
        .iter()
        .map(|v| match v.as_str() {
            Some(s) => Stance::parse_lenient(s),
            None => Stance::Neutral,
        })
        .collect();
    out.resize(expected_len, Stance::Neutral);
    out.truncate(expected_len);
    out
}

/// Classify stance for every item in `items` with a single batched LLM call,
/// returning labels in the same order. Falls back to `neutral` for all items
/// on any provider failure.
pub async fn classify_stances_batch(
    llm: &Arc<dyn LlmClient>,
    claim: &str,
    items: &[EvidenceItem],
) -> Vec<Stance> {
    if items.is_empty() {
        return Vec::new();
    }
    let prompt = build_prompt(claim, items);
    match llm.complete("", &prompt).await {
        Ok(text) => parse_stances(&text, items.len()),
        Err(e) => {
            tracing::warn!("stance classification failed: {e}");
            vec![Stance::Neutral; items.len()]
        }
    }
}

/// Classify and set `stance` on each item in place.
pub async fn attach_stances(llm: &Arc<dyn LlmClient>, claim: &str, evidence: &mut [EvidenceItem]) {
    if evidence.is_empty() {
        return;
    }
    let stances = classify_stances_batch(llm, claim, evidence).await;
    for (item, stance) in evidence.iter_mut().zip(stances.into_iter()) {
        item.stance = stance;
    }
}

/// True when at least one item supports and at least one refutes.
pub fn has_conflict(evidence: &[EvidenceItem]) -> bool {
    let has_support = evidence.iter().any(|e| e.stance == Stance::Supports);
    let has_refute = evidence.iter().any(|e| e.stance == Stance::Refutes);
    has_support && has_refute
}
