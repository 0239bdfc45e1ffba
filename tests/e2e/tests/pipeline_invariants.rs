//! Invariants that must hold for any verification outcome, independent of
//! which verdict scenario produced it: every citation URL traces back to
//! post-rerank evidence, no two citations share a URL, and a downgraded
//! verdict never claims more sources than it actually has.

use std::collections::{HashSet, HashMap};

use verity_core::{Citation, EvidenceItem, EvidenceSource, Stance, Verdict};

fn evidence(url: &str, stance: Stance) -> EvidenceItem {
    let mut item = EvidenceItem::new("title", url, "snippet", EvidenceSource::Web);
    item.stance = stance;
    item
}

#[test]
fn citation_urls_are_a_subset_of_evidence_urls() {
    let evidence = vec![
        evidence("https://a.com/x", Stance::Supports),
        evidence("https://b.com/y", Stance::Neutral),
    ];
    let citations = vec![
        Citation { title: "t".into(), url: "https://a.com/x".into(), snippet: "s".into() },
        Citation { title: "t".into(), url: "https://stale.com/z".into(), snippet: "s".into() },
    ];
    let result = verity_core::verdict::validate_and_finalize(
        Verdict::Supported,
        "r".to_string(),
        citations,
        &evidence,
        1,
    );

    let evidence_urls: HashSet<&str> = evidence.iter().map(|e| e.url.as_str()).collect();
    for citation in &result.citations {
        assert!(evidence_urls.contains(citation.url.as_str()));
    }
}

#[test]
fn no_two_citations_share_a_url() {
    let evidence = vec![evidence("https://a.com/x", Stance::Supports)];
    let citations = vec![
        Citation { title: "t1".into(), url: "https://a.com/x".into(), snippet: "s1".into() },
        Citation { title: "t2".into(), url: "https://a.com/x".into(), snippet: "s2".into() },
    ];
    let result = verity_core::verdict::validate_and_finalize(
        Verdict::Supported,
        "r".to_string(),
        citations,
        &evidence,
        1,
    );
    assert_eq!(result.citations.len(), 1);
}

#[test]
fn supported_verdict_with_too_few_citations_is_downgraded() {
    let evidence = vec![evidence("https://a.com/x", Stance::Supports)];
    let citations = vec![Citation { title: "t".into(), url: "https://a.com/x".into(), snippet: "s".into() }];
    let result = verity_core::verdict::validate_and_finalize(
        Verdict::Supported,
        "r".to_string(),
        citations,
        &evidence,
        2,
    );
    assert_eq!(result.verdict, Verdict::NotEnoughEvidence);
    assert!(result.reasoning.contains("Downgraded"));
}

#[test]
fn mixed_disputed_requires_both_stances_present() {
    let evidence = vec![
        evidence("https://a.com/x", Stance::Supports),
        evidence("https://b.com/y", Stance::Refutes),
    ];
    let verdict = verity_core::verdict::decide_verdict(&evidence, true, true);
    assert_eq!(verdict, Verdict::MixedDisputed);
    let has_support = evidence.iter().any(|e| e.stance == Stance::Supports);
    let has_refute = evidence.iter().any(|e| e.stance == Stance::Refutes);
    assert!(has_support && has_refute);
}

#[test]
fn homepage_filter_matches_documented_examples() {
    assert!(verity_core::credibility::is_homepage_url("https://x.com/"));
    assert!(verity_core::credibility::is_homepage_url("https://x.com/news"));
    assert!(verity_core::credibility::is_homepage_url("https://x.com/sports/"));
    assert!(!verity_core::credibility::is_homepage_url("https://x.com/2024/story-abc123"));
}

#[test]
fn claim_normalization_is_idempotent() {
    let raw = "  The   claim   has\u{00A0}irregular  spacing  ";
    let once = verity_core::normalize(raw);
    let twice = verity_core::normalize(&once);
    assert_eq!(once, twice);
}

#[test]
fn planner_output_is_bounded_and_deduplicated() {
    let queries = verity_core::planner::plan(
        "\"A very specific quoted phrase\" was allegedly observed by NASA scientists in 2026",
    );
    assert!(!queries.is_empty());
    assert!(queries.len() <= 4);
    let unique: HashSet<&String> = queries.iter().collect();
    assert_eq!(unique.len(), queries.len());
}

#[test]
fn reranker_per_domain_cap_holds_for_a_larger_batch() {
    use verity_core::{Reranker, RerankerConfig};

    let items: Vec<EvidenceItem> = (0..8)
        .map(|i| {
            EvidenceItem::new(
                "t",
                format!("https://bbc.com/news/world/2026/story-{i}-slug-long-enough"),
                "the quick brown fox jumps over the lazy dog",
                EvidenceSource::Web,
            )
        })
        .collect();
    let mut reranker = Reranker::new(RerankerConfig { top_k: 25 });
    let result = reranker.rerank("quick brown fox", items);

    let mut per_domain: HashMap<String, usize> = HashMap::new();
    for item in &result {
        *per_domain.entry(verity_core::credibility::domain_of(&item.url)).or_insert(0) += 1;
    }
    for count in per_domain.values() {
        assert!(*count <= 2);
    }
}
