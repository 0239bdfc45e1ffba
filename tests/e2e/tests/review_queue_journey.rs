//! Review queue lifecycle as driven by a real ambiguous orchestrator
//! outcome: an unresolved claim is enqueued under its synthesized id,
//! listed, fetched, then resolved and removed.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use verity_core::{
    Orchestrator, OrchestratorConfig, PendingReview, RagRetriever, Reranker, RerankerConfig,
    ReviewDecision, ReviewQueue, Storage, Verdict, WebAgent,
};
use verity_e2e::mocks::{fixtures, FixedEmbedder, FixedWebSearch, ScriptedLlm};

const TEST_DIMENSIONS: usize = 4;
const TEST_VECTOR: [f32; 4] = [0.1, 0.2, 0.3, 0.4];

#[tokio::test]
async fn ambiguous_outcome_round_trips_through_the_review_queue() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(Storage::new(Some(dir.path().to_path_buf()), TEST_DIMENSIONS).unwrap());
    let embedder: Arc<dyn verity_core::EmbeddingClient> = Arc::new(FixedEmbedder::new(TEST_VECTOR.to_vec()));
    let search = Arc::new(FixedWebSearch::new(fixtures::vitamin_c_mixed()));
    let llm = Arc::new(ScriptedLlm::new(vec!["supports", "refutes"], "Evidence is mixed."));

    let web_agent = WebAgent::new(search);
    let rag_retriever = RagRetriever::new(embedder, storage);
    let reranker = Reranker::new(RerankerConfig { top_k: 25 });
    let config = OrchestratorConfig {
        max_iter: 3,
        initial_top_k: 10,
        min_sources_for_verdict: 1,
        credible_domains: HashSet::new(),
        request_timeout: Duration::from_secs(5),
    };
    let orchestrator = Orchestrator::new(web_agent, rag_retriever, reranker, llm, config);

    let outcome = orchestrator.verify("Vitamin C prevents the common cold.").await;
    assert_eq!(outcome.verdict, Verdict::MixedDisputed);
    assert!(outcome.requires_review);
    let claim_id = outcome.claim_id.clone().expect("ambiguous outcome carries a claim id");

    let queue = ReviewQueue::new();
    queue.insert(
        claim_id.clone(),
        PendingReview {
            claim: "Vitamin C prevents the common cold.".to_string(),
            verdict: outcome.verdict,
            reasoning: outcome.reasoning.clone(),
            citations: outcome.citations.clone(),
            created_at: Utc::now(),
        },
    );

    assert!(queue.list_ids().contains(&claim_id));
    let fetched = queue.get(&claim_id).expect("pending review should be retrievable");
    assert_eq!(fetched.verdict, Verdict::MixedDisputed);

    let resolved = queue.resolve(
        &claim_id,
        ReviewDecision { verdict: Some(Verdict::Refuted), reasoning: Some("Human reviewer disagreed.".to_string()) },
    );
    assert!(resolved);
    assert!(queue.get(&claim_id).is_none());
    assert!(!queue.list_ids().contains(&claim_id));
}

#[tokio::test]
async fn resolving_an_unknown_id_is_a_no_op() {
    let queue = ReviewQueue::new();
    assert!(!queue.resolve("never-enqueued", ReviewDecision::default()));
    assert!(queue.is_empty());
}
