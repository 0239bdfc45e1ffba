//! Fake provider implementations and canned evidence fixtures for the
//! end-to-end scenarios in the design notes (one verdict path per claim).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use verity_core::{EmbeddingError, LlmError, SearchHit};

/// A web search client that returns a fixed set of hits for every query,
/// regardless of what the planner asked for. Good enough for scenarios that
/// only care about "the web agent found these articles".
pub struct FixedWebSearch {
    hits: Vec<SearchHit>,
}

impl FixedWebSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self { hits }
    }
}

#[async_trait]
impl verity_core::WebSearchClient for FixedWebSearch {
    async fn search(&self, _query: &str, _max_results: usize) -> Vec<SearchHit> {
        self.hits.clone()
    }
}

/// A web search client that always fails soft (empty results), modeling a
/// provider outage or a claim nothing on the open web has ever mentioned.
pub struct EmptyWebSearch;

#[async_trait]
impl verity_core::WebSearchClient for EmptyWebSearch {
    async fn search(&self, _query: &str, _max_results: usize) -> Vec<SearchHit> {
        Vec::new()
    }
}

/// A web search client that returns a distinct set of hits keyed by the
/// literal query string passed in, and otherwise nothing. Useful for
/// building a web result set that doesn't depend on exercising the planner.
#[derive(Default)]
pub struct QueryKeyedWebSearch {
    by_query: HashMap<String, Vec<SearchHit>>,
}

impl QueryKeyedWebSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, query: impl Into<String>, hits: Vec<SearchHit>) -> Self {
        self.by_query.insert(query.into(), hits);
        self
    }
}

#[async_trait]
impl verity_core::WebSearchClient for QueryKeyedWebSearch {
    async fn search(&self, query: &str, _max_results: usize) -> Vec<SearchHit> {
        self.by_query.get(query).cloned().unwrap_or_default()
    }
}

/// An embedding client that hands out the same fixed vector for every text,
/// preserving input order. Dimensions must match [`crate::harness::TEST_DIMENSIONS`].
pub struct FixedEmbedder {
    vector: Vec<f32>,
}

impl FixedEmbedder {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}

#[async_trait]
impl verity_core::EmbeddingClient for FixedEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|_| self.vector.clone()).collect())
    }
}

/// An embedding client that always fails, modeling a provider outage during
/// retrieval (the one layer permitted to propagate an error, per the data
/// model notes).
pub struct FailingEmbedder;

#[async_trait]
impl verity_core::EmbeddingClient for FailingEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::Request("embedding provider unavailable".to_string()))
    }
}

/// An LLM client that answers stance-classification prompts and rationale
/// prompts differently based on a caller-supplied stance script, so a test
/// can drive a specific supports/refutes/neutral mix without depending on
/// the exact prompt wording.
pub struct ScriptedLlm {
    /// One stance label per evidence item, applied in order, regardless of
    /// how many items the prompt actually contains (the stance classifier
    /// truncates/pads to fit on mismatch).
    stances: Vec<&'static str>,
    rationale: String,
}

impl ScriptedLlm {
    pub fn new(stances: Vec<&'static str>, rationale: impl Into<String>) -> Self {
        Self { stances, rationale: rationale.into() }
    }
}

#[async_trait]
impl verity_core::LlmClient for ScriptedLlm {
    async fn complete(&self, _system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        if user_prompt.contains("SOURCES (one per line") {
            let quoted: Vec<String> = self.stances.iter().map(|s| format!("\"{s}\"")).collect();
            Ok(format!("[{}]", quoted.join(", ")))
        } else {
            Ok(self.rationale.clone())
        }
    }
}

/// An LLM client that always fails, forcing stance classification to its
/// all-neutral fallback and rationale generation to its fixed sentence.
pub struct FailingLlm;

#[async_trait]
impl verity_core::LlmClient for FailingLlm {
    async fn complete(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::Request("llm provider unavailable".to_string()))
    }
}

/// An LLM client that counts how many times it was invoked, for asserting
/// a pipeline short-circuited before reaching stance classification or
/// rationale generation.
#[derive(Default)]
pub struct CountingLlm {
    calls: Mutex<usize>,
    response: String,
}

impl CountingLlm {
    pub fn new(response: impl Into<String>) -> Self {
        Self { calls: Mutex::new(0), response: response.into() }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl verity_core::LlmClient for CountingLlm {
    async fn complete(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String, LlmError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.response.clone())
    }
}

/// Canned (title, url, snippet) fixtures for the seed scenarios.
pub mod fixtures {
    use verity_core::SearchHit;

    pub fn who_emergency_supports() -> Vec<SearchHit> {
        vec![
            SearchHit {
                title: "WHO ends global emergency status for COVID-19".to_string(),
                url: "https://reuters.com/world/2026/who-ends-emergency-abc123".to_string(),
                snippet: "The World Health Organization declared an end to the COVID-19 global health emergency.".to_string(),
            },
            SearchHit {
                title: "WHO declares COVID-19 no longer a global health emergency".to_string(),
                url: "https://apnews.com/article/who-covid-emergency-ends-xyz789".to_string(),
                snippet: "Geneva officials confirmed the WHO ends global emergency designation for the pandemic.".to_string(),
            },
        ]
    }

    pub fn great_wall_refutes() -> Vec<SearchHit> {
        vec![
            SearchHit {
                title: "Myth debunked: the Great Wall is not visible from the Moon".to_string(),
                url: "https://snopes.com/fact-check/great-wall-moon-visibility-001".to_string(),
                snippet: "Astronauts and experts have repeatedly debunked the claim that the Great Wall of China is visible from space with the naked eye.".to_string(),
            },
            SearchHit {
                title: "Fact check: no structure is visible from the Moon unaided".to_string(),
                url: "https://factcheck.org/2024/great-wall-moon-claim-rebuttal".to_string(),
                snippet: "NASA confirms the Great Wall of China cannot be seen from the Moon without aid; the claim is false.".to_string(),
            },
        ]
    }

    pub fn vitamin_c_mixed() -> Vec<SearchHit> {
        vec![
            SearchHit {
                title: "Study finds vitamin C reduces cold duration".to_string(),
                url: "https://nytimes.com/health/2026/vitamin-c-cold-study-findings".to_string(),
                snippet: "Researchers report vitamin C supplementation shortened the duration of common cold symptoms in trial participants.".to_string(),
            },
            SearchHit {
                title: "Vitamin C does not prevent colds, review concludes".to_string(),
                url: "https://bbc.com/news/health/vitamin-c-cold-prevention-review".to_string(),
                snippet: "A meta-analysis concludes vitamin C does not prevent the common cold in the general population, contrary to popular belief.".to_string(),
            },
        ]
    }

    pub fn nytimes_homepage_and_article() -> (SearchHit, SearchHit) {
        (
            SearchHit {
                title: "NYTimes homepage".to_string(),
                url: "https://nytimes.com/".to_string(),
                snippet: "Front page".to_string(),
            },
            SearchHit {
                title: "Specific article".to_string(),
                url: "https://nytimes.com/2024/article-xyz-123".to_string(),
                snippet: "A specific, dated article with a slug-like final path segment.".to_string(),
            },
        )
    }

    /// Five distinct BBC article URLs, for the per-domain-cap scenario.
    pub fn bbc_distinct_articles(n: usize) -> Vec<SearchHit> {
        (0..n)
            .map(|i| SearchHit {
                title: format!("BBC story {i}"),
                url: format!("https://bbc.com/news/world/2026/story-{i}-longenough"),
                snippet: "The quick brown fox jumps over the lazy dog repeatedly in this story.".to_string(),
            })
            .collect()
    }
}
