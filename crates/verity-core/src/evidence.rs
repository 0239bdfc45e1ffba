//! Core data model: evidence items, citations, stances, and verdicts.
//!
//! EvidenceItems flow linearly through the pipeline (intake -> merge -> rerank ->
//! stance -> verdict); nothing here is shared-mutable, each stage owns its own
//! `Vec<EvidenceItem>` and passes it forward by value.

use serde::{Deserialize, Serialize};

/// Per-snippet relation to the claim being verified.
///
/// The wire representation is the three lowercase strings from the original
/// API; `Unset` only ever exists before the stance classifier runs and is
/// never serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Supports,
    Refutes,
    Neutral,
    #[serde(skip)]
    Unset,
}

impl Default for Stance {
    fn default() -> Self {
        Stance::Unset
    }
}

impl Stance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stance::Supports => "supports",
            Stance::Refutes => "refutes",
            Stance::Neutral => "neutral",
            Stance::Unset => "unset",
        }
    }

    /// Parse a label from the stance classifier's LLM output; anything else
    /// (including garbage) is treated as `neutral`, never as an error.
    pub fn parse_lenient(raw: &str) -> Stance {
        match raw.trim().to_ascii_lowercase().as_str() {
            "supports" => Stance::Supports,
            "refutes" => Stance::Refutes,
            _ => Stance::Neutral,
        }
    }
}

/// Where an [`EvidenceItem`] came from: live web search, the local RAG index,
/// or (carried through metadata) a specific domain label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvidenceSource {
    Web,
    Rag,
    Domain(String),
}

impl EvidenceSource {
    pub fn as_str(&self) -> &str {
        match self {
            EvidenceSource::Web => "web",
            EvidenceSource::Rag => "rag",
            EvidenceSource::Domain(d) => d,
        }
    }

    pub fn from_str(s: &str) -> EvidenceSource {
        match s {
            "web" => EvidenceSource::Web,
            "rag" | "" => EvidenceSource::Rag,
            other => EvidenceSource::Domain(other.to_string()),
        }
    }
}

/// A single piece of evidence gathered for a claim. Identity is the URL: two
/// items with equal URL are duplicates (see the Merger, `src/merger.rs`).
#[derive(Debug, Clone)]
pub struct EvidenceItem {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source: EvidenceSource,
    /// Whatever the most recent scoring stage assigned: retrieval distance,
    /// cross-encoder relevance, or the reranker's hybrid score.
    pub score: f32,
    pub stance: Stance,
}

impl EvidenceItem {
    pub fn new(title: impl Into<String>, url: impl Into<String>, snippet: impl Into<String>, source: EvidenceSource) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            source,
            score: 0.0,
            stance: Stance::Unset,
        }
    }
}

/// Response-shape projection of an [`EvidenceItem`]: what actually crosses
/// the wire to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl From<&EvidenceItem> for Citation {
    fn from(item: &EvidenceItem) -> Self {
        let snippet = if item.snippet.is_empty() {
            item.title.clone()
        } else {
            item.snippet.clone()
        };
        Citation {
            title: item.title.clone(),
            url: item.url.clone(),
            snippet,
        }
    }
}

/// Closed verdict enum. Wire strings match exactly, including the spaced
/// slash variant of `Mixed / Disputed`.
///
/// `Unverifiable` is representable but unreachable from [`crate::verdict::decide_verdict`] —
/// kept for wire-format completeness (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Supported")]
    Supported,
    #[serde(rename = "Refuted")]
    Refuted,
    #[serde(rename = "Not Enough Evidence")]
    NotEnoughEvidence,
    #[serde(rename = "Mixed / Disputed")]
    MixedDisputed,
    #[serde(rename = "Unverifiable")]
    Unverifiable,
}

impl Verdict {
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Verdict::Supported => "Supported",
            Verdict::Refuted => "Refuted",
            Verdict::NotEnoughEvidence => "Not Enough Evidence",
            Verdict::MixedDisputed => "Mixed / Disputed",
            Verdict::Unverifiable => "Unverifiable",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_wire_str())
    }
}

/// A single (title, url, snippet) result from a web search provider, before
/// it is lifted into an [`EvidenceItem`].
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}
