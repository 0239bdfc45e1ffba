pub mod rag;
pub mod web_agent;

pub use rag::RagRetriever;
pub use web_agent::WebAgent;
