pub mod reranker;
pub mod vector;

pub use reranker::{Reranker, RerankerConfig};
pub use vector::VectorIndex;
