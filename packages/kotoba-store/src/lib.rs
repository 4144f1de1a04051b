pub mod corpus;
pub mod qdrant;

mod error;

pub use corpus::{CorpusChunk, CorpusStore};
pub use error::{Error, Result};
pub use qdrant::QdrantStore;
