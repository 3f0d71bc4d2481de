//! Clip store with a synchronized full-text index.
//!
//! The authoritative record store (sled) and the derived inverted index are
//! mutated in lockstep through [`Engine`]; queries are BM25-ranked with
//! deterministic ordering.

pub mod engine;
pub mod error;
pub mod index;
pub mod query;
pub mod store;
pub mod tokenizer;

pub use engine::Engine;
pub use error::{MuseError, Result};
pub use index::{DocId, IndexField, InvertedIndex, Posting};
pub use query::DEFAULT_LIMIT;
pub use store::{Clip, ClipKind, ClipStore, NewClip};
