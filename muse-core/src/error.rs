use thiserror::Error;

/// Error taxonomy for clip mutations and queries.
///
/// Validation failures are raised before any store or index write, so they
/// never leave partial state. Store and codec failures during a mutation
/// surface as a failed write with the index untouched — the engine applies
/// its in-memory index delta only after the store write has succeeded.
#[derive(Debug, Error)]
pub enum MuseError {
    #[error("clip {0} not found")]
    NotFound(u64),

    #[error("invalid clip: {0}")]
    Validation(String),

    #[error("store error: {0}")]
    Store(#[from] sled::Error),

    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, MuseError>;
