use thiserror::Error;
use uuid::Uuid;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} store failed to load: {source}")]
    Load {
        kind: &'static str,
        source: BoxError,
    },

    /// The persistence port rejected a write. The in-memory store was not
    /// changed.
    #[error("write-through of {kind} {id} failed: {source}")]
    WriteThrough {
        kind: &'static str,
        id: Uuid,
        source: BoxError,
    },

    #[error("{kind} store is already loaded")]
    AlreadyLoaded { kind: &'static str },

    #[error("{kind} store has not been loaded")]
    NotLoaded { kind: &'static str },

    #[error("{kind} {id} already exists")]
    DuplicateId { kind: &'static str, id: Uuid },

    #[error("{kind} '{key}' already exists")]
    DuplicateKey { kind: &'static str, key: String },

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },
}
