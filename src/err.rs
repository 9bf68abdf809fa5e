use crate::res_id::ResId;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Debug, Error)]
pub enum SnapshotError {
    /// A required argument or collaborator was missing or unusable.
    #[error("Invalid argument: {name}")]
    InvalidArgument { name: String },

    /// Assertive lookup of an id that does not index the table.
    #[error("Invalid object id {id} (table holds {len} objects)")]
    InvalidObjectId { id: ResId, len: usize },

    #[error("Logic error: duplicate registration, object already exists with id {id}")]
    DuplicateRegistration { id: ResId },

    #[error("Could not find id for resource {what}")]
    MissingIdentity { what: String },

    #[error("Export cancelled after {processed} of {total} objects")]
    Cancelled { processed: usize, total: usize },

    #[error("An I/O error has occurred: {0}")]
    Io(#[from] std::io::Error),

    #[error("`serde_json` failed with error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SnapshotError {
    pub(crate) fn invalid_argument(name: impl Into<String>) -> Self {
        SnapshotError::InvalidArgument { name: name.into() }
    }
}
