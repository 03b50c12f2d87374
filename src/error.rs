use crate::api::ApiError;
use crate::fragment::FragmentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("block creation already pending (ticket {0})")]
    CreationPending(u64),

    #[error("no creation in flight for ticket {0}")]
    UnknownCreation(u64),

    #[error("{to} does not accept drops from {from}")]
    DropRejected { from: String, to: String },

    #[error("unknown block: {0}")]
    UnknownBlock(String),

    #[error("unknown group item: {0}")]
    UnknownItem(String),

    #[error("block {0} has no group items")]
    NotAGroup(String),

    #[error(transparent)]
    Fragment(#[from] FragmentError),

    #[error("block render request failed: {0}")]
    Request(#[from] ApiError),
}

pub type EditorResult<T> = Result<T, EditorError>;
