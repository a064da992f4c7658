use thiserror::Error;

use crate::gateway::GatewayError;
use crate::pipeline::classifier::ClassifyError;
use crate::storage::StoreError;

/// Top-level error for the CLI surface.
#[derive(Debug, Error)]
pub enum RegdocError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
