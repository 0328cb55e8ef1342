use fanpulse_core::{DomainError, NotifyError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("domain rule violated: {0}")]
    Domain(#[from] DomainError),
}
