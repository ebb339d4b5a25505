use thiserror::Error;
use warden_state::StoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("session store error: {0}")]
    Store(#[from] StoreError),
}
