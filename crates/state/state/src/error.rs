use thiserror::Error;

/// Errors raised by a [`crate::SessionStore`] implementation.
///
/// A missing key is never an error — it is reported as `Ok(None)` from
/// [`crate::SessionStore::get_key`]. This enum is reserved for genuine I/O
/// or backend failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("store backend error: {0}")]
    Backend(String),
}
