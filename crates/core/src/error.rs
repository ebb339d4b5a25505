use thiserror::Error;

/// Errors raised while building an [`crate::ApiSpec`] from an
/// [`crate::ApiDefinition`].
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid path pattern {pattern:?} in version {version:?}: {source}")]
    InvalidPathPattern {
        version: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
