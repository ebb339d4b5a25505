use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read definitions directory {path:?}: {source}")]
    ReadDir {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read definition file {path:?}: {source}")]
    ReadFile {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
