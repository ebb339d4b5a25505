/// Errors raised while (re)building a routing table.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("failed to load API definitions: {0}")]
    Loader(#[from] warden_loader::LoaderError),
    #[error("failed to compile API definition {api_id}: {source}")]
    Compile {
        api_id: String,
        #[source]
        source: warden_core::CoreError,
    },
}
