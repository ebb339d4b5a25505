pub mod classify;
pub mod error;
pub mod source;
pub mod version;

pub use classify::{is_request_valid, resolve_effective_version, RequestValidation};
pub use error::LoaderError;
pub use source::{DefinitionSource, DirectorySource};
pub use version::{extract_version, is_version_expired};
