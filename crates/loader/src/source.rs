use std::path::Path;

use warden_core::ApiDefinition;

use crate::error::LoaderError;

/// Where [`ApiDefinition`]s are loaded from. The directory source ships a
/// concrete implementation; a document-store-backed source (filtered by
/// `active = true`) is a pluggable alternative outside this crate's scope —
/// both would produce the same `Vec<ApiDefinition>`.
pub trait DefinitionSource: Send + Sync {
    /// # Errors
    ///
    /// Returns an error only for I/O failures reading the source itself.
    /// Individual malformed definitions are logged and skipped, not
    /// propagated as an error (§7: "malformed definitions at load time are
    /// logged and skipped").
    fn load(&self) -> Result<Vec<ApiDefinition>, LoaderError>;
}

/// Loads one [`ApiDefinition`] per `*.json` file in a directory.
#[derive(Clone)]
pub struct DirectorySource {
    dir: std::path::PathBuf,
}

impl DirectorySource {
    #[must_use]
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DefinitionSource for DirectorySource {
    fn load(&self) -> Result<Vec<ApiDefinition>, LoaderError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| LoaderError::ReadDir {
            path: self.dir.clone(),
            source,
        })?;

        let mut definitions = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, dir = %self.dir.display(), "failed to read directory entry");
                    continue;
                }
            };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match load_one(&path) {
                Ok(definition) => definitions.push(definition),
                Err(err) => {
                    tracing::warn!(error = %err, path = %path.display(), "skipping malformed API definition");
                }
            }
        }
        Ok(definitions)
    }
}

fn load_one(path: &Path) -> Result<ApiDefinition, LoaderError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LoaderError::ReadFile {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|err| LoaderError::ReadFile {
        path: path.to_owned(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_valid_definitions_and_skips_malformed_ones() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("good.json"),
            serde_json::json!({
                "api_id": "api-1",
                "org_id": "org-1",
                "name": "Example",
                "version_definition": { "location": "header", "key": "X-Api-Version" },
                "versions": { "v1": { "name": "v1" } },
                "proxy": { "listen_path": "/example/", "target_url": "http://upstream.local" },
                "auth_header_name": "Authorization"
            })
            .to_string(),
        )
        .unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("ignored.txt"), "not a definition").unwrap();

        let definitions = DirectorySource::new(dir.path()).load().unwrap();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].api_id, "api-1");
    }
}
