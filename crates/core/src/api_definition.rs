use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Where to look for the version token on an inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionDefinitionLocation {
    Header,
    UrlParam,
}

/// Tells the loader where to find the version token on a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionDefinition {
    pub location: VersionDefinitionLocation,
    /// Header name or query/form parameter name, depending on `location`.
    pub key: String,
}

/// One declared API version: its expiry and its ignored/whitelist/blacklist
/// path lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionInfo {
    pub name: String,
    /// `"-1"` or empty means the version never expires. Otherwise
    /// `YYYY-MM-DD HH:MM`.
    #[serde(default)]
    pub expires: String,
    #[serde(default)]
    pub ignored: Vec<String>,
    #[serde(default)]
    pub whitelist: Vec<String>,
    #[serde(default)]
    pub blacklist: Vec<String>,
}

/// Reverse-proxy target configuration for one API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub listen_path: String,
    pub target_url: String,
    #[serde(default)]
    pub strip_listen_path: bool,
}

/// OAuth2 settings for an API that authenticates callers via bearer tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OauthConfig {
    #[serde(default)]
    pub allowed_access_types: Vec<String>,
    #[serde(default)]
    pub allowed_authorize_types: Vec<String>,
}

/// The declarative description of one upstream API, as loaded from a
/// definition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDefinition {
    pub api_id: String,
    pub org_id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub use_oauth2: bool,
    #[serde(default)]
    pub oauth_meta: OauthConfig,
    pub version_definition: VersionDefinition,
    /// True if this API has exactly one effective version, selected
    /// deterministically from `versions` rather than read off the request.
    #[serde(default)]
    pub not_versioned: bool,
    /// Version name -> definition. A `BTreeMap` so iteration order is
    /// deterministic, which matters for `not_versioned` selection.
    pub versions: BTreeMap<String, VersionInfo>,
    pub proxy: ProxyConfig,
    pub auth_header_name: String,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_definition() {
        let json = serde_json::json!({
            "api_id": "api-1",
            "org_id": "org-1",
            "name": "Example",
            "version_definition": { "location": "header", "key": "X-Api-Version" },
            "versions": {
                "v1": { "name": "v1" }
            },
            "proxy": {
                "listen_path": "/example/",
                "target_url": "http://upstream.local"
            },
            "auth_header_name": "Authorization"
        });
        let def: ApiDefinition = serde_json::from_value(json).unwrap();
        assert!(def.active);
        assert!(!def.use_oauth2);
        assert_eq!(def.versions.len(), 1);
    }
}
