use chrono::{DateTime, Utc};

use warden_core::{ApiSpec, RequestStatus};

use crate::version::is_version_expired;

/// Result of [`is_request_valid`]: the overall status, the effective
/// version name (if one could be resolved at all), and whether the matched
/// path rule says to skip authentication.
pub struct RequestValidation {
    pub status: RequestStatus,
    pub effective_version: Option<String>,
    pub ignore_auth: bool,
}

/// The deterministic effective version for this request: for a
/// `not_versioned` API, the lexicographically smallest declared version;
/// otherwise whatever the caller extracted from the header/query param.
#[must_use]
pub fn resolve_effective_version(spec: &ApiSpec, extracted: Option<String>) -> Option<String> {
    if spec.definition.not_versioned {
        spec.not_versioned_effective_version().map(str::to_owned)
    } else {
        extracted
    }
}

/// Compose version resolution, version existence/expiry, and path
/// classification into the single [`RequestStatus`] decision for a request.
#[must_use]
pub fn is_request_valid(
    spec: &ApiSpec,
    extracted_version: Option<String>,
    path: &str,
    now: DateTime<Utc>,
) -> RequestValidation {
    let Some(version_name) = resolve_effective_version(spec, extracted_version) else {
        return RequestValidation {
            status: RequestStatus::VersionNotFound,
            effective_version: None,
            ignore_auth: false,
        };
    };

    let Some(info) = spec.definition.versions.get(&version_name) else {
        return RequestValidation {
            status: RequestStatus::VersionDoesNotExist,
            effective_version: Some(version_name),
            ignore_auth: false,
        };
    };

    if !spec.path_rules.contains_key(&version_name) {
        return RequestValidation {
            status: RequestStatus::VersionPathsNotFound,
            effective_version: Some(version_name),
            ignore_auth: false,
        };
    }

    if !spec.whitelist_enabled.contains_key(&version_name) {
        return RequestValidation {
            status: RequestStatus::VersionWhiteListStatusNotFound,
            effective_version: Some(version_name),
            ignore_auth: false,
        };
    }

    if is_version_expired(info, now) {
        return RequestValidation {
            status: RequestStatus::VersionExpired,
            effective_version: Some(version_name),
            ignore_auth: false,
        };
    }

    let (allow, ignore_auth) = spec.classify_path(&version_name, path);
    if !allow {
        return RequestValidation {
            status: RequestStatus::EndPointNotAllowed,
            effective_version: Some(version_name),
            ignore_auth: false,
        };
    }

    RequestValidation {
        status: if ignore_auth {
            RequestStatus::StatusOkAndIgnore
        } else {
            RequestStatus::StatusOK
        },
        effective_version: Some(version_name),
        ignore_auth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use warden_core::{
        ApiDefinition, OauthConfig, ProxyConfig, VersionDefinition, VersionDefinitionLocation,
        VersionInfo,
    };

    fn spec_with_version(info: VersionInfo) -> ApiSpec {
        let mut versions = BTreeMap::new();
        versions.insert(info.name.clone(), info);
        let definition = ApiDefinition {
            api_id: "api-1".into(),
            org_id: "org-1".into(),
            name: "Example".into(),
            active: true,
            use_oauth2: false,
            oauth_meta: OauthConfig::default(),
            version_definition: VersionDefinition {
                location: VersionDefinitionLocation::Header,
                key: "X-Api-Version".into(),
            },
            not_versioned: false,
            versions,
            proxy: ProxyConfig {
                listen_path: "/example/".into(),
                target_url: "http://upstream.local".into(),
                strip_listen_path: true,
            },
            auth_header_name: "Authorization".into(),
        };
        ApiSpec::compile(definition).unwrap()
    }

    #[test]
    fn missing_version_token_is_version_not_found() {
        let spec = spec_with_version(VersionInfo {
            name: "v1".into(),
            ..Default::default()
        });
        let result = is_request_valid(&spec, None, "/x", Utc::now());
        assert_eq!(result.status, RequestStatus::VersionNotFound);
    }

    #[test]
    fn unknown_version_name_does_not_exist() {
        let spec = spec_with_version(VersionInfo {
            name: "v1".into(),
            ..Default::default()
        });
        let result = is_request_valid(&spec, Some("v2".into()), "/x", Utc::now());
        assert_eq!(result.status, RequestStatus::VersionDoesNotExist);
    }

    #[test]
    fn expired_version_is_rejected() {
        let spec = spec_with_version(VersionInfo {
            name: "v1".into(),
            expires: "2000-01-01 00:00".into(),
            ..Default::default()
        });
        let result = is_request_valid(&spec, Some("v1".into()), "/x", Utc::now());
        assert_eq!(result.status, RequestStatus::VersionExpired);
    }

    #[test]
    fn ignored_path_short_circuits_to_ok_and_ignore() {
        let spec = spec_with_version(VersionInfo {
            name: "v1".into(),
            ignored: vec!["/public/{any}".into()],
            ..Default::default()
        });
        let result = is_request_valid(&spec, Some("v1".into()), "/public/x", Utc::now());
        assert_eq!(result.status, RequestStatus::StatusOkAndIgnore);
        assert!(result.ignore_auth);
    }

    #[test]
    fn whitelist_excludes_other_paths() {
        let spec = spec_with_version(VersionInfo {
            name: "v1".into(),
            whitelist: vec!["/allowed".into()],
            ..Default::default()
        });
        let result = is_request_valid(&spec, Some("v1".into()), "/other", Utc::now());
        assert_eq!(result.status, RequestStatus::EndPointNotAllowed);
    }

    #[test]
    fn not_versioned_picks_deterministic_version() {
        let mut versions = BTreeMap::new();
        versions.insert("v2".into(), VersionInfo { name: "v2".into(), ..Default::default() });
        versions.insert("v1".into(), VersionInfo { name: "v1".into(), ..Default::default() });
        let definition = ApiDefinition {
            api_id: "api-1".into(),
            org_id: "org-1".into(),
            name: "Example".into(),
            active: true,
            use_oauth2: false,
            oauth_meta: OauthConfig::default(),
            version_definition: VersionDefinition {
                location: VersionDefinitionLocation::Header,
                key: "X-Api-Version".into(),
            },
            not_versioned: true,
            versions,
            proxy: ProxyConfig {
                listen_path: "/example/".into(),
                target_url: "http://upstream.local".into(),
                strip_listen_path: true,
            },
            auth_header_name: "Authorization".into(),
        };
        let spec = ApiSpec::compile(definition).unwrap();
        let result = is_request_valid(&spec, None, "/x", Utc::now());
        assert_eq!(result.effective_version.as_deref(), Some("v1"));
        assert_eq!(result.status, RequestStatus::StatusOK);
    }
}
