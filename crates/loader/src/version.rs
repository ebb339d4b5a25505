use chrono::NaiveDateTime;

use warden_core::{VersionDefinition, VersionDefinitionLocation, VersionInfo};

/// Extract the version token from a request, given where the API definition
/// says to look for it. `header` and `query_param` are callbacks so this
/// crate doesn't need to depend on any particular HTTP framework's request
/// type.
pub fn extract_version(
    version_definition: &VersionDefinition,
    header: impl FnOnce(&str) -> Option<String>,
    query_param: impl FnOnce(&str) -> Option<String>,
) -> Option<String> {
    match version_definition.location {
        VersionDefinitionLocation::Header => header(&version_definition.key),
        VersionDefinitionLocation::UrlParam => query_param(&version_definition.key),
    }
}

/// Parse a `VersionInfo.expires` string and decide whether it denotes an
/// expired version as of `now`.
///
/// `"-1"` or empty means never expires. Otherwise the value is parsed as
/// `YYYY-MM-DD HH:MM`; an unparseable value is treated as expired (deny).
#[must_use]
pub fn is_version_expired(info: &VersionInfo, now: chrono::DateTime<chrono::Utc>) -> bool {
    let raw = info.expires.trim();
    if raw.is_empty() || raw == "-1" {
        return false;
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M") {
        Ok(parsed) => parsed.and_utc() <= now,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn info_with_expires(expires: &str) -> VersionInfo {
        VersionInfo {
            name: "v1".into(),
            expires: expires.into(),
            ignored: vec![],
            whitelist: vec![],
            blacklist: vec![],
        }
    }

    #[test]
    fn minus_one_never_expires() {
        let now = chrono::Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert!(!is_version_expired(&info_with_expires("-1"), now));
    }

    #[test]
    fn empty_never_expires() {
        let now = chrono::Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        assert!(!is_version_expired(&info_with_expires(""), now));
    }

    #[test]
    fn past_timestamp_is_expired() {
        let now = chrono::Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert!(is_version_expired(
            &info_with_expires("2000-01-01 00:00"),
            now
        ));
    }

    #[test]
    fn future_timestamp_is_not_expired() {
        let now = chrono::Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert!(!is_version_expired(
            &info_with_expires("2099-01-01 00:00"),
            now
        ));
    }

    #[test]
    fn unparseable_is_expired() {
        let now = chrono::Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert!(is_version_expired(&info_with_expires("garbage"), now));
    }

    #[test]
    fn extracts_from_header() {
        let def = VersionDefinition {
            location: VersionDefinitionLocation::Header,
            key: "X-Api-Version".into(),
        };
        let got = extract_version(&def, |_| Some("v2".into()), |_| None);
        assert_eq!(got.as_deref(), Some("v2"));
    }

    #[test]
    fn extracts_from_query_param() {
        let def = VersionDefinition {
            location: VersionDefinitionLocation::UrlParam,
            key: "v".into(),
        };
        let got = extract_version(&def, |_| None, |_| Some("v3".into()));
        assert_eq!(got.as_deref(), Some("v3"));
    }
}
