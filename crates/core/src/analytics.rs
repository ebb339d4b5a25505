use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Effective version name used for APIs that don't carry a version token.
pub const NON_VERSIONED_LABEL: &str = "Non Versioned";

/// One per-request record. Built by the proxy/error terminators and handed
/// to an [`crate`]-external analytics sink. See `warden-analytics` for the
/// sink trait and implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub method: String,
    pub path: String,
    pub content_length: i64,
    pub user_agent: String,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub hour: u32,
    pub response_code: u16,
    pub api_key: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub api_name: String,
    pub api_id: String,
    pub org_id: String,
}

impl AnalyticsRecord {
    /// Build a record, deriving the day/month/year/hour fields from
    /// `timestamp` in UTC.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        content_length: i64,
        user_agent: impl Into<String>,
        response_code: u16,
        api_key: impl Into<String>,
        timestamp: DateTime<Utc>,
        version: Option<&str>,
        api_name: impl Into<String>,
        api_id: impl Into<String>,
        org_id: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            content_length,
            user_agent: user_agent.into(),
            day: timestamp.day(),
            month: timestamp.month(),
            year: timestamp.year(),
            hour: timestamp.hour(),
            response_code,
            api_key: api_key.into(),
            timestamp,
            version: version.unwrap_or(NON_VERSIONED_LABEL).to_owned(),
            api_name: api_name.into(),
            api_id: api_id.into(),
            org_id: org_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_version_label_when_none() {
        let record = AnalyticsRecord::new(
            "GET", "/x", 0, "curl", 200, "key-1", Utc::now(), None, "api", "api-1", "org-1",
        );
        assert_eq!(record.version, NON_VERSIONED_LABEL);
    }
}
