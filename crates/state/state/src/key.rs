//! Helpers for the store's persisted key layout: `apikey-<name>` for
//! sessions, `analytics-<timekey>-<uuid>` for analytics records, and
//! `oauth-data.<api_id>.<sub-prefix>.<id>` for OAuth2 artifacts.

/// Build the session key for an auth key name.
#[must_use]
pub fn session_key(name: &str) -> String {
    format!("apikey-{name}")
}

/// Strip the `apikey-` prefix from a session key, if present.
#[must_use]
pub fn strip_session_prefix(key: &str) -> &str {
    key.strip_prefix("apikey-").unwrap_or(key)
}

/// Build an analytics record key for a time-ordered bucket and a unique id.
#[must_use]
pub fn analytics_key(timekey: &str, id: &str) -> String {
    format!("analytics-{timekey}-{id}")
}

/// Build an OAuth2 artifact key under an API's namespace.
#[must_use]
pub fn oauth_key(api_id: &str, sub_prefix: &str, id: &str) -> String {
    format!("oauth-data.{api_id}.{sub_prefix}.{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_key_round_trips() {
        let key = session_key("abc123");
        assert_eq!(key, "apikey-abc123");
        assert_eq!(strip_session_prefix(&key), "abc123");
    }

    #[test]
    fn strip_is_a_no_op_without_the_prefix() {
        assert_eq!(strip_session_prefix("abc123"), "abc123");
    }

    #[test]
    fn oauth_key_layout() {
        assert_eq!(oauth_key("api-1", "client", "xyz"), "oauth-data.api-1.client.xyz");
    }
}
