use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One entry in a session's access-rights map: which API, and which of its
/// versions, the key is allowed to reach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRightsEntry {
    pub api_name: String,
    pub api_id: String,
    #[serde(default)]
    pub allowed_versions: Vec<String>,
}

/// The per-key authorization + rate + quota record.
///
/// Invariants: `0 <= allowance <= rate`; if `quota_max >= 0` then
/// `0 <= quota_remaining <= quota_max` except during the instant between
/// depletion and renewal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Seconds since epoch of the last rate-limit evaluation.
    pub last_check: i64,
    pub allowance: f64,
    pub rate: f64,
    /// Window length in seconds over which `rate` tokens are replenished.
    pub per: f64,

    /// Seconds since epoch; 0 means never expires.
    #[serde(default)]
    pub expires: i64,

    /// -1 means unlimited.
    #[serde(default = "default_quota_max")]
    pub quota_max: i64,
    #[serde(default)]
    pub quota_remaining: i64,
    /// Seconds since epoch at which the quota next renews.
    #[serde(default)]
    pub quota_renews: i64,
    #[serde(default)]
    pub quota_renewal_rate: i64,

    #[serde(default)]
    pub access_rights: HashMap<String, AccessRightsEntry>,

    #[serde(default)]
    pub org_id: String,
}

fn default_quota_max() -> i64 {
    -1
}

impl SessionState {
    /// True iff `expires >= 1` and `expires <= now` (seconds since epoch).
    #[must_use]
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires >= 1 && self.expires <= now
    }

    /// `expires - now + 300`, the 5-minute grace window used as the store
    /// TTL on write-back. Non-positive means "no expiry" at the store layer.
    #[must_use]
    pub fn store_ttl_seconds(&self, now: i64) -> i64 {
        self.expires - now + 300
    }
}
