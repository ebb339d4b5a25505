pub mod access_rights;
pub mod analytics;
pub mod key_exists;
pub mod key_expired;
pub mod oauth2_key_exists;
pub mod rate_limit_and_quota;
pub mod version_check;

pub use access_rights::AccessRightsLayer;
pub use analytics::AnalyticsLayer;
pub use key_exists::KeyExistsLayer;
pub use key_expired::KeyExpiredLayer;
pub use oauth2_key_exists::Oauth2KeyExistsLayer;
pub use rate_limit_and_quota::RateLimitAndQuotaLayer;
pub use version_check::VersionCheckLayer;
