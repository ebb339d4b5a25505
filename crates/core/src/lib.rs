pub mod analytics;
pub mod api_definition;
pub mod api_spec;
pub mod error;
pub mod session;

pub use analytics::AnalyticsRecord;
pub use api_definition::{
    ApiDefinition, OauthConfig, ProxyConfig, VersionDefinition, VersionDefinitionLocation,
    VersionInfo,
};
pub use api_spec::{ApiSpec, CompiledPathRule, PathRuleStatus, RequestStatus};
pub use error::CoreError;
pub use session::{AccessRightsEntry, SessionState};
