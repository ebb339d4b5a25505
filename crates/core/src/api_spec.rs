use std::collections::BTreeMap;

use regex::Regex;

use crate::api_definition::ApiDefinition;
use crate::error::CoreError;

/// Classification outcome for a path rule match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRuleStatus {
    Ignored,
    Blacklist,
    Whitelist,
}

/// One compiled entry in a version's ruleset.
pub struct CompiledPathRule {
    pub pattern: Regex,
    pub status: PathRuleStatus,
}

impl std::fmt::Debug for CompiledPathRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledPathRule")
            .field("pattern", &self.pattern.as_str())
            .field("status", &self.status)
            .finish()
    }
}

/// Outcome of `IsRequestValid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    VersionNotFound,
    VersionDoesNotExist,
    VersionPathsNotFound,
    VersionWhiteListStatusNotFound,
    VersionExpired,
    EndPointNotAllowed,
    StatusOkAndIgnore,
    StatusOK,
}

impl RequestStatus {
    /// The message rendered into the 409 body for non-OK statuses.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::VersionNotFound => "This API version does not seem to exist",
            Self::VersionDoesNotExist => "This API version does not exist",
            Self::VersionPathsNotFound => "Version path rules not found",
            Self::VersionWhiteListStatusNotFound => "Version whitelist status not found",
            Self::VersionExpired => "Api Version has expired",
            Self::EndPointNotAllowed => "Requested endpoint is forbidden",
            Self::StatusOkAndIgnore | Self::StatusOK => "",
        }
    }

    #[must_use]
    pub fn is_ok(self) -> bool {
        matches!(self, Self::StatusOK | Self::StatusOkAndIgnore)
    }
}

/// The compiled, runtime form of an [`ApiDefinition`].
#[derive(Debug)]
pub struct ApiSpec {
    pub definition: ApiDefinition,
    /// Version name -> ordered (ignored, blacklist, whitelist) ruleset.
    pub path_rules: BTreeMap<String, Vec<CompiledPathRule>>,
    /// Version name -> whether that version declared any whitelist entries.
    pub whitelist_enabled: BTreeMap<String, bool>,
}

/// Replace every `{anything}` placeholder in a path pattern with a
/// non-greedy capture, then compile it. The resulting pattern is searched
/// against the request path, not anchored to the whole string.
fn compile_path_pattern(version: &str, raw: &str) -> Result<Regex, CoreError> {
    let mut substituted = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '{' {
            while let Some(&next) = chars.peek() {
                chars.next();
                if next == '}' {
                    break;
                }
            }
            substituted.push_str("(.*?)");
        } else {
            substituted.push_str(&regex::escape(&c.to_string()));
        }
    }
    Regex::new(&substituted).map_err(|source| CoreError::InvalidPathPattern {
        version: version.to_owned(),
        pattern: raw.to_owned(),
        source,
    })
}

impl ApiSpec {
    /// Compile an [`ApiDefinition`] into its runtime [`ApiSpec`] form.
    ///
    /// Per version, the ruleset is the concatenation of `ignored`,
    /// `blacklist`, then `whitelist` patterns, in that order; the first
    /// matching pattern wins during classification.
    pub fn compile(definition: ApiDefinition) -> Result<Self, CoreError> {
        let mut path_rules = BTreeMap::new();
        let mut whitelist_enabled = BTreeMap::new();

        for (name, info) in &definition.versions {
            let mut rules = Vec::with_capacity(
                info.ignored.len() + info.blacklist.len() + info.whitelist.len(),
            );
            for raw in &info.ignored {
                rules.push(CompiledPathRule {
                    pattern: compile_path_pattern(name, raw)?,
                    status: PathRuleStatus::Ignored,
                });
            }
            for raw in &info.blacklist {
                rules.push(CompiledPathRule {
                    pattern: compile_path_pattern(name, raw)?,
                    status: PathRuleStatus::Blacklist,
                });
            }
            for raw in &info.whitelist {
                rules.push(CompiledPathRule {
                    pattern: compile_path_pattern(name, raw)?,
                    status: PathRuleStatus::Whitelist,
                });
            }
            whitelist_enabled.insert(name.clone(), !info.whitelist.is_empty());
            path_rules.insert(name.clone(), rules);
        }

        Ok(Self {
            definition,
            path_rules,
            whitelist_enabled,
        })
    }

    /// Classify a request path against a version's ruleset: `(allow?,
    /// ignore_auth?)`.
    #[must_use]
    pub fn classify_path(&self, version: &str, path: &str) -> (bool, bool) {
        let Some(rules) = self.path_rules.get(version) else {
            return (true, false);
        };
        for rule in rules {
            if rule.pattern.is_match(path) {
                return match rule.status {
                    PathRuleStatus::Ignored => (true, true),
                    PathRuleStatus::Blacklist => (false, false),
                    PathRuleStatus::Whitelist => (true, false),
                };
            }
        }
        if self.whitelist_enabled.get(version).copied().unwrap_or(false) {
            (false, false)
        } else {
            (true, false)
        }
    }

    /// The deterministic effective version for a `not_versioned` API: the
    /// lexicographically smallest version name.
    #[must_use]
    pub fn not_versioned_effective_version(&self) -> Option<&str> {
        self.definition.versions.keys().next().map(String::as_str)
    }
}
