//! Rule configuration store
//!
//! A [`RuleSet`] is only ever built through [`RuleSet::new`], [`RuleSet::default`] or
//! [`normalize`], so every value in circulation already satisfies the prefix
//! invariants: lower-cased, trimmed, non-empty, starting with `/`, deduplicated.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::error::RulesError;

/// Paths that are redirectable in `allowList` mode.
pub const DEFAULT_ALLOW_PREFIXES: &[&str] = &[
    "/watch",
    "/playlist",
    "/@",
    "/channel/",
    "/live/",
    "/shorts/",
    "/podcasts",
    "/gaming",
    "/feed/subscriptions",
    "/feed/library",
    "/feed/you",
    "/post/",
    "/hashtag/",
    "/results",
    "/",
];

/// Paths that are never redirectable, whatever the mode.
pub const DEFAULT_DENY_PREFIXES: &[&str] = &[
    // Account and auth flows
    "/signin",
    "/logout",
    "/login",
    "/oops",
    "/error",
    "/verify",
    "/consent",
    "/account",
    "/premium",
    "/paid_memberships",
    // Ads
    "/s/ads",
    "/pagead",
    // Embeds and APIs
    "/embed/",
    "/iframe_api",
    "/api/",
    // Legal and info pages
    "/t/terms",
    "/about/",
    "/howyoutubeworks/",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleMode {
    /// Only paths matching an allow prefix are redirectable
    #[default]
    AllowList,
    /// Every path that is not denied is redirectable
    AllowAllExcept,
}

impl RuleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleMode::AllowList => "allowList",
            RuleMode::AllowAllExcept => "allowAllExcept",
        }
    }
}

impl std::fmt::Display for RuleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RuleMode {
    type Err = RulesError;

    /// Wire values are matched exactly; there is no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allowList" => Ok(RuleMode::AllowList),
            "allowAllExcept" => Ok(RuleMode::AllowAllExcept),
            _ => Err(RulesError::UnknownMode(s.to_string())),
        }
    }
}

/// The active URL classification rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct RuleSet {
    mode: RuleMode,
    allow: BTreeSet<String>,
    deny: BTreeSet<String>,
}

impl RuleSet {
    /// Build a rule set from a mode and allow prefixes. The deny list is always the
    /// built-in one.
    pub fn new<I, S>(mode: RuleMode, allow: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            mode,
            allow: normalize_prefixes(allow),
            deny: default_deny(),
        }
    }

    pub fn mode(&self) -> RuleMode {
        self.mode
    }

    pub fn allow(&self) -> &BTreeSet<String> {
        &self.allow
    }

    pub fn deny(&self) -> &BTreeSet<String> {
        &self.deny
    }

    /// `path` must already be lower-cased.
    pub fn is_denied(&self, path: &str) -> bool {
        matches_any_prefix(path, &self.deny)
    }

    /// `path` must already be lower-cased. Does not consult the deny list.
    pub fn is_allowed(&self, path: &str) -> bool {
        match self.mode {
            RuleMode::AllowAllExcept => true,
            RuleMode::AllowList => matches_any_prefix(path, &self.allow),
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(RuleMode::AllowList, DEFAULT_ALLOW_PREFIXES)
    }
}

impl From<Value> for RuleSet {
    fn from(raw: Value) -> Self {
        normalize(&raw)
    }
}

/// Turn an arbitrary external payload into a well-formed [`RuleSet`].
///
/// - Anything that is not an object yields the default rules.
/// - `mode` is `allowAllExcept` only for that exact literal.
/// - `allow` is taken from the payload when it is an array, otherwise the default list.
///   Non-string entries are dropped.
/// - `deny` is never read from the payload.
pub fn normalize(raw: &Value) -> RuleSet {
    let Some(object) = raw.as_object() else {
        return RuleSet::default();
    };

    let mode: RuleMode = object
        .get("mode")
        .and_then(Value::as_str)
        .and_then(|mode| mode.parse().ok())
        .unwrap_or_default();

    match object.get("allow").and_then(Value::as_array) {
        Some(items) => RuleSet::new(mode, items.iter().filter_map(Value::as_str)),
        None => RuleSet::new(mode, DEFAULT_ALLOW_PREFIXES),
    }
}

fn normalize_prefixes<I, S>(items: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().trim().to_lowercase())
        .filter(|item| item.starts_with('/'))
        .collect()
}

fn default_deny() -> BTreeSet<String> {
    DEFAULT_DENY_PREFIXES.iter().map(|p| p.to_string()).collect()
}

fn matches_any_prefix(path: &str, prefixes: &BTreeSet<String>) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}
