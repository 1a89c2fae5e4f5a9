//! Redirect classification
//!
//! Total and panic-free: a URL that cannot be parsed is simply not redirectable.

use serde_json::Value;
use url::Url;

use crate::rules::{normalize, RuleSet};

/// Short-link host; redirectable whenever it carries an ID.
pub const SHORT_LINK_HOST: &str = "youtu.be";

/// Every other redirectable host ends with this.
pub const VIDEO_HOST_SUFFIX: &str = "youtube.com";

/// Decide whether `url` should be handed to the alternate player.
pub fn classify(url: &str, rules: &RuleSet) -> bool {
    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(_) => return false,
    };

    let host = match parsed.host_str() {
        Some(host) => host.to_lowercase(),
        None => return false,
    };

    if host == SHORT_LINK_HOST {
        return parsed.path().len() > 1;
    }

    if !host.ends_with(VIDEO_HOST_SUFFIX) {
        return false;
    }

    let path = match parsed.path() {
        "" => "/".to_string(),
        path => path.to_lowercase(),
    };

    if rules.is_denied(&path) {
        return false;
    }

    rules.is_allowed(&path)
}

/// Classify against an unvalidated configuration payload.
pub fn classify_raw(url: &str, raw_rules: &Value) -> bool {
    classify(url, &normalize(raw_rules))
}
