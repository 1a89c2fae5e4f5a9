//! Click-capture decision

use detour_rules::{classify, RuleSet};
use url::Url;

use crate::click::{ClickEvent, MouseButton};
use crate::error::NavigationError;
use crate::Result;

/// Why a click was left to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Disabled,
    NotPrimaryButton,
    ModifierHeld,
    AlreadyHandled,
    NoAnchor,
    Download,
    OtherBrowsingContext,
    Unresolvable,
    NotRedirectable,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::Disabled => "redirect on click disabled",
            IgnoreReason::NotPrimaryButton => "not a primary button click",
            IgnoreReason::ModifierHeld => "modifier key held",
            IgnoreReason::AlreadyHandled => "default already prevented",
            IgnoreReason::NoAnchor => "no anchor with href",
            IgnoreReason::Download => "download link",
            IgnoreReason::OtherBrowsingContext => "opens another browsing context",
            IgnoreReason::Unresolvable => "href does not resolve",
            IgnoreReason::NotRedirectable => "URL is not redirectable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickDecision {
    /// Let the browser navigate normally
    Ignore(IgnoreReason),
    /// Cancel the navigation and redirect this absolute URL
    Redirect(String),
}

impl ClickDecision {
    pub fn is_redirect(&self) -> bool {
        matches!(self, ClickDecision::Redirect(_))
    }
}

/// Resolve an anchor href against the document location.
pub fn resolve_href(href: &str, location: &str) -> Result<Url> {
    if href.is_empty() {
        return Err(NavigationError::EmptyHref);
    }

    let base = Url::parse(location)
        .map_err(|e| NavigationError::InvalidUrl(format!("{}: {}", location, e)))?;

    base.join(href)
        .map_err(|e| NavigationError::InvalidUrl(format!("{}: {}", href, e)))
}

/// Click decisions for one document, against the rules active right now.
pub struct LinkInterceptor<'a> {
    location: &'a str,
    rules: &'a RuleSet,
    enabled: bool,
}

impl<'a> LinkInterceptor<'a> {
    pub fn new(location: &'a str, rules: &'a RuleSet, enabled: bool) -> Self {
        Self {
            location,
            rules,
            enabled,
        }
    }

    pub fn decide(&self, event: &ClickEvent) -> ClickDecision {
        match self.evaluate(event) {
            Ok(url) => {
                tracing::info!(url = %url, "Intercepted link navigation");
                ClickDecision::Redirect(url)
            }
            Err(reason) => {
                tracing::debug!(reason = reason.as_str(), "Click left to the browser");
                ClickDecision::Ignore(reason)
            }
        }
    }

    fn evaluate(&self, event: &ClickEvent) -> std::result::Result<String, IgnoreReason> {
        if !self.enabled {
            return Err(IgnoreReason::Disabled);
        }

        if event.default_prevented {
            return Err(IgnoreReason::AlreadyHandled);
        }

        if event.button != MouseButton::Primary {
            return Err(IgnoreReason::NotPrimaryButton);
        }

        if event.modifiers.any() {
            return Err(IgnoreReason::ModifierHeld);
        }

        let anchor = event.anchor.as_ref().ok_or(IgnoreReason::NoAnchor)?;
        let href = anchor.href.as_deref().ok_or(IgnoreReason::NoAnchor)?;

        if anchor.download {
            return Err(IgnoreReason::Download);
        }

        if !anchor.targets_current_context() {
            return Err(IgnoreReason::OtherBrowsingContext);
        }

        let resolved = resolve_href(href, self.location)
            .map_err(|_| IgnoreReason::Unresolvable)?
            .to_string();

        if !classify(&resolved, self.rules) {
            return Err(IgnoreReason::NotRedirectable);
        }

        Ok(resolved)
    }
}
