//! Embed states and the process-wide interception behavior
//!
//! Per-frame state lives on the frame itself as data attributes so that it survives
//! independently of the registry:
//! - `data-detour-state="placeholder"` while the frame shows the placeholder page
//! - `data-detour-bypass="true"` once the user chose to keep the original player

use serde::{Deserialize, Serialize};

pub const STATE_ATTRIBUTE: &str = "data-detour-state";
pub const BYPASS_ATTRIBUTE: &str = "data-detour-bypass";

const BYPASS_VALUE: &str = "true";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedState {
    /// Frame shows whatever the page put there
    Untouched,
    /// Frame source points at the placeholder page
    Placeholder,
}

impl EmbedState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedState::Untouched => "untouched",
            EmbedState::Placeholder => "placeholder",
        }
    }

    /// Read the state marker of a frame. A missing or unknown marker is `Untouched`.
    pub fn from_marker(marker: Option<&str>) -> Self {
        match marker {
            Some("placeholder") => EmbedState::Placeholder,
            _ => EmbedState::Untouched,
        }
    }

    pub fn can_transition_to(&self, target: EmbedState) -> bool {
        !matches!(
            (self, target),
            (EmbedState::Placeholder, EmbedState::Placeholder)
        )
    }
}

impl std::fmt::Display for EmbedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub(crate) fn is_bypass_marker(value: Option<&str>) -> bool {
    value == Some(BYPASS_VALUE)
}

pub(crate) fn bypass_marker() -> &'static str {
    BYPASS_VALUE
}

/// What to do with recognized video-host embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterceptionBehavior {
    /// Leave embeds alone and restore any placeholder
    #[serde(rename = "iframeBehaviorNone")]
    None,
    /// Swap embeds for the placeholder page
    #[serde(rename = "iframeBehaviorReplace", alias = "iframeBehaviorButton")]
    Replace,
}

impl InterceptionBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterceptionBehavior::None => "iframeBehaviorNone",
            InterceptionBehavior::Replace => "iframeBehaviorReplace",
        }
    }

    /// Parse a wire value. The retired `iframeBehaviorButton` option maps to `Replace`;
    /// anything unrecognized yields `None` so callers keep their previous value.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "iframeBehaviorNone" => Some(InterceptionBehavior::None),
            "iframeBehaviorReplace" | "iframeBehaviorButton" => Some(InterceptionBehavior::Replace),
            _ => None,
        }
    }

    /// Whether mutations should trigger scans.
    pub fn monitors_mutations(&self) -> bool {
        matches!(self, InterceptionBehavior::Replace)
    }
}

impl std::fmt::Display for InterceptionBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
