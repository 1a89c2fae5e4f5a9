//! Click events as delivered by the host page

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum MouseButton {
    Primary,
    Auxiliary,
    Secondary,
    Other(u16),
}

impl From<u16> for MouseButton {
    fn from(code: u16) -> Self {
        match code {
            0 => MouseButton::Primary,
            1 => MouseButton::Auxiliary,
            2 => MouseButton::Secondary,
            other => MouseButton::Other(other),
        }
    }
}

impl From<MouseButton> for u16 {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Primary => 0,
            MouseButton::Auxiliary => 1,
            MouseButton::Secondary => 2,
            MouseButton::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub meta: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.meta || self.ctrl || self.shift || self.alt
    }
}

/// The closest anchor ancestor of the click target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Anchor {
    /// Raw `href` attribute, possibly relative
    pub href: Option<String>,
    /// Raw `target` attribute
    pub target: Option<String>,
    /// Whether a `download` attribute is present
    pub download: bool,
}

impl Anchor {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Default::default()
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_download(mut self) -> Self {
        self.download = true;
        self
    }

    /// Whether following the link stays in this frame, its parent, or the top frame.
    pub fn targets_current_context(&self) -> bool {
        match self.target.as_deref().map(str::to_lowercase).as_deref() {
            None | Some("") | Some("_self") | Some("_top") | Some("_parent") => true,
            Some(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub button: MouseButton,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub default_prevented: bool,
    #[serde(default)]
    pub anchor: Option<Anchor>,
}

impl ClickEvent {
    /// Plain left click on an anchor.
    pub fn primary(anchor: Anchor) -> Self {
        Self {
            button: MouseButton::Primary,
            modifiers: Modifiers::default(),
            default_prevented: false,
            anchor: Some(anchor),
        }
    }
}
