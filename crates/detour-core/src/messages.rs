//! Message contracts with the settings peer, the background peer and the
//! placeholder page

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use detour_embeds::WindowId;

use crate::config::Config;

/// Inbound configuration message from the settings peer. Every field is optional;
/// absent fields leave the current value in place. A field of the wrong JSON type is
/// dropped on its own and the rest of the message still applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigUpdate {
    /// Raw behavior value, validated by [`InterceptionBehavior::from_wire`](detour_embeds::InterceptionBehavior::from_wire)
    #[serde(deserialize_with = "lenient")]
    pub interception_behavior: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub button_label: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub auto_redirect_on_click: Option<AutoRedirect>,
    /// Raw rule payload, passed through [`detour_rules::normalize`]
    pub url_rules_config: Option<Value>,
}

impl ConfigUpdate {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }

    match T::deserialize(&value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            tracing::debug!(error = %e, value = %value, "Ignoring malformed configuration field");
            Ok(None)
        }
    }
}

/// Redirect-on-click flag. Older settings pages send it as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AutoRedirect {
    Flag(bool),
    Legacy(String),
}

impl AutoRedirect {
    /// `None` for unrecognized legacy strings.
    pub fn enabled(&self) -> Option<bool> {
        match self {
            AutoRedirect::Flag(flag) => Some(*flag),
            AutoRedirect::Legacy(value) => match value.as_str() {
                "autoRedirectLinksYes" => Some(true),
                "autoRedirectLinksNo" => Some(false),
                _ => None,
            },
        }
    }
}

/// Messages sent to the background peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OutboundMessage {
    ThemeChanged {
        #[serde(rename = "isDark")]
        is_dark: bool,
    },
    LinkRedirect {
        url: String,
    },
}

/// The user's choice on the placeholder page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmbedAction {
    OpenExternal,
    KeepOriginal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaceholderMessage {
    EmbedAction { action: EmbedAction },
}

/// A cross-document message as received by the page's message listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameMessage {
    /// Origin of the sending document
    pub origin: String,
    /// Content window that posted the message
    pub source: Option<WindowId>,
    pub data: Value,
}

impl FrameMessage {
    /// Decode the payload; `None` for anything that is not a placeholder action.
    pub fn placeholder_message(&self) -> Option<PlaceholderMessage> {
        serde_json::from_value(self.data.clone()).ok()
    }
}

/// Hand-off of a video to the alternate player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLaunch {
    /// Opened in a new browsing context
    pub player_uri: String,
    /// The current tab navigates here
    pub fallback_url: String,
}

impl ExternalLaunch {
    pub fn new(config: &Config, source: &str) -> Self {
        Self {
            player_uri: format!("{}{}", config.player_scheme, source),
            fallback_url: config.fallback_homepage.clone(),
        }
    }
}
