//! Events delivered to the content script

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use detour_navigation::ClickEvent;

use crate::messages::{ConfigUpdate, FrameMessage};

/// A node added to the document, as summarized by the host's mutation observer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddedNode {
    pub is_element: bool,
    /// The node itself is an embedded frame
    pub is_embed: bool,
    /// Some descendant is an embedded frame
    pub contains_embed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mutation {
    Attributes {
        #[serde(rename = "targetIsEmbed")]
        target_is_embed: bool,
        #[serde(rename = "attributeName")]
        attribute_name: String,
    },
    ChildList {
        added: Vec<AddedNode>,
    },
}

impl Mutation {
    /// Whether this mutation can change which frames need interception.
    pub fn affects_embeds(&self) -> bool {
        match self {
            Mutation::Attributes {
                target_is_embed,
                attribute_name,
            } => *target_is_embed && attribute_name == detour_embeds::SOURCE_ATTRIBUTE,
            Mutation::ChildList { added } => added
                .iter()
                .any(|node| node.is_element && (node.is_embed || node.contains_embed)),
        }
    }
}

/// How the host should treat the DOM event that produced a [`PageEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Continue,
    /// Cancel the default action and stop propagation
    PreventDefault,
}

#[derive(Debug)]
pub enum PageEvent {
    /// DOM content loaded (sent immediately if the document was already loaded)
    DomReady,
    AnimationFrame,
    Mutations(Vec<Mutation>),
    Config(ConfigUpdate),
    FrameMessage(FrameMessage),
    /// Clicks need a synchronous answer; `reply` carries it back when the event
    /// went through a channel.
    Click {
        event: ClickEvent,
        reply: Option<oneshot::Sender<Disposition>>,
    },
    ThemeChanged {
        is_dark: bool,
    },
}

impl PageEvent {
    pub fn click(event: ClickEvent) -> Self {
        PageEvent::Click { event, reply: None }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PageEvent::DomReady => "dom_ready",
            PageEvent::AnimationFrame => "animation_frame",
            PageEvent::Mutations(_) => "mutations",
            PageEvent::Config(_) => "config",
            PageEvent::FrameMessage(_) => "frame_message",
            PageEvent::Click { .. } => "click",
            PageEvent::ThemeChanged { .. } => "theme_changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevant_mutations() {
        let src = Mutation::Attributes {
            target_is_embed: true,
            attribute_name: "src".to_string(),
        };
        assert!(src.affects_embeds());

        let other_attr = Mutation::Attributes {
            target_is_embed: true,
            attribute_name: "class".to_string(),
        };
        assert!(!other_attr.affects_embeds());

        let not_embed = Mutation::Attributes {
            target_is_embed: false,
            attribute_name: "src".to_string(),
        };
        assert!(!not_embed.affects_embeds());
    }

    #[test]
    fn test_child_list_mutations() {
        let wrapper = Mutation::ChildList {
            added: vec![
                AddedNode::default(),
                AddedNode {
                    is_element: true,
                    contains_embed: true,
                    ..Default::default()
                },
            ],
        };
        assert!(wrapper.affects_embeds());

        let text_only = Mutation::ChildList {
            added: vec![AddedNode::default()],
        };
        assert!(!text_only.affects_embeds());

        let plain_div = Mutation::ChildList {
            added: vec![AddedNode {
                is_element: true,
                ..Default::default()
            }],
        };
        assert!(!plain_div.affects_embeds());
    }

    #[test]
    fn test_mutation_wire_format() {
        let mutation: Mutation = serde_json::from_str(
            r#"{"type":"childList","added":[{"isElement":true,"isEmbed":true}]}"#,
        )
        .unwrap();
        assert!(mutation.affects_embeds());
    }
}
