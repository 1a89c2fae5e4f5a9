//! Host document abstraction
//!
//! The interceptor never owns frames. A host (a real DOM binding or the in-memory
//! [`MemoryDocument`](crate::MemoryDocument)) hands out shared frame handles and the
//! interceptor only keeps weak references to them.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Attribute holding the frame's visible source.
pub const SOURCE_ATTRIBUTE: &str = "src";

/// Identity of a frame's content window, used to match cross-document messages
/// back to the frame that sent them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowId(Uuid);

impl WindowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WindowId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An embedded frame element.
pub trait EmbedFrame: Send + Sync {
    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&self, name: &str, value: &str);

    fn remove_attribute(&self, name: &str);

    /// Content window identity; `None` while the frame has no browsing context.
    fn window(&self) -> Option<WindowId>;

    fn source(&self) -> Option<String> {
        self.attribute(SOURCE_ATTRIBUTE)
    }

    fn set_source(&self, source: &str) {
        self.set_attribute(SOURCE_ATTRIBUTE, source);
    }
}

/// A document containing embedded frames.
pub trait Document: Send + Sync {
    type Frame: EmbedFrame;

    /// All frames currently attached, in document order.
    fn frames(&self) -> Vec<Arc<Self::Frame>>;

    /// Whether a body (or document element) exists for a mutation observer to attach to.
    fn has_observation_root(&self) -> bool;

    /// Current document URL, used as the base for relative links.
    fn location(&self) -> String;
}
