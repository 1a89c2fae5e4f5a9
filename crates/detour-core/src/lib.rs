//! Detour Core
//!
//! The content script that runs in every frame of a video-host page. It owns the
//! settings context and the embed registry, and reacts to page events on one task:
//! configuration from the settings peer, DOM mutations, placeholder messages, clicks
//! and theme changes. The embed scan is the only deferred work and is debounced.

mod config;
mod error;
mod events;
mod host;
mod messages;
mod scheduler;
mod script;
mod settings;

pub use config::Config;
pub use error::CoreError;
pub use events::{AddedNode, Disposition, Mutation, PageEvent};
pub use host::{Host, RecordingHost};
pub use messages::{
    AutoRedirect, ConfigUpdate, EmbedAction, ExternalLaunch, FrameMessage, OutboundMessage,
    PlaceholderMessage,
};
pub use scheduler::ScanScheduler;
pub use script::{ContentScript, ObserverState, ScanStats, BUTTON_LABEL_KEY};
pub use settings::{Settings, SettingsChange};

// Re-export the component crates' public surface
pub use detour_embeds::{
    Document, EmbedFrame, EmbedState, InterceptionBehavior, MemoryDocument, MemoryFrame,
    PlaceholderResource, ScanOutcome, WindowId,
};
pub use detour_navigation::{Anchor, ClickDecision, ClickEvent, Modifiers, MouseButton};
pub use detour_rules::{classify, RuleMode, RuleSet};
pub use detour_storage::{Database, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
