//! Host bindings
//!
//! Everything the content script does outside its own state goes through [`Host`]:
//! messages to the background peer, the alternate-player hand-off and frame callbacks.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::messages::{ExternalLaunch, OutboundMessage};

pub trait Host: Send {
    /// Send a message to the background peer.
    fn send(&self, message: OutboundMessage);

    /// Open the alternate player and move the current tab to the fallback page.
    fn launch_external(&self, launch: &ExternalLaunch);

    /// Ask for a [`PageEvent::AnimationFrame`](crate::PageEvent::AnimationFrame) on the next frame.
    fn request_animation_frame(&self);

    /// Current light/dark color-scheme preference.
    fn prefers_dark(&self) -> bool;
}

#[derive(Default)]
struct Recorded {
    messages: Vec<OutboundMessage>,
    launches: Vec<ExternalLaunch>,
    frame_requests: usize,
    prefers_dark: bool,
}

/// Headless host that records every effect.
pub struct RecordingHost {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Recorded::default())),
        }
    }

    pub fn set_prefers_dark(&self, dark: bool) {
        self.inner.lock().prefers_dark = dark;
    }

    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.inner.lock().messages.clone()
    }

    pub fn launches(&self) -> Vec<ExternalLaunch> {
        self.inner.lock().launches.clone()
    }

    pub fn frame_requests(&self) -> usize {
        self.inner.lock().frame_requests
    }
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RecordingHost {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Host for RecordingHost {
    fn send(&self, message: OutboundMessage) {
        self.inner.lock().messages.push(message);
    }

    fn launch_external(&self, launch: &ExternalLaunch) {
        self.inner.lock().launches.push(launch.clone());
    }

    fn request_animation_frame(&self) {
        self.inner.lock().frame_requests += 1;
    }

    fn prefers_dark(&self) -> bool {
        self.inner.lock().prefers_dark
    }
}
